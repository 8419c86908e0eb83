use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::registry::vertex_id;
use crate::relationship::Relationship;
use crate::schema::{PropertyDef, TypeSchema, Value};

/// The closed set of resource kinds the typed pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Image,
    Keypair,
    Volume,
    VolumeSnapshot,
    Instance,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Keypair => "keypair",
            ResourceKind::Volume => "volume",
            ResourceKind::VolumeSnapshot => "volume_snapshot",
            ResourceKind::Instance => "instance",
        }
    }

    /// The OpenStack service that owns the kind.
    pub fn source_system(self) -> &'static str {
        match self {
            ResourceKind::Image => "glance",
            ResourceKind::Keypair | ResourceKind::Instance => "nova",
            ResourceKind::Volume | ResourceKind::VolumeSnapshot => "cinder",
        }
    }

    pub fn schema(self) -> &'static TypeSchema {
        match self {
            ResourceKind::Image => Image::schema(),
            ResourceKind::Keypair => Keypair::schema(),
            ResourceKind::Volume => Volume::schema(),
            ResourceKind::VolumeSnapshot => VolumeSnapshot::schema(),
            ResourceKind::Instance => Instance::schema(),
        }
    }

    /// Output unit name of the kind's vertex file, e.g. `cinder.volume_snapshot`.
    pub fn unit_name(self) -> String {
        format!("{}.{}", self.source_system(), self.as_str())
    }
}

/// A typed resource record with a fixed vertex schema.
pub trait ResourceRecord {
    const KIND: ResourceKind;

    fn schema() -> &'static TypeSchema;
    fn source_id(&self) -> &str;
    fn display_name(&self) -> Option<&str>;
    /// Property values in the order of [`ResourceRecord::schema`].
    fn values(&self) -> Vec<Value>;

    /// Peer key for a relationship whose defining attribute lives on this record.
    fn reference(&self, _relationship: Relationship) -> Option<&str> {
        None
    }

    fn vid(&self) -> String {
        vertex_id(self.display_name(), self.source_id())
    }
}

static IMAGE_SCHEMA: Lazy<TypeSchema> = Lazy::new(|| {
    TypeSchema::tag(
        "image",
        vec![
            PropertyDef::string("id"),
            PropertyDef::string("name").nullable(),
            PropertyDef::string("status"),
            PropertyDef::int("size").nullable(),
            PropertyDef::int("min_disk"),
            PropertyDef::int("min_ram"),
            PropertyDef::string("created_at"),
            PropertyDef::string("updated_at"),
        ],
    )
});

static KEYPAIR_SCHEMA: Lazy<TypeSchema> = Lazy::new(|| {
    TypeSchema::tag(
        "keypair",
        vec![
            PropertyDef::string("id"),
            PropertyDef::string("name"),
            PropertyDef::string("fingerprint"),
        ],
    )
});

static VOLUME_SCHEMA: Lazy<TypeSchema> = Lazy::new(|| {
    TypeSchema::tag(
        "volume",
        vec![
            PropertyDef::string("id"),
            PropertyDef::string("name").nullable(),
            PropertyDef::string("status"),
            PropertyDef::int("size"),
            PropertyDef::string("volume_type").nullable(),
            PropertyDef::string("created_at"),
        ],
    )
});

static VOLUME_SNAPSHOT_SCHEMA: Lazy<TypeSchema> = Lazy::new(|| {
    TypeSchema::tag(
        "volume_snapshot",
        vec![
            PropertyDef::string("id"),
            PropertyDef::string("name").nullable(),
            PropertyDef::string("description").nullable(),
            PropertyDef::string("status"),
            PropertyDef::int("size"),
            PropertyDef::string("volume_id").nullable(),
        ],
    )
});

static INSTANCE_SCHEMA: Lazy<TypeSchema> = Lazy::new(|| {
    TypeSchema::tag(
        "instance",
        vec![
            PropertyDef::string("id"),
            PropertyDef::string("name").nullable(),
            PropertyDef::string("status"),
            PropertyDef::string("key_name").nullable(),
            PropertyDef::string("created_at"),
        ],
    )
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: String,
    pub name: Option<String>,
    pub status: String,
    pub size: Option<i64>,
    pub min_disk: i64,
    pub min_ram: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Volume the image was uploaded from. OpenStack does not persist this,
    /// so it is only set when the fetch layer is told about it.
    pub source_volume_id: Option<String>,
}

impl ResourceRecord for Image {
    const KIND: ResourceKind = ResourceKind::Image;

    fn schema() -> &'static TypeSchema {
        &IMAGE_SCHEMA
    }

    fn source_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.as_str()),
            Value::from(self.name.as_deref()),
            Value::from(self.status.as_str()),
            Value::from(self.size),
            Value::from(self.min_disk),
            Value::from(self.min_ram),
            Value::from(self.created_at.as_str()),
            Value::from(self.updated_at.as_str()),
        ]
    }

    fn reference(&self, relationship: Relationship) -> Option<&str> {
        match relationship {
            Relationship::ImageFromVolume => self.source_volume_id.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keypair {
    pub id: String,
    pub name: String,
    pub fingerprint: String,
}

impl ResourceRecord for Keypair {
    const KIND: ResourceKind = ResourceKind::Keypair;

    fn schema() -> &'static TypeSchema {
        &KEYPAIR_SCHEMA
    }

    fn source_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.as_str()),
            Value::from(self.name.as_str()),
            Value::from(self.fingerprint.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub id: String,
    pub name: Option<String>,
    pub status: String,
    pub size: i64,
    pub volume_type: Option<String>,
    pub created_at: String,
    pub snapshot_id: Option<String>,
    pub source_volid: Option<String>,
    /// Image id from the volume's image metadata, when it was created from an image.
    pub image_id: Option<String>,
}

impl ResourceRecord for Volume {
    const KIND: ResourceKind = ResourceKind::Volume;

    fn schema() -> &'static TypeSchema {
        &VOLUME_SCHEMA
    }

    fn source_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.as_str()),
            Value::from(self.name.as_deref()),
            Value::from(self.status.as_str()),
            Value::from(self.size),
            Value::from(self.volume_type.as_deref()),
            Value::from(self.created_at.as_str()),
        ]
    }

    fn reference(&self, relationship: Relationship) -> Option<&str> {
        match relationship {
            Relationship::VolumeFromSnapshot => self.snapshot_id.as_deref(),
            Relationship::VolumeFromImage => self.image_id.as_deref(),
            Relationship::VolumeFromVolume => self.source_volid.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub size: i64,
    pub volume_id: Option<String>,
}

impl ResourceRecord for VolumeSnapshot {
    const KIND: ResourceKind = ResourceKind::VolumeSnapshot;

    fn schema() -> &'static TypeSchema {
        &VOLUME_SNAPSHOT_SCHEMA
    }

    fn source_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.as_str()),
            Value::from(self.name.as_deref()),
            Value::from(self.description.as_deref()),
            Value::from(self.status.as_str()),
            Value::from(self.size),
            Value::from(self.volume_id.as_deref()),
        ]
    }

    fn reference(&self, relationship: Relationship) -> Option<&str> {
        match relationship {
            Relationship::SnapshotFromVolume => self.volume_id.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub id: String,
    pub name: Option<String>,
    pub status: String,
    pub created_at: String,
    /// Empty or absent for instances booted from a volume.
    pub image_id: Option<String>,
    pub key_name: Option<String>,
}

impl ResourceRecord for Instance {
    const KIND: ResourceKind = ResourceKind::Instance;

    fn schema() -> &'static TypeSchema {
        &INSTANCE_SCHEMA
    }

    fn source_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.as_str()),
            Value::from(self.name.as_deref()),
            Value::from(self.status.as_str()),
            Value::from(self.key_name.as_deref()),
            Value::from(self.created_at.as_str()),
        ]
    }

    fn reference(&self, relationship: Relationship) -> Option<&str> {
        match relationship {
            Relationship::ImageUsedBy => self.image_id.as_deref(),
            Relationship::KeypairUsedBy => self.key_name.as_deref(),
            _ => None,
        }
    }
}

/// Everything the typed pipeline consumes for one run, as returned by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub images: Vec<Image>,
    pub keypairs: Vec<Keypair>,
    pub volumes: Vec<Volume>,
    pub volume_snapshots: Vec<VolumeSnapshot>,
    pub instances: Vec<Instance>,
}

impl Inventory {
    pub fn record_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Image => self.images.len(),
            ResourceKind::Keypair => self.keypairs.len(),
            ResourceKind::Volume => self.volumes.len(),
            ResourceKind::VolumeSnapshot => self.volume_snapshots.len(),
            ResourceKind::Instance => self.instances.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_match_schema_arity() {
        assert_eq!(Image::default().values().len(), Image::schema().len());
        assert_eq!(Keypair::default().values().len(), Keypair::schema().len());
        assert_eq!(Volume::default().values().len(), Volume::schema().len());
        assert_eq!(
            VolumeSnapshot::default().values().len(),
            VolumeSnapshot::schema().len()
        );
        assert_eq!(Instance::default().values().len(), Instance::schema().len());
    }

    #[test]
    fn vid_falls_back_to_source_id() {
        let named = Volume {
            id: "v1".into(),
            name: Some("vol-1".into()),
            ..Default::default()
        };
        let unnamed = Volume {
            id: "v2".into(),
            name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(named.vid(), "vol-1");
        assert_eq!(unnamed.vid(), "v2");
    }

    #[test]
    fn unit_names_carry_source_system() {
        assert_eq!(ResourceKind::VolumeSnapshot.unit_name(), "cinder.volume_snapshot");
        assert_eq!(ResourceKind::Image.unit_name(), "glance.image");
        assert_eq!(ResourceKind::Keypair.unit_name(), "nova.keypair");
    }

    #[test]
    fn inventory_accepts_sparse_json() {
        let inventory: Inventory = serde_json::from_str(
            r#"{"volume_snapshots": [{"id": "s1", "name": "snap-1", "volume_id": "v1"}]}"#,
        )
        .unwrap();
        assert_eq!(inventory.record_count(ResourceKind::VolumeSnapshot), 1);
        assert_eq!(inventory.record_count(ResourceKind::Volume), 0);
        assert_eq!(inventory.volume_snapshots[0].volume_id.as_deref(), Some("v1"));
    }
}
