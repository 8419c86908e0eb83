use once_cell::sync::Lazy;

use crate::models::ResourceKind;
use crate::schema::TypeSchema;

static CREATED_FROM: Lazy<TypeSchema> = Lazy::new(|| TypeSchema::edge("created_from", Vec::new()));
static USED_BY: Lazy<TypeSchema> = Lazy::new(|| TypeSchema::edge("used_by", Vec::new()));

/// Which end of the edge the record carrying the relationship attribute sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// The carrying record is the edge source.
    Outgoing,
    /// The carrying record is the edge destination.
    Incoming,
}

/// How the peer key stored on the carrying record becomes a VID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerResolution {
    /// The key is a source identifier looked up in the identifier registry.
    Registry,
    /// The key already is the peer's VID.
    Direct,
}

/// The fixed relationships of the typed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    VolumeFromSnapshot,
    SnapshotFromVolume,
    ImageFromVolume,
    VolumeFromImage,
    VolumeFromVolume,
    ImageUsedBy,
    KeypairUsedBy,
}

#[derive(Debug, Clone, Copy)]
pub struct RelationshipSpec {
    pub edge: &'static TypeSchema,
    /// Kind whose records carry the defining attribute.
    pub carrier: ResourceKind,
    pub peer: ResourceKind,
    pub direction: EdgeDirection,
    pub resolution: PeerResolution,
    pub unit: &'static str,
}

impl Relationship {
    /// Emission order. Every entry only depends on kinds whose vertices are
    /// emitted before the relationship pass starts.
    pub const ORDER: [Relationship; 7] = [
        Relationship::VolumeFromSnapshot,
        Relationship::SnapshotFromVolume,
        Relationship::ImageFromVolume,
        Relationship::VolumeFromImage,
        Relationship::VolumeFromVolume,
        Relationship::ImageUsedBy,
        Relationship::KeypairUsedBy,
    ];

    pub fn spec(self) -> RelationshipSpec {
        use EdgeDirection::*;
        use PeerResolution::*;
        use ResourceKind::*;

        let (edge, carrier, peer, direction, resolution, unit) = match self {
            Relationship::VolumeFromSnapshot => (
                &*CREATED_FROM,
                Volume,
                VolumeSnapshot,
                Outgoing,
                Registry,
                "cinder.volume.created_from.snapshot",
            ),
            Relationship::SnapshotFromVolume => (
                &*CREATED_FROM,
                VolumeSnapshot,
                Volume,
                Outgoing,
                Registry,
                "cinder.snapshot.created_from",
            ),
            Relationship::ImageFromVolume => (
                &*CREATED_FROM,
                Image,
                Volume,
                Outgoing,
                Registry,
                "glance.image.created_from",
            ),
            Relationship::VolumeFromImage => (
                &*CREATED_FROM,
                Volume,
                Image,
                Outgoing,
                Registry,
                "cinder.volume.created_from",
            ),
            Relationship::VolumeFromVolume => (
                &*CREATED_FROM,
                Volume,
                Volume,
                Outgoing,
                Registry,
                "cinder.volume.created_from.volume",
            ),
            Relationship::ImageUsedBy => (
                &*USED_BY,
                Instance,
                Image,
                Incoming,
                Registry,
                "glance.image.used_by",
            ),
            Relationship::KeypairUsedBy => (
                &*USED_BY,
                Instance,
                Keypair,
                Incoming,
                Direct,
                "nova.keypair.used_by",
            ),
        };

        RelationshipSpec {
            edge,
            carrier,
            peer,
            direction,
            resolution,
            unit,
        }
    }

    /// Kinds whose VIDs must be registered before this relationship is emitted.
    pub fn requires(self) -> Vec<ResourceKind> {
        let spec = self.spec();
        let mut kinds = vec![spec.carrier];
        if spec.peer != spec.carrier {
            kinds.push(spec.peer);
        }
        kinds
    }

    /// Distinct edge schemas used by the typed pipeline, in first-use order.
    pub fn edge_schemas() -> Vec<&'static TypeSchema> {
        let mut schemas: Vec<&'static TypeSchema> = Vec::new();
        for relationship in Self::ORDER {
            let edge = relationship.spec().edge;
            if !schemas.iter().any(|known| known.name == edge.name) {
                schemas.push(edge);
            }
        }
        schemas
    }
}
