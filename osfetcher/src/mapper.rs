use nebulagen::models::{Image, Instance, Inventory, Keypair, Volume, VolumeSnapshot};

use crate::models::{ImageDto, KeypairDto, RawInventory, ServerDto, SnapshotDto, VolumeDto};
use crate::params::ImageProvenance;

pub fn map_image(dto: ImageDto) -> Image {
    Image {
        id: dto.id,
        name: non_empty(dto.name),
        status: dto.status,
        size: dto.size,
        min_disk: dto.min_disk.unwrap_or_default(),
        min_ram: dto.min_ram.unwrap_or_default(),
        created_at: dto.created_at,
        updated_at: dto.updated_at,
        source_volume_id: None,
    }
}

/// Nova identifies keypairs by name.
pub fn map_keypair(dto: KeypairDto) -> Keypair {
    Keypair {
        id: dto.name.clone(),
        name: dto.name,
        fingerprint: dto.fingerprint,
    }
}

pub fn map_volume(dto: VolumeDto) -> Volume {
    let image_id = dto.image_id().map(str::to_string);
    Volume {
        id: dto.id,
        name: non_empty(dto.name),
        status: dto.status,
        size: dto.size,
        volume_type: dto.volume_type,
        created_at: dto.created_at,
        snapshot_id: dto.snapshot_id,
        source_volid: dto.source_volid,
        image_id,
    }
}

pub fn map_snapshot(dto: SnapshotDto) -> VolumeSnapshot {
    VolumeSnapshot {
        id: dto.id,
        name: non_empty(dto.name),
        description: dto.description,
        status: dto.status,
        size: dto.size,
        volume_id: dto.volume_id,
    }
}

pub fn map_server(dto: ServerDto) -> Instance {
    let image_id = dto.image_id().map(str::to_string);
    Instance {
        id: dto.id,
        name: non_empty(dto.name),
        status: dto.status,
        created_at: dto.created,
        image_id,
        key_name: non_empty(dto.key_name),
    }
}

pub fn map_inventory(raw: RawInventory) -> Inventory {
    Inventory {
        images: raw.images.into_iter().map(map_image).collect(),
        keypairs: raw.keypairs.into_iter().map(map_keypair).collect(),
        volumes: raw.volumes.into_iter().map(map_volume).collect(),
        volume_snapshots: raw.snapshots.into_iter().map(map_snapshot).collect(),
        instances: raw.servers.into_iter().map(map_server).collect(),
    }
}

/// Fills `source_volume_id` on the images named by the overrides and returns
/// how many were applied. Overrides naming no known image are logged and skipped.
pub fn apply_provenance(images: &mut [Image], overrides: &[ImageProvenance]) -> usize {
    let mut applied = 0;
    for provenance in overrides {
        let target = images.iter_mut().find(|image| {
            image.id == provenance.image || image.name.as_deref() == Some(provenance.image.as_str())
        });
        match target {
            Some(image) => {
                image.source_volume_id = Some(provenance.volume.clone());
                applied += 1;
            }
            None => log::warn!(
                "Image provenance override names unknown image '{}'",
                provenance.image
            ),
        }
    }
    applied
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebulagen::models::ResourceRecord;
    use serde_json::json;

    #[test]
    fn empty_names_become_none() {
        let volume = map_volume(VolumeDto {
            id: "v1".into(),
            name: Some(String::new()),
            size: 2,
            ..Default::default()
        });
        assert_eq!(volume.name, None);
        assert_eq!(volume.vid(), "v1");
    }

    #[test]
    fn server_fields_map_to_instance() {
        let instance = map_server(ServerDto {
            id: "i1".into(),
            name: Some("vm-1".into()),
            status: "ACTIVE".into(),
            created: "2024-01-02T00:00:00Z".into(),
            image: json!({"id": "img1"}),
            key_name: Some("kp-1".into()),
        });
        assert_eq!(instance.created_at, "2024-01-02T00:00:00Z");
        assert_eq!(instance.image_id.as_deref(), Some("img1"));
        assert_eq!(instance.key_name.as_deref(), Some("kp-1"));
    }

    #[test]
    fn provenance_matches_id_or_name() {
        let mut images = vec![
            map_image(ImageDto {
                id: "img1".into(),
                name: Some("cirros".into()),
                ..Default::default()
            }),
            map_image(ImageDto {
                id: "img2".into(),
                name: Some("cirros_mod_from_volume-1".into()),
                ..Default::default()
            }),
        ];
        let overrides = vec![
            "cirros_mod_from_volume-1=v1".parse().unwrap(),
            "img1=v9".parse().unwrap(),
            "missing=v2".parse().unwrap(),
        ];

        assert_eq!(apply_provenance(&mut images, &overrides), 2);
        assert_eq!(images[0].source_volume_id.as_deref(), Some("v9"));
        assert_eq!(images[1].source_volume_id.as_deref(), Some("v1"));
    }
}
