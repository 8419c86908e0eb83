use std::fs;
use std::path::Path;

use nebulagen::models::{Image, Instance, Inventory, Keypair, Volume, VolumeSnapshot};

#[allow(dead_code)]
pub fn sample_inventory() -> Inventory {
    Inventory {
        images: vec![
            Image {
                id: "img1".into(),
                name: Some("cirros".into()),
                status: "active".into(),
                size: Some(16_338_944),
                min_disk: 0,
                min_ram: 0,
                created_at: "2024-01-01T00:00:00Z".into(),
                updated_at: "2024-01-01T00:00:00Z".into(),
                source_volume_id: None,
            },
            Image {
                id: "img2".into(),
                name: Some("cirros_mod_from_volume-1".into()),
                status: "active".into(),
                size: None,
                source_volume_id: Some("v1".into()),
                ..Default::default()
            },
        ],
        keypairs: vec![Keypair {
            id: "kp-1".into(),
            name: "kp-1".into(),
            fingerprint: "aa:bb:cc".into(),
        }],
        volumes: vec![
            Volume {
                id: "v1".into(),
                name: Some("volume-1".into()),
                status: "available".into(),
                size: 1,
                image_id: Some("img1".into()),
                ..Default::default()
            },
            Volume {
                id: "v2".into(),
                name: None,
                status: "available".into(),
                size: 1,
                snapshot_id: Some("s1".into()),
                ..Default::default()
            },
            Volume {
                id: "v3".into(),
                name: Some("clone-of-1".into()),
                status: "available".into(),
                size: 1,
                source_volid: Some("v1".into()),
                ..Default::default()
            },
        ],
        volume_snapshots: vec![VolumeSnapshot {
            id: "s1".into(),
            name: Some("snap-1".into()),
            description: Some("nightly".into()),
            status: "available".into(),
            size: 1,
            volume_id: Some("v1".into()),
        }],
        instances: vec![Instance {
            id: "i1".into(),
            name: Some("vm-1".into()),
            status: "ACTIVE".into(),
            created_at: "2024-01-02T00:00:00Z".into(),
            image_id: Some("img1".into()),
            key_name: Some("kp-1".into()),
        }],
    }
}

/// VID of an `INSERT VERTEX ... VALUES "<vid>":(...)` statement.
#[allow(dead_code)]
pub fn vertex_vid(statement: &str) -> Option<String> {
    let rest = statement.split(" VALUES \"").nth(1)?;
    rest.split("\":(").next().map(str::to_string)
}

/// Endpoints of an `INSERT EDGE ... VALUES "<src>" -> "<dst>":(...)` statement.
#[allow(dead_code)]
pub fn edge_endpoints(statement: &str) -> Option<(String, String)> {
    let rest = statement.split(" VALUES \"").nth(1)?;
    let (src, rest) = rest.split_once("\" -> \"")?;
    let (dst, _) = rest.split_once("\":(")?;
    Some((src.to_string(), dst.to_string()))
}

/// Every file under the root, `vertices/` and `edges/`, sorted by relative path.
#[allow(dead_code)]
pub fn read_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    for group in ["", "vertices", "edges"] {
        let dir = root.join(group);
        let mut entries: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_file())
            .collect();
        entries.sort();
        for path in entries {
            let name = path.strip_prefix(root).unwrap().to_string_lossy().to_string();
            files.push((name, fs::read(&path).unwrap()));
        }
    }
    files
}
