mod common;

use std::collections::HashSet;

use nebulagen::{
    GraphExporter,
    batch::OutputUnit,
    config::{OutputConfig, SpaceConfig},
    models::{Image, Instance, Inventory, ResourceKind, Volume, VolumeSnapshot},
    orchestrator::Orchestrator,
};

fn run(inventory: &Inventory) -> nebulagen::orchestrator::RunOutput {
    Orchestrator::new(SpaceConfig::default())
        .run_inventory(inventory)
        .expect("typed pipeline run succeeds")
}

#[test]
fn snapshot_and_volume_scenario() {
    let inventory = Inventory {
        volume_snapshots: vec![VolumeSnapshot {
            id: "s1".into(),
            name: Some("snap-1".into()),
            volume_id: Some("v1".into()),
            ..Default::default()
        }],
        volumes: vec![Volume {
            id: "v1".into(),
            name: Some("vol-1".into()),
            snapshot_id: None,
            source_volid: None,
            ..Default::default()
        }],
        ..Default::default()
    };

    let output = run(&inventory);

    assert_eq!(output.registry.len(), 2);
    assert_eq!(output.registry.resolve("s1"), "snap-1");
    assert_eq!(output.registry.resolve("v1"), "vol-1");

    let volume_to_snapshot = output
        .batch(&OutputUnit::edges("cinder.volume.created_from.snapshot"))
        .expect("volume -> snapshot batch");
    assert_eq!(
        volume_to_snapshot.lines(),
        ["CREATE EDGE IF NOT EXISTS created_from();"]
    );

    let snapshot_to_volume = output
        .batch(&OutputUnit::edges("cinder.snapshot.created_from"))
        .expect("snapshot -> volume batch");
    assert_eq!(snapshot_to_volume.data_count(), 1);
    assert_eq!(
        snapshot_to_volume.lines()[1],
        r#"INSERT EDGE created_from() VALUES "snap-1" -> "vol-1":();"#
    );
    assert!(output.diagnostics.is_clean());
}

#[test]
fn instance_used_by_scenario() {
    let inventory = Inventory {
        images: vec![Image {
            id: "img1".into(),
            name: Some("cirros".into()),
            ..Default::default()
        }],
        instances: vec![Instance {
            id: "i1".into(),
            name: Some("vm-1".into()),
            image_id: Some("img1".into()),
            key_name: Some("kp-1".into()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let output = run(&inventory);

    let image_used_by = output
        .batch(&OutputUnit::edges("glance.image.used_by"))
        .unwrap();
    assert_eq!(
        image_used_by.lines(),
        [
            "CREATE EDGE IF NOT EXISTS used_by();",
            r#"INSERT EDGE used_by() VALUES "cirros" -> "vm-1":();"#,
        ]
    );

    let keypair_used_by = output
        .batch(&OutputUnit::edges("nova.keypair.used_by"))
        .unwrap();
    assert_eq!(
        keypair_used_by.lines()[1],
        r#"INSERT EDGE used_by() VALUES "kp-1" -> "vm-1":();"#
    );
}

#[test]
fn edge_vids_match_record_vids() {
    let inventory = common::sample_inventory();
    let output = run(&inventory);

    // "v2" has no name, so its VID is its id.
    let batch = output
        .batch(&OutputUnit::edges("cinder.volume.created_from.snapshot"))
        .unwrap();
    assert_eq!(
        common::edge_endpoints(&batch.lines()[1]),
        Some(("v2".to_string(), "snap-1".to_string()))
    );

    let placeholder = output
        .batch(&OutputUnit::edges("glance.image.created_from"))
        .unwrap();
    assert_eq!(
        common::edge_endpoints(&placeholder.lines()[1]),
        Some(("cirros_mod_from_volume-1".to_string(), "volume-1".to_string()))
    );

    let clones = output
        .batch(&OutputUnit::edges("cinder.volume.created_from.volume"))
        .unwrap();
    assert_eq!(
        common::edge_endpoints(&clones.lines()[1]),
        Some(("clone-of-1".to_string(), "volume-1".to_string()))
    );

    let from_image = output
        .batch(&OutputUnit::edges("cinder.volume.created_from"))
        .unwrap();
    assert_eq!(
        common::edge_endpoints(&from_image.lines()[1]),
        Some(("volume-1".to_string(), "cirros".to_string()))
    );
}

#[test]
fn vertex_counts_and_tuple_lengths_match_schema() {
    let inventory = common::sample_inventory();
    let output = run(&inventory);

    for kind in [
        ResourceKind::Image,
        ResourceKind::Keypair,
        ResourceKind::Volume,
        ResourceKind::VolumeSnapshot,
        ResourceKind::Instance,
    ] {
        let batch = output
            .batch(&OutputUnit::vertices(kind.unit_name()))
            .unwrap_or_else(|| panic!("missing vertex batch for {}", kind.as_str()));
        assert_eq!(batch.data_count(), inventory.record_count(kind));

        let schema_len = kind.schema().len();
        for statement in batch.lines().iter().filter(|s| s.starts_with("INSERT")) {
            let tuple = statement
                .rsplit_once(":(")
                .and_then(|(_, rest)| rest.strip_suffix(");"))
                .unwrap();
            assert_eq!(tuple.split(", ").count(), schema_len, "{statement}");
        }
    }
}

#[test]
fn edges_only_reference_previously_emitted_vertices() {
    let output = run(&common::sample_inventory());

    let mut seen = HashSet::new();
    let mut edge_count = 0;
    for batch in &output.batches {
        for statement in batch.lines() {
            if statement.starts_with("INSERT VERTEX") {
                seen.insert(common::vertex_vid(statement).unwrap());
            } else if statement.starts_with("INSERT EDGE") {
                let (src, dst) = common::edge_endpoints(statement).unwrap();
                assert!(seen.contains(&src), "{src} used before it was emitted");
                assert!(seen.contains(&dst), "{dst} used before it was emitted");
                edge_count += 1;
            }
        }
    }
    assert_eq!(edge_count, 7);
    assert!(output.diagnostics.is_clean());
}

#[test]
fn unresolved_reference_is_skipped_with_warning() {
    let inventory = Inventory {
        volumes: vec![Volume {
            id: "v1".into(),
            name: Some("vol-1".into()),
            snapshot_id: Some("ghost".into()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let output = run(&inventory);
    let batch = output
        .batch(&OutputUnit::edges("cinder.volume.created_from.snapshot"))
        .unwrap();
    assert_eq!(batch.data_count(), 0);
    assert_eq!(output.diagnostics.unresolved.len(), 1);
    assert_eq!(output.diagnostics.unresolved[0].missing_key, "ghost");
}

#[test]
fn rerun_produces_identical_files() {
    let inventory = common::sample_inventory();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    for dir in [&first, &second] {
        GraphExporter::new(OutputConfig::new(dir.path()), SpaceConfig::default())
            .export_inventory(&inventory)
            .unwrap();
    }

    let first_tree = common::read_tree(first.path());
    assert_eq!(first_tree.len(), 1 + 5 + 7);
    assert_eq!(first_tree, common::read_tree(second.path()));
}
