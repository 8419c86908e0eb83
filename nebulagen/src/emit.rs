use serde::Serialize;

use crate::batch::{EmissionBatch, OutputUnit};
use crate::errors::{GraphGenError, Result};
use crate::models::ResourceRecord;
use crate::registry::IdentifierRegistry;
use crate::relationship::{EdgeDirection, PeerResolution, Relationship};
use crate::render;

/// A relationship endpoint whose key was never registered. The edge is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub unit: String,
    /// VID of the endpoint that did resolve, if any.
    pub anchor: Option<String>,
    pub missing_key: String,
}

/// Warnings collected over one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub unresolved: Vec<UnresolvedReference>,
    /// Directly named endpoints (keypair names) with no vertex of their own.
    /// The edge is still emitted.
    pub dangling: Vec<UnresolvedReference>,
}

impl Diagnostics {
    pub fn record_unresolved(
        &mut self,
        unit: &str,
        anchor: Option<&str>,
        missing_key: impl Into<String>,
    ) {
        let missing_key = missing_key.into();
        log::warn!(
            "Skipping edge in '{}': reference '{}' from '{}' is not registered",
            unit,
            missing_key,
            anchor.unwrap_or("<unknown>")
        );
        self.unresolved.push(UnresolvedReference {
            unit: unit.to_string(),
            anchor: anchor.map(str::to_string),
            missing_key,
        });
    }

    pub fn record_dangling(&mut self, unit: &str, anchor: &str, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        log::debug!(
            "Edge in '{}' from '{}' names '{}', which has no vertex",
            unit,
            anchor,
            endpoint
        );
        self.dangling.push(UnresolvedReference {
            unit: unit.to_string(),
            anchor: Some(anchor.to_string()),
            missing_key: endpoint,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Renders vertices and outbound relationships for one typed resource collection.
pub struct ResourceEmitter<'a, R> {
    records: &'a [R],
}

impl<'a, R: ResourceRecord> ResourceEmitter<'a, R> {
    pub fn new(records: &'a [R]) -> Self {
        Self { records }
    }

    /// Registers every record's VID and renders the kind's vertex batch.
    pub fn emit_vertices(&self, registry: &mut IdentifierRegistry) -> Result<EmissionBatch> {
        let schema = R::schema();
        let mut batch = EmissionBatch::statements(
            OutputUnit::vertices(R::KIND.unit_name()),
            [render::declare(schema)?],
        );

        for record in self.records {
            let vid = record.vid();
            registry.register(record.source_id(), vid.as_str());
            batch.push_statement(render::insert_vertex(schema, &vid, &record.values())?);
        }

        log::debug!(
            "Rendered {} '{}' vertices",
            self.records.len(),
            R::KIND.as_str()
        );
        Ok(batch)
    }

    /// Renders the edge batch of a relationship carried by this kind's records.
    ///
    /// Records without the defining attribute produce no edge. References
    /// that do not resolve are skipped and recorded in `diagnostics`.
    pub fn emit_relationship(
        &self,
        relationship: Relationship,
        registry: &IdentifierRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Result<EmissionBatch> {
        let spec = relationship.spec();
        if spec.carrier != R::KIND {
            return Err(GraphGenError::InvalidArg(format!(
                "relationship {:?} is carried by {} records, not {}",
                relationship,
                spec.carrier.as_str(),
                R::KIND.as_str()
            )));
        }

        let mut batch =
            EmissionBatch::statements(OutputUnit::edges(spec.unit), [render::declare(spec.edge)?]);

        for record in self.records {
            let Some(key) = record.reference(relationship).filter(|key| !key.is_empty()) else {
                continue;
            };

            let Some(own_vid) = registry.lookup(record.source_id()) else {
                diagnostics.record_unresolved(spec.unit, None, record.source_id());
                continue;
            };

            let peer_vid = match spec.resolution {
                PeerResolution::Direct => {
                    if !registry.contains(key) {
                        diagnostics.record_dangling(spec.unit, own_vid, key);
                    }
                    key
                }
                PeerResolution::Registry => match registry.lookup(key) {
                    Some(vid) => vid,
                    None => {
                        diagnostics.record_unresolved(spec.unit, Some(own_vid), key);
                        continue;
                    }
                },
            };

            let (src, dst) = match spec.direction {
                EdgeDirection::Outgoing => (own_vid, peer_vid),
                EdgeDirection::Incoming => (peer_vid, own_vid),
            };
            batch.push_statement(render::insert_edge(spec.edge, src, dst, &[])?);
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instance, Keypair, Volume, VolumeSnapshot};

    fn snapshot() -> VolumeSnapshot {
        VolumeSnapshot {
            id: "s1".into(),
            name: Some("snap-1".into()),
            status: "available".into(),
            size: 1,
            volume_id: Some("v1".into()),
            ..Default::default()
        }
    }

    fn volume() -> Volume {
        Volume {
            id: "v1".into(),
            name: Some("vol-1".into()),
            status: "available".into(),
            size: 1,
            ..Default::default()
        }
    }

    #[test]
    fn vertex_batch_registers_vids() {
        let snapshots = vec![snapshot()];
        let mut registry = IdentifierRegistry::new();
        let batch = ResourceEmitter::new(&snapshots)
            .emit_vertices(&mut registry)
            .unwrap();

        assert_eq!(batch.unit, OutputUnit::vertices("cinder.volume_snapshot"));
        assert_eq!(batch.data_count(), 1);
        assert!(batch.lines()[0].starts_with("CREATE TAG IF NOT EXISTS volume_snapshot("));
        assert_eq!(registry.resolve("s1"), "snap-1");
    }

    #[test]
    fn missing_attribute_produces_no_edge() {
        let volumes = vec![volume()];
        let mut registry = IdentifierRegistry::new();
        let emitter = ResourceEmitter::new(&volumes);
        emitter.emit_vertices(&mut registry).unwrap();

        let mut diagnostics = Diagnostics::default();
        let batch = emitter
            .emit_relationship(Relationship::VolumeFromSnapshot, &registry, &mut diagnostics)
            .unwrap();

        assert_eq!(batch.lines(), ["CREATE EDGE IF NOT EXISTS created_from();"]);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn unresolved_reference_is_skipped_and_recorded() {
        let snapshots = vec![snapshot()];
        let mut registry = IdentifierRegistry::new();
        let emitter = ResourceEmitter::new(&snapshots);
        emitter.emit_vertices(&mut registry).unwrap();

        let mut diagnostics = Diagnostics::default();
        let batch = emitter
            .emit_relationship(Relationship::SnapshotFromVolume, &registry, &mut diagnostics)
            .unwrap();

        assert_eq!(batch.data_count(), 0);
        assert_eq!(diagnostics.unresolved.len(), 1);
        assert_eq!(diagnostics.unresolved[0].missing_key, "v1");
        assert_eq!(diagnostics.unresolved[0].anchor.as_deref(), Some("snap-1"));
    }

    #[test]
    fn incoming_relationship_points_at_carrier() {
        let instances = vec![Instance {
            id: "i1".into(),
            name: Some("vm-1".into()),
            key_name: Some("kp-1".into()),
            ..Default::default()
        }];
        let mut registry = IdentifierRegistry::new();
        let emitter = ResourceEmitter::new(&instances);
        emitter.emit_vertices(&mut registry).unwrap();

        let mut diagnostics = Diagnostics::default();
        let batch = emitter
            .emit_relationship(Relationship::KeypairUsedBy, &registry, &mut diagnostics)
            .unwrap();

        assert_eq!(
            batch.lines()[1],
            r#"INSERT EDGE used_by() VALUES "kp-1" -> "vm-1":();"#
        );
        assert!(diagnostics.is_clean());
        assert_eq!(diagnostics.dangling.len(), 1);
        assert_eq!(diagnostics.dangling[0].missing_key, "kp-1");
        assert_eq!(diagnostics.dangling[0].anchor.as_deref(), Some("vm-1"));
    }

    #[test]
    fn registered_keypair_is_not_dangling() {
        let keypairs = vec![Keypair {
            id: "kp-1".into(),
            name: "kp-1".into(),
            fingerprint: "aa:bb".into(),
        }];
        let instances = vec![Instance {
            id: "i1".into(),
            name: Some("vm-1".into()),
            key_name: Some("kp-1".into()),
            ..Default::default()
        }];
        let mut registry = IdentifierRegistry::new();
        ResourceEmitter::new(&keypairs)
            .emit_vertices(&mut registry)
            .unwrap();
        let emitter = ResourceEmitter::new(&instances);
        emitter.emit_vertices(&mut registry).unwrap();

        let mut diagnostics = Diagnostics::default();
        let batch = emitter
            .emit_relationship(Relationship::KeypairUsedBy, &registry, &mut diagnostics)
            .unwrap();

        assert_eq!(batch.data_count(), 1);
        assert!(diagnostics.dangling.is_empty());
    }

    #[test]
    fn rejects_relationship_carried_by_other_kind() {
        let volumes = vec![volume()];
        let registry = IdentifierRegistry::new();
        let mut diagnostics = Diagnostics::default();
        let result = ResourceEmitter::new(&volumes).emit_relationship(
            Relationship::ImageUsedBy,
            &registry,
            &mut diagnostics,
        );
        assert!(matches!(result, Err(GraphGenError::InvalidArg(_))));
    }
}
