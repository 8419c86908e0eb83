use std::collections::BTreeSet;

use serde::Serialize;

use crate::batch::{EmissionBatch, OutputUnit};
use crate::config::SpaceConfig;
use crate::emit::{Diagnostics, ResourceEmitter};
use crate::errors::{GraphGenError, Result};
use crate::models::{Inventory, ResourceKind};
use crate::registry::IdentifierRegistry;
use crate::relationship::Relationship;
use crate::render;
use crate::topology::{TopologyDocument, TopologyEmitter};

/// Declared emission order of the typed pipeline: one vertex pass over the
/// kinds, then one pass over the relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionPlan {
    pub vertex_order: Vec<ResourceKind>,
    pub relationship_order: Vec<Relationship>,
}

impl Default for EmissionPlan {
    fn default() -> Self {
        Self {
            vertex_order: vec![
                ResourceKind::VolumeSnapshot,
                ResourceKind::Volume,
                ResourceKind::Image,
                ResourceKind::Keypair,
                ResourceKind::Instance,
            ],
            relationship_order: Relationship::ORDER.to_vec(),
        }
    }
}

impl EmissionPlan {
    /// Checks that every relationship only needs kinds the vertex pass registers.
    pub fn validate(&self) -> Result<()> {
        let registered: BTreeSet<ResourceKind> = self.vertex_order.iter().copied().collect();
        for relationship in &self.relationship_order {
            for kind in relationship.requires() {
                if !registered.contains(&kind) {
                    return Err(GraphGenError::DependencyOrder(format!(
                        "relationship {:?} needs '{}' vertices, which the plan never registers",
                        relationship,
                        kind.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub unit: String,
    pub data_count: usize,
}

/// Result of one pipeline run: the batches in emission order plus warnings.
#[derive(Debug)]
pub struct RunOutput {
    pub batches: Vec<EmissionBatch>,
    pub diagnostics: Diagnostics,
    pub registry: IdentifierRegistry,
}

impl RunOutput {
    pub fn batch(&self, unit: &OutputUnit) -> Option<&EmissionBatch> {
        self.batches.iter().find(|batch| &batch.unit == unit)
    }

    pub fn summary(&self) -> Vec<UnitSummary> {
        self.batches
            .iter()
            .map(|batch| UnitSummary {
                unit: batch.unit.file_name(),
                data_count: batch.data_count(),
            })
            .collect()
    }
}

pub struct Orchestrator {
    space: SpaceConfig,
    plan: EmissionPlan,
}

impl Orchestrator {
    pub fn new(space: SpaceConfig) -> Self {
        Self::with_plan(space, EmissionPlan::default())
    }

    pub fn with_plan(space: SpaceConfig, plan: EmissionPlan) -> Self {
        Self { space, plan }
    }

    /// Runs the typed pipeline over a fetched inventory.
    pub fn run_inventory(&self, inventory: &Inventory) -> Result<RunOutput> {
        self.plan.validate()?;

        let mut registry = IdentifierRegistry::new();
        let mut diagnostics = Diagnostics::default();
        let mut batches = Vec::new();

        for &kind in &self.plan.vertex_order {
            batches.push(emit_vertices(inventory, kind, &mut registry)?);
            log::info!(
                "Registered {} '{}' vertices",
                inventory.record_count(kind),
                kind.as_str()
            );
        }

        // Every kind in the plan is registered past this point.
        for &relationship in &self.plan.relationship_order {
            batches.push(emit_relationship(
                inventory,
                relationship,
                &registry,
                &mut diagnostics,
            )?);
        }

        batches.push(self.schema_batch()?);

        if !diagnostics.is_clean() {
            log::warn!(
                "{} references could not be resolved and were skipped",
                diagnostics.unresolved.len()
            );
        }

        Ok(RunOutput {
            batches,
            diagnostics,
            registry,
        })
    }

    /// Runs the generic pipeline over one topology document.
    pub fn run_topology(&self, document: &TopologyDocument) -> Result<RunOutput> {
        let mut diagnostics = Diagnostics::default();
        let batches = TopologyEmitter::new(document, &self.space).emit(&mut diagnostics)?;
        Ok(RunOutput {
            batches,
            diagnostics,
            registry: IdentifierRegistry::new(),
        })
    }

    /// Consolidated declarations for every type the typed pipeline can emit.
    fn schema_batch(&self) -> Result<EmissionBatch> {
        let mut statements = render::declare_space(&self.space)?.to_vec();
        for kind in &self.plan.vertex_order {
            statements.push(render::declare(kind.schema())?);
        }
        for edge in Relationship::edge_schemas() {
            statements.push(render::declare(edge)?);
        }
        Ok(EmissionBatch::statements(OutputUnit::schema(), statements))
    }
}

fn emit_vertices(
    inventory: &Inventory,
    kind: ResourceKind,
    registry: &mut IdentifierRegistry,
) -> Result<EmissionBatch> {
    match kind {
        ResourceKind::Image => ResourceEmitter::new(&inventory.images).emit_vertices(registry),
        ResourceKind::Keypair => ResourceEmitter::new(&inventory.keypairs).emit_vertices(registry),
        ResourceKind::Volume => ResourceEmitter::new(&inventory.volumes).emit_vertices(registry),
        ResourceKind::VolumeSnapshot => {
            ResourceEmitter::new(&inventory.volume_snapshots).emit_vertices(registry)
        }
        ResourceKind::Instance => {
            ResourceEmitter::new(&inventory.instances).emit_vertices(registry)
        }
    }
}

fn emit_relationship(
    inventory: &Inventory,
    relationship: Relationship,
    registry: &IdentifierRegistry,
    diagnostics: &mut Diagnostics,
) -> Result<EmissionBatch> {
    match relationship.spec().carrier {
        ResourceKind::Image => ResourceEmitter::new(&inventory.images)
            .emit_relationship(relationship, registry, diagnostics),
        ResourceKind::Keypair => ResourceEmitter::new(&inventory.keypairs)
            .emit_relationship(relationship, registry, diagnostics),
        ResourceKind::Volume => ResourceEmitter::new(&inventory.volumes)
            .emit_relationship(relationship, registry, diagnostics),
        ResourceKind::VolumeSnapshot => ResourceEmitter::new(&inventory.volume_snapshots)
            .emit_relationship(relationship, registry, diagnostics),
        ResourceKind::Instance => ResourceEmitter::new(&inventory.instances)
            .emit_relationship(relationship, registry, diagnostics),
    }
}
