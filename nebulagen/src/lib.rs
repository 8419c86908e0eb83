pub mod batch;
pub mod config;
pub mod emit;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod relationship;
pub mod render;
pub mod schema;
pub mod topology;
pub mod writer;

use crate::config::{OutputConfig, SpaceConfig};
use crate::errors::Result;
use crate::models::Inventory;
use crate::orchestrator::{Orchestrator, RunOutput};
use crate::topology::TopologyDocument;
use crate::writer::BatchWriter;

pub use crate::orchestrator::EmissionPlan;
pub use crate::registry::{IdentifierRegistry, vertex_id};

/// The main entry point for the `nebulagen` library.
///
/// `GraphExporter` turns already-fetched OpenStack data into NebulaGraph
/// load files. It bundles:
/// - an `Orchestrator` that assigns VIDs, resolves references and renders
///   nGQL in dependency order,
/// - a `BatchWriter` that persists every emission batch under the output root.
///
/// # Example
///
/// ```rust,no_run
/// use nebulagen::{GraphExporter, config::{OutputConfig, SpaceConfig}, models::Inventory};
///
/// let exporter = GraphExporter::new(OutputConfig::new("./out"), SpaceConfig::default());
/// let output = exporter.export_inventory(&Inventory::default()).unwrap();
/// assert!(output.diagnostics.is_clean());
/// ```
pub struct GraphExporter {
    pub orchestrator: Orchestrator,
    pub writer: BatchWriter,
}

impl GraphExporter {
    pub fn new(output: OutputConfig, space: SpaceConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(space),
            writer: BatchWriter::new(output),
        }
    }

    /// Renders the typed pipeline and writes every batch.
    pub fn export_inventory(&self, inventory: &Inventory) -> Result<RunOutput> {
        let output = self.orchestrator.run_inventory(inventory)?;
        self.writer.write_all(&output.batches)?;
        Ok(output)
    }

    /// Renders the generic topology pipeline and writes every batch.
    pub fn export_topology(&self, document: &TopologyDocument) -> Result<RunOutput> {
        let output = self.orchestrator.run_topology(document)?;
        self.writer.write_all(&output.batches)?;
        Ok(output)
    }
}
