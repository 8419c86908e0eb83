use std::sync::Arc;

use nebulagen::models::Inventory;
use nebulagen::topology::TopologyDocument;

use crate::{
    client::{CloudService, OpenStackService},
    config::OpenStackCredentials,
    error::Result,
    mapper,
    models::RawInventory,
    params::ImageProvenance,
};

/// Pulls the resource inventory and the Vitrage topology through a
/// `CloudService` and hands them to the graph generator in its own types.
pub struct OpenStackFetcher {
    client: Arc<dyn CloudService>,
    provenance: Vec<ImageProvenance>,
}

impl OpenStackFetcher {
    pub fn new(client: Arc<dyn CloudService>) -> Self {
        Self {
            client,
            provenance: Vec::new(),
        }
    }

    pub async fn connect(credentials: &OpenStackCredentials) -> Result<Self> {
        let client = OpenStackService::connect(credentials).await?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_provenance(mut self, provenance: Vec<ImageProvenance>) -> Self {
        self.provenance = provenance;
        self
    }

    /// Lists every resource kind concurrently, unmapped.
    pub async fn fetch_raw(&self) -> Result<RawInventory> {
        let (images, keypairs, volumes, snapshots, servers) = tokio::try_join!(
            self.client.list_images(),
            self.client.list_keypairs(),
            self.client.list_volumes(),
            self.client.list_volume_snapshots(),
            self.client.list_servers(),
        )?;
        log::info!(
            "Fetched {} images, {} keypairs, {} volumes, {} snapshots, {} servers",
            images.len(),
            keypairs.len(),
            volumes.len(),
            snapshots.len(),
            servers.len()
        );
        Ok(RawInventory {
            images,
            keypairs,
            volumes,
            snapshots,
            servers,
        })
    }

    pub async fn fetch_inventory(&self) -> Result<Inventory> {
        let raw = self.fetch_raw().await?;
        let mut inventory = mapper::map_inventory(raw);
        if !self.provenance.is_empty() {
            let applied = mapper::apply_provenance(&mut inventory.images, &self.provenance);
            log::info!(
                "Applied {} of {} image provenance overrides",
                applied,
                self.provenance.len()
            );
        }
        Ok(inventory)
    }

    pub async fn fetch_topology(&self) -> Result<TopologyDocument> {
        let document = self.client.topology().await?;
        log::info!(
            "Fetched topology with {} nodes and {} links",
            document.nodes.len(),
            document.links.len()
        );
        Ok(document)
    }
}
