//! Wire shapes of the OpenStack APIs, trimmed to the fields the graph uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub min_disk: Option<i64>,
    #[serde(default)]
    pub min_ram: Option<i64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeypairDto {
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub source_volid: Option<String>,
    /// Present for volumes created from an image; carries `image_id`.
    #[serde(default)]
    pub volume_image_metadata: Option<BTreeMap<String, JsonValue>>,
}

impl VolumeDto {
    pub fn image_id(&self) -> Option<&str> {
        self.volume_image_metadata
            .as_ref()?
            .get("image_id")?
            .as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub volume_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
    /// An object with `id`, or `""` for servers booted from a volume.
    #[serde(default)]
    pub image: JsonValue,
    #[serde(default)]
    pub key_name: Option<String>,
}

impl ServerDto {
    pub fn image_id(&self) -> Option<&str> {
        self.image.get("id")?.as_str()
    }
}

/// Everything the resource pipeline reads, as returned by the APIs.
///
/// This is also the on-disk fixture format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInventory {
    pub images: Vec<ImageDto>,
    pub keypairs: Vec<KeypairDto>,
    pub volumes: Vec<VolumeDto>,
    pub snapshots: Vec<SnapshotDto>,
    pub servers: Vec<ServerDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub rel: String,
}

pub(crate) fn next_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "next")
        .map(|link| link.href.clone())
}

/// One page of a list response: its items and the URL of the next page.
pub trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Deserialize)]
pub struct ImagePage {
    pub images: Vec<ImageDto>,
    /// Relative to the image endpoint root.
    #[serde(default)]
    pub next: Option<String>,
}

impl Page for ImagePage {
    type Item = ImageDto;

    fn into_parts(self) -> (Vec<ImageDto>, Option<String>) {
        (self.images, self.next)
    }
}

#[derive(Debug, Deserialize)]
pub struct KeypairEntry {
    pub keypair: KeypairDto,
}

#[derive(Debug, Deserialize)]
pub struct KeypairPage {
    pub keypairs: Vec<KeypairEntry>,
    #[serde(default)]
    pub keypairs_links: Vec<Link>,
}

impl Page for KeypairPage {
    type Item = KeypairDto;

    fn into_parts(self) -> (Vec<KeypairDto>, Option<String>) {
        let next = next_link(&self.keypairs_links);
        (
            self.keypairs.into_iter().map(|entry| entry.keypair).collect(),
            next,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct VolumePage {
    pub volumes: Vec<VolumeDto>,
    #[serde(default)]
    pub volumes_links: Vec<Link>,
}

impl Page for VolumePage {
    type Item = VolumeDto;

    fn into_parts(self) -> (Vec<VolumeDto>, Option<String>) {
        let next = next_link(&self.volumes_links);
        (self.volumes, next)
    }
}

#[derive(Debug, Deserialize)]
pub struct SnapshotPage {
    pub snapshots: Vec<SnapshotDto>,
    #[serde(default)]
    pub snapshots_links: Vec<Link>,
}

impl Page for SnapshotPage {
    type Item = SnapshotDto;

    fn into_parts(self) -> (Vec<SnapshotDto>, Option<String>) {
        let next = next_link(&self.snapshots_links);
        (self.snapshots, next)
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerPage {
    pub servers: Vec<ServerDto>,
    #[serde(default)]
    pub servers_links: Vec<Link>,
}

impl Page for ServerPage {
    type Item = ServerDto;

    fn into_parts(self) -> (Vec<ServerDto>, Option<String>) {
        let next = next_link(&self.servers_links);
        (self.servers, next)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: TokenBody,
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}
