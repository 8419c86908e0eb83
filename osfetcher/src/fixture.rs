use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nebulagen::topology::TopologyDocument;
use serde::{de::DeserializeOwned, Serialize};

use crate::client::CloudService;
use crate::error::{FetcherError, Result};
use crate::models::{ImageDto, KeypairDto, RawInventory, ServerDto, SnapshotDto, VolumeDto};

pub const RESOURCES_FILE: &str = "resources.json";
pub const TOPOLOGY_FILE: &str = "topology.json";

/// Replays a captured cloud from a directory holding `resources.json`
/// and/or `topology.json`.
pub struct FixtureService {
    dir: PathBuf,
}

impl FixtureService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resources(&self) -> Result<RawInventory> {
        read_json(&self.dir.join(RESOURCES_FILE))
    }
}

#[async_trait]
impl CloudService for FixtureService {
    async fn list_images(&self) -> Result<Vec<ImageDto>> {
        Ok(self.resources()?.images)
    }

    async fn list_keypairs(&self) -> Result<Vec<KeypairDto>> {
        Ok(self.resources()?.keypairs)
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeDto>> {
        Ok(self.resources()?.volumes)
    }

    async fn list_volume_snapshots(&self) -> Result<Vec<SnapshotDto>> {
        Ok(self.resources()?.snapshots)
    }

    async fn list_servers(&self) -> Result<Vec<ServerDto>> {
        Ok(self.resources()?.servers)
    }

    async fn topology(&self) -> Result<TopologyDocument> {
        read_json(&self.dir.join(TOPOLOGY_FILE))
    }
}

/// Writes `resources.json` in the format `FixtureService` reads.
pub fn save_resources(dir: &Path, raw: &RawInventory) -> Result<PathBuf> {
    write_json(&dir.join(RESOURCES_FILE), raw)
}

/// Writes `topology.json` in the format `FixtureService` reads.
pub fn save_topology(dir: &Path, document: &TopologyDocument) -> Result<PathBuf> {
    write_json(&dir.join(TOPOLOGY_FILE), document)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| {
        FetcherError::InvalidParam(format!("cannot open fixture {:?}: {}", path, err))
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn saved_resources_replay() {
        let dir = tempdir().unwrap();
        let raw = RawInventory {
            keypairs: vec![KeypairDto {
                name: "kp-1".into(),
                fingerprint: "aa:bb".into(),
            }],
            ..Default::default()
        };
        save_resources(dir.path(), &raw).unwrap();

        let service = FixtureService::new(dir.path());
        assert_eq!(service.list_keypairs().await.unwrap(), raw.keypairs);
        assert!(service.list_servers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fixture_is_an_error() {
        let dir = tempdir().unwrap();
        let service = FixtureService::new(dir.path());
        assert!(matches!(
            service.topology().await,
            Err(FetcherError::InvalidParam(_))
        ));
    }
}
