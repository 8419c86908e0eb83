use serde::Deserialize;
use std::path::PathBuf;

use crate::batch::OutputGroup;

#[derive(Deserialize, Debug, Clone)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub vertices_dir: PathBuf,
    pub edges_dir: PathBuf,
    pub schema_path: PathBuf,
}

impl OutputConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            vertices_dir: base_path.join("vertices"),
            edges_dir: base_path.join("edges"),
            schema_path: base_path.join("schema.ngql"),
            output_dir: base_path,
        }
    }

    /// Directory that holds every output unit of the given group.
    pub fn group_dir(&self, group: OutputGroup) -> &PathBuf {
        match group {
            OutputGroup::Vertices => &self.vertices_dir,
            OutputGroup::Edges => &self.edges_dir,
            OutputGroup::Root => &self.output_dir,
        }
    }
}

/// Parameters of the `CREATE SPACE` declaration heading every schema document.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpaceConfig {
    pub name: String,
    #[serde(default = "default_partition_num")]
    pub partition_num: u32,
    #[serde(default = "default_replica_factor")]
    pub replica_factor: u32,
    #[serde(default = "default_vid_length")]
    pub vid_length: u32,
}

fn default_partition_num() -> u32 {
    3
}

fn default_replica_factor() -> u32 {
    1
}

fn default_vid_length() -> u32 {
    128
}

impl SpaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_num: default_partition_num(),
            replica_factor: default_replica_factor(),
            vid_length: default_vid_length(),
        }
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self::new("openstack")
    }
}
