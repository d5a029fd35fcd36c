// On-disk layout of a corpus directory
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.bin";
pub const METADATA_FILE: &str = "metadata.json";

/// Bumped whenever [`IndexFile`] changes shape
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Bincode payload of `index.bin`: a flat squared-L2 index, row-major
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexFile {
    pub format_version: u32,
    pub dim: usize,
    pub vectors: Vec<f32>,
}

/// Locations of the two files that make up a corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    pub index: PathBuf,
    pub metadata: PathBuf,
}

impl CorpusPaths {
    /// Standard file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            index: dir.join(INDEX_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }
}
