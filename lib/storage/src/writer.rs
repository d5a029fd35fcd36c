use crate::format::{CorpusPaths, IndexFile, INDEX_FORMAT_VERSION};
use anyhow::{anyhow, ensure, Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use shortlist_core::{AssessmentRecord, FlatIndex, VectorIndex};
use std::io::Write;
use std::path::Path;

/// Writes `records` and `index` into `dir` using the standard file names.
///
/// Each file is replaced atomically, so a concurrently starting reader sees
/// either the old or the new version of a file, never a torn one.
pub fn write_corpus<P: AsRef<Path>>(
    dir: P,
    records: &[AssessmentRecord],
    index: &FlatIndex,
) -> Result<CorpusPaths> {
    ensure!(
        records.len() == index.len(),
        "refusing to write {} records alongside {} vectors",
        records.len(),
        index.len()
    );
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let paths = CorpusPaths::in_dir(dir);
    write_index(&paths.index, index)?;
    write_metadata(&paths.metadata, records)?;
    Ok(paths)
}

pub fn write_index(path: &Path, index: &FlatIndex) -> Result<()> {
    let file = IndexFile {
        format_version: INDEX_FORMAT_VERSION,
        dim: index.dim(),
        vectors: index.as_flat().to_vec(),
    };
    let data = bincode::serialize(&file).map_err(|e| anyhow!("Serialization error: {}", e))?;
    write_atomic(path, &data)
}

pub fn write_metadata(path: &Path, records: &[AssessmentRecord]) -> Result<()> {
    let data = serde_json::to_vec_pretty(records).context("failed to encode metadata")?;
    write_atomic(path, &data)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(data))
        .with_context(|| format!("failed to write {}", path.display()))
}
