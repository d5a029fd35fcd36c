use crate::format::{CorpusPaths, IndexFile, INDEX_FORMAT_VERSION};
use anyhow::{anyhow, bail, Context, Result};
use shortlist_core::{AssessmentRecord, CorpusStore, Error, FlatIndex, VectorIndex};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Loads the corpus described by `paths`.
///
/// Every failure, including a record/vector count mismatch, is reported as
/// [`Error::Startup`].
pub fn load_corpus(paths: &CorpusPaths) -> shortlist_core::Result<CorpusStore> {
    let index = load_index(&paths.index).map_err(startup)?;
    let records = load_metadata(&paths.metadata).map_err(startup)?;
    let dim = index.dim();

    let corpus = CorpusStore::new(records, index)?;
    info!(
        assessments = corpus.len(),
        dim,
        index = %paths.index.display(),
        "Loaded corpus"
    );
    Ok(corpus)
}

/// [`load_corpus`] for the standard file names inside `dir`
pub fn load_corpus_dir<P: AsRef<Path>>(dir: P) -> shortlist_core::Result<CorpusStore> {
    load_corpus(&CorpusPaths::in_dir(dir))
}

fn startup(e: anyhow::Error) -> Error {
    Error::Startup(format!("{e:#}"))
}

pub fn load_index(path: &Path) -> Result<FlatIndex> {
    if !path.exists() {
        bail!("index not found at {}", path.display());
    }
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read index {}", path.display()))?;
    let file: IndexFile = bincode::deserialize(&data)
        .map_err(|e| anyhow!("corrupt index {}: {}", path.display(), e))?;
    if file.format_version != INDEX_FORMAT_VERSION {
        bail!(
            "index {} has format version {}, expected {}",
            path.display(),
            file.format_version,
            INDEX_FORMAT_VERSION
        );
    }
    FlatIndex::from_flat(file.dim, file.vectors)
        .map_err(|e| anyhow!("corrupt index {}: {}", path.display(), e))
}

pub fn load_metadata(path: &Path) -> Result<Vec<AssessmentRecord>> {
    if !path.exists() {
        bail!("metadata not found at {}", path.display());
    }
    let file = File::open(path)
        .with_context(|| format!("failed to open metadata {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("corrupt metadata {}", path.display()))
}
