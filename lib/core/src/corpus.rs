use crate::index::VectorIndex;
use crate::record::AssessmentRecord;
use crate::{Error, Result};

/// The immutable catalogue: records plus the index over their vectors.
///
/// Built once at start-up and shared read-only between requests, typically
/// behind an `Arc`. Record `i` always corresponds to index row `i`.
pub struct CorpusStore {
    records: Vec<AssessmentRecord>,
    index: Box<dyn VectorIndex>,
}

impl CorpusStore {
    pub fn new(records: Vec<AssessmentRecord>, index: impl VectorIndex + 'static) -> Result<Self> {
        Self::from_boxed(records, Box::new(index))
    }

    pub fn from_boxed(records: Vec<AssessmentRecord>, index: Box<dyn VectorIndex>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::Startup("corpus contains no assessments".into()));
        }
        if records.len() != index.len() {
            return Err(Error::Startup(format!(
                "metadata has {} records but the index holds {} vectors",
                records.len(),
                index.len()
            )));
        }
        Ok(Self { records, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dimensionality every query vector must match
    #[inline]
    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    #[inline]
    pub fn record(&self, row: usize) -> Option<&AssessmentRecord> {
        self.records.get(row)
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }
}

impl std::fmt::Debug for CorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusStore")
            .field("records", &self.records.len())
            .field("dim", &self.dim())
            .finish()
    }
}
