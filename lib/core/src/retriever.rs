use crate::candidate::Candidate;
use crate::corpus::CorpusStore;
use crate::{Error, Result, Vector};
use tracing::debug;

/// Candidates fetched per query before balancing
pub const DEFAULT_OVERSAMPLE: usize = 100;

/// Turns a query vector into an oversampled, distance-ordered candidate list
#[derive(Debug, Clone, Copy)]
pub struct CandidateRetriever {
    oversample: usize,
}

impl Default for CandidateRetriever {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSAMPLE)
    }
}

impl CandidateRetriever {
    pub fn new(oversample: usize) -> Self {
        Self { oversample }
    }

    pub fn oversample(&self) -> usize {
        self.oversample
    }

    /// Searches the corpus index and pairs each hit with its record.
    ///
    /// Hits whose row has no record, or whose distance is not finite, are
    /// skipped; they never fail the request. Order is the index's own
    /// ascending-distance order.
    pub fn retrieve<'c>(&self, corpus: &'c CorpusStore, query: &Vector) -> Result<Vec<Candidate<'c>>> {
        let neighbors = corpus.index().search(query.as_slice(), self.oversample)?;

        let mut candidates = Vec::with_capacity(neighbors.len());
        for hit in neighbors {
            let Some(record) = corpus.record(hit.row) else {
                let skipped = Error::RowOutOfRange {
                    row: hit.row,
                    len: corpus.len(),
                };
                debug!(error = %skipped, "skipping index hit");
                continue;
            };
            if !hit.distance.is_finite() {
                debug!(row = hit.row, distance = hit.distance, "skipping non-finite distance");
                continue;
            }
            candidates.push(Candidate::from_distance(record, hit.distance));
        }

        Ok(candidates)
    }
}
