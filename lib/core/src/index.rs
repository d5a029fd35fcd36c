//! Nearest-neighbour index over the corpus vectors.

use crate::simd::squared_l2;
use crate::{Error, Result, Vector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

/// Row count from which the scan is split across the rayon pool.
const PARALLEL_SCAN_THRESHOLD: usize = 4_096;

/// One search hit: a row id and its distance to the query (smaller is closer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// A read-only k-nearest-neighbour index.
///
/// Implementations return hits ordered by ascending distance. Row ids refer
/// to the position the vector was added at.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Exact index scanning every vector with squared L2 distance.
///
/// Vectors are stored row-major in a single buffer. Ties are broken by the
/// lower row id, so results are fully deterministic.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("index dimension must be non-zero".into()));
        }
        Ok(Self {
            dim,
            data: Vec::new(),
        })
    }

    /// Builds an index from a row-major buffer of `dim`-sized vectors.
    pub fn from_flat(dim: usize, data: Vec<f32>) -> Result<Self> {
        let mut index = Self::new(dim)?;
        if data.len() % dim != 0 {
            return Err(Error::InvalidConfig(format!(
                "buffer of {} floats is not a whole number of {dim}-dimensional rows",
                data.len()
            )));
        }
        index.data = data;
        Ok(index)
    }

    pub fn from_vectors(dim: usize, vectors: impl IntoIterator<Item = Vector>) -> Result<Self> {
        let mut index = Self::new(dim)?;
        for v in vectors {
            index.add(&v)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, vector: &Vector) -> Result<()> {
        if vector.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: vector.dim(),
            });
        }
        self.data.extend_from_slice(vector.as_slice());
        Ok(())
    }

    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.data.get(start..end)
    }

    /// The raw row-major buffer
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 || self.data.is_empty() {
            return Ok(Vec::new());
        }

        let score = |(row, v): (usize, &[f32])| (OrderedFloat(squared_l2(query, v)), row);
        let mut scored: Vec<(OrderedFloat<f32>, usize)> = if self.len() >= PARALLEL_SCAN_THRESHOLD {
            self.data
                .par_chunks_exact(self.dim)
                .enumerate()
                .map(score)
                .collect()
        } else {
            self.data.chunks_exact(self.dim).enumerate().map(score).collect()
        };

        if scored.len() > k {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        // (distance, row) pairs are unique, so the unstable sort is deterministic.
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .map(|(distance, row)| Neighbor {
                row,
                distance: distance.into_inner(),
            })
            .collect())
    }
}
