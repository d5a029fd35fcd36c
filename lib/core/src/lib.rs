//! # Shortlist Core
//!
//! Core library for the Shortlist assessment recommender.
//!
//! This crate holds everything in the retrieval pipeline that does not talk
//! to the network:
//!
//! - [`AssessmentRecord`] - A catalogued assessment and its [`TestTypes`]
//! - [`QueryIntent`] - Skills and test types extracted from a query
//! - [`FlatIndex`] - Exact squared-L2 nearest-neighbour index
//! - [`CorpusStore`] - Records plus index, loaded once and shared read-only
//! - [`CandidateRetriever`] - Oversampled search returning scored [`Candidate`]s
//! - [`DiversityBalancer`] - Cuts candidates down to a ranked, type-balanced list
//!
//! ## Example
//!
//! ```rust
//! use shortlist_core::{
//!     AssessmentRecord, CandidateRetriever, CorpusStore, DiversityBalancer, FlatIndex,
//!     TestType, TestTypes, Vector,
//! };
//! use std::collections::BTreeSet;
//!
//! let records = vec![
//!     AssessmentRecord::new(0, "Java 8", "https://catalog.test/products/java-8/",
//!         TestTypes::from_iter([TestType::Knowledge])),
//!     AssessmentRecord::new(1, "OPQ32r", "https://catalog.test/products/opq32r/",
//!         TestTypes::from_iter([TestType::Personality])),
//! ];
//! let index = FlatIndex::from_vectors(2, [
//!     Vector::new(vec![1.0, 0.0]),
//!     Vector::new(vec![0.0, 1.0]),
//! ]).unwrap();
//! let corpus = CorpusStore::new(records, index).unwrap();
//!
//! let candidates = CandidateRetriever::default()
//!     .retrieve(&corpus, &Vector::new(vec![0.9, 0.1]))
//!     .unwrap();
//! let required = BTreeSet::from([TestType::Personality]);
//! let picked = DiversityBalancer::new(1, 2).balance(&candidates, &required);
//! assert_eq!(picked[0].record.name, "OPQ32r");
//! ```

pub mod balance;
pub mod candidate;
pub mod corpus;
pub mod error;
pub mod index;
pub mod intent;
pub mod record;
pub mod retriever;
pub mod vector;

/// Squared-L2 kernels with AVX2/FMA and NEON fast paths
pub mod simd;

pub use balance::{DiversityBalancer, DEFAULT_MIN_PER_TYPE, DEFAULT_TARGET};
pub use candidate::{similarity_from_distance, Candidate, Recommendation};
pub use corpus::CorpusStore;
pub use error::{Error, Result};
pub use index::{FlatIndex, Neighbor, VectorIndex};
pub use intent::{intent_prompt, parse_intent_response, strip_code_fence, QueryIntent};
pub use record::{canonical_url, AssessmentRecord, TestType, TestTypes};
pub use retriever::{CandidateRetriever, DEFAULT_OVERSAMPLE};
pub use vector::Vector;
