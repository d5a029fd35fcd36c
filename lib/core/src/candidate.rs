use crate::record::{AssessmentRecord, TestTypes};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Maps a non-negative distance onto a similarity in (0, 1].
///
/// `1 / (1 + d)` is strictly decreasing in `d`, equals 1 at `d = 0` and never
/// divides by zero. Negative inputs are clamped to 0.
#[inline]
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

/// A search hit borrowed from the corpus, scored for the current request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub record: &'a AssessmentRecord,
    pub similarity_score: f32,
}

impl<'a> Candidate<'a> {
    pub fn new(record: &'a AssessmentRecord, similarity_score: f32) -> Self {
        Self {
            record,
            similarity_score,
        }
    }

    pub fn from_distance(record: &'a AssessmentRecord, distance: f32) -> Self {
        Self::new(record, similarity_from_distance(distance))
    }

    /// Deduplication key, see [`AssessmentRecord::canonical_url`]
    pub fn dedup_key(&self) -> Cow<'a, str> {
        let record: &'a AssessmentRecord = self.record;
        record.canonical_url()
    }

    pub fn to_recommendation(&self) -> Recommendation {
        Recommendation {
            name: self.record.name.clone(),
            url: self.record.url.clone(),
            test_type: Some(self.record.test_type.clone()),
            similarity_score: Some(self.similarity_score),
        }
    }
}

/// One entry of the final ranked answer.
///
/// `test_type` and `similarity_score` are diagnostics; the public service
/// contract only exposes `name` and `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<TestTypes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
        for d in [1e-6f32, 0.5, 1.0, 10.0, 1e6] {
            let s = similarity_from_distance(d);
            assert!(s > 0.0 && s <= 1.0, "{d} -> {s}");
        }
        assert_eq!(similarity_from_distance(-3.0), 1.0);
    }

    #[test]
    fn test_similarity_strictly_decreasing() {
        let distances = [0.0f32, 0.01, 0.1, 1.0, 2.5, 100.0];
        let scores: Vec<f32> = distances.iter().map(|d| similarity_from_distance(*d)).collect();
        assert!(scores.windows(2).all(|w| w[0] > w[1]));
        assert!((similarity_from_distance(1.0) - 0.5).abs() < f32::EPSILON);
    }
}
