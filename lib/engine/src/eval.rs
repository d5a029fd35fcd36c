//! Offline Recall@K evaluation against a labelled query set.

use crate::engine::RetrievalEngine;
use serde::{Deserialize, Serialize};
use shortlist_core::{canonical_url, Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// One relevant assessment for one query. A query with several relevant
/// assessments appears once per assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledPair {
    #[serde(alias = "Query")]
    pub query: String,
    #[serde(alias = "Assessment_url")]
    pub assessment_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub ground_truth_count: usize,
    pub predicted_count: usize,
    pub matches: usize,
    pub recall: f64,
    /// Set when every attempt failed; the query then scores zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub mean_recall: f64,
    pub queries: Vec<QueryEvaluation>,
}

pub fn load_dataset(path: &Path) -> Result<Vec<LabelledPair>> {
    let data = std::fs::read(path)?;
    serde_json::from_slice(&data)
        .map_err(|e| Error::Serialization(format!("invalid dataset {}: {e}", path.display())))
}

/// Collects the relevant URLs of each distinct query, ordered by query text.
pub fn group_by_query(pairs: &[LabelledPair]) -> BTreeMap<&str, Vec<&str>> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for pair in pairs {
        grouped
            .entry(pair.query.as_str())
            .or_default()
            .push(pair.assessment_url.as_str());
    }
    grouped
}

/// Fraction of the distinct relevant URLs found among the first `k`
/// predictions, comparing canonical URLs. Zero when nothing is relevant.
pub fn recall_at_k<P, G>(predicted: &[P], relevant: &[G], k: usize) -> (f64, usize)
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    let relevant: HashSet<_> = relevant.iter().map(|u| canonical_url(u.as_ref())).collect();
    if relevant.is_empty() {
        return (0.0, 0);
    }
    let predicted: HashSet<_> = predicted
        .iter()
        .take(k)
        .map(|u| canonical_url(u.as_ref()))
        .collect();
    let hits = predicted.intersection(&relevant).count();
    (hits as f64 / relevant.len() as f64, hits)
}

/// Runs every distinct query through `engine` and scores the top `k`.
///
/// Each query gets up to `attempts` tries; a query that never succeeds is
/// recorded with recall 0 instead of aborting the run.
pub async fn evaluate(
    engine: &RetrievalEngine,
    pairs: &[LabelledPair],
    k: usize,
    attempts: u32,
) -> EvaluationReport {
    let grouped = group_by_query(pairs);
    info!(queries = grouped.len(), pairs = pairs.len(), k, "starting evaluation");

    let mut queries = Vec::with_capacity(grouped.len());
    for (query, relevant) in grouped {
        let ground_truth_count = relevant
            .iter()
            .map(|u| canonical_url(u))
            .collect::<HashSet<_>>()
            .len();

        let mut last_error = None;
        let mut predicted = None;
        for attempt in 1..=attempts.max(1) {
            match engine.retrieve(query, k).await {
                Ok(recs) => {
                    predicted = Some(recs);
                    break;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "evaluation query failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        let evaluation = match predicted {
            Some(recs) => {
                let urls: Vec<&str> = recs.iter().map(|r| r.url.as_str()).collect();
                let (recall, matches) = recall_at_k(&urls, &relevant, k);
                QueryEvaluation {
                    query: query.to_string(),
                    ground_truth_count,
                    predicted_count: urls.len(),
                    matches,
                    recall,
                    error: None,
                }
            }
            None => QueryEvaluation {
                query: query.to_string(),
                ground_truth_count,
                predicted_count: 0,
                matches: 0,
                recall: 0.0,
                error: last_error,
            },
        };
        info!(
            recall = evaluation.recall,
            matches = evaluation.matches,
            ground_truth = evaluation.ground_truth_count,
            "evaluated query"
        );
        queries.push(evaluation);
    }

    let mean_recall = if queries.is_empty() {
        0.0
    } else {
        queries.iter().map(|q| q.recall).sum::<f64>() / queries.len() as f64
    };
    info!(mean_recall, queries = queries.len(), "evaluation complete");

    EvaluationReport {
        k,
        mean_recall,
        queries,
    }
}
