//! Pattern analysis over a reconciled attention matrix.

use serde::{Deserialize, Serialize};

use crate::constants::{ENTROPY_EPSILON, TOP_K};
use crate::error::{AnalysisError, Result};
use crate::heatmap::{ensure_finite, row_sums};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfAttentionScore {
    pub token: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttentionTotal {
    pub token: String,
    pub total_attention: f64,
}

/// Row-entropy summary; higher means attention is spread more evenly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttentionDiversity {
    pub mean_entropy: f64,
    pub max_entropy: f64,
    pub min_entropy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub high_self_attention: Vec<SelfAttentionScore>,
    pub most_influential: Vec<AttentionTotal>,
    pub most_attended: Vec<AttentionTotal>,
    pub attention_diversity: AttentionDiversity,
}

/// Rank tokens by self, outgoing and incoming attention, and summarize row entropy.
///
/// `matrix` should already be reconciled to `tokens.len()`; rows beyond the
/// token list are ignored in the rankings but still contribute entropy.
pub fn analyze_patterns(matrix: &[Vec<f64>], tokens: &[String]) -> Result<PatternAnalysis> {
    if matrix.is_empty() || tokens.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "No attention matrix or tokens provided".to_string(),
        ));
    }

    ensure_finite(matrix)
        .map_err(|e| AnalysisError::ComputationFault(format!("Analysis failed: {e}")))?;

    let n = tokens.len();
    let bound = n.min(matrix.len());
    let self_scores = (0..bound)
        .map(|i| {
            matrix[i].get(i).copied().ok_or_else(|| {
                AnalysisError::ComputationFault(format!(
                    "Analysis failed: row {i} has no diagonal cell"
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    if let Some((j, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() < n) {
        return Err(AnalysisError::ComputationFault(format!(
            "Analysis failed: row {j} has {} columns, expected {n}",
            row.len()
        )));
    }
    let outgoing = row_sums(matrix);
    let incoming: Vec<f64> = (0..n)
        .map(|i| matrix.iter().map(|row| row[i]).sum())
        .collect();

    let high_self_attention = top_k(&self_scores, n)
        .map(|i| SelfAttentionScore {
            token: tokens[i].clone(),
            score: self_scores[i],
        })
        .collect();
    let most_influential = top_k(&outgoing, n)
        .map(|i| AttentionTotal {
            token: tokens[i].clone(),
            total_attention: outgoing[i],
        })
        .collect();
    let most_attended = top_k(&incoming, n)
        .map(|i| AttentionTotal {
            token: tokens[i].clone(),
            total_attention: incoming[i],
        })
        .collect();

    let entropies: Vec<f64> = matrix.iter().map(|row| row_entropy(row)).collect();

    Ok(PatternAnalysis {
        high_self_attention,
        most_influential,
        most_attended,
        attention_diversity: diversity(&entropies),
    })
}

/// Shannon entropy (natural log) of a row treated as a distribution.
/// Rows with a non-positive sum have entropy 0.
pub fn row_entropy(row: &[f64]) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    let h: f64 = -row
        .iter()
        .map(|v| v / sum)
        .filter(|&p| p > 0.0)
        .map(|p| p * (p + ENTROPY_EPSILON).ln())
        .sum::<f64>();
    // epsilon makes a one-hot row come out at -1e-10
    h.max(0.0)
}

/// Indices of the `TOP_K` largest scores below `limit`, descending, ties by index.
fn top_k(scores: &[f64], limit: usize) -> impl Iterator<Item = usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.into_iter().take(TOP_K).filter(move |&i| i < limit)
}

fn diversity(entropies: &[f64]) -> AttentionDiversity {
    let mean = entropies.iter().sum::<f64>() / entropies.len() as f64;
    AttentionDiversity {
        mean_entropy: mean,
        max_entropy: entropies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_entropy: entropies.iter().copied().fold(f64::INFINITY, f64::min),
    }
}
