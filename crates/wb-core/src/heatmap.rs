//! Attention aggregation: reconcile a matrix against the text's tokens,
//! compute flat statistics and per-token importance.

use serde::{Deserialize, Serialize};

use crate::attention::AttentionMatrix;
use crate::error::{AnalysisError, Result};
use crate::tokenizer::tokenize;

/// Per-token importance derived from incoming and outgoing attention mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenImportance {
    pub index: usize,
    pub importance: f64,
    /// Column sum divided by the largest column sum.
    pub incoming_attention: f64,
    /// Row sum divided by the largest row sum.
    pub outgoing_attention: f64,
}

/// Visualization record for one analysis request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub tokens: Vec<String>,
    pub attention_matrix: AttentionMatrix,
    pub max_attention: f64,
    pub min_attention: f64,
    pub avg_attention: f64,
    /// Ordered by token index.
    pub token_importance: Vec<TokenImportance>,
}

/// Reshape `matrix` to `n`×`n`: extra rows and columns are dropped, missing
/// ones are filled with zeros. Already-square `n`×`n` input is returned as is.
pub fn reconcile(matrix: &[Vec<f64>], n: usize) -> AttentionMatrix {
    (0..n)
        .map(|i| {
            let mut row: Vec<f64> = matrix
                .get(i)
                .map(|r| r.iter().copied().take(n).collect())
                .unwrap_or_default();
            row.resize(n, 0.0);
            row
        })
        .collect()
}

/// Build the heatmap record for `text` and an attention matrix from any source.
pub fn build_heatmap(text: &str, matrix: &[Vec<f64>]) -> Result<Heatmap> {
    if matrix.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "No attention weights provided".to_string(),
        ));
    }

    let tokens = tokenize(text);
    let reconciled = reconcile(matrix, tokens.len());
    ensure_finite(&reconciled)
        .map_err(|e| AnalysisError::ComputationFault(format!("Failed to generate heatmap: {e}")))?;

    let (min_attention, max_attention, avg_attention) = flat_stats(&reconciled);
    let token_importance = token_importance(&reconciled)?;

    Ok(Heatmap {
        tokens,
        attention_matrix: reconciled,
        max_attention,
        min_attention,
        avg_attention,
        token_importance,
    })
}

/// Normalized incoming/outgoing attention per token of a square matrix.
pub fn token_importance(matrix: &[Vec<f64>]) -> Result<Vec<TokenImportance>> {
    let n = matrix.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(AnalysisError::ComputationFault(format!(
            "Failed to calculate token importance: row {i} has {} columns, expected {n}",
            row.len()
        )));
    }

    let incoming = column_sums(matrix);
    let outgoing = row_sums(matrix);
    let max_incoming = incoming.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_outgoing = outgoing.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let scores = (0..n)
        .map(|i| {
            let incoming_attention = ratio(incoming[i], max_incoming);
            let outgoing_attention = ratio(outgoing[i], max_outgoing);
            TokenImportance {
                index: i,
                importance: (incoming_attention + outgoing_attention) / 2.0,
                incoming_attention,
                outgoing_attention,
            }
        })
        .collect();
    Ok(scores)
}

/// Sum of each row.
pub fn row_sums(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix.iter().map(|row| row.iter().sum()).collect()
}

/// Sum of each column, over columns `0..matrix.len()`. Short rows count as zero.
pub fn column_sums(matrix: &[Vec<f64>]) -> Vec<f64> {
    (0..matrix.len())
        .map(|i| matrix.iter().map(|row| row.get(i).copied().unwrap_or(0.0)).sum())
        .collect()
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

/// (min, max, mean) over every cell; (0.0, 1.0, 0.0) when there are none.
fn flat_stats(matrix: &[Vec<f64>]) -> (f64, f64, f64) {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in matrix.iter().flatten() {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    if count == 0 {
        (0.0, 1.0, 0.0)
    } else {
        (min, max, sum / count as f64)
    }
}

/// First non-finite cell, formatted for an error message.
pub(crate) fn ensure_finite(matrix: &[Vec<f64>]) -> std::result::Result<(), String> {
    for (i, row) in matrix.iter().enumerate() {
        if let Some(j) = row.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite weight {} at ({i}, {j})", row[j]));
        }
    }
    Ok(())
}
