//! Mock attention generator.
//!
//! Produces a row-stochastic N×N matrix with a hand-coded bias:
//! self-attention > adjacent tokens > distant tokens. No learned model.

use crate::constants::{
    ADJACENT_ATTENTION_RANGE, DISTANT_ATTENTION_RANGE, MAX_ATTENTION_TOKENS,
    SELF_ATTENTION_RANGE,
};
use crate::scores::ScoreSource;

/// One row per source token, one column per target token.
pub type AttentionMatrix = Vec<Vec<f64>>;

/// Generate mock attention weights for the whitespace tokens of `text`.
///
/// Only the first [`MAX_ATTENTION_TOKENS`] tokens are used. Each row is
/// normalized to sum to 1; a row summing to zero is left unnormalized.
/// Returns an empty matrix when `text` has no tokens.
pub fn generate_attention<S: ScoreSource + ?Sized>(text: &str, source: &mut S) -> AttentionMatrix {
    let n = text.split_whitespace().take(MAX_ATTENTION_TOKENS).count();

    (0..n)
        .map(|i| {
            let mut row: Vec<f64> = (0..n)
                .map(|j| {
                    let (low, high) = match i.abs_diff(j) {
                        0 => SELF_ATTENTION_RANGE,
                        1 => ADJACENT_ATTENTION_RANGE,
                        _ => DISTANT_ATTENTION_RANGE,
                    };
                    source.uniform(low, high)
                })
                .collect();
            normalize_row(&mut row);
            row
        })
        .collect()
}

/// Scale a row in place so it sums to 1. Zero-sum rows are untouched.
fn normalize_row(row: &mut [f64]) {
    let sum: f64 = row.iter().sum();
    if sum > 0.0 {
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::SequenceSource;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_empty_text_yields_empty_matrix() {
        assert!(generate_attention("", &mut rng()).is_empty());
        assert!(generate_attention("   ", &mut rng()).is_empty());
    }

    #[test]
    fn test_square_shape() {
        let m = generate_attention("the quick brown fox", &mut rng());
        assert_eq!(m.len(), 4);
        assert!(m.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_caps_at_twenty_tokens() {
        let text = (0..25).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let m = generate_attention(&text, &mut rng());
        assert_eq!(m.len(), MAX_ATTENTION_TOKENS);
        assert!(m.iter().all(|row| row.len() == MAX_ATTENTION_TOKENS));
    }

    #[test]
    fn test_rows_sum_to_one() {
        let m = generate_attention("a b c d e f g", &mut rng());
        for (i, row) in m.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {i} sums to {sum}");
        }
    }

    #[test]
    fn test_bias_pattern_with_midpoint_source() {
        // midpoints: self 0.55, adjacent 0.35, distant 0.175
        let m = generate_attention("a b c", &mut SequenceSource::midpoint());
        let row0_sum = 0.55 + 0.35 + 0.175;
        assert!((m[0][0] - 0.55 / row0_sum).abs() < 1e-12);
        assert!((m[0][1] - 0.35 / row0_sum).abs() < 1e-12);
        assert!((m[0][2] - 0.175 / row0_sum).abs() < 1e-12);
        // middle row has two neighbours and no distant cell
        let row1_sum = 0.35 + 0.55 + 0.35;
        assert!((m[1][1] - 0.55 / row1_sum).abs() < 1e-12);
        assert!(m[1][1] > m[1][0]);
    }

    #[test]
    fn test_self_dominates_distant() {
        let m = generate_attention("a b c d e", &mut rng());
        for (i, row) in m.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if i.abs_diff(j) > 1 {
                    assert!(row[i] > v, "self {i} should beat distant {j}");
                }
            }
        }
    }

    #[test]
    fn test_zero_row_left_unnormalized() {
        let mut row = vec![0.0, 0.0, 0.0];
        normalize_row(&mut row);
        assert_eq!(row, vec![0.0, 0.0, 0.0]);
    }
}
