//! Integration tests exercising the attention pipeline end to end:
//! generate → build_heatmap → analyze_patterns, plus property checks.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wb_core::{
    AnalysisError, MAX_ATTENTION_TOKENS, NlpProcessor, TaskInput, TaskType, TOP_K,
    analyze_patterns, build_heatmap, generate_attention, reconcile, row_entropy,
};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

const SENTENCE: &str = "The quick brown fox jumps over the lazy dog";

/// Test 1: the three stages compose without reshaping a generated matrix.
#[test]
fn pipeline_roundtrip() {
    let matrix = generate_attention(SENTENCE, &mut rng());
    assert_eq!(matrix.len(), 9);

    let heatmap = build_heatmap(SENTENCE, &matrix).unwrap();
    assert_eq!(heatmap.attention_matrix, matrix, "square input is not reshaped");
    assert_eq!(heatmap.token_importance.len(), 9);
    assert_abs_diff_eq!(heatmap.avg_attention, 1.0 / 9.0, epsilon = 1e-9);

    let analysis = analyze_patterns(&heatmap.attention_matrix, &heatmap.tokens).unwrap();
    assert_eq!(analysis.high_self_attention.len(), TOP_K);
    // every row is a distribution over 9 cells
    assert!(analysis.attention_diversity.max_entropy <= 9f64.ln() + 1e-9);
    assert!(analysis.attention_diversity.min_entropy > 0.0);
}

/// Test 2: long text is capped by the generator but not by the aggregator.
#[test]
fn generator_cap_then_padding() {
    let text = (0..25).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" ");
    let matrix = generate_attention(&text, &mut rng());
    assert_eq!(matrix.len(), MAX_ATTENTION_TOKENS);

    let heatmap = build_heatmap(&text, &matrix).unwrap();
    assert_eq!(heatmap.tokens.len(), 25);
    assert_eq!(heatmap.attention_matrix.len(), 25);
    assert!(heatmap.attention_matrix[24].iter().all(|&v| v == 0.0));
    assert_eq!(heatmap.token_importance[24].importance, 0.0);

    let analysis = analyze_patterns(&heatmap.attention_matrix, &heatmap.tokens).unwrap();
    assert_eq!(analysis.attention_diversity.min_entropy, 0.0);
}

/// Test 3: empty text flows through as errors, not panics.
#[test]
fn empty_text_errors() {
    let matrix = generate_attention("", &mut rng());
    assert!(matrix.is_empty());
    assert!(matches!(
        build_heatmap("", &matrix),
        Err(AnalysisError::EmptyInput(_))
    ));
    assert!(matches!(
        analyze_patterns(&matrix, &[]),
        Err(AnalysisError::EmptyInput(_))
    ));
}

/// Test 4: processor output for sentiment feeds straight into the heatmap.
#[test]
fn sentiment_output_visualizes() {
    let processor = NlpProcessor::new();
    let out = processor
        .run(
            TaskType::Sentiment,
            &TaskInput::new("I love this wonderful library"),
            &mut rng(),
        )
        .unwrap();
    let weights = out.attention_weights().expect("sentiment carries attention");
    let heatmap = build_heatmap("I love this wonderful library", weights).unwrap();
    assert_eq!(heatmap.tokens.len(), 5);

    let json = out.to_json().unwrap();
    assert_eq!(json["predictions"][0]["label"], "POSITIVE");
}

/// Test 5: same seed, same matrix.
#[test]
fn seeded_generation_is_deterministic() {
    let a = generate_attention(SENTENCE, &mut rng());
    let b = generate_attention(SENTENCE, &mut rng());
    assert_eq!(a, b);
}

fn square_matrix(max_n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1..=max_n).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(0.0f64..1.0, n), n))
}

fn word_list(max_n: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 1..=max_n)
}

proptest! {
    #[test]
    fn importance_length_matches_tokens(words in word_list(12), matrix in square_matrix(12)) {
        let text = words.join(" ");
        let heatmap = build_heatmap(&text, &matrix).unwrap();
        prop_assert_eq!(heatmap.token_importance.len(), words.len());
        for (i, t) in heatmap.token_importance.iter().enumerate() {
            prop_assert_eq!(t.index, i);
            prop_assert!((0.0..=1.0 + 1e-12).contains(&t.importance));
        }
    }

    #[test]
    fn reconcile_is_idempotent(matrix in square_matrix(10), n in 0usize..14) {
        let once = reconcile(&matrix, n);
        let twice = reconcile(&once, n);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(reconcile(&matrix, matrix.len()), matrix);
    }

    #[test]
    fn generated_rows_sum_to_one(words in word_list(30), seed in any::<u64>()) {
        let matrix = generate_attention(&words.join(" "), &mut SmallRng::seed_from_u64(seed));
        prop_assert_eq!(matrix.len(), words.len().min(MAX_ATTENTION_TOKENS));
        for row in &matrix {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn entropy_is_non_negative(row in prop::collection::vec(0.0f64..1.0, 1..20)) {
        prop_assert!(row_entropy(&row) >= 0.0);
    }

    #[test]
    fn one_hot_entropy_is_zero(n in 1usize..20, hot in 0usize..20, mass in 0.01f64..10.0) {
        let mut row = vec![0.0; n];
        row[hot % n] = mass;
        prop_assert!(row_entropy(&row).abs() < 1e-9);
    }

    #[test]
    fn top_lists_bounded(words in word_list(8), matrix in square_matrix(8)) {
        let text = words.join(" ");
        let heatmap = build_heatmap(&text, &matrix).unwrap();
        let analysis = analyze_patterns(&heatmap.attention_matrix, &heatmap.tokens).unwrap();
        let limit = TOP_K.min(words.len());
        prop_assert_eq!(analysis.high_self_attention.len(), limit);
        prop_assert_eq!(analysis.most_influential.len(), limit);
        prop_assert_eq!(analysis.most_attended.len(), limit);
    }
}
