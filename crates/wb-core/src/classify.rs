use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::scores::ScoreSource;

pub const DEFAULT_CLASSIFICATION_MODEL: &str = "facebook/bart-large-mnli";

pub const DEFAULT_LABELS: &[&str] = &[
    "positive",
    "negative",
    "neutral",
    "business",
    "technology",
    "sports",
    "politics",
];

/// Labels with a keyword heuristic; every other label gets a random score.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("business", &["company", "business", "profit", "market", "money"]),
    ("technology", &["tech", "computer", "software", "ai", "digital"]),
    ("sports", &["game", "sport", "player", "team", "win"]),
    ("politics", &["government", "political", "election", "policy"]),
];

const BASE_SCORE: f64 = 0.1;
const KEYWORD_BONUS: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationPredictions {
    /// Sorted by descending score.
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassificationOutput {
    pub task: &'static str,
    pub predictions: ClassificationPredictions,
    pub model_used: String,
    pub labels_used: Vec<String>,
}

pub fn classify_text<S: ScoreSource + ?Sized>(
    text: &str,
    model_name: Option<&str>,
    labels: Option<&[String]>,
    source: &mut S,
) -> Result<ClassificationOutput> {
    let labels: Vec<String> = match labels {
        Some(l) => l.to_vec(),
        None => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    };
    if labels.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "Text classification failed: no labels provided".to_string(),
        ));
    }

    let lower = text.to_lowercase();
    let raw: Vec<f64> = labels
        .iter()
        .map(|label| label_score(&lower, label, source))
        .collect();
    let total: f64 = raw.iter().sum();

    let mut ranked: Vec<(String, f64)> = labels
        .iter()
        .cloned()
        .zip(raw.into_iter().map(|s| s / total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (sorted_labels, scores): (Vec<String>, Vec<f64>) = ranked.into_iter().unzip();

    Ok(ClassificationOutput {
        task: "text_classification",
        predictions: ClassificationPredictions {
            labels: sorted_labels,
            scores,
        },
        model_used: model_name
            .unwrap_or(DEFAULT_CLASSIFICATION_MODEL)
            .to_string(),
        labels_used: labels,
    })
}

fn label_score<S: ScoreSource + ?Sized>(lower_text: &str, label: &str, source: &mut S) -> f64 {
    let label = label.to_lowercase();
    match TOPIC_KEYWORDS.iter().find(|(topic, _)| *topic == label) {
        Some((_, keywords)) => {
            let hit = keywords.iter().any(|k| lower_text.contains(k));
            BASE_SCORE + if hit { KEYWORD_BONUS } else { 0.0 }
        }
        None => source.uniform(0.1, 0.8),
    }
}
