use serde::Serialize;

use crate::attention::{AttentionMatrix, generate_attention};
use crate::constants::MAX_CONFIDENCE;
use crate::scores::ScoreSource;

pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "love", "like", "happy",
    "best",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "sad", "worst", "horrible", "angry",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SentimentOutput {
    pub task: &'static str,
    pub predictions: Vec<SentimentPrediction>,
    pub model_used: String,
    pub attention_weights: AttentionMatrix,
}

/// Keyword-count sentiment.
///
/// Each lexicon word counts once when it appears anywhere in the lowercased
/// text (substring match, so "likely" counts as "like").
pub fn analyze_sentiment<S: ScoreSource + ?Sized>(
    text: &str,
    model_name: Option<&str>,
    source: &mut S,
) -> SentimentOutput {
    let lower = text.to_lowercase();
    let pos = count_hits(&lower, POSITIVE_WORDS);
    let neg = count_hits(&lower, NEGATIVE_WORDS);

    let prediction = if pos > neg {
        SentimentPrediction {
            label: SentimentLabel::Positive,
            score: keyword_confidence(pos),
        }
    } else if neg > pos {
        SentimentPrediction {
            label: SentimentLabel::Negative,
            score: keyword_confidence(neg),
        }
    } else {
        SentimentPrediction {
            label: SentimentLabel::Neutral,
            score: 0.5 + source.uniform(-0.1, 0.1),
        }
    };

    SentimentOutput {
        task: "sentiment_analysis",
        predictions: vec![prediction],
        model_used: model_name.unwrap_or(DEFAULT_SENTIMENT_MODEL).to_string(),
        attention_weights: generate_attention(text, source),
    }
}

fn count_hits(lower: &str, lexicon: &[&str]) -> usize {
    lexicon.iter().filter(|w| lower.contains(*w)).count()
}

fn keyword_confidence(hits: usize) -> f64 {
    (0.6 + hits as f64 * 0.1).min(MAX_CONFIDENCE)
}
