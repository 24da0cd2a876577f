use serde::Serialize;

use crate::constants::{SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH};
use crate::error::{AnalysisError, Result};
use crate::tokenizer::{split_sentences, word_count};

pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";

#[derive(Clone, Debug, Serialize)]
pub struct SummaryOutput {
    pub task: &'static str,
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
    pub compression_ratio: f64,
    pub model_used: String,
}

/// Word-count bounds for a summary.
#[derive(Clone, Copy, Debug)]
pub struct SummaryBounds {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            max_length: SUMMARY_MAX_LENGTH,
            min_length: SUMMARY_MIN_LENGTH,
        }
    }
}

/// Extractive summary: first and last sentence, widened with the middle
/// sentence when too short, truncated with "..." when too long.
pub fn summarize_text(
    text: &str,
    model_name: Option<&str>,
    bounds: SummaryBounds,
) -> Result<SummaryOutput> {
    let original_length = word_count(text);
    if original_length == 0 {
        return Err(AnalysisError::EmptyInput(
            "Text summarization failed: no words to summarize".to_string(),
        ));
    }

    let sentences = split_sentences(text);
    let mut summary = if sentences.len() <= 2 {
        text.to_string()
    } else {
        let mut s = format!("{}. {}", sentences[0], sentences[sentences.len() - 1]);
        if !s.ends_with('.') {
            s.push('.');
        }
        s
    };

    let words: Vec<&str> = summary.split_whitespace().collect();
    if words.len() > bounds.max_length {
        summary = format!("{}...", words[..bounds.max_length].join(" "));
    } else if words.len() < bounds.min_length && sentences.len() > 2 {
        summary = format!(
            "{}. {}. {}",
            sentences[0],
            sentences[sentences.len() / 2],
            sentences[sentences.len() - 1]
        );
    }

    let summary_length = word_count(&summary);
    Ok(SummaryOutput {
        task: "text_summarization",
        compression_ratio: summary_length as f64 / original_length as f64,
        summary,
        original_length,
        summary_length,
        model_used: model_name
            .unwrap_or(DEFAULT_SUMMARIZATION_MODEL)
            .to_string(),
    })
}
