use serde::Serialize;

use crate::constants::MAX_CONFIDENCE;
use crate::tokenizer::{char_offset, split_sentences};

pub const DEFAULT_QA_MODEL: &str = "distilbert-base-cased-distilled-squad";

#[derive(Clone, Debug, Serialize)]
pub struct AnswerOutput {
    pub task: &'static str,
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    /// Character offset of the answer sentence in the context.
    pub start_position: usize,
    pub end_position: usize,
    pub model_used: String,
}

/// Pick the context sentence containing the most question words.
///
/// Question words are lowercased and longer than two characters; a word
/// counts when it occurs anywhere in the lowercased sentence. Earlier
/// sentences win ties. With no overlap the first sentence is returned.
pub fn answer_question(question: &str, context: &str, model_name: Option<&str>) -> AnswerOutput {
    let question_words: Vec<String> = question
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect();

    let sentences = split_sentences(context);
    let mut best: Option<&str> = None;
    let mut best_score = 0usize;
    for &sentence in &sentences {
        let lower = sentence.to_lowercase();
        let score = question_words
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .count();
        if score > best_score {
            best_score = score;
            best = Some(sentence);
        }
    }

    let (answer, start_position, end_position) = match best {
        Some(sentence) => {
            let start = context.find(sentence).map_or(0, |b| char_offset(context, b));
            (
                sentence.trim().to_string(),
                start,
                start + sentence.chars().count(),
            )
        }
        None => {
            let first = sentences.first().copied().unwrap_or_default().to_string();
            let len = first.chars().count();
            (first, 0, len)
        }
    };

    AnswerOutput {
        task: "question_answering",
        question: question.to_string(),
        answer,
        confidence: (0.3 + best_score as f64 * 0.1).min(MAX_CONFIDENCE),
        start_position,
        end_position,
        model_used: model_name.unwrap_or(DEFAULT_QA_MODEL).to_string(),
    }
}
