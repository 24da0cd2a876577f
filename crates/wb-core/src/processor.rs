//! Task routing: one entry point over every mock analysis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attention::{AttentionMatrix, generate_attention};
use crate::classify::{ClassificationOutput, DEFAULT_CLASSIFICATION_MODEL, classify_text};
use crate::error::{AnalysisError, Result};
use crate::ner::{DEFAULT_NER_MODEL, NerOutput, recognize_entities};
use crate::qa::{AnswerOutput, DEFAULT_QA_MODEL, answer_question};
use crate::scores::ScoreSource;
use crate::sentiment::{DEFAULT_SENTIMENT_MODEL, SentimentOutput, analyze_sentiment};
use crate::summarize::{DEFAULT_SUMMARIZATION_MODEL, SummaryBounds, SummaryOutput, summarize_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Sentiment,
    Classification,
    Ner,
    Summarization,
    Qa,
    Attention,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Sentiment,
        TaskType::Classification,
        TaskType::Ner,
        TaskType::Summarization,
        TaskType::Qa,
        TaskType::Attention,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Sentiment => "sentiment",
            TaskType::Classification => "classification",
            TaskType::Ner => "ner",
            TaskType::Summarization => "summarization",
            TaskType::Qa => "qa",
            TaskType::Attention => "attention",
        }
    }

    /// Whether results of this task carry attention weights worth visualizing.
    pub fn has_attention(self) -> bool {
        matches!(self, TaskType::Sentiment | TaskType::Attention)
    }

    /// Tasks eligible for side-by-side model comparison.
    pub fn comparable(self) -> bool {
        matches!(
            self,
            TaskType::Sentiment | TaskType::Classification | TaskType::Ner
        )
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AnalysisError::UnsupportedTask(s.to_string()))
    }
}

/// Request-scoped inputs for a single analysis.
#[derive(Clone, Debug, Default)]
pub struct TaskInput {
    /// Analyzed text; the question for QA.
    pub text: String,
    pub model_name: Option<String>,
    /// QA context passage.
    pub context: String,
    /// Classification labels; defaults apply when `None`.
    pub labels: Option<Vec<String>>,
}

impl TaskInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AttentionOutput {
    pub task: &'static str,
    pub text: String,
    pub attention_weights: AttentionMatrix,
    pub model_used: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Sentiment(SentimentOutput),
    Classification(ClassificationOutput),
    Ner(NerOutput),
    Summarization(SummaryOutput),
    Qa(AnswerOutput),
    Attention(AttentionOutput),
}

impl TaskOutput {
    pub fn attention_weights(&self) -> Option<&AttentionMatrix> {
        match self {
            TaskOutput::Sentiment(o) => Some(&o.attention_weights),
            TaskOutput::Attention(o) => Some(&o.attention_weights),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| AnalysisError::ComputationFault(format!("failed to serialize results: {e}")))
    }
}

/// Default model per task plus the analysis dispatch.
#[derive(Clone, Debug)]
pub struct NlpProcessor {
    attention_model: String,
    summary_bounds: SummaryBounds,
}

impl Default for NlpProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl NlpProcessor {
    pub fn new() -> Self {
        Self {
            attention_model: "bert-base-uncased".to_string(),
            summary_bounds: SummaryBounds::default(),
        }
    }

    pub fn with_summary_bounds(mut self, bounds: SummaryBounds) -> Self {
        self.summary_bounds = bounds;
        self
    }

    pub fn default_model(&self, task: TaskType) -> &str {
        match task {
            TaskType::Sentiment => DEFAULT_SENTIMENT_MODEL,
            TaskType::Classification => DEFAULT_CLASSIFICATION_MODEL,
            TaskType::Ner => DEFAULT_NER_MODEL,
            TaskType::Summarization => DEFAULT_SUMMARIZATION_MODEL,
            TaskType::Qa => DEFAULT_QA_MODEL,
            TaskType::Attention => &self.attention_model,
        }
    }

    /// "task: model" lines for every task with a default model.
    pub fn loaded_models(&self) -> Vec<String> {
        TaskType::ALL
            .into_iter()
            .filter(|t| *t != TaskType::Attention)
            .map(|t| format!("{t}: {}", self.default_model(t)))
            .collect()
    }

    pub fn run<S: ScoreSource + ?Sized>(
        &self,
        task: TaskType,
        input: &TaskInput,
        source: &mut S,
    ) -> Result<TaskOutput> {
        let model = input.model_name.as_deref();
        let output = match task {
            TaskType::Sentiment => {
                TaskOutput::Sentiment(analyze_sentiment(&input.text, model, source))
            }
            TaskType::Classification => TaskOutput::Classification(classify_text(
                &input.text,
                model,
                input.labels.as_deref(),
                source,
            )?),
            TaskType::Ner => TaskOutput::Ner(recognize_entities(&input.text, model, source)),
            TaskType::Summarization => TaskOutput::Summarization(summarize_text(
                &input.text,
                model,
                self.summary_bounds,
            )?),
            TaskType::Qa => TaskOutput::Qa(answer_question(&input.text, &input.context, model)),
            TaskType::Attention => TaskOutput::Attention(AttentionOutput {
                task: "attention_analysis",
                text: input.text.clone(),
                attention_weights: generate_attention(&input.text, source),
                model_used: model.unwrap_or(&self.attention_model).to_string(),
            }),
        };
        Ok(output)
    }
}
