//! Mock NLP analyses and attention-matrix math.
//!
//! Sentiment, classification, NER, summarization and QA are keyword and
//! pattern heuristics; attention weights are random with a fixed
//! self > adjacent > distant bias. The attention pipeline is
//! generate → build_heatmap → analyze_patterns, each a pure function.
//!
//! Zero I/O: persistence and transport live in other crates.

pub mod attention;
pub mod classify;
pub mod constants;
pub mod error;
pub mod heatmap;
pub mod ner;
pub mod patterns;
pub mod processor;
pub mod qa;
pub mod scores;
pub mod sentiment;
pub mod summarize;
pub mod tokenizer;

pub use attention::{AttentionMatrix, generate_attention};
pub use classify::{ClassificationOutput, classify_text};
pub use constants::{ENTROPY_EPSILON, MAX_ATTENTION_TOKENS, TOP_K};
pub use error::{AnalysisError, Result};
pub use heatmap::{Heatmap, TokenImportance, build_heatmap, reconcile};
pub use ner::{EntityType, NerOutput, recognize_entities};
pub use patterns::{AttentionDiversity, PatternAnalysis, analyze_patterns, row_entropy};
pub use processor::{NlpProcessor, TaskInput, TaskOutput, TaskType};
pub use qa::{AnswerOutput, answer_question};
pub use scores::{ScoreSource, SequenceSource};
pub use sentiment::{SentimentOutput, analyze_sentiment};
pub use summarize::{SummaryBounds, SummaryOutput, summarize_text};
pub use tokenizer::tokenize;
