/// Generator token cap; longer inputs keep only their first tokens.
pub const MAX_ATTENTION_TOKENS: usize = 20;

/// Self-attention (diagonal) draw range.
pub const SELF_ATTENTION_RANGE: (f64, f64) = (0.3, 0.8);

/// Adjacent-token (|i - j| = 1) draw range.
pub const ADJACENT_ATTENTION_RANGE: (f64, f64) = (0.2, 0.5);

/// Draw range for every other cell.
pub const DISTANT_ATTENTION_RANGE: (f64, f64) = (0.05, 0.3);

/// Added inside each log argument of the row entropy.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// Entries reported per pattern ranking.
pub const TOP_K: usize = 3;

/// Summary word ceiling.
pub const SUMMARY_MAX_LENGTH: usize = 150;

/// Summary word floor before the middle sentence is pulled in.
pub const SUMMARY_MIN_LENGTH: usize = 30;

/// Confidence ceiling shared by sentiment and QA heuristics.
pub const MAX_CONFIDENCE: f64 = 0.9;
