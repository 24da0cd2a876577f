use std::fmt;

/// Error value returned at every public analysis boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Matrix, token list, text or label set was empty.
    EmptyInput(String),
    /// Arithmetic fault while aggregating or analyzing.
    ComputationFault(String),
    /// Task type string not recognized.
    UnsupportedTask(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyInput(msg) => write!(f, "{msg}"),
            AnalysisError::ComputationFault(msg) => write!(f, "computation fault: {msg}"),
            AnalysisError::UnsupportedTask(task) => write!(f, "unsupported task type: {task}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

pub type Result<T> = std::result::Result<T, AnalysisError>;
