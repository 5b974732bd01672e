use std::fmt;

use mf_energy::SequenceError;

#[derive(Debug)]
pub enum FoldError {
    /// The input contained symbols outside the accepted alphabet.
    Sequence(SequenceError),
    /// The input exceeds the configured length bound.
    Capacity { length: usize, max_length: usize },
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::Sequence(e) => write!(f, "{}", e),
            FoldError::Capacity { length, max_length } => {
                write!(f, "Sequence length {} exceeds the configured bound of {}", length, max_length)
            }
        }
    }
}

impl std::error::Error for FoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FoldError::Sequence(e) => Some(e),
            FoldError::Capacity { .. } => None,
        }
    }
}

impl From<SequenceError> for FoldError {
    fn from(e: SequenceError) -> Self {
        FoldError::Sequence(e)
    }
}
