use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    OutOfRange { index: usize, length: usize },
    InvalidRange { start: usize, len: usize, length: usize },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::OutOfRange { index, length } => {
                write!(f, "index {} out of range for sequence of length {}", index, length)
            }
            SequenceError::InvalidRange { start, len, length } => {
                write!(
                    f,
                    "window {}+{} out of range for sequence of length {}",
                    start, len, length
                )
            }
        }
    }
}

impl std::error::Error for SequenceError {}
