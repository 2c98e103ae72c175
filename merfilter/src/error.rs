use std::fmt;
use std::io;

#[derive(Debug)]
pub enum FilterError {
    /// A mer's length does not match the table's frozen mer length.
    MerLength { expected: usize, found: usize },
    /// Two tables with different lower-level thresholds cannot merge.
    LowerLevel { left: u32, right: u32 },
    /// The per-phase worker pool could not be built.
    WorkerPool(String),
    /// Quarantine side channel failed; the shard data could not be preserved.
    Io(io::Error),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::MerLength { expected, found } => {
                write!(f, "mer length {} does not match table length {}", found, expected)
            }
            FilterError::LowerLevel { left, right } => {
                write!(f, "lower level mismatch between tables: {} vs {}", left, right)
            }
            FilterError::WorkerPool(why) => write!(f, "worker pool: {}", why),
            FilterError::Io(why) => write!(f, "quarantine io: {}", why),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Io(why) => Some(why),
            _ => None,
        }
    }
}

impl From<io::Error> for FilterError {
    fn from(why: io::Error) -> Self {
        FilterError::Io(why)
    }
}
