use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
    InvalidTimestamp {
        unix_millis: i64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier {
                kind,
                value,
                reason,
            } => write!(f, "invalid {kind} {value:?}: {reason}"),
            Self::InvalidTimestamp { unix_millis } => {
                write!(f, "invalid timestamp: {unix_millis} ms is out of range")
            }
        }
    }
}

impl std::error::Error for Error {}
