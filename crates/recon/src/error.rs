use std::fmt;

#[derive(Debug)]
pub enum FilterError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Spec validation error (contradictory or meaningless predicate).
    Validation(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "filter parse error: {msg}"),
            Self::Validation(msg) => write!(f, "filter validation error: {msg}"),
        }
    }
}

impl std::error::Error for FilterError {}
