use std::fmt;

#[derive(Debug)]
pub enum ReadError {
    /// The byte stream could not be parsed as a supported tabular format.
    /// Hard stop: no partial record set is ever returned for a file.
    FileRead(String),
    /// A required sheet name is absent. Recoverable — callers fall back to
    /// the first sheet and record a warning.
    SheetNotFound { name: String },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileRead(msg) => write!(f, "cannot read file: {msg}"),
            Self::SheetNotFound { name } => write!(f, "sheet '{name}' not found"),
        }
    }
}

impl std::error::Error for ReadError {}
