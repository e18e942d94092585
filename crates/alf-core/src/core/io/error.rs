use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("Inconsistent record shape: {0}")]
    Shape(String),

    #[error("File contains no lines")]
    Empty,

    #[error("Failed to read '{path}': {source}", path = path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<ObservableError>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Invalid float value '{value}'")]
    InvalidFloat { value: String },

    #[error("Expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Expected exactly {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}
