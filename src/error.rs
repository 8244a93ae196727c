//! Error types for the bibstyle crate

use std::fmt;
use thiserror::Error;

/// Result type for bibstyle operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bibstyle
#[derive(Error, Debug)]
pub enum Error {
    /// Parse error with location information
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
        /// Error message
        message: String,
        /// Optional source snippet
        snippet: Option<String>,
    },

    /// A field refers to a `@string` macro that is never defined
    #[error("Undefined string variable '{name}' in field '{field}' of entry '{key}'")]
    UndefinedVariable {
        /// Citation key of the offending entry
        key: String,
        /// The field holding the reference
        field: String,
        /// The macro name as written
        name: String,
    },

    /// A field the entry's template cannot do without is absent
    #[error("Missing required field '{field}' in {entry_type} entry '{key}'")]
    MissingRequiredField {
        /// Citation key of the offending entry
        key: String,
        /// The entry type
        entry_type: String,
        /// The missing field
        field: String,
    },

    /// The style has no template for this entry type
    #[error("Unsupported entry type '{entry_type}' for entry '{key}'")]
    UnsupportedEntryType {
        /// Citation key of the offending entry
        key: String,
        /// The entry type as written in the database
        entry_type: String,
    },

    /// No formatting style is known under this identifier
    #[error("Unknown formatting style '{0}'")]
    UnknownStyle(String),

    /// No name style is known under this identifier
    #[error("Unknown name style '{0}'")]
    UnknownNameStyle(String),

    /// No output format is known under this identifier
    #[error("Unknown output format '{0}'")]
    UnknownOutputFormat(String),

    /// Style options could not be read
    #[error("Invalid style options: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether this error only reports an absent field, or one whose
    /// macro never got defined.
    ///
    /// Optional template parts swallow exactly this kind of error.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. } | Self::UndefinedVariable { .. }
        )
    }
}

/// Location information for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    /// Compute the location of a byte offset within `input`
    #[must_use]
    pub fn of_offset(input: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;

        for ch in input[..offset.min(input.len())].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
