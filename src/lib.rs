//! # bibstyle
//!
//! BibTeX bibliography formatting with an alpha-family citation style.
//!
//! ## Features
//!
//! - Zero-copy BibTeX parsing with `@string` macro expansion
//! - Error messages with source locations
//! - LaTeX-aware rich text: emphasis, brace-protected runs, accents
//! - "Last, First" and plain name styles, optional abbreviation
//! - Per-entry-type templates for the standard entry kinds
//! - Text, HTML, Markdown and LaTeX output
//!
//! ## Example
//!
//! ```
//! use bibstyle::{OutputFormat, StyleOptions};
//!
//! let input = r#"
//!     @article{einstein1905,
//!         author = "Albert Einstein",
//!         title = "On the Electrodynamics of Moving Bodies",
//!         journal = "Annalen der Physik",
//!         volume = 17,
//!         pages = "891--921",
//!         year = 1905
//!     }
//! "#;
//!
//! let text = bibstyle::render_bibliography(input, &StyleOptions::default(), OutputFormat::Text)?;
//! assert_eq!(
//!     text,
//!     "[1] Einstein, Albert. (1905). On the electrodynamics of moving bodies. \
//!      Annalen der Physik, 17:891\u{2013}921.\n"
//! );
//! # Ok::<(), bibstyle::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs,
    missing_debug_implementations
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod latex;
pub mod model;
pub mod parser;
pub mod person;
pub mod richtext;
pub mod style;

mod database;
mod writer;

pub use database::Database;
pub use error::{Error, Result};
pub use model::{Entry, EntryType, Field, Value};
pub use person::Person;
pub use richtext::{Segment, Text};
pub use style::{Bibliography, FormattedEntry, NameStyle, SortingStyle, Style, StyleOptions};
pub use writer::{to_file, to_string, OutputFormat, Writer, WriterConfig};

/// Re-export of the commonly used types
pub mod prelude {
    pub use crate::{
        Bibliography, Database, Entry, EntryType, Error, FormattedEntry, OutputFormat, Result,
        Style, StyleOptions, Text, Value,
    };
}

/// Parse a BibTeX database from a string
pub fn parse(input: &str) -> Result<Database> {
    Database::parse(input)
}

/// Parse a BibTeX database from a file
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Database<'static>> {
    let content = std::fs::read_to_string(path)?;
    parse(&content).map(database::Database::into_owned)
}

/// Parse `input`, format every entry and render the bibliography.
///
/// Fails on the first entry that cannot be formatted; use
/// [`Style::format_bibliography_lenient`] to skip such entries instead.
pub fn render_bibliography(
    input: &str,
    options: &StyleOptions,
    format: OutputFormat,
) -> Result<String> {
    let style = Style::from_options(options)?;
    let db = Database::parse(input)?;
    let bibliography = style.format_bibliography(db.entries())?;
    to_string(&bibliography, format)
}
