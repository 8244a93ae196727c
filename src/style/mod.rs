//! The `alpha-numbered` citation style
//!
//! A [`Style`] turns [`Entry`] records into [`FormattedEntry`] values: an
//! ordered list of sentence chunks per entry, ready for a
//! [`Writer`](crate::Writer). Whole databases are formatted into a
//! [`Bibliography`], sorted and labelled `1`, `2`, ...
//!
//! ```
//! use bibstyle::{Entry, EntryType, Style};
//!
//! let entry = Entry::new(EntryType::Article, "doe2020")
//!     .with_field("author", "Jane Doe and John Smith")
//!     .with_field("title", "On the {DNA} of Things")
//!     .with_field("journal", "Nature")
//!     .with_field("volume", "5")
//!     .with_field("pages", "1--10")
//!     .with_field("year", "2020");
//!
//! let formatted = Style::default().format_entry(&entry)?;
//! assert_eq!(
//!     formatted.text().to_string(),
//!     "Doe, Jane and Smith, John. (2020). On the DNA of things. Nature, 5:1\u{2013}10."
//! );
//! # Ok::<(), bibstyle::Error>(())
//! ```

mod entries;
mod names;
mod sorting;
mod template;

pub use names::NameStyle;
pub use sorting::SortingStyle;

use crate::model::Entry;
use crate::person::Person;
use crate::richtext::Text;
use crate::{Error, Result};
use entries::{template_for, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Style selection with builder pattern.
///
/// Every style is picked by identifier here; nothing is registered
/// globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOptions {
    style: String,
    name_style: String,
    abbreviate_names: bool,
    sorting: SortingStyle,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            style: Style::NAME.to_string(),
            name_style: NameStyle::default().name().to_string(),
            abbreviate_names: false,
            sorting: SortingStyle::default(),
        }
    }
}

impl StyleOptions {
    /// Create options selecting the default style
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from JSON; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the formatting style identifier
    #[must_use]
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the name style identifier (`lastfirst` or `plain`)
    #[must_use]
    pub fn name_style(mut self, name_style: impl Into<String>) -> Self {
        self.name_style = name_style.into();
        self
    }

    /// Abbreviate given names to initials
    #[must_use]
    pub const fn abbreviate_names(mut self, abbreviate: bool) -> Self {
        self.abbreviate_names = abbreviate;
        self
    }

    /// Set the bibliography order
    #[must_use]
    pub const fn sorting(mut self, sorting: SortingStyle) -> Self {
        self.sorting = sorting;
        self
    }

    /// Resolve the identifiers into a style
    pub fn build(&self) -> Result<Style> {
        Style::from_options(self)
    }
}

/// The citation formatter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    name_style: NameStyle,
    abbreviate_names: bool,
    sorting: SortingStyle,
}

impl Style {
    /// Identifier of this formatting style
    pub const NAME: &'static str = "alpha-numbered";

    /// Create the style with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a style from options, rejecting unknown identifiers
    pub fn from_options(options: &StyleOptions) -> Result<Self> {
        Ok(Self::from_name(&options.style)?
            .with_name_style(options.name_style.parse()?)
            .with_abbreviated_names(options.abbreviate_names)
            .with_sorting(options.sorting))
    }

    /// Look a formatting style up by identifier
    pub fn from_name(name: &str) -> Result<Self> {
        if name == Self::NAME {
            Ok(Self::default())
        } else {
            Err(Error::UnknownStyle(name.to_string()))
        }
    }

    /// Use a different name style
    #[must_use]
    pub const fn with_name_style(mut self, name_style: NameStyle) -> Self {
        self.name_style = name_style;
        self
    }

    /// Abbreviate given names to initials
    #[must_use]
    pub const fn with_abbreviated_names(mut self, abbreviate: bool) -> Self {
        self.abbreviate_names = abbreviate;
        self
    }

    /// Use a different bibliography order
    #[must_use]
    pub const fn with_sorting(mut self, sorting: SortingStyle) -> Self {
        self.sorting = sorting;
        self
    }

    /// The name style in use
    #[must_use]
    pub const fn name_style(&self) -> NameStyle {
        self.name_style
    }

    /// The bibliography order in use
    #[must_use]
    pub const fn sorting(&self) -> SortingStyle {
        self.sorting
    }

    /// Format one person with this style's name settings
    #[must_use]
    pub fn format_name(&self, person: &Person) -> Text {
        self.name_style.format(person, self.abbreviate_names)
    }

    /// Format a single entry.
    ///
    /// The result is unlabelled; labels are assigned when a whole
    /// bibliography is formatted.
    pub fn format_entry(&self, entry: &Entry<'_>) -> Result<FormattedEntry> {
        let template =
            template_for(entry.entry_type()).ok_or_else(|| Error::UnsupportedEntryType {
                key: entry.key().to_string(),
                entry_type: entry.entry_type().to_string(),
            })?;

        let cx = Context::new(self, entry);
        if let Some(field) = entry.missing_required_fields().first() {
            return Err(cx.missing(field));
        }

        let blocks: Vec<Text> = template(&cx)?
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();
        debug!(
            key = entry.key(),
            entry_type = %entry.entry_type(),
            blocks = blocks.len(),
            "formatted entry"
        );

        Ok(FormattedEntry {
            key: entry.key().to_string(),
            entry_type: entry.entry_type().to_string(),
            label: String::new(),
            blocks,
        })
    }

    /// Sort the entries and format each one, labelled by position.
    ///
    /// Failures are reported per entry and do not stop the others.
    pub fn format_entries(&self, entries: &[Entry<'_>]) -> Vec<Result<FormattedEntry>> {
        let mut order: Vec<&Entry<'_>> = entries.iter().collect();
        self.sorting.sort(&mut order, |entry| *entry);

        let format = |(i, entry): (usize, &&Entry<'_>)| {
            self.format_entry(entry).map(|formatted| formatted.with_label(i + 1))
        };

        #[cfg(feature = "parallel")]
        {
            order.par_iter().enumerate().map(format).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            order.iter().enumerate().map(format).collect()
        }
    }

    /// Format a whole database, failing on the first entry that cannot be
    /// formatted
    pub fn format_bibliography(&self, entries: &[Entry<'_>]) -> Result<Bibliography> {
        let entries = self
            .format_entries(entries)
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok(Bibliography { entries })
    }

    /// Format a whole database, skipping entries that cannot be formatted.
    ///
    /// The remaining entries are relabelled so labels stay contiguous.
    #[must_use]
    pub fn format_bibliography_lenient(&self, entries: &[Entry<'_>]) -> Bibliography {
        let entries = self
            .format_entries(entries)
            .into_iter()
            .filter_map(|result| {
                result
                    .map_err(|err| warn!(error = %err, "skipping entry"))
                    .ok()
            })
            .enumerate()
            .map(|(i, formatted)| formatted.with_label(i + 1))
            .collect();
        Bibliography { entries }
    }
}

/// One formatted citation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEntry {
    /// Citation key
    pub key: String,
    /// Entry type as written in the database
    pub entry_type: String,
    /// Bibliography label, empty for an entry formatted on its own
    pub label: String,
    /// Non-empty sentence chunks in citation order
    pub blocks: Vec<Text>,
}

impl FormattedEntry {
    fn with_label(mut self, position: usize) -> Self {
        self.label = position.to_string();
        self
    }

    /// The whole citation as one text.
    ///
    /// Chunks are separated by a single space; a chunk that already ends
    /// in a space gets no extra one.
    #[must_use]
    pub fn text(&self) -> Text {
        let mut text = Text::new();
        for block in &self.blocks {
            if text.last_char().is_some_and(|c| c != ' ') {
                text.push_str(" ");
            }
            text.append(block.clone());
        }
        text.trim_end()
    }
}

/// A formatted, ordered and labelled bibliography
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    entries: Vec<FormattedEntry>,
}

impl Bibliography {
    /// All entries in bibliography order
    #[must_use]
    pub fn entries(&self) -> &[FormattedEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bibliography has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by citation key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormattedEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Iterate over the entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, FormattedEntry> {
        self.entries.iter()
    }

    /// The widest label, used to size label columns
    #[must_use]
    pub fn longest_label(&self) -> &str {
        self.entries
            .iter()
            .map(|e| e.label.as_str())
            .max_by_key(|label| label.chars().count())
            .unwrap_or("")
    }
}

impl<'b> IntoIterator for &'b Bibliography {
    type Item = &'b FormattedEntry;
    type IntoIter = std::slice::Iter<'b, FormattedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryType;
    use pretty_assertions::assert_eq;

    fn misc(key: &'static str, author: &'static str, year: &'static str) -> Entry<'static> {
        Entry::new(EntryType::Misc, key)
            .with_field("author", author)
            .with_field("year", year)
    }

    #[test]
    fn test_options_from_json() {
        let options = StyleOptions::from_json(
            r#"{"name_style": "plain", "abbreviate_names": true, "sorting": "none"}"#,
        )
        .unwrap();
        assert_eq!(
            options,
            StyleOptions::new()
                .name_style("plain")
                .abbreviate_names(true)
                .sorting(SortingStyle::Unsorted)
        );

        let style = options.build().unwrap();
        assert_eq!(style.name_style(), NameStyle::Plain);
        assert_eq!(style.sorting(), SortingStyle::Unsorted);
    }

    #[test]
    fn test_unknown_identifiers_are_rejected() {
        let err = StyleOptions::new().style("unsrt").build().unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(ref s) if s == "unsrt"));

        let err = StyleOptions::new().name_style("fancy").build().unwrap_err();
        assert!(matches!(err, Error::UnknownNameStyle(ref s) if s == "fancy"));

        let err = StyleOptions::from_json(r#"{"colour": "red"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        assert!(Style::from_name("alpha-numbered").is_ok());
    }

    #[test]
    fn test_format_entry_text() {
        let entry = misc("k", "Doe, Jane and Roe, Richard and others", "2001")
            .with_field("title", "Notes")
            .with_field("note", "Draft");
        let formatted = Style::default().format_entry(&entry).unwrap();
        assert_eq!(formatted.label, "");
        assert_eq!(
            formatted.text().to_string(),
            "Doe, Jane, Roe, Richard, and others. (2001). Notes. Draft."
        );
    }

    #[test]
    fn test_abbreviated_names() {
        let entry = misc("k", "Knuth, Donald Ervin", "1968");
        let style = Style::new().with_abbreviated_names(true);
        assert_eq!(
            style.format_entry(&entry).unwrap().text().to_string(),
            "Knuth, D.\u{a0}E. (1968)."
        );
    }

    #[test]
    fn test_unsupported_and_missing() {
        let entry = Entry::new(EntryType::parse("patent"), "p").with_field("year", "2000");
        assert!(matches!(
            Style::default().format_entry(&entry),
            Err(Error::UnsupportedEntryType { .. })
        ));

        let entry = Entry::new(EntryType::Unpublished, "u").with_field("author", "Doe, J.");
        let err = Style::default().format_entry(&entry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required field 'year' in unpublished entry 'u'"
        );
    }

    #[test]
    fn test_labels_follow_sort_order() {
        let entries = vec![
            misc("zed", "Zed, Zoe", "2001"),
            misc("abe", "Abe, Al", "2003"),
            misc("abe-old", "Abe, Al", "1999"),
        ];
        let bib = Style::default().format_bibliography(&entries).unwrap();
        let order: Vec<(&str, &str)> = bib
            .iter()
            .map(|e| (e.key.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(order, [("abe-old", "1"), ("abe", "2"), ("zed", "3")]);

        let bib = Style::default()
            .with_sorting(SortingStyle::Unsorted)
            .format_bibliography(&entries)
            .unwrap();
        assert_eq!(bib.entries()[0].key, "zed");
        assert_eq!(bib.get("abe").map(|e| e.label.as_str()), Some("2"));
    }

    #[test]
    fn test_lenient_bibliography_relabels() {
        let entries = vec![
            misc("a", "Abe, Al", "2000"),
            Entry::new(EntryType::Article, "b").with_field("author", "Bo, Bea"),
            misc("c", "Cy, Cal", "2000"),
        ];
        assert!(Style::default().format_bibliography(&entries).is_err());
        assert_eq!(Style::default().format_entries(&entries).len(), 3);

        let bib = Style::default().format_bibliography_lenient(&entries);
        assert_eq!(bib.len(), 2);
        assert_eq!(bib.entries()[1].key, "c");
        assert_eq!(bib.entries()[1].label, "2");
        assert_eq!(bib.longest_label(), "2");
    }

    #[test]
    fn test_style_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Style>();
        assert_sync::<Bibliography>();
    }
}
