//! Bibliography ordering

use crate::latex;
use crate::model::{Entry, EntryType};
use crate::person::Person;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Order in which entries appear in a bibliography
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingStyle {
    /// By author (editor for books), then year, then title
    #[default]
    AuthorYearTitle,
    /// Keep database order
    #[serde(rename = "none")]
    Unsorted,
}

impl SortingStyle {
    /// Identifier the sorting style is selected by
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AuthorYearTitle => "author_year_title",
            Self::Unsorted => "none",
        }
    }

    /// Stable sort of `items` by the entry each one refers to
    pub(crate) fn sort<'e, T>(self, items: &mut [T], entry: impl Fn(&T) -> &Entry<'e>) {
        match self {
            Self::AuthorYearTitle => items.sort_by_cached_key(|item| sort_key(entry(item))),
            Self::Unsorted => {}
        }
    }
}

impl FromStr for SortingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "author_year_title" => Ok(Self::AuthorYearTitle),
            "none" => Ok(Self::Unsorted),
            other => Err(Error::UnknownStyle(other.to_string())),
        }
    }
}

/// `(authors, year, title)`, all normalised for comparison
pub(crate) fn sort_key(entry: &Entry<'_>) -> (String, String, String) {
    let persons = match entry.entry_type() {
        EntryType::Book => entry.persons("author").or_else(|| entry.persons("editor")),
        _ => entry.persons("author"),
    };
    let authors = persons.map_or_else(String::new, |persons| persons_key(&persons));
    let field = |name: &str| {
        entry
            .get_as_string(name)
            .map_or_else(String::new, |value| normalize(&latex::to_plain(&value)))
    };

    (authors, field("year"), field("title"))
}

fn persons_key(persons: &[Person]) -> String {
    persons
        .iter()
        .map(person_key)
        .collect::<Vec<_>>()
        .join("   ")
}

fn person_key(person: &Person) -> String {
    let words = |names: Vec<&String>| {
        names
            .into_iter()
            .map(|name| latex::to_plain(name))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let key = [
        words(person.prelast_names.iter().chain(&person.last_names).collect()),
        words(person.first_names.iter().chain(&person.middle_names).collect()),
        words(person.lineage_names.iter().collect()),
    ]
    .join("  ");
    normalize(&key)
}

/// Lowercase and strip diacritics
fn normalize(s: &str) -> String {
    s.nfkd()
        .filter(|&c| !is_combining_mark(c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ty: EntryType<'static>, key: &'static str, author: &'static str) -> Entry<'static> {
        Entry::new(ty, key)
            .with_field("author", author)
            .with_field("year", "2000")
    }

    #[test]
    fn test_person_key_ignores_accents_and_case() {
        let key = sort_key(&entry(EntryType::Misc, "a", "{\\\"O}zt{\\\"u}rk, Ay{\\c{s}}e"));
        assert_eq!(key.0, "ozturk  ayse  ");
        assert_eq!(key.1, "2000");
    }

    #[test]
    fn test_books_fall_back_to_editors() {
        let book = Entry::new(EntryType::Book, "b").with_field("editor", "Roe, Richard");
        assert_eq!(sort_key(&book).0, "roe  richard  ");

        let misc = Entry::new(EntryType::Misc, "m").with_field("editor", "Roe, Richard");
        assert_eq!(sort_key(&misc).0, "");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut entries = vec![
            entry(EntryType::Misc, "z1", "Zed, Z."),
            entry(EntryType::Misc, "a", "Alpha, A."),
            entry(EntryType::Misc, "z2", "Zed, Z."),
        ];
        SortingStyle::AuthorYearTitle.sort(&mut entries, |e| e);
        let keys: Vec<_> = entries.iter().map(Entry::key).collect();
        assert_eq!(keys, ["a", "z1", "z2"]);

        SortingStyle::Unsorted.sort(&mut entries, |e| e);
        let keys: Vec<_> = entries.iter().map(Entry::key).collect();
        assert_eq!(keys, ["a", "z1", "z2"]);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!("none".parse::<SortingStyle>().unwrap(), SortingStyle::Unsorted);
        assert_eq!(SortingStyle::default().name(), "author_year_title");
        assert!("year".parse::<SortingStyle>().is_err());
    }
}
