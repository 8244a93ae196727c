//! Data models for BibTeX entries

use crate::person::{self, Person};
use std::borrow::Cow;
use std::fmt;

/// A BibTeX entry (article, book, etc.)
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    /// Entry type (article, book, inproceedings, etc.)
    pub ty: EntryType<'a>,
    /// Citation key
    pub key: Cow<'a, str>,
    /// Fields (author, title, year, etc.)
    pub fields: Vec<Field<'a>>,
}

impl<'a> Entry<'a> {
    /// Create a new entry
    #[must_use]
    pub const fn new(ty: EntryType<'a>, key: &'a str) -> Self {
        Self {
            ty,
            key: Cow::Borrowed(key),
            fields: Vec::new(),
        }
    }

    /// Add a field, builder style
    #[must_use]
    pub fn with_field(mut self, name: &'a str, value: impl Into<Value<'a>>) -> Self {
        self.add_field(Field::new(name, value.into()));
        self
    }

    /// Get the entry type
    #[must_use]
    pub const fn entry_type(&self) -> &EntryType<'a> {
        &self.ty
    }

    /// Get the citation key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn find(&self, name: &str) -> Option<&Field<'a>> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Get a field value by name (case-insensitive)
    /// Note: This only returns string literals, not numbers
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|f| f.value.as_str())
    }

    /// Get a field value as text, converting numbers and flattening
    /// concatenations. Unresolved variables yield `None`.
    #[must_use]
    pub fn get_as_string(&self, name: &str) -> Option<Cow<'_, str>> {
        self.find(name).and_then(|f| f.value.as_text())
    }

    /// The first undefined macro a field still refers to
    #[must_use]
    pub fn unresolved(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|f| f.value.unresolved())
    }

    /// Whether the entry carries the field at all
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Parse a name-list field (`author`, `editor`) into persons.
    ///
    /// Returns `None` when the field is absent or holds no names.
    #[must_use]
    pub fn persons(&self, role: &str) -> Option<Vec<Person>> {
        let names = person::parse_name_list(&self.get_as_string(role)?);
        (!names.is_empty()).then_some(names)
    }

    /// Get all fields
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Add a field
    pub fn add_field(&mut self, field: Field<'a>) {
        self.fields.push(field);
    }

    /// Required fields of this entry's type that the entry lacks, in the
    /// order the type lists them
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        self.ty
            .required_fields()
            .iter()
            .copied()
            .filter(|&field| self.get_as_string(field).is_none())
            .collect()
    }

    /// Check if entry has all required fields for its type
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing_required_fields().is_empty()
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Entry<'static> {
        Entry {
            ty: self.ty.into_owned(),
            key: Cow::Owned(self.key.into_owned()),
            fields: self.fields.into_iter().map(Field::into_owned).collect(),
        }
    }
}

/// BibTeX entry type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType<'a> {
    /// Article from a journal or magazine
    Article,
    /// Book with an explicit publisher
    Book,
    /// Part of a book having its own title
    InCollection,
    /// Article in conference proceedings
    InProceedings,
    /// Technical documentation
    Manual,
    /// Anything that fits nowhere else
    Misc,
    /// `PhD` thesis
    PhdThesis,
    /// Report published by a school or other institution
    TechReport,
    /// Document with an author and title, but not formally published
    Unpublished,
    /// Any other entry type; the style has no template for it
    Custom(Cow<'a, str>),
}

impl<'a> EntryType<'a> {
    /// Parse from string (case-insensitive)
    #[must_use]
    pub fn parse(s: &'a str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            _ => Self::Custom(Cow::Borrowed(s)),
        }
    }

    /// Fields every entry of this type must carry.
    ///
    /// `book` additionally needs an `author` or an `editor`; that
    /// either-or requirement is enforced by its template.
    #[must_use]
    pub const fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Article => &["author", "year", "title", "journal"],
            Self::Book => &["year", "title", "publisher"],
            Self::InCollection | Self::InProceedings => &["author", "year", "title", "booktitle"],
            Self::Manual => &["year", "title"],
            Self::Misc => &["year"],
            Self::PhdThesis => &["author", "year", "title", "school"],
            Self::TechReport => &["author", "year", "title", "institution"],
            Self::Unpublished => &["author", "year", "title", "note"],
            Self::Custom(_) => &[],
        }
    }

    /// Whether this is one of the standard types rather than `Custom`
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> EntryType<'static> {
        match self {
            Self::Custom(s) => EntryType::Custom(Cow::Owned(s.into_owned())),
            Self::Article => EntryType::Article,
            Self::Book => EntryType::Book,
            Self::InCollection => EntryType::InCollection,
            Self::InProceedings => EntryType::InProceedings,
            Self::Manual => EntryType::Manual,
            Self::Misc => EntryType::Misc,
            Self::PhdThesis => EntryType::PhdThesis,
            Self::TechReport => EntryType::TechReport,
            Self::Unpublished => EntryType::Unpublished,
        }
    }
}

impl fmt::Display for EntryType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Book => write!(f, "book"),
            Self::InCollection => write!(f, "incollection"),
            Self::InProceedings => write!(f, "inproceedings"),
            Self::Manual => write!(f, "manual"),
            Self::Misc => write!(f, "misc"),
            Self::PhdThesis => write!(f, "phdthesis"),
            Self::TechReport => write!(f, "techreport"),
            Self::Unpublished => write!(f, "unpublished"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A field in a BibTeX entry
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Field name
    pub name: Cow<'a, str>,
    /// Field value
    pub value: Value<'a>,
}

impl<'a> Field<'a> {
    /// Create a new field
    #[must_use]
    pub const fn new(name: &'a str, value: Value<'a>) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value,
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Field<'static> {
        Field {
            name: Cow::Owned(self.name.into_owned()),
            value: self.value.into_owned(),
        }
    }
}

/// A value in a BibTeX field
///
/// `Concat` is boxed so the enum stays the size of a `Cow<str>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String literal
    Literal(Cow<'a, str>),
    /// Number literal
    Number(i64),
    /// Concatenated values
    Concat(Box<Vec<Value<'a>>>),
    /// Variable reference
    Variable(Cow<'a, str>),
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Self::Literal(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Self::Literal(Cow::Owned(s))
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl Value<'_> {
    /// Get the value as a string (if it's a simple literal)
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as text if it contains no unresolved variables
    #[must_use]
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Literal(s) => Some(Cow::Borrowed(s.as_ref())),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Variable(_) => None,
            Self::Concat(parts) => {
                let mut out = String::new();
                for part in parts.iter() {
                    out.push_str(&part.as_text()?);
                }
                Some(Cow::Owned(out))
            }
        }
    }

    /// The first variable reference left in the value
    #[must_use]
    pub fn unresolved(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            Self::Concat(parts) => parts.iter().find_map(Value::unresolved),
            Self::Literal(_) | Self::Number(_) => None,
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::Literal(s) => Value::Literal(Cow::Owned(s.into_owned())),
            Self::Number(n) => Value::Number(n),
            Self::Variable(s) => Value::Variable(Cow::Owned(s.into_owned())),
            Self::Concat(parts) => {
                Value::Concat(Box::new(parts.into_iter().map(Value::into_owned).collect()))
            }
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Variable(name) => write!(f, "{{{name}}}"),
            Self::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " # ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}
