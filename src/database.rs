//! BibTeX database representation

use crate::parser::{self, ParsedItem};
use crate::{Entry, Result, Value};
use ahash::{AHashMap, AHashSet};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Month macros every BibTeX style predefines
const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// A parsed BibTeX database with all macros expanded
#[derive(Debug, Clone, Default)]
pub struct Database<'a> {
    /// Bibliography entries
    entries: Vec<Entry<'a>>,
    /// String definitions, keyed by lowercased name
    strings: AHashMap<Cow<'a, str>, Value<'a>>,
    /// Preambles
    preambles: Vec<Value<'a>>,
    /// Comments
    comments: Vec<Cow<'a, str>>,
}

impl<'a> Database<'a> {
    /// Create a new empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a BibTeX database from a string.
    ///
    /// `@string` macros (and the predefined month names) are expanded and
    /// `#` concatenations flattened, so every field of every entry ends up a
    /// plain literal or number. A reference to an undefined macro is left in
    /// place; formatting the entry that holds it reports the macro.
    pub fn parse(input: &'a str) -> Result<Self> {
        let items = parser::parse_bibtex(input)?;
        let mut db = Self::new();

        for item in items {
            match item {
                ParsedItem::Entry(mut entry) => {
                    for field in &mut entry.fields {
                        let value = std::mem::take(&mut field.value);
                        field.value = db.expand(value);
                    }
                    entry.fields.shrink_to_fit();
                    db.entries.push(entry);
                }
                // Macros only see definitions that precede them.
                ParsedItem::String(name, value) => {
                    let value = db.expand(value);
                    db.strings.insert(macro_name(name), value);
                }
                ParsedItem::Preamble(value) => {
                    let value = db.expand(value);
                    db.preambles.push(value);
                }
                ParsedItem::Comment(text) => db.comments.push(Cow::Borrowed(text)),
            }
        }

        debug!(
            entries = db.entries.len(),
            strings = db.strings.len(),
            preambles = db.preambles.len(),
            "parsed bibliography database"
        );

        Ok(db)
    }

    /// Get all entries
    #[must_use]
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Get all string definitions
    #[must_use]
    pub const fn strings(&self) -> &AHashMap<Cow<'a, str>, Value<'a>> {
        &self.strings
    }

    /// Get all preambles
    #[must_use]
    pub fn preambles(&self) -> &[Value<'a>] {
        &self.preambles
    }

    /// Get all comments
    #[must_use]
    pub fn comments(&self) -> &[Cow<'a, str>] {
        &self.comments
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: Entry<'a>) {
        self.entries.push(entry);
    }

    /// Find an entry by citation key
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&Entry<'a>> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Find entries by type name (case-insensitive)
    #[must_use]
    pub fn find_by_type(&self, ty: &str) -> Vec<&Entry<'a>> {
        self.entries
            .iter()
            .filter(|e| e.ty.to_string().eq_ignore_ascii_case(ty))
            .collect()
    }

    /// Resolve macro references and flatten concatenations
    fn expand(&self, value: Value<'a>) -> Value<'a> {
        self.expand_with(value, &mut AHashSet::new())
    }

    fn expand_with(&self, value: Value<'a>, active: &mut AHashSet<String>) -> Value<'a> {
        match value {
            // literals stay borrowed from the input
            Value::Literal(_) | Value::Number(_) => value,
            Value::Variable(name) => self.resolve(name, active),
            Value::Concat(parts) => {
                let parts: Vec<_> = parts
                    .into_iter()
                    .map(|part| self.expand_with(part, active))
                    .collect();
                // An undefined macro keeps the concatenation unflattened.
                if parts.iter().any(|part| part.unresolved().is_some()) {
                    return Value::Concat(Box::new(parts));
                }

                let mut combined = String::new();
                for part in &parts {
                    match part {
                        Value::Literal(s) => combined.push_str(s),
                        Value::Number(n) => combined.push_str(&n.to_string()),
                        Value::Variable(_) | Value::Concat(_) => {}
                    }
                }
                Value::Literal(Cow::Owned(combined))
            }
        }
    }

    /// Look a macro up. Undefined and self-referencing names stay as
    /// references so only the entries using them fail to format.
    fn resolve(&self, name: Cow<'a, str>, active: &mut AHashSet<String>) -> Value<'a> {
        let key = name.to_ascii_lowercase();
        if let Some(value) = self.strings.get(key.as_str()) {
            if !active.insert(key.clone()) {
                warn!(name = %name, "circular string macro");
                return Value::Variable(name);
            }
            let expanded = self.expand_with(value.clone(), active);
            active.remove(&key);
            return expanded;
        }

        if let Some(&(_, month)) = MONTHS.iter().find(|(abbr, _)| *abbr == key) {
            return Value::Literal(Cow::Borrowed(month));
        }

        warn!(name = %name, "undefined string macro");
        Value::Variable(name)
    }

    /// Convert to owned version (no borrowed data)
    #[must_use]
    pub fn into_owned(self) -> Database<'static> {
        Database {
            entries: self.entries.into_iter().map(Entry::into_owned).collect(),
            strings: self
                .strings
                .into_iter()
                .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
                .collect(),
            preambles: self.preambles.into_iter().map(Value::into_owned).collect(),
            comments: self
                .comments
                .into_iter()
                .map(|c| Cow::Owned(c.into_owned()))
                .collect(),
        }
    }
}

fn macro_name(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}
