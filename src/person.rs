//! Person names as written in BibTeX `author` and `editor` fields
//!
//! A name list is split on the word `and` at brace depth zero. Each name is
//! then read in one of the three BibTeX forms:
//!
//! - `First von Last`
//! - `von Last, First`
//! - `von Last, Jr, First`
//!
//! The `von` part is the run of words whose first letter at brace depth
//! zero is lowercase. Name tokens keep their LaTeX markup; decoding happens
//! when a name is formatted.

use std::fmt;

/// The literal name that stands for "and others" in a name list
pub const OTHERS: &str = "others";

/// A parsed person name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    /// First given name
    pub first_names: Vec<String>,
    /// Further given names
    pub middle_names: Vec<String>,
    /// Particles such as `van`, `de la`
    pub prelast_names: Vec<String>,
    /// Family names
    pub last_names: Vec<String>,
    /// Suffixes such as `Jr.` or `III`
    pub lineage_names: Vec<String>,
}

impl Person {
    /// Parse a single BibTeX name
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let rest: String;
        let mut person = Self::default();
        let mut parts = split_commas(name);

        // More than two commas: everything after the second belongs to the
        // given names.
        if parts.len() > 3 {
            rest = parts[2..].join(" ");
            parts.truncate(2);
            parts.push(&rest);
        }

        match parts.as_slice() {
            [von_last, jr, first] => {
                person.set_von_last(split_words(von_last));
                person.lineage_names = owned(split_words(jr));
                person.set_first_middle(split_words(first));
            }
            [von_last, first] => {
                person.set_von_last(split_words(von_last));
                person.set_first_middle(split_words(first));
            }
            _ => {
                let words = split_words(name);
                let split = words
                    .iter()
                    .position(|w| is_von_word(w))
                    .unwrap_or(words.len());
                let mut first_middle = words[..split].to_vec();
                let mut von_last = words[split..].to_vec();
                if von_last.is_empty() {
                    if let Some(last) = first_middle.pop() {
                        von_last.push(last);
                    }
                }
                person.set_first_middle(first_middle);
                person.set_von_last(von_last);
            }
        }

        person
    }

    /// The `others` sentinel person
    #[must_use]
    pub fn others() -> Self {
        Self {
            last_names: vec![OTHERS.to_string()],
            ..Self::default()
        }
    }

    /// Whether this person is the `others` sentinel
    #[must_use]
    pub fn is_others(&self) -> bool {
        self.last_names.first().map(String::as_str) == Some(OTHERS)
    }

    /// First and middle names, in order
    pub fn given_names(&self) -> impl Iterator<Item = &str> {
        self.first_names
            .iter()
            .chain(&self.middle_names)
            .map(String::as_str)
    }

    fn set_first_middle(&mut self, words: Vec<&str>) {
        let mut words = words.into_iter();
        if let Some(first) = words.next() {
            self.first_names.push(first.to_string());
        }
        self.middle_names.extend(words.map(str::to_string));
    }

    fn set_von_last(&mut self, words: Vec<&str>) {
        // The von part ends after its last lowercase word.
        let split = words
            .iter()
            .rposition(|w| is_von_word(w))
            .map_or(0, |pos| pos + 1);
        let mut von = words[..split].to_vec();
        let mut last = words[split..].to_vec();
        if last.is_empty() {
            if let Some(word) = von.pop() {
                last.push(word);
            }
        }
        self.prelast_names = owned(von);
        self.last_names = owned(last);
    }
}

impl fmt::Display for Person {
    /// Writes the name back in `von Last, Jr, First Middle` form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let von_last: Vec<&str> = self
            .prelast_names
            .iter()
            .chain(&self.last_names)
            .map(String::as_str)
            .collect();
        write!(f, "{}", von_last.join(" "))?;
        if !self.lineage_names.is_empty() {
            write!(f, ", {}", self.lineage_names.join(" "))?;
        }
        let given: Vec<&str> = self.given_names().collect();
        if !given.is_empty() {
            write!(f, ", {}", given.join(" "))?;
        }
        Ok(())
    }
}

/// Parse an `and`-separated name list
#[must_use]
pub fn parse_name_list(names: &str) -> Vec<Person> {
    let mut persons = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in split_words(names) {
        if word.eq_ignore_ascii_case("and") {
            push_name(&mut persons, &current);
            current.clear();
        } else {
            current.push(word);
        }
    }
    push_name(&mut persons, &current);

    persons
}

fn push_name(persons: &mut Vec<Person>, words: &[&str]) {
    if words.is_empty() {
        return;
    }
    let name = words.join(" ");
    if name == OTHERS {
        persons.push(Person::others());
    } else {
        persons.push(Person::parse(&name));
    }
}

/// Abbreviate a given-name token to its initial(s).
///
/// Hyphenated names keep one initial per piece (`Jean-Paul` → `J.-P.`), and
/// a leading brace group such as `{\'E}mile` is kept whole (`{\'E}.`).
#[must_use]
pub fn abbreviate(token: &str) -> String {
    split_at_depth0(token, |c| c == '-')
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let initial = if piece.starts_with('{') {
                leading_group(piece)
            } else {
                let end = piece.chars().next().map_or(0, char::len_utf8);
                &piece[..end]
            };
            format!("{initial}.")
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// The balanced `{...}` group at the start of `s`, or all of `s` when the
/// braces never close
fn leading_group(s: &str) -> &str {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &s[..=i];
                }
            }
            _ => {}
        }
    }
    s
}

/// A word belongs to the von part when its first letter at brace depth zero
/// is lowercase. A brace group opened by a control sequence (`{\'e}`) counts
/// as a letter of its own.
fn is_von_word(word: &str) -> bool {
    let mut depth = 0usize;
    let mut chars = word.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if depth == 0 && chars.peek() == Some(&'\\') => {
                chars.next();
                let mut command = String::new();
                while let Some(&next) = chars.peek() {
                    if !next.is_alphabetic() {
                        break;
                    }
                    command.push(next);
                    chars.next();
                }
                if command.is_empty() {
                    // control symbol such as \'
                    chars.next();
                }
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                    if inner.is_alphabetic() {
                        return inner.is_lowercase();
                    }
                }
                return command.chars().next().is_some_and(char::is_lowercase);
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && c.is_alphabetic() => return c.is_lowercase(),
            _ => {}
        }
    }

    false
}

fn owned(words: Vec<&str>) -> Vec<String> {
    words.into_iter().map(str::to_string).collect()
}

/// Split on whitespace and ties (`~`) outside braces
fn split_words(s: &str) -> Vec<&str> {
    split_at_depth0(s, |c| c.is_whitespace() || c == '~')
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect()
}

/// Split on commas outside braces, trimming each part
fn split_commas(s: &str) -> Vec<&str> {
    split_at_depth0(s, |c| c == ',')
        .into_iter()
        .map(str::trim)
        .collect()
}

fn split_at_depth0(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts
}
