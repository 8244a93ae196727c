//! Name formatting

use super::template::{tie_or_space, together_texts};
use crate::person::{self, Person, OTHERS};
use crate::richtext::Text;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a single person's name is laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `von Last Jr, First Middle`
    #[default]
    LastFirst,
    /// `First Middle von Last, Jr`
    Plain,
}

impl NameStyle {
    /// Identifier the style is selected by
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LastFirst => "lastfirst",
            Self::Plain => "plain",
        }
    }

    /// Format one person.
    ///
    /// The `others` sentinel always renders as the bare word `others`.
    #[must_use]
    pub fn format(self, person: &Person, abbreviate: bool) -> Text {
        if person.is_others() {
            return Text::from(OTHERS);
        }

        let given: Vec<&str> = person.given_names().collect();
        let parts = match self {
            Self::LastFirst => [
                name_part(&person.prelast_names, "", true, false),
                name_part(&person.last_names, "", false, false),
                name_part(&person.lineage_names, " ", false, false),
                name_part(&given, ", ", false, abbreviate),
            ],
            Self::Plain => [
                name_part(&given, "", true, abbreviate),
                name_part(&person.prelast_names, "", true, false),
                name_part(&person.last_names, "", false, false),
                name_part(&person.lineage_names, ", ", false, false),
            ],
        };

        let mut text = Text::new();
        for part in parts {
            text.append(part);
        }
        text
    }
}

impl fmt::Display for NameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NameStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lastfirst" => Ok(Self::LastFirst),
            "plain" => Ok(Self::Plain),
            other => Err(Error::UnknownNameStyle(other.to_string())),
        }
    }
}

/// One group of name tokens: the tokens tied together, `before` in front
/// and, with `tie`, a tie or space behind so the group sticks to what
/// follows.
fn name_part<S: AsRef<str>>(tokens: &[S], before: &str, tie: bool, abbreviate: bool) -> Text {
    let words = tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            if abbreviate {
                Text::from_latex(&person::abbreviate(token))
            } else {
                Text::from_latex(token)
            }
        })
        .collect();
    let joined = together_texts(words, true);
    if joined.is_empty() {
        return joined;
    }

    let after = tie_or_space(&joined);
    let mut text = Text::from(before);
    text.append(joined);
    if tie {
        text.push_str(after.encode_utf8(&mut [0; 4]));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::parse_name_list;

    fn last_first(name: &str) -> String {
        NameStyle::LastFirst
            .format(&Person::parse(name), false)
            .to_string()
    }

    #[test]
    fn test_last_first() {
        assert_eq!(last_first("John Smith"), "Smith, John");
        assert_eq!(last_first("Ludwig van Beethoven"), "van Beethoven, Ludwig");
        assert_eq!(last_first("Charles de Gaulle"), "de\u{a0}Gaulle, Charles");
        assert_eq!(last_first("Ford, Jr., Henry"), "Ford Jr., Henry");
        assert_eq!(last_first("Aristotle"), "Aristotle");
        assert_eq!(
            last_first("Jean de la Fontaine"),
            "de\u{a0}la Fontaine, Jean"
        );
    }

    #[test]
    fn test_abbreviated_given_names() {
        let person = Person::parse("Knuth, Donald Ervin");
        assert_eq!(
            NameStyle::LastFirst.format(&person, true).to_string(),
            "Knuth, D.\u{a0}E."
        );

        let person = Person::parse("Sartre, Jean-Paul");
        assert_eq!(
            NameStyle::LastFirst.format(&person, true).to_string(),
            "Sartre, J.-P."
        );
    }

    #[test]
    fn test_others_ignores_every_other_part() {
        let mut person = Person::others();
        person.first_names.push("Ignored".to_string());
        person.lineage_names.push("Jr.".to_string());
        for style in [NameStyle::LastFirst, NameStyle::Plain] {
            assert_eq!(style.format(&person, true).to_string(), "others");
        }

        let list = parse_name_list("Smith, John and others");
        assert_eq!(NameStyle::LastFirst.format(&list[1], false).to_string(), "others");
    }

    #[test]
    fn test_latex_in_names_is_decoded() {
        assert_eq!(last_first("{\\\"O}zt{\\\"u}rk, Ay{\\c{s}}e"), "Öztürk, Ayşe");
    }

    #[test]
    fn test_plain_style() {
        let person = Person::parse("Ford, Jr., Henry");
        assert_eq!(
            NameStyle::Plain.format(&person, false).to_string(),
            "Henry Ford, Jr."
        );
        let person = Person::parse("Charles de Gaulle");
        assert_eq!(
            NameStyle::Plain.format(&person, true).to_string(),
            "C.\u{a0}de\u{a0}Gaulle"
        );
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("lastfirst".parse::<NameStyle>().unwrap(), NameStyle::LastFirst);
        assert_eq!(NameStyle::Plain.to_string(), "plain");
        assert!("fancy".parse::<NameStyle>().is_err());
    }
}
