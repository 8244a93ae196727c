//! Combinators the entry templates are assembled from
//!
//! Every part of a template is a `Result<Text>`. A missing field surfaces as
//! [`crate::Error::MissingRequiredField`]; [`optional`] turns exactly that error
//! into empty text, every other combinator propagates it. Empty parts are
//! dropped before joining, so optional pieces never leave a dangling
//! separator behind.

use crate::richtext::{Text, NBSP};
use crate::Result;

/// Shorthand for a literal template part
pub(crate) fn lit(s: &str) -> Result<Text> {
    Ok(Text::from(s))
}

/// Render nothing instead of failing when a field is missing
pub(crate) fn optional(part: Result<Text>) -> Result<Text> {
    match part {
        Err(err) if err.is_missing_field() => Ok(Text::new()),
        other => other,
    }
}

/// The first alternative that renders to something.
///
/// Failures propagate only if they come before a non-empty alternative.
pub(crate) fn first_of(alternatives: impl IntoIterator<Item = Result<Text>>) -> Result<Text> {
    for alternative in alternatives {
        let text = alternative?;
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Ok(Text::new())
}

/// Separator-driven join of template parts
#[derive(Debug, Clone, Copy)]
pub(crate) struct Join<'s> {
    sep: &'s str,
    sep2: Option<&'s str>,
    last_sep: Option<&'s str>,
}

impl<'s> Join<'s> {
    pub(crate) const fn new(sep: &'s str) -> Self {
        Self {
            sep,
            sep2: None,
            last_sep: None,
        }
    }

    /// Separator used when there are exactly two parts
    pub(crate) const fn pair(mut self, sep2: &'s str) -> Self {
        self.sep2 = Some(sep2);
        self
    }

    /// Separator before the last of three or more parts
    pub(crate) const fn last(mut self, last_sep: &'s str) -> Self {
        self.last_sep = Some(last_sep);
        self
    }

    pub(crate) fn apply(&self, parts: impl IntoIterator<Item = Result<Text>>) -> Result<Text> {
        let parts = parts.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(self.join_texts(parts))
    }

    pub(crate) fn join_texts(&self, parts: Vec<Text>) -> Text {
        let parts: Vec<Text> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        let count = parts.len();
        let mut text = Text::new();

        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                let sep = match (count, self.sep2, self.last_sep) {
                    (2, Some(sep2), _) => sep2,
                    (n, _, Some(last_sep)) if n > 2 && i == n - 1 => last_sep,
                    _ => self.sep,
                };
                text.push_str(sep);
            }
            text.append(part);
        }

        text
    }
}

/// Concatenate without separator
pub(crate) fn join(parts: impl IntoIterator<Item = Result<Text>>) -> Result<Text> {
    Join::new("").apply(parts)
}

/// Join with spaces
pub(crate) fn words(parts: impl IntoIterator<Item = Result<Text>>) -> Result<Text> {
    Join::new(" ").apply(parts)
}

/// Comma-join and terminate with a period
pub(crate) fn sentence(parts: impl IntoIterator<Item = Result<Text>>) -> Result<Text> {
    Ok(Join::new(", ").apply(parts)?.add_period())
}

/// Keep words on one line: parts are tied with non-breaking spaces. With
/// three or more parts the last one is attached with a plain space unless
/// `last_tie` is set.
pub(crate) fn together(parts: impl IntoIterator<Item = Result<Text>>, last_tie: bool) -> Result<Text> {
    let parts = parts.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(together_texts(parts, last_tie))
}

pub(crate) fn together_texts(parts: Vec<Text>, last_tie: bool) -> Text {
    let parts: Vec<Text> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    let count = parts.len();
    let mut text = Text::new();
    let tie = NBSP.to_string();

    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            if i == count - 1 && count > 2 && !last_tie {
                text.push_str(" ");
            } else {
                text.push_str(&tie);
            }
        }
        text.append(part);
    }

    text
}

/// A tie after short words, a space after anything of three or more
/// characters
pub(crate) fn tie_or_space(text: &Text) -> char {
    if text.char_len() < 3 {
        NBSP
    } else {
        ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn missing(field: &str) -> Result<Text> {
        Err(Error::MissingRequiredField {
            key: "k".to_string(),
            entry_type: "misc".to_string(),
            field: field.to_string(),
        })
    }

    fn render(part: Result<Text>) -> String {
        part.unwrap().to_string()
    }

    #[test]
    fn test_optional_only_swallows_missing_fields() {
        assert!(optional(missing("x")).unwrap().is_empty());
        let other = optional(Err(Error::UnknownStyle("s".to_string())));
        assert!(matches!(other, Err(Error::UnknownStyle(_))));
    }

    #[test]
    fn test_first_of() {
        assert_eq!(render(first_of([lit(""), lit("b"), missing("c")])), "b");
        assert!(first_of([missing("a"), lit("b")]).is_err());
        assert!(first_of([lit("")]).unwrap().is_empty());
    }

    #[test]
    fn test_join_with_pair_and_last_separators() {
        let names = Join::new(", ").pair(" and ").last(", and ");
        assert_eq!(render(names.apply([lit("A")])), "A");
        assert_eq!(render(names.apply([lit("A"), lit("B")])), "A and B");
        assert_eq!(
            render(names.apply([lit("A"), lit("B"), lit("C")])),
            "A, B, and C"
        );
        assert_eq!(
            render(names.apply([lit("A"), lit(""), lit("C")])),
            "A and C"
        );
    }

    #[test]
    fn test_sentence() {
        assert_eq!(render(sentence([lit("Pub"), lit(""), lit("City")])), "Pub, City.");
        assert!(sentence([lit(""), optional(missing("note"))]).unwrap().is_empty());
        assert!(sentence([missing("school")]).is_err());
    }

    #[test]
    fn test_together() {
        assert_eq!(render(together([lit("pp."), lit("1")], false)), "pp.\u{a0}1");
        assert_eq!(
            render(together([lit("a"), lit("b"), lit("c")], false)),
            "a\u{a0}b c"
        );
        assert_eq!(
            render(together([lit("a"), lit("b"), lit("c")], true)),
            "a\u{a0}b\u{a0}c"
        );
        assert_eq!(tie_or_space(&Text::from("de")), NBSP);
        assert_eq!(tie_or_space(&Text::from("von")), ' ');
    }
}
