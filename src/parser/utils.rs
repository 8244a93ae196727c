//! Parser utilities

use super::backtrack;
use winnow::ascii::multispace0;
use winnow::error::ContextError;
use winnow::prelude::*;

/// Make a parser whitespace-insensitive
pub fn ws<'a, F, O>(mut parser: F) -> impl Parser<&'a str, O, ContextError>
where
    F: Parser<&'a str, O, ContextError>,
{
    move |input: &mut &'a str| {
        let _ = multispace0.parse_next(input)?;
        let output = parser.parse_next(input)?;
        let _ = multispace0.parse_next(input)?;
        Ok(output)
    }
}

/// Case-insensitive keyword
#[must_use]
pub fn tag_no_case<'a>(tag: &'static str) -> impl Parser<&'a str, &'a str, ContextError> {
    move |input: &mut &'a str| {
        let s: &'a str = *input;
        match s.get(..tag.len()) {
            Some(head) if head.eq_ignore_ascii_case(tag) => {
                *input = &s[tag.len()..];
                Ok(head)
            }
            _ => Err(backtrack()),
        }
    }
}

/// Case-insensitive keyword that is not the prefix of a longer identifier
#[must_use]
pub fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, &'a str, ContextError> {
    let mut tag = tag_no_case(word);
    move |input: &mut &'a str| {
        let start: &'a str = *input;
        let matched = tag.parse_next(input)?;
        if input.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            *input = start;
            return Err(backtrack());
        }
        Ok(matched)
    }
}
