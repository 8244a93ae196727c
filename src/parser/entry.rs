//! Entry parsing for BibTeX

use super::{backtrack, lexer, utils, value, PResult};
use crate::model::{Entry, EntryType, Field};
use std::borrow::Cow;
use winnow::prelude::*;

/// Parse an entry starting at its type name, `article{key, ...}`
pub fn parse_entry<'a>(input: &mut &'a str) -> PResult<Entry<'a>> {
    let ty = EntryType::parse(lexer::identifier(input)?);
    lexer::skip_whitespace(input);

    let close = open_delimiter(input)?;
    let key = utils::ws(lexer::citation_key).parse_next(input)?;

    let fields = {
        let s: &'a str = *input;
        match s.strip_prefix(',') {
            Some(rest) => {
                *input = rest;
                parse_fields(input, close)?
            }
            None => Vec::new(),
        }
    };

    utils::ws(close).parse_next(input)?;

    Ok(Entry {
        ty,
        key: Cow::Borrowed(key),
        fields,
    })
}

/// Consume `{` or `(` and return the matching closing delimiter
pub(crate) fn open_delimiter<'a>(input: &mut &'a str) -> PResult<char> {
    let s: &'a str = *input;
    let close = match s.chars().next() {
        Some('{') => '}',
        Some('(') => ')',
        _ => return Err(backtrack()),
    };
    *input = &s[1..];
    Ok(close)
}

/// Comma-separated `name = value` pairs up to `close`; a trailing comma is
/// allowed
fn parse_fields<'a>(input: &mut &'a str, close: char) -> PResult<Vec<Field<'a>>> {
    let mut fields = Vec::new();

    loop {
        lexer::skip_whitespace(input);
        if input.starts_with(close) || input.is_empty() {
            break;
        }

        fields.push(parse_field(input)?);

        lexer::skip_whitespace(input);
        let s: &'a str = *input;
        match s.strip_prefix(',') {
            Some(rest) => *input = rest,
            None if s.starts_with(close) => break,
            None => return Err(backtrack()),
        }
    }

    Ok(fields)
}

/// Parse a single field (name = value)
fn parse_field<'a>(input: &mut &'a str) -> PResult<Field<'a>> {
    let name = utils::ws(lexer::identifier).parse_next(input)?;
    utils::ws('=').parse_next(input)?;
    let value = utils::ws(value::parse_value).parse_next(input)?;

    Ok(Field::new(name, value))
}
