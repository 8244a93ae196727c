//! BibTeX parser implementation using winnow

pub mod entry;
pub mod lexer;
pub mod utils;
pub mod value;

use crate::error::Location;
use crate::model::{Entry, Value};
use crate::{Error, Result};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

pub use entry::parse_entry;

/// Internal parser result type
pub type PResult<O> = winnow::PResult<O, ContextError>;

pub(crate) fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// A parsed item from the BibTeX file
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedItem<'a> {
    /// A bibliography entry
    Entry(Entry<'a>),
    /// A `@string` macro definition
    String(&'a str, Value<'a>),
    /// A `@preamble`
    Preamble(Value<'a>),
    /// `@comment`, `%` lines and any text between items
    Comment(&'a str),
}

/// Parse a complete BibTeX database into its items, in source order
pub fn parse_bibtex(input: &str) -> Result<Vec<ParsedItem<'_>>> {
    let mut items = Vec::new();
    let mut remaining = input;

    loop {
        lexer::skip_whitespace(&mut remaining);
        if remaining.is_empty() {
            break;
        }

        let start = remaining;
        let item = if remaining.starts_with('@') {
            parse_item(&mut remaining).map_err(|_| item_error(input, start))?
        } else {
            parse_text(&mut remaining)
        };
        items.push(item);
    }

    Ok(items)
}

/// `@comment`, `@string`, `@preamble` or an entry
fn parse_item<'a>(input: &mut &'a str) -> PResult<ParsedItem<'a>> {
    ('@', winnow::ascii::multispace0).parse_next(input)?;

    if utils::keyword("comment").parse_next(input).is_ok() {
        return parse_comment(input).map(ParsedItem::Comment);
    }
    if utils::keyword("string").parse_next(input).is_ok() {
        return delimited_body(input, |input| {
            let name = utils::ws(lexer::identifier).parse_next(input)?;
            utils::ws('=').parse_next(input)?;
            let value = utils::ws(value::parse_value).parse_next(input)?;
            Ok(ParsedItem::String(name, value))
        });
    }
    if utils::keyword("preamble").parse_next(input).is_ok() {
        return delimited_body(input, |input| {
            utils::ws(value::parse_value)
                .map(ParsedItem::Preamble)
                .parse_next(input)
        });
    }

    parse_entry(input).map(ParsedItem::Entry)
}

/// Run `body` between `{`/`}` or `(`/`)`
fn delimited_body<'a, O>(
    input: &mut &'a str,
    mut body: impl FnMut(&mut &'a str) -> PResult<O>,
) -> PResult<O> {
    lexer::skip_whitespace(input);
    let close = entry::open_delimiter(input)?;
    let output = body(input)?;
    utils::ws(close).parse_next(input)?;
    Ok(output)
}

/// The body of a `@comment`: a brace group, a parenthesised run, or the
/// rest of the line
fn parse_comment<'a>(input: &mut &'a str) -> PResult<&'a str> {
    lexer::skip_whitespace(input);
    let s: &'a str = *input;

    if let Some(rest) = s.strip_prefix('{') {
        *input = rest;
        let body = lexer::balanced_braces(input)?;
        '}'.parse_next(input)?;
        return Ok(body.trim());
    }
    if let Some(rest) = s.strip_prefix('(') {
        let end = memchr::memchr(b')', rest.as_bytes()).ok_or_else(backtrack)?;
        *input = &rest[end + 1..];
        return Ok(rest[..end].trim());
    }

    let end = memchr::memchr(b'\n', s.as_bytes()).unwrap_or(s.len());
    *input = &s[end..];
    Ok(s[..end].trim())
}

/// Text outside any `@` item: a `%` line or free text up to the next `@`
fn parse_text<'a>(input: &mut &'a str) -> ParsedItem<'a> {
    let s: &'a str = *input;
    let end = if s.starts_with('%') {
        memchr::memchr(b'\n', s.as_bytes())
    } else {
        memchr::memchr(b'@', s.as_bytes())
    }
    .unwrap_or(s.len());

    *input = &s[end..];
    ParsedItem::Comment(s[..end].trim_end())
}

fn item_error(input: &str, rest: &str) -> Error {
    let mut kind = rest[1..].trim_start();
    let kind = lexer::identifier(&mut kind).unwrap_or("");
    let location = Location::of_offset(input, input.len() - rest.len());

    Error::ParseError {
        line: location.line,
        column: location.column,
        message: format!("Failed to parse @{kind} block"),
        snippet: Some(snippet(rest, 40)),
    }
}

/// The first `max_len` characters of `input`
fn snippet(input: &str, max_len: usize) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(max_len).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
