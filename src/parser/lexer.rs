//! Token-level scanners for `.bib` input

use super::{backtrack, PResult};
use winnow::prelude::*;
use winnow::{
    ascii::digit1,
    combinator::{alt, opt},
    token::take_while,
};

/// Entry types, field names and macro names
pub fn identifier<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/' | '\'')
    })
    .parse_next(input)
}

/// Citation keys: anything up to a comma, whitespace or a closing delimiter
pub fn citation_key<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '(' | ')' | '"' | '=' | '#')
    })
    .parse_next(input)
}

/// Contents of a brace group, up to but excluding the matching `}`
pub fn balanced_braces<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let start = *input;
    let bytes = start.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(offset) = memchr::memchr3(b'{', b'}', b'\\', &bytes[pos..]) else {
            break;
        };
        pos += offset;
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => {
                *input = &start[pos..];
                return Ok(&start[..pos]);
            }
            b'}' => depth -= 1,
            // a backslash shields the byte after it
            _ => pos += 1,
        }
        pos += 1;
    }

    Err(backtrack())
}

/// A `"..."` string; quotes inside braces do not terminate it
pub fn quoted_string<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let start = *input;
    let bytes = start.as_bytes();
    if bytes.first() != Some(&b'"') {
        return Err(backtrack());
    }

    let mut pos = 1;
    let mut depth = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'"' if depth == 0 => {
                *input = &start[pos + 1..];
                return Ok(&start[1..pos]);
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        pos += 1;
    }

    Err(backtrack())
}

/// An optionally signed run of digits, as written
pub fn number<'a>(input: &mut &'a str) -> PResult<&'a str> {
    (opt(alt(('+', '-'))), digit1)
        .recognize()
        .parse_next(input)
}

/// Skip ASCII whitespace
pub fn skip_whitespace<'a>(input: &mut &'a str) {
    let s: &'a str = *input;
    *input = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
}
