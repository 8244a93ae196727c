//! Field values: literals, numbers, macro references and `#` concatenations

use super::{backtrack, lexer, PResult};
use crate::model::Value;
use std::borrow::Cow;
use winnow::combinator::alt;
use winnow::prelude::*;

/// Parse a field value
pub fn parse_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let mut parts = vec![parse_single_value(input)?];

    loop {
        let checkpoint = *input;
        lexer::skip_whitespace(input);
        let s: &'a str = *input;
        if let Some(rest) = s.strip_prefix('#') {
            *input = rest;
            lexer::skip_whitespace(input);
            parts.push(parse_single_value(input)?);
        } else {
            *input = checkpoint;
            break;
        }
    }

    Ok(if parts.len() == 1 {
        parts.swap_remove(0)
    } else {
        Value::Concat(Box::new(parts))
    })
}

fn parse_single_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    alt((
        parse_quoted_value,
        parse_braced_value,
        parse_number_value,
        parse_variable_value,
    ))
    .parse_next(input)
}

fn parse_quoted_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    lexer::quoted_string(input).map(|s| Value::Literal(Cow::Borrowed(s)))
}

fn parse_braced_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let start = *input;
    let Some(rest) = start.strip_prefix('{') else {
        return Err(backtrack());
    };
    *input = rest;

    let content = lexer::balanced_braces(input)?;
    let rest: &'a str = *input;
    *input = rest.strip_prefix('}').ok_or_else(backtrack)?;

    Ok(Value::Literal(Cow::Borrowed(content)))
}

/// A bare number; text that does not round-trip through `i64` (leading
/// zeros, a `+` sign, overflow) is kept as written
fn parse_number_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let digits = lexer::number(input)?;
    Ok(match digits.parse::<i64>() {
        Ok(n) if n.to_string() == digits => Value::Number(n),
        _ => Value::Literal(Cow::Borrowed(digits)),
    })
}

fn parse_variable_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    if input.chars().next().map_or(true, char::is_numeric) {
        return Err(backtrack());
    }

    let ident = lexer::identifier(input)?;
    Ok(Value::Variable(Cow::Borrowed(ident)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_value() {
        let mut input = r#""hello world" xxx"#;
        let value = parse_value(&mut input).unwrap();
        assert_eq!(value, Value::from("hello world"));
        assert_eq!(input, " xxx");
    }

    #[test]
    fn test_parse_braced_value() {
        let mut input = "{The {DNA} helix} xxx";
        let value = parse_value(&mut input).unwrap();
        assert_eq!(value, Value::from("The {DNA} helix"));
        assert_eq!(input, " xxx");
    }

    #[test]
    fn test_parse_number_value() {
        let mut input = "2023 xxx";
        assert_eq!(parse_value(&mut input).unwrap(), Value::Number(2023));
        assert_eq!(input, " xxx");
    }

    #[test]
    fn test_number_keeps_leading_zeros() {
        let mut input = "02,";
        assert_eq!(parse_value(&mut input).unwrap(), Value::from("02"));

        let mut input = "99999999999999999999,";
        assert_eq!(
            parse_value(&mut input).unwrap(),
            Value::from("99999999999999999999")
        );
    }

    #[test]
    fn test_parse_concatenated_value() {
        let mut input = r#""hello" # myvar # {world} , xxx"#;
        let value = parse_value(&mut input).unwrap();
        assert_eq!(
            value,
            Value::Concat(Box::new(vec![
                Value::from("hello"),
                Value::Variable(Cow::Borrowed("myvar")),
                Value::from("world"),
            ]))
        );
        assert_eq!(input, " , xxx");
    }

    #[test]
    fn test_dangling_concatenation_fails() {
        let mut input = r#""hello" # }"#;
        assert!(parse_value(&mut input).is_err());
    }
}
