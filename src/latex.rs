//! Decoding of the LaTeX subset found in BibTeX field values
//!
//! Brace groups become [`Segment::Protected`] runs, `\emph` and friends map
//! to emphasis, accent commands are composed into precomposed Unicode
//! characters and the usual ligatures (`~`, `--`, `---`) are resolved.
//! Unknown commands are kept verbatim.

use crate::richtext::{Segment, Text, EM_DASH, EN_DASH, NBSP};
use ahash::AHashMap;
use lazy_static::lazy_static;
use std::iter::Peekable;
use std::str::Chars;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Accent commands and the combining mark each one applies
    static ref ACCENTS: AHashMap<&'static str, char> = [
        ("'", '\u{301}'),
        ("`", '\u{300}'),
        ("^", '\u{302}'),
        ("\"", '\u{308}'),
        ("~", '\u{303}'),
        ("=", '\u{304}'),
        (".", '\u{307}'),
        ("u", '\u{306}'),
        ("v", '\u{30c}'),
        ("H", '\u{30b}'),
        ("r", '\u{30a}'),
        ("c", '\u{327}'),
        ("k", '\u{328}'),
        ("d", '\u{323}'),
        ("b", '\u{331}'),
    ]
    .into_iter()
    .collect();

    /// Commands that stand for a fixed piece of text
    static ref SYMBOLS: AHashMap<&'static str, &'static str> = [
        ("ss", "ß"),
        ("o", "ø"),
        ("O", "Ø"),
        ("ae", "æ"),
        ("AE", "Æ"),
        ("oe", "œ"),
        ("OE", "Œ"),
        ("aa", "å"),
        ("AA", "Å"),
        ("l", "ł"),
        ("L", "Ł"),
        ("i", "ı"),
        ("j", "ȷ"),
        ("textendash", "\u{2013}"),
        ("textemdash", "\u{2014}"),
        ("textquoteleft", "\u{2018}"),
        ("textquoteright", "\u{2019}"),
        ("ldots", "\u{2026}"),
        ("dots", "\u{2026}"),
        ("TeX", "TeX"),
        ("LaTeX", "LaTeX"),
        ("BibTeX", "BibTeX"),
    ]
    .into_iter()
    .collect();
}

type Input<'s> = Peekable<Chars<'s>>;

/// Decode a field value into rich text
#[must_use]
pub fn parse(input: &str) -> Text {
    let mut chars = input.chars().peekable();
    parse_group(&mut chars, false)
}

/// Decode a field value and drop all markup
#[must_use]
pub fn to_plain(input: &str) -> String {
    parse(input).to_string()
}

fn parse_group(chars: &mut Input<'_>, nested: bool) -> Text {
    let mut text = Text::new();
    let mut buf = String::new();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                flush(&mut text, &mut buf);
                let inner = parse_group(chars, true);
                text.push(Segment::Protected(inner));
            }
            '}' if nested => break,
            // stray closing brace
            '}' => {}
            '\\' => command(chars, &mut text, &mut buf),
            '~' => buf.push(NBSP),
            '-' => {
                let mut run = 1;
                while chars.next_if_eq(&'-').is_some() {
                    run += 1;
                }
                match run {
                    1 => buf.push('-'),
                    2 => buf.push(EN_DASH),
                    _ => buf.push(EM_DASH),
                }
            }
            c if c.is_whitespace() => {
                if !buf.ends_with(' ') {
                    buf.push(' ');
                }
            }
            c => buf.push(c),
        }
    }

    flush(&mut text, &mut buf);
    text
}

fn flush(text: &mut Text, buf: &mut String) {
    if !buf.is_empty() {
        text.push(Segment::Str(std::mem::take(buf)));
    }
}

fn command(chars: &mut Input<'_>, text: &mut Text, buf: &mut String) {
    let Some(&next) = chars.peek() else {
        buf.push('\\');
        return;
    };

    if !next.is_ascii_alphabetic() {
        chars.next();
        let symbol = next.to_string();
        if let Some(&mark) = ACCENTS.get(symbol.as_str()) {
            buf.push_str(&accent(&read_raw_argument(chars), mark));
        } else {
            match next {
                '&' | '%' | '$' | '#' | '_' | '{' | '}' => buf.push(next),
                ' ' | '\\' => buf.push(' '),
                // italic correction and discretionary hyphen
                '/' | '-' => {}
                _ => {
                    buf.push('\\');
                    buf.push(next);
                }
            }
        }
        return;
    }

    let mut name = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_alphabetic) {
        name.push(c);
    }
    while chars.next_if(|c| c.is_whitespace()).is_some() {}

    match name.as_str() {
        "emph" | "textit" | "textsl" | "it" | "em" => {
            flush(text, buf);
            text.push(Segment::Emph(parse_argument(chars)));
        }
        "textbf" | "bf" => {
            flush(text, buf);
            text.push(Segment::Strong(parse_argument(chars)));
        }
        "url" => {
            flush(text, buf);
            let url = read_raw_argument(chars);
            text.push(Segment::Link {
                text: Text::from(url.as_str()),
                url,
            });
        }
        "href" => {
            flush(text, buf);
            let url = read_raw_argument(chars);
            let label = parse_argument(chars);
            text.push(Segment::Link { url, text: label });
        }
        "textrm" | "textsf" | "texttt" | "textsc" | "textup" | "textnormal" | "mbox" => {
            flush(text, buf);
            text.append(parse_argument(chars));
        }
        _ => {
            if let Some(&mark) = ACCENTS.get(name.as_str()) {
                buf.push_str(&accent(&read_raw_argument(chars), mark));
            } else if let Some(symbol) = SYMBOLS.get(name.as_str()) {
                buf.push_str(symbol);
            } else {
                buf.push('\\');
                buf.push_str(&name);
            }
        }
    }
}

/// Put `mark` on the first character of the decoded argument
fn accent(argument: &str, mark: char) -> String {
    let base = to_plain(argument);
    let mut rest = base.chars();
    let Some(first) = rest.next() else {
        return String::new();
    };
    // dotless i and j take the accent as ordinary letters
    let first = match first {
        'ı' => 'i',
        'ȷ' => 'j',
        c => c,
    };

    let mut composed: String = [first, mark].into_iter().nfc().collect();
    composed.extend(rest);
    composed
}

/// A macro argument decoded as rich text: a brace group or a single
/// character
fn parse_argument(chars: &mut Input<'_>) -> Text {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
    match chars.next() {
        Some('{') => parse_group(chars, true),
        Some(c) => Text::from(c.to_string()),
        None => Text::new(),
    }
}

/// A macro argument as raw source: the contents of a brace group, a single
/// control sequence, or a single character
fn read_raw_argument(chars: &mut Input<'_>) -> String {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
    let mut out = String::new();

    match chars.next() {
        Some('{') => {
            let mut depth = 0usize;
            for c in chars.by_ref() {
                match c {
                    '{' => depth += 1,
                    '}' if depth == 0 => break,
                    '}' => depth -= 1,
                    _ => {}
                }
                out.push(c);
            }
        }
        Some('\\') => {
            out.push('\\');
            while let Some(c) = chars.next_if(char::is_ascii_alphabetic) {
                out.push(c);
            }
            if out.len() == 1 {
                out.extend(chars.next());
            }
        }
        Some(c) => out.push(c),
        None => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let text = parse("A simple title");
        assert_eq!(text.segments(), &[Segment::Str("A simple title".to_string())]);
    }

    #[test]
    fn test_braces_become_protected() {
        let text = parse("The {DNA} helix");
        assert_eq!(
            text.segments(),
            &[
                Segment::Str("The ".to_string()),
                Segment::Protected(Text::from("DNA")),
                Segment::Str(" helix".to_string()),
            ]
        );
        assert_eq!(text.to_string(), "The DNA helix");
    }

    #[test]
    fn test_accents_compose() {
        assert_eq!(to_plain("{\\\"O}zt{\\\"u}rk"), "Öztürk");
        assert_eq!(to_plain("Erd\\H{o}s"), "Erdős");
        assert_eq!(to_plain("Fran\\c{c}ois"), "François");
        assert_eq!(to_plain("Fran\\c cois"), "François");
        assert_eq!(to_plain("\\'{\\i}"), "í");
        assert_eq!(to_plain("Gau\\ss"), "Gauß");
        assert_eq!(to_plain("Bj\\o rn"), "Bjørn");
    }

    #[test]
    fn test_ligatures_and_escapes() {
        assert_eq!(to_plain("a--b---c"), "a\u{2013}b\u{2014}c");
        assert_eq!(to_plain("R~\\&~D"), "R\u{a0}&\u{a0}D");
        assert_eq!(to_plain("50\\% off"), "50% off");
        assert_eq!(to_plain("two   spaces"), "two spaces");
    }

    #[test]
    fn test_emphasis_and_links() {
        let text = parse("On \\emph{Species}");
        assert_eq!(
            text.segments(),
            &[
                Segment::Str("On ".to_string()),
                Segment::Emph(Text::from("Species")),
            ]
        );

        let text = parse("\\url{https://example.org}");
        assert_eq!(
            text.segments(),
            &[Segment::Link {
                url: "https://example.org".to_string(),
                text: Text::from("https://example.org"),
            }]
        );
    }

    #[test]
    fn test_unknown_command_is_kept() {
        assert_eq!(to_plain("\\foo bar"), "\\foobar");
    }
}
