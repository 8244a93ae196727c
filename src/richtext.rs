//! Rich text produced by the formatter
//!
//! A [`Text`] is a flat list of [`Segment`]s. Nested segments (emphasis,
//! links, case-protected runs) carry their own `Text`. Adjacent plain runs
//! are merged on insertion and empty segments are never stored, so
//! `is_empty` is a cheap check.

use std::fmt;

/// Non-breaking space, the "tie" between words that must stay together
pub const NBSP: char = '\u{a0}';

/// The dash used in number ranges
pub const EN_DASH: char = '\u{2013}';

/// The dash used for parenthetical breaks
pub const EM_DASH: char = '\u{2014}';

/// One run of rich text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain characters
    Str(String),
    /// Emphasised (usually italic) text
    Emph(Text),
    /// Strong (usually bold) text
    Strong(Text),
    /// Text exempt from case changes, from a `{...}` group in the source
    Protected(Text),
    /// Hyperlink
    Link {
        /// Link target
        url: String,
        /// Visible text
        text: Text,
    },
}

impl Segment {
    fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Emph(t) | Self::Strong(t) | Self::Protected(t) | Self::Link { text: t, .. } => {
                t.is_empty()
            }
        }
    }
}

/// A sequence of rich text segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    parts: Vec<Segment>,
}

impl Text {
    /// Create empty text
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Decode a LaTeX field value into rich text
    #[must_use]
    pub fn from_latex(input: &str) -> Self {
        crate::latex::parse(input)
    }

    /// The segments of this text
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.parts
    }

    /// Whether there is nothing to render
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of characters of visible text
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                Segment::Str(s) => s.chars().count(),
                Segment::Emph(t)
                | Segment::Strong(t)
                | Segment::Protected(t)
                | Segment::Link { text: t, .. } => t.char_len(),
            })
            .sum()
    }

    /// Append a segment, merging plain runs and dropping empty ones
    pub fn push(&mut self, segment: Segment) {
        if segment.is_empty() {
            return;
        }
        if let (Some(Segment::Str(last)), Segment::Str(s)) = (self.parts.last_mut(), &segment) {
            last.push_str(s);
            return;
        }
        self.parts.push(segment);
    }

    /// Append plain characters
    pub fn push_str(&mut self, s: &str) {
        self.push(Segment::Str(s.to_string()));
    }

    /// Append all segments of `other`
    pub fn append(&mut self, other: Self) {
        for segment in other.parts {
            self.push(segment);
        }
    }

    /// Wrap in emphasis
    #[must_use]
    pub fn emph(self) -> Self {
        Self::wrap(Segment::Emph(self))
    }

    /// Wrap in strong emphasis
    #[must_use]
    pub fn strong(self) -> Self {
        Self::wrap(Segment::Strong(self))
    }

    /// Protect from case changes
    #[must_use]
    pub fn protected(self) -> Self {
        Self::wrap(Segment::Protected(self))
    }

    /// Turn into a hyperlink pointing at `url`
    #[must_use]
    pub fn link(self, url: impl Into<String>) -> Self {
        Self::wrap(Segment::Link {
            url: url.into(),
            text: self,
        })
    }

    fn wrap(segment: Segment) -> Self {
        let mut text = Self::new();
        text.push(segment);
        text
    }

    /// Join non-empty texts with `sep`
    #[must_use]
    pub fn join(sep: &str, parts: impl IntoIterator<Item = Self>) -> Self {
        let mut text = Self::new();
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !text.is_empty() {
                text.push_str(sep);
            }
            text.append(part);
        }
        text
    }

    /// Last visible character
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        match self.parts.last()? {
            Segment::Str(s) => s.chars().last(),
            Segment::Emph(t)
            | Segment::Strong(t)
            | Segment::Protected(t)
            | Segment::Link { text: t, .. } => t.last_char(),
        }
    }

    /// Terminate with a period unless the text is empty or already ends
    /// with `.`, `?` or `!`
    #[must_use]
    pub fn add_period(mut self) -> Self {
        if !self.is_empty() && !matches!(self.last_char(), Some('.' | '?' | '!')) {
            self.push_str(".");
        }
        self
    }

    /// Drop trailing plain spaces
    #[must_use]
    pub fn trim_end(mut self) -> Self {
        if let Some(Segment::Str(s)) = self.parts.last_mut() {
            let trimmed = s.trim_end_matches(' ').len();
            s.truncate(trimmed);
            if s.is_empty() {
                self.parts.pop();
            }
        }
        self
    }

    /// Lowercase everything outside protected runs
    #[must_use]
    pub fn lower(mut self) -> Self {
        self.lower_in_place();
        self
    }

    /// Uppercase the first character unless it is protected
    #[must_use]
    pub fn capfirst(mut self) -> Self {
        self.capfirst_in_place();
        self
    }

    /// Sentence case: first character upper, the rest lower, protected runs
    /// untouched
    #[must_use]
    pub fn capitalize(self) -> Self {
        self.lower().capfirst()
    }

    fn lower_in_place(&mut self) {
        for part in &mut self.parts {
            match part {
                Segment::Str(s) => *s = s.to_lowercase(),
                Segment::Emph(t) | Segment::Strong(t) | Segment::Link { text: t, .. } => {
                    t.lower_in_place();
                }
                Segment::Protected(_) => {}
            }
        }
    }

    fn capfirst_in_place(&mut self) {
        match self.parts.first_mut() {
            Some(Segment::Str(s)) => {
                let mut chars = s.chars();
                if let Some(first) = chars.next() {
                    *s = first.to_uppercase().chain(chars).collect();
                }
            }
            Some(Segment::Emph(t) | Segment::Strong(t) | Segment::Link { text: t, .. }) => {
                t.capfirst_in_place();
            }
            Some(Segment::Protected(_)) | None => {}
        }
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::wrap(Segment::Str(s.to_string()))
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::wrap(Segment::Str(s))
    }
}

impl fmt::Display for Text {
    /// Writes the visible characters without any markup
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Segment::Str(s) => f.write_str(s)?,
                Segment::Emph(t)
                | Segment::Strong(t)
                | Segment::Protected(t)
                | Segment::Link { text: t, .. } => write!(f, "{t}")?,
            }
        }
        Ok(())
    }
}

/// Replace every run of hyphens with a single en-dash
#[must_use]
pub fn dashify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c == '-' {
            if !in_run {
                out.push(EN_DASH);
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
