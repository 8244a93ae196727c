//! Rendering of formatted bibliographies

use crate::richtext::{Segment, Text, EM_DASH, EN_DASH, NBSP};
use crate::style::{Bibliography, FormattedEntry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Output medium for rendered citations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text without markup
    #[default]
    Text,
    /// HTML fragment
    Html,
    /// Markdown
    Markdown,
    /// LaTeX
    Latex,
}

impl OutputFormat {
    /// Identifier the format is selected by
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Latex => "latex",
        }
    }

    /// Render rich text in this format
    #[must_use]
    pub fn render(self, text: &Text) -> String {
        let mut out = String::new();
        self.render_into(text, &mut out);
        out
    }

    fn render_into(self, text: &Text, out: &mut String) {
        for segment in text.segments() {
            match (self, segment) {
                (_, Segment::Str(s)) => self.escape_into(s, out),

                (Self::Text | Self::Markdown, Segment::Protected(inner))
                | (Self::Text, Segment::Emph(inner) | Segment::Strong(inner))
                | (Self::Text, Segment::Link { text: inner, .. }) => self.render_into(inner, out),

                (Self::Html, Segment::Emph(inner)) => self.wrap("<em>", inner, "</em>", out),
                (Self::Html, Segment::Strong(inner)) => {
                    self.wrap("<strong>", inner, "</strong>", out);
                }
                (Self::Html, Segment::Protected(inner)) => {
                    self.wrap(r#"<span class="bibtex-protected">"#, inner, "</span>", out);
                }
                (Self::Html, Segment::Link { url, text }) => {
                    out.push_str("<a href=\"");
                    out.push_str(&escape_html(url));
                    out.push_str("\">");
                    self.render_into(text, out);
                    out.push_str("</a>");
                }

                (Self::Markdown, Segment::Emph(inner)) => self.wrap("*", inner, "*", out),
                (Self::Markdown, Segment::Strong(inner)) => self.wrap("**", inner, "**", out),
                (Self::Markdown, Segment::Link { url, text }) => {
                    out.push('[');
                    self.render_into(text, out);
                    out.push_str("](");
                    out.push_str(&url.replace(')', "%29"));
                    out.push(')');
                }

                (Self::Latex, Segment::Emph(inner)) => self.wrap("\\emph{", inner, "}", out),
                (Self::Latex, Segment::Strong(inner)) => self.wrap("\\textbf{", inner, "}", out),
                (Self::Latex, Segment::Protected(inner)) => self.wrap("{", inner, "}", out),
                (Self::Latex, Segment::Link { url, text }) => {
                    out.push_str("\\href{");
                    out.push_str(&url.replace('%', "\\%").replace('#', "\\#"));
                    out.push_str("}{");
                    self.render_into(text, out);
                    out.push('}');
                }
            }
        }
    }

    fn wrap(self, open: &str, inner: &Text, close: &str, out: &mut String) {
        out.push_str(open);
        self.render_into(inner, out);
        out.push_str(close);
    }

    fn escape_into(self, s: &str, out: &mut String) {
        match self {
            Self::Text => out.extend(s.chars().map(|c| if c == NBSP { ' ' } else { c })),
            Self::Html => {
                for c in s.chars() {
                    match c {
                        NBSP => out.push_str("&nbsp;"),
                        c => push_html_char(c, out),
                    }
                }
            }
            Self::Markdown => {
                for c in s.chars() {
                    match c {
                        NBSP => out.push_str("&nbsp;"),
                        '\\' | '*' | '_' | '[' | ']' | '`' | '<' | '>' | '#' => {
                            out.push('\\');
                            out.push(c);
                        }
                        c => out.push(c),
                    }
                }
            }
            Self::Latex => {
                for c in s.chars() {
                    match c {
                        NBSP => out.push('~'),
                        EN_DASH => out.push_str("--"),
                        EM_DASH => out.push_str("---"),
                        '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                            out.push('\\');
                            out.push(c);
                        }
                        '~' => out.push_str("\\textasciitilde{}"),
                        '^' => out.push_str("\\textasciicircum{}"),
                        '\\' => out.push_str("\\textbackslash{}"),
                        c => out.push(c),
                    }
                }
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "latex" => Ok(Self::Latex),
            _ => Err(Error::UnknownOutputFormat(s.to_string())),
        }
    }
}

fn push_html_char(c: char, out: &mut String) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        c => out.push(c),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_html_char(c, &mut out);
    }
    out
}

/// Configuration for rendering a bibliography
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Output medium (default: text)
    pub format: OutputFormat,
    /// Whether to print entry labels (default: true)
    pub show_labels: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_labels: true,
        }
    }
}

impl WriterConfig {
    /// Default configuration for `format`
    #[must_use]
    pub fn for_format(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Bibliography writer
#[derive(Debug)]
pub struct Writer<W: Write> {
    writer: W,
    config: WriterConfig,
}

impl<W: Write> Writer<W> {
    /// Create a new writer with default configuration
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            config: WriterConfig::default(),
        }
    }

    /// Create a new writer with custom configuration
    pub const fn with_config(writer: W, config: WriterConfig) -> Self {
        Self { writer, config }
    }

    /// Write a complete bibliography
    pub fn write_bibliography(&mut self, bibliography: &Bibliography) -> io::Result<()> {
        match self.config.format {
            OutputFormat::Html => writeln!(self.writer, "<dl>")?,
            OutputFormat::Latex => writeln!(
                self.writer,
                "\\begin{{thebibliography}}{{{}}}\n",
                bibliography.longest_label()
            )?,
            OutputFormat::Text | OutputFormat::Markdown => {}
        }

        for (i, entry) in bibliography.iter().enumerate() {
            if i > 0 && self.config.format == OutputFormat::Markdown {
                writeln!(self.writer)?;
            }
            self.write_entry(entry)?;
        }

        match self.config.format {
            OutputFormat::Html => writeln!(self.writer, "</dl>")?,
            OutputFormat::Latex => writeln!(self.writer, "\\end{{thebibliography}}")?,
            OutputFormat::Text | OutputFormat::Markdown => {}
        }

        Ok(())
    }

    /// Write a single formatted entry
    pub fn write_entry(&mut self, entry: &FormattedEntry) -> io::Result<()> {
        let format = self.config.format;
        let body = format.render(&entry.text());
        let label = (self.config.show_labels && !entry.label.is_empty()).then_some(&entry.label);

        match (format, label) {
            (OutputFormat::Html, Some(label)) => writeln!(
                self.writer,
                "<dt>{}</dt>\n<dd>{body}</dd>",
                escape_html(label)
            ),
            (OutputFormat::Html, None) => writeln!(self.writer, "<dd>{body}</dd>"),
            (OutputFormat::Latex, Some(label)) => {
                writeln!(self.writer, "\\bibitem[{label}]{{{}}}\n{body}\n", entry.key)
            }
            (OutputFormat::Latex, None) => {
                writeln!(self.writer, "\\bibitem{{{}}}\n{body}\n", entry.key)
            }
            (OutputFormat::Text | OutputFormat::Markdown, Some(label)) => {
                writeln!(self.writer, "[{label}] {body}")
            }
            (OutputFormat::Text | OutputFormat::Markdown, None) => writeln!(self.writer, "{body}"),
        }
    }

    /// Write rich text without any entry framing
    pub fn write_text(&mut self, text: &Text) -> io::Result<()> {
        self.writer
            .write_all(self.config.format.render(text).as_bytes())
    }
}

/// Render a bibliography to a string
pub fn to_string(bibliography: &Bibliography, format: OutputFormat) -> Result<String> {
    let mut buf = Vec::new();
    Writer::with_config(&mut buf, WriterConfig::for_format(format))
        .write_bibliography(bibliography)?;
    String::from_utf8(buf).map_err(|e| Error::IoError(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Render a bibliography into a file
pub fn to_file(
    bibliography: &Bibliography,
    path: impl AsRef<std::path::Path>,
    format: OutputFormat,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = Writer::with_config(io::BufWriter::new(file), WriterConfig::for_format(format));
    writer.write_bibliography(bibliography)?;
    Ok(())
}
