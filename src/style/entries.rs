//! Per-type entry templates
//!
//! Each template returns the top-level chunks of one citation in order. A
//! chunk may come back empty; the caller drops those before joining.

use super::template::{first_of, join, lit, optional, sentence, together, words, Join};
use super::Style;
use crate::model::{Entry, EntryType};
use crate::person::Person;
use crate::richtext::{dashify, Text};
use crate::{Error, Result};
use std::borrow::Cow;

/// Author and editor lists: `A`, `A and B`, `A, B, and C`
const NAMES: Join<'static> = Join::new(", ").pair(" and ").last(", and ");

/// A template renders one entry into its top-level chunks
pub(crate) type Template = fn(&Context<'_>) -> Result<Vec<Text>>;

/// The template for an entry type, `None` for types the style cannot format
pub(crate) fn template_for(ty: &EntryType<'_>) -> Option<Template> {
    match ty {
        EntryType::Article => Some(article),
        EntryType::Book => Some(book),
        EntryType::InCollection | EntryType::InProceedings => Some(incollection),
        EntryType::Manual => Some(manual),
        EntryType::Misc => Some(misc),
        EntryType::PhdThesis => Some(phdthesis),
        EntryType::TechReport => Some(techreport),
        EntryType::Unpublished => Some(unpublished),
        EntryType::Custom(_) => None,
    }
}

/// Field access and shared building blocks for one entry
pub(crate) struct Context<'a> {
    style: &'a Style,
    entry: &'a Entry<'a>,
}

impl<'a> Context<'a> {
    pub(crate) const fn new(style: &'a Style, entry: &'a Entry<'a>) -> Self {
        Self { style, entry }
    }

    /// The error for an absent field; a field left holding an undefined
    /// macro reports the macro instead
    pub(crate) fn missing(&self, field: &str) -> Error {
        let key = self.entry.key().to_string();
        match self.entry.unresolved(field) {
            Some(name) => Error::UndefinedVariable {
                key,
                field: field.to_string(),
                name: name.to_string(),
            },
            None => Error::MissingRequiredField {
                key,
                entry_type: self.entry.entry_type().to_string(),
                field: field.to_string(),
            },
        }
    }

    fn raw(&self, name: &str) -> Result<Cow<'_, str>> {
        self.entry
            .get_as_string(name)
            .ok_or_else(|| self.missing(name))
    }

    /// A field decoded from LaTeX
    fn field(&self, name: &str) -> Result<Text> {
        Ok(Text::from_latex(self.raw(name)?.trim()))
    }

    /// A field taken verbatim, for identifiers and URLs
    fn raw_field(&self, name: &str) -> Result<String> {
        Ok(self.raw(name)?.trim().to_string())
    }

    fn optional_field(&self, name: &str) -> Result<Text> {
        optional(self.field(name))
    }

    fn persons(&self, role: &str) -> Result<Vec<Person>> {
        self.entry.persons(role).ok_or_else(|| self.missing(role))
    }

    fn names(&self, role: &str) -> Result<Text> {
        let persons = self.persons(role)?;
        NAMES.apply(persons.iter().map(|p| Ok(self.style.format_name(p))))
    }

    fn names_sentence(&self, role: &str) -> Result<Text> {
        sentence([self.names(role)])
    }

    fn date(&self) -> Result<Text> {
        join([join([lit("("), self.field("year"), lit(")")]), lit(". ")])
    }

    /// Sentence-cased title
    fn title(&self, name: &str) -> Result<Text> {
        sentence([self.field(name).map(Text::capitalize)])
    }

    /// Emphasised book title
    fn btitle(&self, name: &str, as_sentence: bool) -> Result<Text> {
        let title = self.field(name).map(Text::emph);
        if as_sentence {
            sentence([title])
        } else {
            title
        }
    }

    fn pages(&self) -> Result<Text> {
        Ok(Text::from_latex(&dashify(self.raw("pages")?.trim())))
    }

    fn editor(&self, as_sentence: bool) -> Result<Text> {
        let editors = self.persons("editor")?;
        let word = if editors.len() > 1 { "editors" } else { "editor" };
        let block = Join::new(", ").apply([self.names("editor"), lit(word)]);
        if as_sentence {
            sentence([block])
        } else {
            block
        }
    }

    fn author_or_editor(&self) -> Result<Text> {
        first_of([optional(self.names_sentence("author")), self.editor(true)])
    }

    fn volume_and_series(&self, as_sentence: bool) -> Result<Text> {
        let (volume, number) = if as_sentence {
            ("Volume", "Number")
        } else {
            ("volume", "number")
        };
        let volume_of_series = optional(words([
            together([lit(volume), self.field("volume")], false),
            optional(words([lit("of"), self.field("series")])),
        ]));
        let number_in_series = optional(words([
            together([lit(number), self.field("number")], false),
            optional(words([lit("in"), self.field("series")])),
        ]));
        let result = first_of([
            volume_of_series,
            number_in_series,
            self.optional_field("series"),
        ]);

        if as_sentence {
            sentence([result]).map(Text::capfirst)
        } else {
            result
        }
    }

    fn edition(&self) -> Result<Text> {
        optional(words([self.field("edition").map(Text::lower), lit("edition")]))
    }

    fn isbn(&self) -> Result<Text> {
        words([lit("ISBN"), self.field("isbn")])
    }

    fn chapter_and_pages(&self) -> Result<Text> {
        Join::new(", ").apply([
            optional(together([lit("chapter"), self.field("chapter")], false)),
            optional(together([lit("pp."), self.pages()], false)),
        ])
    }

    fn volume_and_pages(&self) -> Result<Text> {
        first_of([
            optional(join([
                self.field("volume"),
                optional(join([lit("("), self.field("number"), lit(")")])),
                lit(":"),
                self.pages(),
            ])),
            words([lit("pages"), self.pages()]),
        ])
    }

    fn web_refs(&self) -> Result<Text> {
        sentence([
            optional(join([
                self.url(),
                optional(join([lit(" (visited on "), self.field("urldate"), lit(")")])),
            ])),
            optional(self.eprint()),
            optional(self.pubmed()),
            optional(self.doi()),
        ])
    }

    fn url(&self) -> Result<Text> {
        let url = self.raw_field("url")?;
        words([lit("URL:"), Ok(Text::from(url.as_str()).link(url))])
    }

    fn eprint(&self) -> Result<Text> {
        let eprint = self.raw_field("eprint")?;
        Ok(Text::from(format!("arXiv:{eprint}")).link(format!("https://arxiv.org/abs/{eprint}")))
    }

    fn pubmed(&self) -> Result<Text> {
        let pubmed = self.raw_field("pubmed")?;
        Ok(Text::from(format!("PMID:{pubmed}"))
            .link(format!("https://www.ncbi.nlm.nih.gov/pubmed/{pubmed}")))
    }

    fn doi(&self) -> Result<Text> {
        let doi = self.raw_field("doi")?;
        let url = format!("https://doi.org/{doi}");
        join([lit("DOI: "), Ok(Text::from(doi).link(url))])
    }

    fn note(&self) -> Result<Text> {
        sentence([self.optional_field("note")])
    }
}

fn article(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        cx.names_sentence("author")?,
        cx.date()?,
        cx.title("title")?,
        sentence([cx.field("journal").map(Text::emph), optional(cx.volume_and_pages())])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn book(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        cx.author_or_editor()?,
        cx.date()?,
        cx.btitle("title", true)?,
        cx.volume_and_series(true)?,
        sentence([cx.field("publisher"), cx.optional_field("address"), cx.edition()])?,
        optional(sentence([cx.isbn()]))?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn incollection(cx: &Context<'_>) -> Result<Vec<Text>> {
    let container = sentence([
        optional(cx.editor(false)),
        cx.btitle("booktitle", false),
        cx.volume_and_series(false),
        cx.chapter_and_pages(),
    ]);

    Ok(vec![
        cx.names_sentence("author")?,
        cx.date()?,
        cx.btitle("title", true)?,
        words([lit("In:"), container])?,
        sentence([
            cx.optional_field("publisher"),
            cx.optional_field("address"),
            cx.edition(),
        ])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn manual(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        optional(cx.names_sentence("author"))?,
        cx.date()?,
        cx.btitle("title", true)?,
        sentence([
            cx.optional_field("organization"),
            cx.optional_field("address"),
            cx.edition(),
        ])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn misc(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        optional(cx.names_sentence("author"))?,
        cx.date()?,
        optional(cx.btitle("title", true))?,
        sentence([cx.optional_field("howpublished")])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn phdthesis(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        cx.names_sentence("author")?,
        cx.date()?,
        cx.title("title")?,
        sentence([
            first_of([cx.optional_field("type"), lit("PhD thesis")]),
            cx.field("school"),
            cx.optional_field("address"),
        ])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn techreport(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        cx.names_sentence("author")?,
        cx.date()?,
        cx.title("title")?,
        sentence([
            words([
                first_of([cx.optional_field("type"), lit("Technical Report")]),
                cx.optional_field("number"),
            ]),
            cx.field("institution"),
            cx.optional_field("address"),
        ])?,
        cx.note()?,
        cx.web_refs()?,
    ])
}

fn unpublished(cx: &Context<'_>) -> Result<Vec<Text>> {
    Ok(vec![
        cx.names_sentence("author")?,
        cx.date()?,
        cx.title("title")?,
        sentence([cx.field("note")])?,
        cx.web_refs()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::richtext::Segment;
    use pretty_assertions::assert_eq;

    fn chunks(entry: &Entry<'_>) -> Result<Vec<String>> {
        let style = Style::default();
        let cx = Context::new(&style, entry);
        let template = template_for(entry.entry_type()).ok_or_else(|| cx.missing("type"))?;
        Ok(template(&cx)?
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect())
    }

    fn article() -> Entry<'static> {
        Entry::new(EntryType::Article, "doe2020")
            .with_field("author", "Doe, Jane")
            .with_field("title", "A study of {DNA} Repair")
            .with_field("journal", "Journal of Things")
            .with_field("year", "2020")
    }

    fn volume_and_pages(entry: Entry<'static>) -> String {
        let style = Style::default();
        let cx = Context::new(&style, &entry);
        cx.volume_and_pages().unwrap().to_string()
    }

    #[test]
    fn test_article_chunks() {
        let entry = article()
            .with_field("volume", "5")
            .with_field("pages", "1--10");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec![
                "Doe, Jane.",
                "(2020). ",
                "A study of DNA repair.",
                "Journal of Things, 5:1\u{2013}10.",
            ]
        );
    }

    #[test]
    fn test_article_volume_and_pages() {
        let base = article().with_field("pages", "1-10");
        assert_eq!(volume_and_pages(base.clone().with_field("volume", "5")), "5:1\u{2013}10");
        assert_eq!(
            volume_and_pages(
                base.clone()
                    .with_field("volume", "5")
                    .with_field("number", "2")
            ),
            "5(2):1\u{2013}10"
        );
        assert_eq!(volume_and_pages(base), "pages 1\u{2013}10");
    }

    #[test]
    fn test_journal_is_emphasised() {
        let entry = article();
        let style = Style::default();
        let cx = Context::new(&style, &entry);
        let chunk = &article_chunks(&cx)[3];
        assert_eq!(
            chunk.segments()[0],
            Segment::Emph(Text::from("Journal of Things"))
        );
    }

    fn article_chunks(cx: &Context<'_>) -> Vec<Text> {
        super::article(cx).unwrap()
    }

    #[test]
    fn test_missing_journal_is_reported() {
        let mut entry = article();
        entry.fields.retain(|f| f.name != "journal");
        let err = chunks(&entry).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField { ref field, .. } if field == "journal"
        ));
        assert!(err.to_string().contains("doe2020"));
    }

    #[test]
    fn test_misc_without_author() {
        let entry = Entry::new(EntryType::Misc, "m")
            .with_field("year", "2019")
            .with_field("howpublished", "\\url{https://example.org}");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec!["(2019). ", "https://example.org."]
        );
    }

    #[test]
    fn test_book_falls_back_to_editors() {
        let entry = Entry::new(EntryType::Book, "b")
            .with_field("editor", "Smith, John and Roe, Richard")
            .with_field("title", "Collected Works")
            .with_field("publisher", "Acme")
            .with_field("address", "Berlin")
            .with_field("edition", "Second")
            .with_field("volume", "3")
            .with_field("series", "Lecture Notes")
            .with_field("isbn", "978-3-16")
            .with_field("year", "1999");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec![
                "Smith, John and Roe, Richard, editors.",
                "(1999). ",
                "Collected Works.",
                "Volume\u{a0}3 of Lecture Notes.",
                "Acme, Berlin, second edition.",
                "ISBN 978-3-16.",
            ]
        );
    }

    #[test]
    fn test_book_without_author_or_editor() {
        let entry = Entry::new(EntryType::Book, "b")
            .with_field("title", "T")
            .with_field("publisher", "P")
            .with_field("year", "2000");
        let err = chunks(&entry).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField { ref field, .. } if field == "editor"
        ));
    }

    #[test]
    fn test_incollection() {
        let entry = Entry::new(EntryType::InProceedings, "p")
            .with_field("author", "Ann Lee and Bo Chen and Cy Diaz")
            .with_field("title", "Fast Things")
            .with_field("booktitle", "Proceedings of Stuff")
            .with_field("editor", "Kim, Sun")
            .with_field("pages", "3--9")
            .with_field("year", "2021");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec![
                "Lee, Ann, Chen, Bo, and Diaz, Cy.",
                "(2021). ",
                "Fast Things.",
                "In: Kim, Sun, editor, Proceedings of Stuff, pp.\u{a0}3\u{2013}9.",
            ]
        );
    }

    #[test]
    fn test_series_only() {
        let entry = Entry::new(EntryType::Book, "b")
            .with_field("author", "Doe, Jane")
            .with_field("series", "lecture notes")
            .with_field("number", "7");
        let style = Style::default();
        let cx = Context::new(&style, &entry);
        assert_eq!(
            cx.volume_and_series(true).unwrap().to_string(),
            "Number\u{a0}7 in lecture notes."
        );
        assert_eq!(
            cx.volume_and_series(false).unwrap().to_string(),
            "number\u{a0}7 in lecture notes"
        );

        let entry = Entry::new(EntryType::Book, "b").with_field("series", "lecture notes");
        let cx = Context::new(&style, &entry);
        assert_eq!(
            cx.volume_and_series(true).unwrap().to_string(),
            "Lecture notes."
        );
    }

    #[test]
    fn test_thesis_and_report_defaults() {
        let thesis = Entry::new(EntryType::PhdThesis, "t")
            .with_field("author", "Doe, Jane")
            .with_field("title", "On Things")
            .with_field("school", "MIT")
            .with_field("year", "2010");
        assert_eq!(chunks(&thesis).unwrap()[3], "PhD thesis, MIT.");

        let report = Entry::new(EntryType::TechReport, "r")
            .with_field("author", "Doe, Jane")
            .with_field("title", "On Things")
            .with_field("institution", "CERN")
            .with_field("number", "42")
            .with_field("year", "2010");
        assert_eq!(chunks(&report).unwrap()[3], "Technical Report 42, CERN.");
    }

    #[test]
    fn test_incollection_chapter_without_pages() {
        let entry = Entry::new(EntryType::InCollection, "c")
            .with_field("author", "Doe, Jane")
            .with_field("title", "T")
            .with_field("booktitle", "Book")
            .with_field("chapter", "3")
            .with_field("year", "2000");
        assert_eq!(chunks(&entry).unwrap()[3], "In: Book, chapter\u{a0}3.");

        let mut bare = entry;
        bare.fields.retain(|f| f.name != "chapter");
        assert_eq!(
            chunks(&bare).unwrap(),
            vec!["Doe, Jane.", "(2000). ", "T.", "In: Book."]
        );
    }

    #[test]
    fn test_manual() {
        let entry = Entry::new(EntryType::Manual, "man")
            .with_field("title", "Guide")
            .with_field("organization", "ACME")
            .with_field("year", "2000");
        assert_eq!(chunks(&entry).unwrap(), vec!["(2000). ", "Guide.", "ACME."]);

        let entry = entry
            .with_field("author", "Doe, Jane")
            .with_field("address", "Oslo")
            .with_field("edition", "Third");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec!["Doe, Jane.", "(2000). ", "Guide.", "ACME, Oslo, third edition."]
        );
    }

    #[test]
    fn test_unpublished() {
        let entry = Entry::new(EntryType::Unpublished, "u")
            .with_field("author", "Doe, Jane")
            .with_field("title", "Draft Notes")
            .with_field("note", "In preparation")
            .with_field("year", "2001");
        assert_eq!(
            chunks(&entry).unwrap(),
            vec!["Doe, Jane.", "(2001). ", "Draft notes.", "In preparation."]
        );
    }

    #[test]
    fn test_explicit_type_overrides_default() {
        let thesis = Entry::new(EntryType::PhdThesis, "t")
            .with_field("author", "Doe, Jane")
            .with_field("title", "On Things")
            .with_field("school", "MIT")
            .with_field("type", "Habilitation")
            .with_field("year", "2010");
        assert_eq!(chunks(&thesis).unwrap()[3], "Habilitation, MIT.");

        let report = Entry::new(EntryType::TechReport, "r")
            .with_field("author", "Doe, Jane")
            .with_field("title", "On Things")
            .with_field("institution", "CERN")
            .with_field("year", "2010");
        assert_eq!(chunks(&report).unwrap()[3], "Technical Report, CERN.");

        let memo = report.with_field("type", "Memo");
        assert_eq!(chunks(&memo).unwrap()[3], "Memo, CERN.");
    }

    #[test]
    fn test_undefined_macro_names_the_macro() {
        let entry = article().with_field("publisher", Value::Variable(Cow::Borrowed("acm")));
        let mut broken = entry.clone();
        for field in &mut broken.fields {
            if field.name == "journal" {
                field.value = Value::Variable(Cow::Borrowed("jacm"));
            }
        }

        let style = Style::default();
        assert!(matches!(
            style.format_entry(&broken).unwrap_err(),
            Error::UndefinedVariable { ref field, ref name, .. }
                if field == "journal" && name == "jacm"
        ));

        // Optional fields holding an undefined macro are skipped.
        let cx = Context::new(&style, &entry);
        assert!(cx.optional_field("publisher").unwrap().is_empty());
    }

    #[test]
    fn test_web_refs() {
        let entry = Entry::new(EntryType::Misc, "w")
            .with_field("year", "2020")
            .with_field("url", "https://example.org")
            .with_field("urldate", "2021-01-01")
            .with_field("eprint", "2101.00001")
            .with_field("doi", "10.1000/xyz");
        let style = Style::default();
        let cx = Context::new(&style, &entry);
        let refs = cx.web_refs().unwrap();
        assert_eq!(
            refs.to_string(),
            "URL: https://example.org (visited on 2021-01-01), arXiv:2101.00001, DOI: 10.1000/xyz."
        );
        assert!(refs.segments().contains(&Segment::Link {
            url: "https://doi.org/10.1000/xyz".to_string(),
            text: Text::from("10.1000/xyz"),
        }));
    }

    #[test]
    fn test_custom_type_has_no_template() {
        assert!(template_for(&EntryType::Custom(Cow::Borrowed("patent"))).is_none());
        assert!(template_for(&EntryType::InProceedings).is_some());
    }
}
