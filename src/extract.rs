//! Field extraction from a post page.
//!
//! Every lookup is best-effort: a selector that matches nothing leaves its
//! field empty. Only selectors that fail to compile are errors, and those
//! surface when the [`Extractor`] is built, not per page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::config::Edition;
use crate::error::OdbError;
use crate::utils::{markup_text, split_citation, split_lines, trim_odb, truncate_for_log};

/// Fields taken from a post page, before the citation is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub title: String,
    pub bible_verse: String,
    pub golden_verse: String,
    pub passages: Vec<String>,
    pub poem: Vec<String>,
    pub thought: String,
}

/// Compiled selectors plus the citation conventions of one edition.
#[derive(Debug, Clone)]
pub struct Extractor {
    title: Selector,
    golden_verse: Selector,
    golden_verse_index: usize,
    citation: Selector,
    citation_index: usize,
    passages: Selector,
    poem: Selector,
    thought: Selector,
    citation_prefix: String,
    plan_delimiter: String,
}

pub(crate) fn compile(field: &'static str, selector: &str) -> Result<Selector, OdbError> {
    Selector::parse(selector).map_err(|e| OdbError::Selector {
        field,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Trimmed text of an element and all its descendants.
fn element_text(element: ElementRef<'_>) -> String {
    trim_odb(&element.text().collect::<String>()).to_string()
}

fn first_text(document: &Html, selector: &Selector) -> String {
    nth_text(document, selector, 0)
}

/// Text of the `index`-th match, empty when there are fewer matches.
fn nth_text(document: &Html, selector: &Selector, index: usize) -> String {
    document
        .select(selector)
        .nth(index)
        .map(element_text)
        .unwrap_or_default()
}

impl Extractor {
    pub fn new(edition: &Edition) -> Result<Self, OdbError> {
        let s = &edition.selectors;
        Ok(Self {
            title: compile("title", &s.title)?,
            golden_verse: compile("golden_verse", &s.golden_verse)?,
            golden_verse_index: s.golden_verse_index,
            citation: compile("citation", &s.citation)?,
            citation_index: s.citation_index,
            passages: compile("passages", &s.passages)?,
            poem: compile("poem", &s.poem)?,
            thought: compile("thought", &s.thought)?,
            citation_prefix: edition.citation_prefix.clone(),
            plan_delimiter: edition.plan_delimiter.clone(),
        })
    }

    /// Pull every field out of `document`.
    ///
    /// Never fails. A selector with no match, or fewer matches than its
    /// configured index, leaves its field empty.
    ///
    /// # Returns
    ///
    /// The trimmed [`Fields`]; `bible_verse` is the citation with the
    /// edition prefix and reading-plan suffix removed.
    #[instrument(level = "debug", skip_all)]
    pub fn extract(&self, document: &Html) -> Fields {
        let citation_box = nth_text(document, &self.citation, self.citation_index);
        let bible_verse = split_citation(&citation_box, &self.citation_prefix, &self.plan_delimiter);
        if bible_verse.is_empty() && !citation_box.is_empty() {
            debug!(
                citation_box = %truncate_for_log(&citation_box, 120),
                "Citation box does not start with the edition prefix"
            );
        }

        let passages: Vec<String> = document
            .select(&self.passages)
            .map(element_text)
            .filter(|p| !p.is_empty())
            .collect();

        let poem = document
            .select(&self.poem)
            .next()
            .map(|el| {
                split_lines(&el.inner_html())
                    .iter()
                    .map(|line| markup_text(line))
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let fields = Fields {
            title: first_text(document, &self.title),
            bible_verse,
            golden_verse: nth_text(document, &self.golden_verse, self.golden_verse_index),
            passages,
            poem,
            thought: first_text(document, &self.thought),
        };
        debug!(
            title = %fields.title,
            passages = fields.passages.len(),
            poem_lines = fields.poem.len(),
            "Extracted fields"
        );
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Language, Selectors};
    use pretty_assertions::assert_eq;

    const POST_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<article>
  <h2 class="entry-title">
  &#8233;Hope in the Dark&#8233;
  </h2>
  <div class="entry-content">
    <div class="side-box">
      <div class="meta-box">Read: Psalm 23:1-6 | Bible in a Year: Genesis 1-3</div>
      <div class="meta-box">&#8233;The Lord is my shepherd, I lack nothing. Psalm 23:1</div>
    </div>
    <p>First paragraph.</p>
    <p>  </p>
    <p>Second <em>paragraph</em>.&#8233;</p>
    <div class="aside"><p>Not a passage.</p></div>
    <div class="poem-box">
      Through valleys deep<br/>
      &#8233;He leads me on<br>
      <br />
      Faith &amp; hope remain
    </div>
    <div class="thought-box">
      The Shepherd walks ahead of us.
    </div>
  </div>
</article>
</body></html>"#;

    fn english() -> Extractor {
        Extractor::new(&Edition::builtin(Language::English)).unwrap()
    }

    #[test]
    fn test_extract_all_fields() {
        let doc = Html::parse_document(POST_HTML);
        let fields = english().extract(&doc);
        assert_eq!(
            fields,
            Fields {
                title: "Hope in the Dark".to_string(),
                bible_verse: "Psalm 23:1-6".to_string(),
                golden_verse: "The Lord is my shepherd, I lack nothing. Psalm 23:1".to_string(),
                passages: vec![
                    "First paragraph.".to_string(),
                    "Second paragraph.".to_string(),
                ],
                poem: vec![
                    "Through valleys deep".to_string(),
                    "He leads me on".to_string(),
                    "Faith & hope remain".to_string(),
                ],
                thought: "The Shepherd walks ahead of us.".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = Html::parse_document(POST_HTML);
        let extractor = english();
        assert_eq!(extractor.extract(&doc), extractor.extract(&doc));
    }

    #[test]
    fn test_missing_nodes_degrade_to_empty() {
        let doc = Html::parse_document(
            r#"<html><body><h2 class="entry-title">Only a title</h2></body></html>"#,
        );
        let fields = english().extract(&doc);
        assert_eq!(fields.title, "Only a title");
        assert_eq!(fields.bible_verse, "");
        assert_eq!(fields.golden_verse, "");
        assert!(fields.passages.is_empty());
        assert!(fields.poem.is_empty());
        assert_eq!(fields.thought, "");
    }

    #[test]
    fn test_wrong_language_prefix_gives_empty_citation() {
        let doc = Html::parse_document(POST_HTML);
        let extractor = Extractor::new(&Edition::builtin(Language::SimplifiedChinese)).unwrap();
        let fields = extractor.extract(&doc);
        assert_eq!(fields.bible_verse, "");
        assert_eq!(fields.title, "Hope in the Dark");
    }

    #[test]
    fn test_chinese_citation_box() {
        let doc = Html::parse_document(
            r#"<div class="entry-content"><div class="side-box"><div class="meta-box">經文：約翰福音3:16-18 | 全年讀經：創世記1-3</div></div></div>"#,
        );
        let extractor = Extractor::new(&Edition::builtin(Language::TraditionalChinese)).unwrap();
        assert_eq!(extractor.extract(&doc).bible_verse, "約翰福音3:16-18");
    }

    #[test]
    fn test_single_meta_box_leaves_golden_verse_empty() {
        let doc = Html::parse_document(
            r#"<div class="entry-content"><div class="side-box"><div class="meta-box">Read: Ruth 1:1-5 | Bible in a Year: Job 1</div></div></div>"#,
        );
        let fields = english().extract(&doc);
        assert_eq!(fields.bible_verse, "Ruth 1:1-5");
        assert_eq!(fields.golden_verse, "");
    }

    #[test]
    fn test_custom_selectors_and_index() {
        let mut edition = Edition::builtin(Language::English);
        edition.selectors = Selectors {
            citation: ".passage".to_string(),
            golden_verse: ".verse".to_string(),
            golden_verse_index: 0,
            ..Selectors::default()
        };
        let doc = Html::parse_document(
            r#"<div class="passage">Read: Mark 1:1</div><div class="verse">In the beginning.</div>"#,
        );
        let fields = Extractor::new(&edition).unwrap().extract(&doc);
        assert_eq!(fields.bible_verse, "Mark 1:1");
        assert_eq!(fields.golden_verse, "In the beginning.");
    }

    #[test]
    fn test_invalid_selector_rejected_at_construction() {
        let mut edition = Edition::builtin(Language::English);
        edition.selectors = Selectors {
            poem: "div[".to_string(),
            ..Selectors::default()
        };
        match Extractor::new(&edition).unwrap_err() {
            OdbError::Selector { field, selector, .. } => {
                assert_eq!(field, "poem");
                assert_eq!(selector, "div[");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
