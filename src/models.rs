//! The post record returned to callers.
//!
//! A [`Post`] is built once per successful pipeline run by
//! [`Post::assemble`] and never changes afterwards; all fields are read-only
//! through accessors. Serialization uses camelCase keys (`bibleVerse`,
//! `goldenVerse`, ...) for the CLI's JSON output.

use serde::Serialize;

use crate::bibleref::{ReferenceParser, VerseRange};
use crate::extract::Fields;

/// A devotional post for one date and edition.
///
/// `year`, `month` and `day` are the requested date. The page itself is not
/// checked against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    year: i32,
    month: u32,
    day: u32,
    url: String,
    title: String,
    bible_verse: String,
    bible_verse_ref: Vec<VerseRange>,
    golden_verse: String,
    passages: Vec<String>,
    poem: Vec<String>,
    thought: String,
}

impl Post {
    /// Combine the requested date, the resolved URL and the extracted
    /// fields. The citation is handed to `parser`; when it does not parse,
    /// `bible_verse_ref` stays empty.
    pub fn assemble<P: ReferenceParser + ?Sized>(
        (year, month, day): (i32, u32, u32),
        url: String,
        fields: Fields,
        parser: &P,
    ) -> Self {
        let bible_verse_ref = if fields.bible_verse.is_empty() {
            Vec::new()
        } else {
            match parser.parse(&fields.bible_verse) {
                Some(ranges) => ranges,
                None => {
                    tracing::debug!(citation = %fields.bible_verse, "Citation did not parse");
                    Vec::new()
                }
            }
        };
        Self {
            year,
            month,
            day,
            url,
            title: fields.title,
            bible_verse: fields.bible_verse,
            bible_verse_ref,
            golden_verse: fields.golden_verse,
            passages: fields.passages,
            poem: fields.poem,
            thought: fields.thought,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Address of the page the content was taken from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The day's citation, e.g. `"John 3:16"`.
    pub fn bible_verse(&self) -> &str {
        &self.bible_verse
    }

    /// Parsed form of [`bible_verse`](Self::bible_verse). Empty when the
    /// citation was missing or not understood.
    pub fn bible_verse_ref(&self) -> &[VerseRange] {
        &self.bible_verse_ref
    }

    pub fn golden_verse(&self) -> &str {
        &self.golden_verse
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn poem(&self) -> &[String] {
        &self.poem
    }

    pub fn thought(&self) -> &str {
        &self.thought
    }

    /// True when every field carries data.
    pub fn is_complete(&self) -> bool {
        !(self.url.is_empty()
            || self.title.is_empty()
            || self.bible_verse.is_empty()
            || self.golden_verse.is_empty()
            || self.passages.is_empty()
            || self.poem.is_empty()
            || self.thought.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibleref::{ChineseReferenceParser, VersePoint};
    use pretty_assertions::assert_eq;

    fn fields(bible_verse: &str) -> Fields {
        Fields {
            title: "Title".to_string(),
            bible_verse: bible_verse.to_string(),
            golden_verse: "Golden".to_string(),
            passages: vec!["One".to_string(), "Two".to_string()],
            poem: vec!["Line".to_string()],
            thought: "Thought".to_string(),
        }
    }

    /// Parser that must not be consulted.
    struct Unreachable;

    impl ReferenceParser for Unreachable {
        fn parse(&self, citation: &str) -> Option<Vec<VerseRange>> {
            panic!("parser called with {citation:?}");
        }
    }

    #[test]
    fn test_assemble_parses_chinese_citation() {
        let post = Post::assemble(
            (2024, 1, 1),
            "https://simplified-odb.org/2024/01/01/post/".to_string(),
            fields("约翰福音3:16"),
            &ChineseReferenceParser,
        );
        assert_eq!(
            post.bible_verse_ref(),
            &[VerseRange {
                book: 43,
                start: VersePoint { chapter: 3, verse: Some(16) },
                end: VersePoint { chapter: 3, verse: Some(16) },
            }]
        );
        assert!(post.is_complete());
    }

    #[test]
    fn test_assemble_leaves_ref_empty_on_no_match() {
        let post = Post::assemble(
            (2024, 1, 1),
            "https://odb.org/2024/01/01/post/".to_string(),
            fields("John 3:16"),
            &ChineseReferenceParser,
        );
        assert_eq!(post.bible_verse(), "John 3:16");
        assert!(post.bible_verse_ref().is_empty());
    }

    #[test]
    fn test_assemble_skips_parser_for_empty_citation() {
        let post = Post::assemble(
            (2024, 1, 1),
            "https://odb.org/".to_string(),
            fields(""),
            &Unreachable,
        );
        assert!(post.bible_verse_ref().is_empty());
        assert!(!post.is_complete());
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = Post::assemble(
            (2024, 1, 2),
            "https://odb.org/x/".to_string(),
            fields("John 3:16"),
            &ChineseReferenceParser,
        );
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["bibleVerse"], "John 3:16");
        assert_eq!(json["goldenVerse"], "Golden");
        assert_eq!(json["bibleVerseRef"], serde_json::json!([]));
        assert_eq!(json["day"], 2);
    }
}
