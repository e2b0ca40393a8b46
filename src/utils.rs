//! Text helpers shared by the resolver and the field extractor.
//!
//! The devotional pages pad most text nodes with newlines and the Unicode
//! paragraph separator (U+2029), so everything taken out of a document goes
//! through [`trim_odb`] before it reaches a [`Post`](crate::models::Post).

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Characters stripped from both ends of every extracted string.
pub const TRIM_CHARS: [char; 4] = [' ', '\t', '\n', '\u{2029}'];

/// A `<br>` tag in any of its spellings, with the whitespace and paragraph
/// separators around it.
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[ \t\r\n\x{2029}]*<br\s*/?>[ \t\r\n\x{2029}]*")
        .expect("invalid regex: line break")
});

/// Trim [`TRIM_CHARS`] from both ends of `s`.
///
/// # Examples
///
/// ```
/// use odb_fetch::utils::trim_odb;
/// assert_eq!(trim_odb("\u{2029}\n  Hello\t"), "Hello");
/// ```
pub fn trim_odb(s: &str) -> &str {
    s.trim_matches(&TRIM_CHARS[..])
}

/// Split `s` at the first occurrence of `delimiter`.
///
/// # Returns
///
/// The text before the delimiter and the text after it. When the delimiter
/// does not occur the whole input is the token and the remainder is empty.
///
/// # Examples
///
/// ```
/// use odb_fetch::utils::split_token;
/// assert_eq!(split_token("a | b | c", " | "), ("a", "b | c"));
/// assert_eq!(split_token("abc", " | "), ("abc", ""));
/// ```
pub fn split_token<'a>(s: &'a str, delimiter: &str) -> (&'a str, &'a str) {
    if delimiter.is_empty() {
        return (s, "");
    }
    s.split_once(delimiter).unwrap_or((s, ""))
}

/// Pull the daily citation out of a combined citation box.
///
/// The box reads like `"Read: John 3:16 | Bible in a Year: Gen 1"`.
///
/// # Arguments
///
/// * `text` - Raw text of the citation box; it is trimmed first.
/// * `prefix` - The edition's opening label, e.g. `"Read: "` or `"经文："`.
/// * `delimiter` - Separator before the reading-plan citation.
///
/// # Returns
///
/// The trimmed text between `prefix` and the first `delimiter`, or an empty
/// string when `text` does not start with `prefix`.
///
/// # Examples
///
/// ```
/// use odb_fetch::utils::split_citation;
///
/// let box_text = "经文：约翰福音3:16-18 | 全年读经：创世记1-3";
/// assert_eq!(split_citation(box_text, "经文：", " | 全年读经："), "约翰福音3:16-18");
/// assert_eq!(split_citation(box_text, "Read: ", " | "), "");
/// ```
pub fn split_citation(text: &str, prefix: &str, delimiter: &str) -> String {
    let text = trim_odb(text);
    match text.strip_prefix(prefix) {
        Some(rest) => {
            let (citation, _plan) = split_token(rest, delimiter);
            trim_odb(citation).to_string()
        }
        None => String::new(),
    }
}

/// Split an HTML fragment into lines at every `<br>` tag.
///
/// `<br>`, `<br/>` and `<br />` in any case all count, together with the
/// spaces, newlines and U+2029 separators around them.
///
/// # Arguments
///
/// * `html` - Inner HTML of the poem box.
///
/// # Returns
///
/// The trimmed lines in order, still as markup. Lines left empty, such as
/// the gap made by two adjacent `<br>` tags, are dropped.
///
/// # Examples
///
/// ```
/// use odb_fetch::utils::split_lines;
///
/// let lines = split_lines("\n  First line<br/>\u{2029}Second <em>line</em><BR><br />");
/// assert_eq!(lines, vec!["First line", "Second <em>line</em>"]);
/// ```
pub fn split_lines(html: &str) -> Vec<String> {
    LINE_BREAK_RE
        .split(html)
        .map(trim_odb)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flatten a markup fragment to its text, decoding entities and dropping
/// inline tags.
///
/// # Examples
///
/// ```
/// use odb_fetch::utils::markup_text;
/// assert_eq!(markup_text("Faith &amp; <em>hope</em>"), "Faith & hope");
/// ```
pub fn markup_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<String>();
    trim_odb(&text).to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes on a character boundary with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}
