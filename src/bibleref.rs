//! Scripture citation parsing.
//!
//! [`ReferenceParser`] is the seam between field extraction and whatever
//! understands citation grammar. [`ChineseReferenceParser`] handles the
//! Chinese Union Version style used by the Chinese editions, e.g.
//! `约翰福音3:16-18`, `詩篇 23` or `罗马书5:1-5；8:28`. English citations
//! do not match its grammar and parse to `None`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A chapter with an optional verse. `verse == None` means the whole chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersePoint {
    pub chapter: u32,
    pub verse: Option<u32>,
}

/// An inclusive range of verses within one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerseRange {
    /// Canonical book number, 1 (Genesis) to 66 (Revelation).
    pub book: u8,
    pub start: VersePoint,
    pub end: VersePoint,
}

impl VerseRange {
    pub fn book_name(&self) -> &'static str {
        ENGLISH_BOOK_NAMES[usize::from(self.book) - 1]
    }
}

impl fmt::Display for VerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book_name(), self.start.chapter)?;
        if let Some(v) = self.start.verse {
            write!(f, ":{}", v)?;
        }
        if self.end == self.start {
            return Ok(());
        }
        match (self.end.chapter == self.start.chapter, self.end.verse) {
            (true, Some(v)) => write!(f, "-{}", v),
            (false, Some(v)) => write!(f, "-{}:{}", self.end.chapter, v),
            (_, None) => write!(f, "-{}", self.end.chapter),
        }
    }
}

/// Turns a citation string into verse ranges.
///
/// Returns `None` when the text does not conform to the parser's grammar.
/// Implementations never return a partial result.
pub trait ReferenceParser {
    fn parse(&self, citation: &str) -> Option<Vec<VerseRange>>;
}

/// Parser for Chinese Union Version citations in simplified or traditional
/// script, with full book names or standard abbreviations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChineseReferenceParser;

/// Book names and abbreviations, simplified and traditional. Index + 1 is
/// the canonical book number.
static CHINESE_BOOK_NAMES: [&[&str]; 66] = [
    &["创世记", "創世記", "创", "創"],
    &["出埃及记", "出埃及記", "出"],
    &["利未记", "利未記", "利"],
    &["民数记", "民數記", "民"],
    &["申命记", "申命記", "申"],
    &["约书亚记", "約書亞記", "书", "書"],
    &["士师记", "士師記", "士"],
    &["路得记", "路得記", "得"],
    &["撒母耳记上", "撒母耳記上", "撒上"],
    &["撒母耳记下", "撒母耳記下", "撒下"],
    &["列王纪上", "列王紀上", "王上"],
    &["列王纪下", "列王紀下", "王下"],
    &["历代志上", "歷代志上", "代上"],
    &["历代志下", "歷代志下", "代下"],
    &["以斯拉记", "以斯拉記", "拉"],
    &["尼希米记", "尼希米記", "尼"],
    &["以斯帖记", "以斯帖記", "斯"],
    &["约伯记", "約伯記", "伯"],
    &["诗篇", "詩篇", "诗", "詩"],
    &["箴言", "箴"],
    &["传道书", "傳道書", "传", "傳"],
    &["雅歌", "歌"],
    &["以赛亚书", "以賽亞書", "赛", "賽"],
    &["耶利米书", "耶利米書", "耶"],
    &["耶利米哀歌", "哀"],
    &["以西结书", "以西結書", "结", "結"],
    &["但以理书", "但以理書", "但"],
    &["何西阿书", "何西阿書", "何"],
    &["约珥书", "約珥書", "珥"],
    &["阿摩司书", "阿摩司書", "摩"],
    &["俄巴底亚书", "俄巴底亞書", "俄"],
    &["约拿书", "約拿書", "拿"],
    &["弥迦书", "彌迦書", "弥", "彌"],
    &["那鸿书", "那鴻書", "鸿", "鴻"],
    &["哈巴谷书", "哈巴谷書", "哈"],
    &["西番雅书", "西番雅書", "番"],
    &["哈该书", "哈該書", "该", "該"],
    &["撒迦利亚书", "撒迦利亞書", "亚", "亞"],
    &["玛拉基书", "瑪拉基書", "玛", "瑪"],
    &["马太福音", "馬太福音", "太"],
    &["马可福音", "馬可福音", "可"],
    &["路加福音", "路"],
    &["约翰福音", "約翰福音", "约", "約"],
    &["使徒行传", "使徒行傳", "徒"],
    &["罗马书", "羅馬書", "罗", "羅"],
    &["哥林多前书", "哥林多前書", "林前"],
    &["哥林多后书", "哥林多後書", "林后", "林後"],
    &["加拉太书", "加拉太書", "加"],
    &["以弗所书", "以弗所書", "弗"],
    &["腓立比书", "腓立比書", "腓"],
    &["歌罗西书", "歌羅西書", "西"],
    &["帖撒罗尼迦前书", "帖撒羅尼迦前書", "帖前"],
    &["帖撒罗尼迦后书", "帖撒羅尼迦後書", "帖后", "帖後"],
    &["提摩太前书", "提摩太前書", "提前"],
    &["提摩太后书", "提摩太後書", "提后", "提後"],
    &["提多书", "提多書", "多"],
    &["腓利门书", "腓利門書", "门", "門"],
    &["希伯来书", "希伯來書", "来", "來"],
    &["雅各书", "雅各書", "雅"],
    &["彼得前书", "彼得前書", "彼前"],
    &["彼得后书", "彼得後書", "彼后", "彼後"],
    &["约翰一书", "約翰一書", "约一", "約一"],
    &["约翰二书", "約翰二書", "约二", "約二"],
    &["约翰三书", "約翰三書", "约三", "約三"],
    &["犹大书", "猶大書", "犹", "猶"],
    &["启示录", "啟示錄", "启", "啟"],
];

static ENGLISH_BOOK_NAMES: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Songs", "Isaiah",
    "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos", "Obadiah", "Jonah",
    "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah", "Malachi", "Matthew",
    "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians", "Galatians",
    "Ephesians", "Philippians", "Colossians", "1 Thessalonians", "2 Thessalonians", "1 Timothy",
    "2 Timothy", "Titus", "Philemon", "Hebrews", "James", "1 Peter", "2 Peter", "1 John",
    "2 John", "3 John", "Jude", "Revelation",
];

/// Every name paired with its book number, longest names first so that
/// `约翰福音` wins over `约` and `歌罗西书` over `歌`.
static BOOK_LOOKUP: Lazy<Vec<(&'static str, u8)>> = Lazy::new(|| {
    let mut names: Vec<(&'static str, u8)> = CHINESE_BOOK_NAMES
        .iter()
        .enumerate()
        .flat_map(|(i, names)| names.iter().map(move |n| (*n, (i + 1) as u8)))
        .collect();
    names.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    names
});

/// `chapter[:verse][-[chapter:]verse]`, accepting full-width colons and the
/// usual dash variants.
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:[:：](\d+))?(?:[-–—~～至](?:(\d+)[:：])?(\d+))?$")
        .expect("invalid regex: verse range")
});

/// A bare verse or verse span continuing the previous chapter, as in the
/// `18` of `3:16,18`.
static VERSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:[-–—~～至](\d+))?$").expect("invalid regex: verse list"));

fn match_book(text: &str) -> Option<(u8, &str)> {
    BOOK_LOOKUP
        .iter()
        .find_map(|(name, book)| text.strip_prefix(name).map(|rest| (*book, rest)))
}

fn number(caps: &regex::Captures<'_>, i: usize) -> Option<Option<u32>> {
    match caps.get(i) {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

fn parse_range(book: u8, text: &str) -> Option<VerseRange> {
    let caps = RANGE_RE.captures(text)?;
    let chapter = number(&caps, 1)??;
    let verse = number(&caps, 2)?;
    let end_chapter = number(&caps, 3)?;
    let end = number(&caps, 4)?;

    let start = VersePoint { chapter, verse };
    let end = match (verse, end_chapter, end) {
        (_, _, None) => start,
        // 3-5: chapters 3 through 5
        (None, None, Some(c)) => VersePoint { chapter: c, verse: None },
        // 3-4:2 has no start verse to pair with the end verse
        (None, Some(_), Some(_)) => return None,
        (Some(_), None, Some(v)) => VersePoint { chapter, verse: Some(v) },
        (Some(_), Some(c), Some(v)) => VersePoint { chapter: c, verse: Some(v) },
    };
    if (end.chapter, end.verse) < (start.chapter, start.verse) {
        return None;
    }
    Some(VerseRange { book, start, end })
}

fn parse_verses(book: u8, chapter: u32, text: &str) -> Option<VerseRange> {
    let caps = VERSE_RE.captures(text)?;
    let first = number(&caps, 1)??;
    let last = number(&caps, 2)?.unwrap_or(first);
    if last < first {
        return None;
    }
    Some(VerseRange {
        book,
        start: VersePoint { chapter, verse: Some(first) },
        end: VersePoint { chapter, verse: Some(last) },
    })
}

impl ReferenceParser for ChineseReferenceParser {
    fn parse(&self, citation: &str) -> Option<Vec<VerseRange>> {
        let compact: String = citation.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }

        let mut ranges = Vec::new();
        let mut book: Option<u8> = None;
        for group in compact.split(['；', ';']) {
            let (group_book, rest) = match match_book(group) {
                Some((b, rest)) => (b, rest),
                None => (book?, group),
            };
            book = Some(group_book);

            let mut parts = rest.split(['，', ',', '、']);
            let first = parse_range(group_book, parts.next()?)?;
            let mut chapter = first.end.chapter;
            ranges.push(first);
            for part in parts {
                let range = if part.contains([':', '：']) {
                    parse_range(group_book, part)?
                } else if first.start.verse.is_some() {
                    parse_verses(group_book, chapter, part)?
                } else {
                    parse_range(group_book, part)?
                };
                chapter = range.end.chapter;
                ranges.push(range);
            }
        }
        Some(ranges)
    }
}
