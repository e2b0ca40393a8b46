//! # odb_fetch
//!
//! Fetch the *Our Daily Bread* devotional for a date and language edition
//! and extract it into a typed [`Post`].
//!
//! ## Pipeline
//!
//! 1. **Resolve**: turn the date into the post page, through the monthly
//!    calendar or the site's date redirect ([`resolve`])
//! 2. **Fetch**: GET and parse the page ([`fetch`])
//! 3. **Extract**: pull title, citation, verse, passages, poem and thought
//!    out of the markup ([`extract`])
//! 4. **Parse reference**: turn the citation into verse ranges ([`bibleref`])
//! 5. **Assemble**: build the immutable [`Post`]
//!
//! ## Usage
//!
//! ```no_run
//! use odb_fetch::{Language, Odb};
//!
//! # async fn run() -> Result<(), odb_fetch::OdbError> {
//! let odb = Odb::new(Language::SimplifiedChinese)?;
//! let post = odb.get_post(2024, 1, 1).await?;
//! println!("{} ({})", post.title(), post.bible_verse());
//! # Ok(())
//! # }
//! ```

pub mod bibleref;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod resolve;
pub mod utils;

use tracing::{info, instrument, warn};

pub use bibleref::{ChineseReferenceParser, ReferenceParser, VersePoint, VerseRange};
pub use config::{Config, Edition, Language, Selectors, Strategy};
pub use error::OdbError;
pub use fetch::{RawResponse, Transport};
pub use models::Post;

use extract::Extractor;
use resolve::{PostDate, ResolveDate, Resolver};

/// Accessor for one language edition of the site.
///
/// Holds only fixed configuration and a reusable transport, so a single
/// instance can serve several `get_post` calls at once.
#[derive(Debug, Clone)]
pub struct Odb<T = reqwest::Client, P = ChineseReferenceParser> {
    edition: Edition,
    resolver: Resolver,
    extractor: Extractor,
    transport: T,
    parser: P,
}

impl Odb {
    /// Accessor with the built-in configuration for `language`.
    pub fn new(language: Language) -> Result<Self, OdbError> {
        Self::from_config(&Config::default(), language)
    }

    /// Accessor for `language` using the edition and HTTP settings in
    /// `config`.
    pub fn from_config(config: &Config, language: Language) -> Result<Self, OdbError> {
        let client = config.http_client()?;
        Self::with_transport(config.edition(language), client)
    }
}

impl<T: Transport + Sync> Odb<T> {
    /// Accessor over a caller-supplied transport.
    pub fn with_transport(edition: Edition, transport: T) -> Result<Self, OdbError> {
        Self::with_parts(edition, transport, ChineseReferenceParser)
    }
}

impl<T: Transport + Sync, P: ReferenceParser + Sync> Odb<T, P> {
    /// Accessor over a caller-supplied transport and reference parser.
    pub fn with_parts(edition: Edition, transport: T, parser: P) -> Result<Self, OdbError> {
        Ok(Self {
            resolver: Resolver::for_edition(&edition)?,
            extractor: Extractor::new(&edition)?,
            edition,
            transport,
            parser,
        })
    }

    pub fn edition(&self) -> &Edition {
        &self.edition
    }

    /// Fetch and extract the post for a date.
    ///
    /// Fails on transport errors, rejected statuses, unparseable bodies,
    /// dates missing from the monthly listing and impossible dates. Missing
    /// page sections are not failures; they leave their fields empty.
    #[instrument(level = "info", skip(self), fields(language = %self.edition.language))]
    pub async fn get_post(&self, year: i32, month: u32, day: u32) -> Result<Post, OdbError> {
        let date = PostDate::new(year, month, day)?;
        let page = self.resolver.resolve(&self.transport, date).await?;
        let fields = self.extractor.extract(&page.document);
        if fields.title.is_empty() {
            warn!(url = %page.url, "Post page has no title; check the title selector");
        }
        let post = Post::assemble((year, month, day), page.url, fields, &self.parser);
        info!(
            url = %post.url(),
            title = %post.title(),
            verse_ranges = post.bible_verse_ref().len(),
            "Fetched post"
        );
        Ok(post)
    }
}
