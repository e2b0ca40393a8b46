//! Per-edition site configuration.
//!
//! Each language edition of the site lives on its own domain, phrases the
//! citation box in its own language and, depending on which revision of the
//! site it runs, resolves dates either through a monthly listing or through
//! a redirecting date URL. All of that is data in an [`Edition`]; adding an
//! edition is a change to [`Edition::builtin`] or to the YAML config file,
//! never to the extraction code.
//!
//! # Config file
//!
//! ```yaml
//! user_agent: "odb_fetch/0.2"
//! timeout_secs: 20
//! editions:
//!   - language: zh-hans
//!     base_url: "https://simplified-odb.org"
//!     citation_prefix: "经文："
//!     plan_delimiter: " | 全年读经："
//!     strategy: redirect
//!     selectors:
//!       thought: ".devo-thought"
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::OdbError;

/// Language editions of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[serde(rename = "en")]
    #[value(name = "en")]
    English,
    #[serde(rename = "zh-hans")]
    #[value(name = "zh-hans")]
    SimplifiedChinese,
    #[serde(rename = "zh-hant")]
    #[value(name = "zh-hant")]
    TraditionalChinese,
}

impl Language {
    pub const ALL: [Language; 3] = [
        Language::English,
        Language::SimplifiedChinese,
        Language::TraditionalChinese,
    ];

    /// The edition code used on the command line and in config files.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::SimplifiedChinese => "zh-hans",
            Language::TraditionalChinese => "zh-hant",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How a date is turned into a post page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Scrape the monthly calendar at `/{yyyy}/{mm}/` for the day's link.
    Listing,
    /// Request `/{yyyy}/{mm}/{dd}/?{redirect_query}` and follow the site's
    /// redirect to the post.
    Redirect,
}

/// CSS selectors for every field of a post page.
///
/// The markup is shared by all editions of one site revision, so these
/// rarely differ between languages. The citation and the golden verse sit
/// in sibling boxes of the same class, so each also names which match to
/// take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub title: String,
    pub golden_verse: String,
    /// Zero-based index into the `golden_verse` matches.
    pub golden_verse_index: usize,
    pub citation: String,
    /// Zero-based index into the `citation` matches.
    pub citation_index: usize,
    pub passages: String,
    pub poem: String,
    pub thought: String,
    /// Day links inside the monthly calendar widget.
    pub calendar_links: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            title: ".entry-title".to_string(),
            golden_verse: ".entry-content .side-box .meta-box".to_string(),
            golden_verse_index: 1,
            citation: ".entry-content .side-box .meta-box".to_string(),
            citation_index: 0,
            passages: ".entry-content > p".to_string(),
            poem: ".entry-content .poem-box".to_string(),
            thought: ".entry-content .thought-box".to_string(),
            calendar_links: "#wp-calendar td a".to_string(),
        }
    }
}

/// Static configuration for one language edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub language: Language,
    /// Scheme and host of the edition's site, without a trailing slash.
    pub base_url: String,
    /// Text that opens the citation box, e.g. `"Read: "`.
    pub citation_prefix: String,
    /// Separates the daily citation from the reading-plan citation.
    pub plan_delimiter: String,
    pub strategy: Strategy,
    #[serde(default = "default_redirect_query")]
    pub redirect_query: String,
    #[serde(default)]
    pub selectors: Selectors,
}

fn default_redirect_query() -> String {
    "redirect=true".to_string()
}

impl Edition {
    /// The built-in configuration of each edition.
    pub fn builtin(language: Language) -> Self {
        let (base_url, citation_prefix, plan_delimiter, strategy) = match language {
            Language::English => (
                "https://odb.org",
                "Read: ",
                " | Bible in a Year: ",
                Strategy::Redirect,
            ),
            Language::SimplifiedChinese => (
                "https://simplified-odb.org",
                "经文：",
                " | 全年读经：",
                Strategy::Listing,
            ),
            Language::TraditionalChinese => (
                "https://traditional-odb.org",
                "經文：",
                " | 全年讀經：",
                Strategy::Listing,
            ),
        };
        Self {
            language,
            base_url: base_url.to_string(),
            citation_prefix: citation_prefix.to_string(),
            plan_delimiter: plan_delimiter.to_string(),
            strategy,
            redirect_query: default_redirect_query(),
            selectors: Selectors::default(),
        }
    }

    /// Point this edition at another origin. Used for mirrors and tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// URL of the monthly listing page.
    pub fn listing_url(&self, year: i32, month: u32) -> String {
        format!("{}/{}/{:02}/", self.base_url, year, month)
    }

    /// URL that the site redirects to the post of the given day.
    pub fn redirect_url(&self, year: i32, month: u32, day: u32) -> String {
        let base = format!("{}/{}/{:02}/{:02}/", self.base_url, year, month, day);
        if self.redirect_query.is_empty() {
            base
        } else {
            format!("{}?{}", base, self.redirect_query)
        }
    }
}

/// Runtime configuration: HTTP client settings plus edition overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Editions replacing the built-in entry for their language.
    pub editions: Vec<Edition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: concat!("odb_fetch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            editions: Vec::new(),
        }
    }
}

impl Config {
    /// Load a YAML config file.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OdbError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| OdbError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_yaml(&raw).map_err(|e| match e {
            OdbError::Config { reason, .. } => OdbError::Config {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        debug!(editions = config.editions.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, OdbError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| OdbError::Config {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// The edition to use for `language`: the configured override if there
    /// is one, the built-in entry otherwise.
    pub fn edition(&self, language: Language) -> Edition {
        self.editions
            .iter()
            .find(|e| e.language == language)
            .cloned()
            .map(|e| {
                let base_url = e.base_url.clone();
                e.with_base_url(base_url)
            })
            .unwrap_or_else(|| Edition::builtin(language))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the shared HTTP client described by this configuration.
    pub fn http_client(&self) -> Result<reqwest::Client, OdbError> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout())
            .build()
            .map_err(|source| OdbError::Client { source })
    }
}
