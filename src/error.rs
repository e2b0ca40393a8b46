//! Error types for the fetch-and-extract pipeline.
//!
//! Only failures that make a post unusable are errors. A page that is
//! missing a poem, a thought box or a recognizable citation still produces a
//! [`Post`](crate::models::Post) with those fields left empty.

use thiserror::Error;

/// Everything that can abort a [`get_post`](crate::Odb::get_post) call.
#[derive(Debug, Error)]
pub enum OdbError {
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status the current fetch policy rejects.
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body could not be turned into a document.
    #[error("unable to parse body of {url} (status {status}): {reason}")]
    Parse {
        url: String,
        status: u16,
        reason: String,
    },

    /// The monthly listing does not link the requested day.
    #[error("no post listed for {year}-{month:02}-{day:02} at {url}")]
    DateNotFound {
        year: i32,
        month: u32,
        day: u32,
        url: String,
    },

    /// The requested date does not exist on the calendar.
    #[error("invalid date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// A configured CSS selector failed to compile.
    #[error("invalid {field} selector {selector:?}: {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    /// The configuration file could not be read or deserialized.
    #[error("configuration error in {path}: {reason}")]
    Config { path: String, reason: String },

    /// The HTTP client could not be built, e.g. no TLS backend.
    #[error("unable to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

impl OdbError {
    /// Returns true for the errors caused by the caller's input (the date
    /// or the configuration file) rather than the remote site. The CLI maps
    /// these to its usage exit code.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            OdbError::InvalidDate { .. } | OdbError::Config { .. } | OdbError::Selector { .. }
        )
    }

    /// The URL involved in the failure, when there is one.
    pub fn url(&self) -> Option<&str> {
        match self {
            OdbError::Network { url, .. }
            | OdbError::Status { url, .. }
            | OdbError::Parse { url, .. }
            | OdbError::DateNotFound { url, .. } => Some(url),
            _ => None,
        }
    }
}
