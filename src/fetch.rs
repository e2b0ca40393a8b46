//! Page fetching: one GET, a status check, and an HTML parse.
//!
//! The network side sits behind the [`Transport`] trait so the resolvers can
//! be driven by `reqwest` in production and by an in-memory fake in tests.

use std::future::Future;

use scraper::Html;
use tracing::{debug, instrument, warn};

use crate::error::OdbError;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    /// The `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Something that can perform an HTTP GET.
///
/// Implementations follow redirects and read the whole body before
/// returning, so no connection outlives the call. The returned future is
/// `Send` so lookups can run on a multi-threaded runtime.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse, OdbError>> + Send;
}

impl Transport for reqwest::Client {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<RawResponse, OdbError> {
        let network = |source| OdbError::Network {
            url: url.to_string(),
            source,
        };
        let response = reqwest::Client::get(self, url)
            .send()
            .await
            .map_err(network)?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(network)?;
        debug!(status, final_url = %final_url, bytes = body.len(), "Received response");
        Ok(RawResponse {
            status,
            url: final_url,
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Which status codes count as a usable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only 200.
    Strict,
    /// 200, or 404 with a body. The site answers 404 for months whose
    /// calendar is not fully published yet while still rendering the
    /// calendar, so only monthly listing requests use this.
    AllowNotFound,
}

impl StatusPolicy {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            StatusPolicy::Strict => status == 200,
            StatusPolicy::AllowNotFound => status == 200 || status == 404,
        }
    }
}

/// A fetched and parsed page.
#[derive(Debug)]
pub struct Page {
    /// Where the content actually came from, after redirects.
    pub url: String,
    pub status: u16,
    pub document: Html,
}

/// Fetch `url` and parse the body into a document.
///
/// # Arguments
///
/// * `transport` - Performs the GET and follows redirects.
/// * `url` - Absolute URL to request.
/// * `policy` - Which response statuses are usable.
///
/// # Returns
///
/// The parsed [`Page`] with the post-redirect URL, or
/// [`OdbError::Network`], [`OdbError::Status`] or [`OdbError::Parse`].
#[instrument(level = "info", skip(transport))]
pub async fn fetch_page<T: Transport + Sync>(
    transport: &T,
    url: &str,
    policy: StatusPolicy,
) -> Result<Page, OdbError> {
    let response = transport.get(url).await?;
    if !policy.accepts(response.status) {
        warn!(status = response.status, final_url = %response.url, "Rejected response status");
        return Err(OdbError::Status {
            url: response.url,
            status: response.status,
        });
    }
    if response.status != 200 {
        debug!(status = response.status, "Accepting non-200 listing page");
    }
    let document = parse_body(&response)?;
    Ok(Page {
        url: response.url,
        status: response.status,
        document,
    })
}

/// Decode and parse a response body.
///
/// Decoding is lossy, so the only body that counts as unparseable is one
/// with no markup at all.
fn parse_body(response: &RawResponse) -> Result<Html, OdbError> {
    let text = decode_body(&response.body, response.content_type.as_deref());
    if text.trim().is_empty() {
        return Err(OdbError::Parse {
            url: response.url.clone(),
            status: response.status,
            reason: "body is empty".to_string(),
        });
    }
    Ok(Html::parse_document(&text))
}

/// Decode body bytes using the `Content-Type` charset when it names a known
/// encoding, otherwise the encoding `chardetng` guesses. Malformed sequences
/// become U+FFFD.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(charset_label)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()));
    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(body, true);
        detector.guess(None, true)
    });
    let (decoded, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "Replaced malformed byte sequences");
    }
    decoded.into_owned()
}

/// The `charset` parameter of a `Content-Type` value.
fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
    })
}
