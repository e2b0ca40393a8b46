//! Date resolution: from a calendar date to a fetched post page.
//!
//! Two site revisions, two strategies:
//!
//! | Strategy | Requests | How the post URL is found |
//! |----------|----------|---------------------------|
//! | [`ListingResolver`] | 2 | Day links in the monthly calendar at `/{yyyy}/{mm}/` |
//! | [`RedirectResolver`] | 1 | The site redirects `/{yyyy}/{mm}/{dd}/?redirect=true` to the post |
//!
//! Both hand back a [`Page`], so field extraction does not care which one
//! ran.

use std::collections::BTreeMap;
use std::future::Future;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{Edition, Strategy};
use crate::error::OdbError;
use crate::extract::compile;
use crate::fetch::{Page, StatusPolicy, Transport, fetch_page};
use crate::utils::trim_odb;

/// A validated calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PostDate {
    /// Reject dates that do not exist, such as February 30th.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, OdbError> {
        chrono::NaiveDate::from_ymd_opt(year, month, day)
            .map(|_| Self { year, month, day })
            .ok_or(OdbError::InvalidDate { year, month, day })
    }
}

/// Resolve a date to the fetched post page.
pub trait ResolveDate {
    fn resolve<T: Transport + Sync>(
        &self,
        transport: &T,
        date: PostDate,
    ) -> impl Future<Output = Result<Page, OdbError>> + Send;
}

/// Strategy A: scrape the monthly calendar for the day's link.
#[derive(Debug, Clone)]
pub struct ListingResolver {
    edition: Edition,
    calendar_links: Selector,
}

impl ListingResolver {
    pub fn new(edition: Edition) -> Result<Self, OdbError> {
        let calendar_links = compile("calendar_links", &edition.selectors.calendar_links)?;
        Ok(Self {
            edition,
            calendar_links,
        })
    }

    /// Map day numbers to absolute post URLs.
    ///
    /// Anchors whose text is not a day number, or whose `href` does not
    /// resolve against `page_url`, are skipped.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed monthly listing page.
    /// * `page_url` - URL the listing was served from; relative links are
    ///   joined against it.
    ///
    /// # Returns
    ///
    /// Day of month to absolute post URL, ordered by day.
    ///
    /// # Examples
    ///
    /// ```
    /// use odb_fetch::{Edition, Language};
    /// use odb_fetch::resolve::ListingResolver;
    /// use scraper::Html;
    ///
    /// let resolver = ListingResolver::new(Edition::builtin(Language::SimplifiedChinese)).unwrap();
    /// let doc = Html::parse_document(
    ///     r#"<table id="wp-calendar"><tr><td><a href="/2024/01/05/post/">5</a></td></tr></table>"#,
    /// );
    /// let days = resolver.day_links(&doc, "https://simplified-odb.org/2024/01/");
    /// assert_eq!(days[&5], "https://simplified-odb.org/2024/01/05/post/");
    /// ```
    pub fn day_links(&self, document: &Html, page_url: &str) -> BTreeMap<u32, String> {
        let base = Url::parse(page_url).ok();
        let mut days = BTreeMap::new();
        for anchor in document.select(&self.calendar_links) {
            let text = anchor.text().collect::<String>();
            let Ok(day) = trim_odb(&text).parse::<u32>() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let resolved = match &base {
                Some(base) => base.join(href).map(|u| u.to_string()),
                None => Url::parse(href).map(|u| u.to_string()),
            };
            match resolved {
                Ok(url) => {
                    days.insert(day, url);
                }
                Err(e) => warn!(day, href, error = %e, "Skipping unresolvable calendar link"),
            }
        }
        days
    }
}

impl ResolveDate for ListingResolver {
    #[instrument(level = "info", skip_all, fields(strategy = "listing", year = date.year, month = date.month, day = date.day))]
    async fn resolve<T: Transport + Sync>(
        &self,
        transport: &T,
        date: PostDate,
    ) -> Result<Page, OdbError> {
        let listing_url = self.edition.listing_url(date.year, date.month);
        let post_url = {
            let listing = fetch_page(transport, &listing_url, StatusPolicy::AllowNotFound).await?;
            let mut days = self.day_links(&listing.document, &listing.url);
            debug!(
                listed = days.len(),
                status = listing.status,
                "Scraped monthly calendar"
            );
            days.remove(&date.day).ok_or(OdbError::DateNotFound {
                year: date.year,
                month: date.month,
                day: date.day,
                url: listing.url,
            })?
        };
        info!(%post_url, "Resolved post from listing");
        fetch_page(transport, &post_url, StatusPolicy::Strict).await
    }
}

/// Strategy B: let the site redirect the date URL to the post.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    edition: Edition,
}

impl RedirectResolver {
    pub fn new(edition: Edition) -> Self {
        Self { edition }
    }
}

impl ResolveDate for RedirectResolver {
    #[instrument(level = "info", skip_all, fields(strategy = "redirect", year = date.year, month = date.month, day = date.day))]
    async fn resolve<T: Transport + Sync>(
        &self,
        transport: &T,
        date: PostDate,
    ) -> Result<Page, OdbError> {
        let url = self.edition.redirect_url(date.year, date.month, date.day);
        let page = fetch_page(transport, &url, StatusPolicy::Strict).await?;
        info!(post_url = %page.url, "Resolved post via redirect");
        Ok(page)
    }
}

/// The resolver an edition's configuration selects.
#[derive(Debug, Clone)]
pub enum Resolver {
    Listing(ListingResolver),
    Redirect(RedirectResolver),
}

impl Resolver {
    pub fn for_edition(edition: &Edition) -> Result<Self, OdbError> {
        Ok(match edition.strategy {
            Strategy::Listing => Resolver::Listing(ListingResolver::new(edition.clone())?),
            Strategy::Redirect => Resolver::Redirect(RedirectResolver::new(edition.clone())),
        })
    }
}

impl ResolveDate for Resolver {
    async fn resolve<T: Transport + Sync>(
        &self,
        transport: &T,
        date: PostDate,
    ) -> Result<Page, OdbError> {
        match self {
            Resolver::Listing(r) => r.resolve(transport, date).await,
            Resolver::Redirect(r) => r.resolve(transport, date).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::fetch::testing::FakeTransport;
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://simplified-odb.org";

    const CALENDAR: &str = r#"<html><body>
<table id="wp-calendar"><tbody>
<tr>
  <td><a href="/2024/01/01/new-year/">&#8233;1&#8233;</a></td>
  <td><a href="https://simplified-odb.org/2024/01/02/second/"> 2 </a></td>
  <td>3</td>
  <td><a href="/2024/01/04/fourth/">four</a></td>
</tr>
</tbody></table>
</body></html>"#;

    const POST: &str = r#"<html><body><h2 class="entry-title">新年</h2></body></html>"#;

    fn date(year: i32, month: u32, day: u32) -> PostDate {
        PostDate::new(year, month, day).unwrap()
    }

    fn listing() -> ListingResolver {
        ListingResolver::new(
            Edition::builtin(Language::SimplifiedChinese).with_base_url(BASE),
        )
        .unwrap()
    }

    #[test]
    fn test_post_date_validation() {
        assert!(PostDate::new(2024, 2, 29).is_ok());
        assert!(matches!(
            PostDate::new(2023, 2, 29),
            Err(OdbError::InvalidDate { year: 2023, month: 2, day: 29 })
        ));
        assert!(PostDate::new(2024, 13, 1).is_err());
    }

    #[test]
    fn test_day_links() {
        let doc = Html::parse_document(CALENDAR);
        let days = listing().day_links(&doc, "https://simplified-odb.org/2024/01/");
        assert_eq!(
            days.into_iter().collect::<Vec<_>>(),
            vec![
                (1, "https://simplified-odb.org/2024/01/01/new-year/".to_string()),
                (2, "https://simplified-odb.org/2024/01/02/second/".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_resolves_listed_day() {
        let transport = FakeTransport::new()
            .route(&format!("{BASE}/2024/01/"), 200, CALENDAR)
            .route(&format!("{BASE}/2024/01/01/new-year/"), 200, POST);

        let page = listing().resolve(&transport, date(2024, 1, 1)).await.unwrap();
        assert_eq!(page.url, format!("{BASE}/2024/01/01/new-year/"));
        assert_eq!(
            transport.requests(),
            vec![format!("{BASE}/2024/01/"), format!("{BASE}/2024/01/01/new-year/")]
        );
    }

    #[tokio::test]
    async fn test_listing_accepts_404_calendar() {
        let transport = FakeTransport::new()
            .route(&format!("{BASE}/2024/01/"), 404, CALENDAR)
            .route(&format!("{BASE}/2024/01/02/second/"), 200, POST);

        let page = listing().resolve(&transport, date(2024, 1, 2)).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.url, format!("{BASE}/2024/01/02/second/"));
    }

    #[tokio::test]
    async fn test_listing_missing_day_is_date_not_found() {
        let transport = FakeTransport::new().route(&format!("{BASE}/2024/01/"), 404, CALENDAR);

        let err = listing().resolve(&transport, date(2024, 1, 3)).await.unwrap_err();
        match err {
            OdbError::DateNotFound { year, month, day, url } => {
                assert_eq!((year, month, day), (2024, 1, 3));
                assert_eq!(url, format!("{BASE}/2024/01/"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Nothing is fetched beyond the listing.
        assert_eq!(transport.requests(), vec![format!("{BASE}/2024/01/")]);
    }

    #[tokio::test]
    async fn test_listing_post_page_404_is_an_error() {
        let transport = FakeTransport::new().route(&format!("{BASE}/2024/01/"), 200, CALENDAR);

        let err = listing().resolve(&transport, date(2024, 1, 1)).await.unwrap_err();
        assert!(matches!(err, OdbError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_redirect_uses_one_round_trip() {
        let edition = Edition::builtin(Language::English).with_base_url("https://odb.org");
        let transport = FakeTransport::new().redirect(
            "https://odb.org/2024/01/01/?redirect=true",
            "https://odb.org/devotional/2024/01/01/a-fresh-start",
            200,
            POST,
        );

        let page = RedirectResolver::new(edition)
            .resolve(&transport, date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(page.url, "https://odb.org/devotional/2024/01/01/a-fresh-start");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_failure_status() {
        let edition = Edition::builtin(Language::English).with_base_url("https://odb.org");
        let transport = FakeTransport::new();

        let err = RedirectResolver::new(edition)
            .resolve(&transport, date(2030, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, OdbError::Status { status: 404, .. }));
    }

    #[test]
    fn test_resolver_follows_edition_strategy() {
        let en = Edition::builtin(Language::English);
        assert!(matches!(Resolver::for_edition(&en).unwrap(), Resolver::Redirect(_)));
        let en_listing = en.with_strategy(Strategy::Listing);
        assert!(matches!(Resolver::for_edition(&en_listing).unwrap(), Resolver::Listing(_)));
    }
}
