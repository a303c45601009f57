//! Pagination aggregator: walks every page of a jobsite's result set.
//!
//! Page 1 is fetched first and its `meta` object bounds the walk. Pages
//! `2..=last_page` are then fetched strictly in order, one request at a time,
//! with a polite delay between requests. A failure on page 1 is fatal; a
//! failure on any later page stops pagination and the rows collected so far
//! are returned with [`FetchOutcome::truncated`] set.
//!
//! Records are never deduplicated. If the server's pagination shifts under
//! concurrent writes on its side, the same job order may appear twice.

use std::num::NonZeroU32;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use super::client::HttpTransport;
use super::error::FetchError;
use super::progress::ProgressObserver;

/// One job order as returned by the API. No schema is assumed.
pub type RawRecord = Map<String, Value>;

/// Default pause between consecutive page requests.
pub const DEFAULT_POLITE_DELAY: Duration = Duration::from_millis(300);

/// Server-reported pagination summary, parsed from page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetadata {
    /// Total record count reported by the server.
    pub total: u64,
    /// Page size reported by the server.
    pub per_page: u64,
    /// Index of the last page; always at least 1.
    pub last_page: u32,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            total: 0,
            per_page: 0,
            last_page: 1,
        }
    }
}

impl PageMetadata {
    /// Parses the `meta` object of a page response.
    ///
    /// Missing, null, zero, negative or non-numeric fields fall back to the
    /// defaults, so a minimal response degrades to a single page.
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        let Some(meta) = body.get("meta") else {
            return Self::default();
        };

        let last_page = meta_u64(meta, "lastPage")
            .filter(|&n| n > 0)
            .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX));

        Self {
            total: meta_u64(meta, "total").unwrap_or(0),
            per_page: meta_u64(meta, "perPage").unwrap_or(0),
            last_page,
        }
    }
}

fn meta_u64(meta: &Value, key: &str) -> Option<u64> {
    match meta.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Terminal result of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Records in page order, server order within each page.
    pub rows: Vec<RawRecord>,
    /// Metadata parsed from page 1.
    pub meta: PageMetadata,
    /// Pages fetched successfully, page 1 included.
    pub pages_fetched: u32,
    /// Pages the run intended to fetch: `min(last_page, max_pages)`.
    pub pages_requested: u32,
    /// Whether pagination stopped early because a page failed.
    pub truncated: bool,
    /// The page whose failure stopped pagination.
    pub failed_page: Option<u32>,
}

impl FetchOutcome {
    /// Returns true when fewer rows were collected than the server reported.
    ///
    /// This is informational; it also happens legitimately when a page cap
    /// is in effect.
    #[must_use]
    pub fn is_short_of_total(&self) -> bool {
        (self.rows.len() as u64) < self.meta.total
    }
}

/// Drives an [`HttpTransport`] across all pages of a result set.
#[derive(Debug)]
pub struct PageAggregator<T> {
    transport: T,
    polite_delay: Duration,
}

impl<T: HttpTransport> PageAggregator<T> {
    /// Creates an aggregator with the default polite delay.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            polite_delay: DEFAULT_POLITE_DELAY,
        }
    }

    /// Sets the pause between consecutive page requests.
    #[must_use]
    pub fn with_polite_delay(mut self, polite_delay: Duration) -> Self {
        self.polite_delay = polite_delay;
        self
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches every page for `jobsite`, up to `max_pages` when given.
    ///
    /// # Errors
    ///
    /// Returns the page-1 [`FetchError`] unchanged. Failures on later pages
    /// never propagate; they truncate the outcome instead.
    #[instrument(skip(self, jobsite, observer), fields(jobsite = %jobsite))]
    pub async fn fetch_all(
        &self,
        jobsite: &str,
        max_pages: Option<NonZeroU32>,
        observer: &dyn ProgressObserver,
    ) -> Result<FetchOutcome, FetchError> {
        let first = self.transport.fetch_page(jobsite, 1).await?;
        let meta = PageMetadata::from_response(&first);
        observer.on_progress(&format!(
            "Meta: total={}, perPage={}, lastPage={}",
            meta.total, meta.per_page, meta.last_page
        ));

        let mut rows = take_records(first, 1);
        let pages_requested = max_pages.map_or(meta.last_page, |cap| meta.last_page.min(cap.get()));
        info!(
            total = meta.total,
            last_page = meta.last_page,
            pages_requested,
            "pagination bounds resolved"
        );

        let mut pages_fetched = 1;
        let mut failed_page = None;

        for page in 2..=pages_requested {
            observer.on_progress(&format!("Fetching page {page}/{pages_requested}"));

            match self.transport.fetch_page(jobsite, page).await {
                Ok(body) => {
                    let records = take_records(body, page);
                    debug!(page, rows = records.len(), "page appended");
                    rows.extend(records);
                    pages_fetched += 1;
                }
                Err(err) => {
                    error!(page, error = %err, "page fetch failed; keeping rows collected so far");
                    failed_page = Some(page);
                    break;
                }
            }

            if page < pages_requested && !self.polite_delay.is_zero() {
                tokio::time::sleep(self.polite_delay).await;
            }
        }

        let outcome = FetchOutcome {
            rows,
            meta,
            pages_fetched,
            pages_requested,
            truncated: failed_page.is_some(),
            failed_page,
        };

        observer.on_progress(&format!(
            "Collected {} rows (API total said {}).",
            outcome.rows.len(),
            meta.total
        ));
        if outcome.is_short_of_total() {
            warn!(
                rows = outcome.rows.len(),
                total = meta.total,
                truncated = outcome.truncated,
                "collected fewer rows than the server reported"
            );
        }

        Ok(outcome)
    }
}

/// Moves the `data` array out of a page body; anything else yields no rows.
fn take_records(mut body: Value, page: u32) -> Vec<RawRecord> {
    let Some(Value::Array(items)) = body.get_mut("data").map(Value::take) else {
        debug!(page, "page has no data array");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(record) => records.push(record),
            other => warn!(page, value = %other, "skipping non-object entry in data array"),
        }
    }
    records
}
