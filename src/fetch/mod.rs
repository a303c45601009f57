//! Paginated fetch-and-aggregate pipeline for the approved job-orders API.
//!
//! # Example
//!
//! ```no_run
//! use dmw_export_core::fetch::{ApiClient, LogProgress, PageAggregator, TransportSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = TransportSettings::new(
//!     "https://master-api.dmw.gov.ph/api/v1/public/approved-job-orders/filter",
//! );
//! let aggregator = PageAggregator::new(ApiClient::new(&settings)?);
//! let outcome = aggregator.fetch_all("Czech republic", None, &LogProgress).await?;
//! println!("{} rows, truncated: {}", outcome.rows.len(), outcome.truncated);
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod client;
mod error;
mod progress;

pub use aggregator::{DEFAULT_POLITE_DELAY, FetchOutcome, PageAggregator, PageMetadata, RawRecord};
pub use client::{
    ApiClient, DEFAULT_TIMEOUT_SECS, HttpTransport, TransportProfile, TransportSettings,
    parse_api_base,
};
pub use error::{FetchError, MAX_ERROR_BODY_BYTES};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
