//! Request fingerprint shared by all API transports.
//!
//! The public API sits behind bot-detection middleware that rejects requests
//! which do not look like they come from the DMW web frontend.

/// Desktop Chrome User-Agent sent by the browser transport profile.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0 Safari/537.36";

/// Origin of the web frontend that normally calls the API.
pub const BROWSER_ORIGIN: &str = "https://dmw.gov.ph";

/// Referer matching [`BROWSER_ORIGIN`].
pub const BROWSER_REFERER: &str = "https://dmw.gov.ph/";

/// Accept-Language sent by the browser transport profile.
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Header carrying the static API key. Lower-case on purpose: the edge
/// compares the name case-sensitively.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Tool-identifying User-Agent used by the plain transport profile.
#[must_use]
pub(crate) fn default_tool_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("dmw-export/{version} (job-order-export)")
}
