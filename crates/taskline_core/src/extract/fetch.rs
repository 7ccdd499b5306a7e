//! Web page import.
//!
//! # Responsibility
//! - Fetch a page, strip it to text and scan it for dates.
//!
//! # Invariants
//! - One bounded attempt per call: past the timeout the fetch is abandoned
//!   and reported as `FetchTimedOut`; nothing is retried here.
//! - Logs carry byte counts and outcomes, never the URL or page text.

use crate::extract::source::{scan_text, strip_markup, ImportError, ImportOutcome};
use crate::model::date::CanonicalDate;
use log::{info, warn};
use std::time::Duration;

/// Abort budget for one page fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(12);
const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; taskline/1.0)";

/// Fetches `url` with the default 12 s timeout and scans the page text.
pub fn import_url(url: &str, today: CanonicalDate) -> Result<ImportOutcome, ImportError> {
    import_url_with_timeout(url, today, FETCH_TIMEOUT)
}

pub fn import_url_with_timeout(
    url: &str,
    today: CanonicalDate,
    timeout: Duration,
) -> Result<ImportOutcome, ImportError> {
    let page = match fetch_page(url.trim(), timeout) {
        Ok(page) => page,
        Err(err) => {
            let error_code = match err {
                ImportError::FetchTimedOut => "timeout",
                _ => "fetch_failed",
            };
            warn!("event=import_url module=extract status=error error_code={error_code}");
            return Err(err);
        }
    };

    let outcome = scan_text(&strip_markup(&page), today);
    info!(
        "event=import_url module=extract status=ok bytes={} dates={}",
        page.len(),
        outcome.dates.len()
    );
    Ok(outcome)
}

// The body is read whatever the HTTP status; error pages can still carry
// dates worth showing.
fn fetch_page(url: &str, timeout: Duration) -> Result<String, ImportError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(FETCH_USER_AGENT)
        .build()
        .map_err(classify)?;
    client
        .get(url)
        .send()
        .and_then(|response| response.text())
        .map_err(classify)
}

fn classify(err: reqwest::Error) -> ImportError {
    if err.is_timeout() {
        ImportError::FetchTimedOut
    } else {
        ImportError::FetchFailed(err.to_string())
    }
}
