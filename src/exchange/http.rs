//! Shared REST plumbing for venue clients

use super::ExchangeError;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;

/// Default request timeout for venue REST calls
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with the shared timeout
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ExchangeError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Send a request and decode a JSON body, mapping failures onto `ExchangeError`
///
/// A 404 yields `Ok(None)` so callers can report "absent" instead of failing.
pub(crate) async fn get_json<T: DeserializeOwned>(
    venue: &'static str,
    request: RequestBuilder,
) -> Result<Option<T>, ExchangeError> {
    let response = request.send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ExchangeError::Api {
            venue,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ExchangeError::Decode {
            venue,
            reason: e.to_string(),
        })
}

/// Parse a decimal carried as a JSON string
pub(crate) fn parse_decimal(venue: &'static str, raw: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(raw.trim()).map_err(|e| ExchangeError::Decode {
        venue,
        reason: format!("invalid decimal {raw:?}: {e}"),
    })
}

/// Convert a price quoted in cents to dollars
pub(crate) fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// Case-insensitive match of every whitespace-separated query term
pub(crate) fn matches_query(query: &str, haystacks: &[&str]) -> bool {
    let haystack = haystacks.join(" ").to_lowercase();
    query
        .split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}
