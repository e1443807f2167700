//! Cube meta API client.
//!
//! One blocking `GET` against the extended meta endpoint. There is no retry
//! and no custom timeout; any failure is returned to the caller as-is.

use thiserror::Error;
use tracing::debug;

/// Errors raised while fetching the Cube meta document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("A valid token must be provided to access the Cube meta API")]
    InvalidToken,

    #[error("Failed to fetch meta data ({status}): {body}")]
    RemoteFetch { status: u16, body: String },

    #[error("Meta API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// The extended meta endpoint returns the full model, including `sql` and
/// join definitions.
pub fn extended_url(url: &str) -> String {
    if url.ends_with("?extended") {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&extended", url)
    } else {
        format!("{}?extended", url)
    }
}

/// Fetch the Cube meta document from `url` with a bearer `token`.
///
/// # Errors
///
/// [`FetchError::InvalidToken`] for an empty token, before any request is
/// sent; [`FetchError::RemoteFetch`] for a non-200 response;
/// [`FetchError::Transport`] when the request or body decoding fails.
pub fn fetch_meta(url: &str, token: &str) -> FetchResult<serde_json::Value> {
    if token.trim().is_empty() {
        return Err(FetchError::InvalidToken);
    }

    let url = extended_url(url);
    debug!(url = %url, "fetching Cube meta");

    let client = reqwest::blocking::Client::new();
    let response = client.get(&url).bearer_auth(token).send()?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        let body = response.text().unwrap_or_default();
        return Err(FetchError::RemoteFetch {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json()?)
}
