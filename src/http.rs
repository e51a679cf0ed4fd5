//! Shared HTTP client setup.
//!
//! The manifest endpoint sits behind a CDN that rejects obvious bot traffic,
//! so every request goes out with browser-like headers.

use crate::error::{Result, UpdaterError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;

/// User agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// `Accept` header sent with every request.
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// `Accept-Language` header sent with every request.
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en,en-US;q=0.7,en;q=0.3";

/// Build a blocking client with browser headers and an overall request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );

    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| UpdaterError::Network {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })
}
