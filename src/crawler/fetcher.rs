//! Bounded HTTP fetcher
//!
//! Every remote read the crawler performs goes through [`Fetcher`]. It
//! enforces two hard limits on each request: a wall-clock deadline measured
//! from the moment the request is sent, and a cap on the number of body
//! bytes accumulated. Hitting the byte cap is not an error; the body is
//! returned with a `truncated` flag and the connection is dropped. Hitting
//! the deadline is a [`FetchFailure::Timeout`].

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::trace;

/// Hard per-request bounds
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Wall-clock budget for the whole request, connect included
    pub timeout: Duration,
    /// Maximum body bytes to accumulate before truncating
    pub max_bytes: usize,
}

/// A completed fetch: status, bounded body, and whether the byte cap cut
/// the body short
#[derive(Debug)]
pub struct FetchOutcome {
    /// HTTP status code of the final response
    pub status: u16,
    /// Response body, at most `max_bytes` plus one chunk
    pub body: Vec<u8>,
    /// True when the byte cap stopped the read before the body ended
    pub truncated: bool,
}

/// Ways a fetch can fail without producing any body
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request timed out for {url}")]
    Timeout { url: String },

    #[error("network error for {url}: {detail}")]
    Network { url: String, detail: String },
}

/// HTTP fetcher with enforced time and size bounds
pub struct Fetcher {
    client: Client,
    limits: FetchLimits,
}

impl Fetcher {
    /// Builds a fetcher with an identifying user agent
    ///
    /// The user agent follows the `Name/Version (+url; email)` convention so
    /// site operators can find out who is crawling them and how to object.
    pub fn new(config: &UserAgentConfig, limits: FetchLimits) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.header_value())
            .connect_timeout(limits.timeout)
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, limits })
    }

    /// Returns the configured limits
    pub fn limits(&self) -> FetchLimits {
        self.limits
    }

    /// Fetches a URL, streaming the body under the time and size bounds
    ///
    /// The deadline covers the entire request: if the server is still
    /// trickling body bytes when the budget runs out, the fetch fails with
    /// `Timeout` even though headers arrived. The byte cap is the opposite:
    /// a body larger than `max_bytes` is returned truncated, flagged, and
    /// otherwise treated as a success.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchFailure> {
        let started = Instant::now();

        let send = self.client.get(url).send();
        let mut response = match tokio::time::timeout(self.limits.timeout, send).await {
            Err(_) => {
                return Err(FetchFailure::Timeout {
                    url: url.to_string(),
                })
            }
            Ok(Err(e)) => return Err(classify_error(url, e)),
            Ok(Ok(r)) => r,
        };

        let status = response.status().as_u16();
        let mut body = Vec::new();
        let mut truncated = false;

        loop {
            let remaining = match self.limits.timeout.checked_sub(started.elapsed()) {
                Some(d) if !d.is_zero() => d,
                _ => {
                    return Err(FetchFailure::Timeout {
                        url: url.to_string(),
                    })
                }
            };

            let chunk = match tokio::time::timeout(remaining, response.chunk()).await {
                Err(_) => {
                    return Err(FetchFailure::Timeout {
                        url: url.to_string(),
                    })
                }
                Ok(Err(e)) => return Err(classify_error(url, e)),
                Ok(Ok(None)) => break,
                Ok(Ok(Some(c))) => c,
            };

            body.extend_from_slice(&chunk);
            if body.len() > self.limits.max_bytes {
                body.truncate(self.limits.max_bytes);
                truncated = true;
                break;
            }
        }

        trace!(
            url,
            status,
            bytes = body.len(),
            truncated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch complete"
        );

        Ok(FetchOutcome {
            status,
            body,
            truncated,
        })
    }
}

/// Maps a reqwest error to the fetcher's failure taxonomy
fn classify_error(url: &str, e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchFailure::Network {
            url: url.to_string(),
            detail: e.to_string(),
        }
    }
}

/// Decodes a response body as UTF-8, falling back to Latin-1
///
/// Pages lie about their encodings often enough that a strict decode would
/// lose real content. The Latin-1 fallback maps every byte to a char, so
/// decoding itself never fails.
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
