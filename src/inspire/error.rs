//! Error types for INSPIRE lookups.
//!
//! Every variant is a per-URL failure. None of them abort the run: the
//! per-key loop logs them and moves on to the next URL or the next key.

use thiserror::Error;

/// Errors that can occur while fetching one lookup URL.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network-level error (DNS resolution, connection refused, TLS, ...).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response other than 429.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The server kept answering 429 until the retry budget ran out.
    #[error("too many ({retries}) rate-limit retries fetching {url}")]
    RateLimitExhausted {
        /// The URL that was rate limited.
        url: String,
        /// How many retries were spent.
        retries: u32,
    },

    /// A 2xx response with an empty body; nothing to parse.
    #[error("empty response body from {url}")]
    EmptyBody {
        /// The URL that returned nothing.
        url: String,
    },
}

impl LookupError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a rate-limit exhaustion error.
    pub fn rate_limit_exhausted(url: impl Into<String>, retries: u32) -> Self {
        Self::RateLimitExhausted {
            url: url.into(),
            retries,
        }
    }

    /// Creates an empty-body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = LookupError::http_status("https://inspirehep.net/api/doi/x", 404);
        let msg = err.to_string();
        assert!(msg.contains("404"), "expected status in: {msg}");
        assert!(msg.contains("doi/x"), "expected URL in: {msg}");
    }

    #[test]
    fn test_rate_limit_exhausted_display() {
        let err = LookupError::rate_limit_exhausted("https://example.org/x", 3);
        let msg = err.to_string();
        assert!(msg.contains("too many (3)"), "expected retry count in: {msg}");
    }

    #[test]
    fn test_empty_body_display() {
        let err = LookupError::empty_body("https://example.org/x");
        assert!(err.to_string().contains("empty response body"));
    }
}
