//! INSPIRE lookup: identifier-keyed URL construction, rate-limit-aware
//! fetching, and key extraction from the returned BibTeX.
//!
//! All network access is strictly sequential: one request in flight at a
//! time, with fixed-interval pauses between retries and between URLs.

mod error;
mod retry;

pub use error::LookupError;
pub use retry::{DEFAULT_DELAY, DEFAULT_MAX_RETRIES, FetchPolicy, RetryDecision};

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Default INSPIRE REST API base.
pub const DEFAULT_API_BASE: &str = "https://inspirehep.net/api/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Matches `@<entrytype>{<key>,` at the start of a fetched BibTeX body.
#[allow(clippy::expect_used)]
static BIB_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(.*?)\{(.*?),").expect("BibTeX key regex is valid"));

/// The kinds of identifier INSPIRE can be queried by.
///
/// Each kind carries its own API path shape; adding a kind is an
/// exhaustive-match change, not a string-keyed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// arXiv e-print id, from the `eprint` bibliography field.
    Eprint,
    /// DOI, from the `doi` bibliography field.
    Doi,
    /// An INSPIRE texkey itself, resolved through the literature search
    /// endpoint; used by the fill-missing mode.
    Texkey,
}

impl IdentifierKind {
    /// Bibliography field this kind is read from, when it comes from one.
    #[must_use]
    pub fn field_name(self) -> Option<&'static str> {
        match self {
            Self::Eprint => Some("eprint"),
            Self::Doi => Some("doi"),
            Self::Texkey => None,
        }
    }

    /// API path (relative to the base) for one identifier value.
    #[must_use]
    pub fn api_path(self, value: &str) -> String {
        let escaped = urlencoding::encode(value);
        match self {
            Self::Eprint => format!("arxiv/{escaped}?format=bibtex"),
            Self::Doi => format!("doi/{escaped}?format=bibtex"),
            Self::Texkey => {
                format!("literature?sort=mostrecent&size=1&q=texkeys%3A{escaped}&format=bibtex")
            }
        }
    }
}

/// One identifier value of a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// What kind of identifier this is.
    pub kind: IdentifierKind,
    /// The identifier value, unescaped.
    pub value: String,
}

impl Identifier {
    /// Creates an identifier of the given kind.
    pub fn new(kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// The identifiers known for one citation key, in lookup-preference order.
///
/// An empty set produces no network call and no replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet(Vec<Identifier>);

impl IdentifierSet {
    /// Wraps an ordered identifier list.
    #[must_use]
    pub fn new(identifiers: Vec<Identifier>) -> Self {
        Self(identifiers)
    }

    /// The identifiers in preference order.
    #[must_use]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.0
    }

    /// Whether no identifier is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A resolved key substitution: the legacy key, the INSPIRE key it becomes,
/// and the fetched entry text for the new key.
///
/// Only successful lookups produce one, so `insp_key` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// The key as cited in the document today.
    pub ads_key: String,
    /// The INSPIRE key it is rewritten to.
    pub insp_key: String,
    /// Raw BibTeX text fetched for the new key.
    pub bib_entry: String,
}

/// Extracts the citation key from a single-entry BibTeX body.
#[must_use]
pub fn insp_key_from_bib_str(bibtex: &str) -> Option<String> {
    BIB_KEY_PATTERN
        .captures(bibtex.trim_start())
        .map(|cap| cap[2].to_string())
}

/// Client for the INSPIRE REST API.
///
/// Wraps a reusable connection-pooled HTTP client together with the API base
/// and the retry policy. Create once, use for the whole run.
#[derive(Debug, Clone)]
pub struct InspireClient {
    client: Client,
    api_base: String,
    policy: FetchPolicy,
}

impl InspireClient {
    /// Creates a client for the given API base.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error if the HTTP client cannot be
    /// constructed.
    pub fn new(api_base: impl Into<String>, policy: FetchPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            policy,
        })
    }

    /// The configured retry policy.
    #[must_use]
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches one URL, retrying on 429 up to the policy's budget.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] on network failure, non-429 error status,
    /// rate-limit exhaustion, or an empty body. All of these are per-URL
    /// failures the caller falls through on.
    pub async fn fetch_bibtex(&self, url: &str) -> Result<String, LookupError> {
        info!(url = %url, "requesting");
        let mut retries_used = 0u32;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|err| LookupError::network(url, err))?;

            let status = response.status();
            if status.as_u16() == 429 {
                // The server's Retry-After is informational only; the
                // configured fixed delay is authoritative.
                if let Some(retry_after) = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                {
                    debug!(retry_after = %retry_after, "429 carried Retry-After");
                }
                match self.policy.on_rate_limit(retries_used) {
                    RetryDecision::RetryAfterDelay { delay, retry } => {
                        warn!(url = %url, retry, delay_ms = delay.as_millis(), "rate limited, retrying");
                        tokio::time::sleep(delay).await;
                        retries_used = retry;
                        continue;
                    }
                    RetryDecision::GiveUp { retries } => {
                        return Err(LookupError::rate_limit_exhausted(url, retries));
                    }
                }
            }

            if !status.is_success() {
                return Err(LookupError::http_status(url, status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|err| LookupError::network(url, err))?;
            if body.trim().is_empty() {
                return Err(LookupError::empty_body(url));
            }
            return Ok(body);
        }
    }

    /// Resolves one key through its identifiers, first success wins.
    ///
    /// Tries each identifier's URL in set order, pausing the fixed delay
    /// after every failed URL. Returns `None` when every URL failed or the
    /// fetched text carried no extractable key.
    pub async fn lookup(&self, ads_key: &str, identifiers: &IdentifierSet) -> Option<Replacement> {
        for identifier in identifiers.identifiers() {
            let url = format!("{}{}", self.api_base, identifier.kind.api_path(&identifier.value));

            match self.fetch_bibtex(&url).await {
                Ok(body) => {
                    let Some(insp_key) = insp_key_from_bib_str(&body) else {
                        warn!(key = %ads_key, "fetched text has no extractable BibTeX key");
                        return None;
                    };
                    return Some(Replacement {
                        ads_key: ads_key.to_string(),
                        insp_key,
                        bib_entry: body,
                    });
                }
                Err(err) => {
                    warn!(key = %ads_key, error = %err, "lookup URL failed");
                    tokio::time::sleep(self.policy.delay()).await;
                }
            }
        }

        warn!(key = %ads_key, "no INSPIRE entry found");
        None
    }

    /// Fetches a replacement for every key that has identifiers.
    ///
    /// Keys whose set is empty are skipped without any network call; keys
    /// whose lookup fails are omitted from the result.
    pub async fn fetch_replacements(
        &self,
        mapping: &[(String, IdentifierSet)],
    ) -> Vec<Replacement> {
        let mut replacements = Vec::new();

        for (ads_key, identifiers) in mapping {
            if identifiers.is_empty() {
                debug!(key = %ads_key, "no identifiers known, skipping");
                continue;
            }
            if let Some(replacement) = self.lookup(ads_key, identifiers).await {
                info!(key = %replacement.ads_key, insp_key = %replacement.insp_key, "resolved");
                replacements.push(replacement);
            }
        }

        replacements
    }
}
