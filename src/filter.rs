//! Citation-key selection policies.
//!
//! Two policies exist and exactly one is active per run: the ADS shape
//! filter for the normal conversion flow, and a negative "not already
//! INSPIRE-looking" filter used with the fill-missing mode.

use std::sync::LazyLock;

use regex::Regex;

/// ADS keys are 19 characters: a 4-digit year then 15 arbitrary characters
/// (`1992ApJ...388..621D`). Prefix match, matching the legacy tool.
#[allow(clippy::expect_used)]
static ADS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}.{15}").expect("ADS key regex is valid"));

/// INSPIRE texkeys look like `Duncan:1992hi` (author fragment, colon,
/// year, disambiguation letters).
#[allow(clippy::expect_used)]
static INSPIRE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z'.\-]+:\d{4}[a-z]{0,3}$").expect("INSPIRE key regex is valid")
});

/// Which cited keys are candidates for an INSPIRE lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFilter {
    /// Keys shaped like legacy ADS identifiers.
    #[default]
    Ads,
    /// Every key that does not already look like an INSPIRE key.
    All,
}

impl KeyFilter {
    /// Selects candidate keys, preserving order; non-candidates are dropped
    /// silently.
    #[must_use]
    pub fn select(self, cite_keys: &[String]) -> Vec<String> {
        cite_keys
            .iter()
            .filter(|key| self.matches(key))
            .cloned()
            .collect()
    }

    fn matches(self, key: &str) -> bool {
        match self {
            Self::Ads => ADS_PATTERN.is_match(key),
            Self::All => !INSPIRE_PATTERN.is_match(key),
        }
    }
}

/// True when the key already looks like an INSPIRE texkey.
#[must_use]
pub fn is_inspire_like(key: &str) -> bool {
    INSPIRE_PATTERN.is_match(key)
}
