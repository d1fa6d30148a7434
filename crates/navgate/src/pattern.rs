//! Host pattern matching.
//!
//! Two pattern forms are understood:
//!
//! - `*all.<domain>` matches exactly one subdomain label beneath `<domain>`:
//!   `*all.app.link` matches `promo.app.link` but neither `app.link` nor
//!   `a.b.app.link`. Dots in `<domain>` are literal.
//! - anything else matches when the host contains it as a substring:
//!   `app.link` matches `promo.app.link` and `app.link.example`.
//!
//! Hosts are compared exactly as the URL parser returns them; patterns are not
//! case-folded.

use std::fmt;

use regex_lite::Regex;

use crate::error::ConfigError;
use crate::target::NavigationUrl;

/// Prefix marking a wildcard-subdomain pattern.
pub const WILDCARD_PREFIX: &str = "*all.";

/// A compiled host pattern.
#[derive(Clone, Debug)]
pub enum HostPattern {
    /// `*all.<domain>`: one label, a dot, then `<domain>`, anchored.
    Subdomain {
        /// The pattern as written.
        source: String,
        /// Compiled matcher for the host.
        regex: Regex,
    },
    /// Plain substring match against the host.
    Substring(String),
}

impl HostPattern {
    /// Compile a pattern.
    ///
    /// Empty patterns, and wildcard patterns with nothing after the prefix,
    /// are rejected: they would otherwise match every host (or none).
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Self::compile(pattern, "host patterns")
    }

    pub(crate) fn compile(pattern: &str, list: &'static str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern { list });
        }

        let Some(domain) = pattern.strip_prefix(WILDCARD_PREFIX) else {
            return Ok(HostPattern::Substring(pattern.to_string()));
        };

        if domain.is_empty() {
            return Err(ConfigError::EmptyPattern { list });
        }

        let expr = format!(r"^[^.]+\.{}$", regex_lite::escape(domain));
        let regex = Regex::new(&expr).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(HostPattern::Subdomain {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        match self {
            HostPattern::Subdomain { source, .. } => source,
            HostPattern::Substring(s) => s,
        }
    }

    /// Returns true if `host` satisfies this pattern.
    pub fn matches_host(&self, host: &str) -> bool {
        match self {
            HostPattern::Subdomain { regex, .. } => regex.is_match(host),
            HostPattern::Substring(needle) => host.contains(needle.as_str()),
        }
    }

    /// Returns true if the host of `url` satisfies this pattern.
    pub fn matches(&self, url: &NavigationUrl) -> bool {
        self.matches_host(url.host())
    }
}

impl PartialEq for HostPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for HostPattern {}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a URL against an uncompiled pattern.
///
/// Total: a pattern that cannot be compiled (such as `""`) never matches.
pub fn matches(url: &NavigationUrl, pattern: &str) -> bool {
    HostPattern::new(pattern)
        .map(|p| p.matches(url))
        .unwrap_or(false)
}
