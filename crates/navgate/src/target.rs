//! Parsed navigation targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::NavigationError;

/// Textual form of the empty page a browsing surface loads before any content.
pub const BLANK_PAGE: &str = "about:blank";

/// A URL a browsing surface is about to load.
///
/// Wraps [`url::Url`] and exposes the two pieces the policy looks at: the
/// scheme and the host. A missing host reads as the empty string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NavigationUrl {
    inner: Url,
}

impl NavigationUrl {
    /// Parse a navigation target.
    pub fn parse(input: &str) -> Result<Self, NavigationError> {
        Url::parse(input.trim())
            .map(|inner| Self { inner })
            .map_err(|e| NavigationError::MalformedUrl {
                url: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// The URL scheme, e.g. `https` or `itms-appss`.
    pub fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    /// The host, or `""` if the URL has none.
    pub fn host(&self) -> &str {
        self.inner.host_str().unwrap_or_default()
    }

    /// Full textual form.
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// Returns true for the literal `about:blank` page.
    pub fn is_blank_page(&self) -> bool {
        self.as_str() == BLANK_PAGE
    }

    /// The underlying parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.inner
    }
}

impl From<Url> for NavigationUrl {
    fn from(inner: Url) -> Self {
        Self { inner }
    }
}

impl FromStr for NavigationUrl {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NavigationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NavigationUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NavigationUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
