//! Whitelist and restricted rule lists.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pattern::HostPattern;

/// Restricted host patterns of the built-in deeplink preset.
pub const DEEPLINK_RESTRICTED_PATTERNS: &[&str] = &[
    "*all.onelink.me",
    "*all.app.link",
    "*all.smart.link",
    "*all.branch.link",
    "*all.deeplink.me",
    "*all.page.link",
    "onelink.me",
    "app.link",
    "smart.link",
    "branch.link",
    "deeplink.me",
    "page.link",
    "app.temu.com",
    "apps.apple.com",
    "itunes.apple.com",
];

/// Restricted schemes of the built-in deeplink preset.
pub const DEEPLINK_RESTRICTED_SCHEMES: &[&str] = &["itms-appss"];

/// The four rule lists as plain strings, in the shape they are configured.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleLists {
    /// Host patterns that always allow.
    pub whitelist_patterns: Vec<String>,
    /// Schemes that always allow.
    pub whitelist_schemes: Vec<String>,
    /// Host patterns that require confirmation.
    pub restricted_patterns: Vec<String>,
    /// Schemes that require confirmation.
    pub restricted_schemes: Vec<String>,
}

impl RuleLists {
    /// The built-in deeplink preset: common attribution-link domains, the
    /// App Store hosts and the `itms-appss` scheme are restricted; nothing is
    /// whitelisted.
    pub fn deeplink_defaults() -> Self {
        Self {
            whitelist_patterns: Vec::new(),
            whitelist_schemes: Vec::new(),
            restricted_patterns: to_strings(DEEPLINK_RESTRICTED_PATTERNS),
            restricted_schemes: to_strings(DEEPLINK_RESTRICTED_SCHEMES),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Compiled, immutable rule lists.
///
/// Built once per engine and shared read-only between sessions. Duplicate
/// entries are allowed; evaluation is an OR over each list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    whitelist_patterns: Vec<HostPattern>,
    whitelist_schemes: Vec<String>,
    restricted_patterns: Vec<HostPattern>,
    restricted_schemes: Vec<String>,
}

impl RuleSet {
    /// A rule set with no entries: every URL is allowed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a rule set.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Compile the built-in deeplink preset.
    pub fn deeplink_defaults() -> Result<Self, ConfigError> {
        Self::from_lists(&RuleLists::deeplink_defaults())
    }

    /// Compile rule lists.
    pub fn from_lists(lists: &RuleLists) -> Result<Self, ConfigError> {
        Ok(Self {
            whitelist_patterns: compile_patterns(&lists.whitelist_patterns, "whitelist_patterns")?,
            whitelist_schemes: check_schemes(&lists.whitelist_schemes, "whitelist_schemes")?,
            restricted_patterns: compile_patterns(
                &lists.restricted_patterns,
                "restricted_patterns",
            )?,
            restricted_schemes: check_schemes(&lists.restricted_schemes, "restricted_schemes")?,
        })
    }

    /// Whitelisted host patterns, in configured order.
    pub fn whitelist_patterns(&self) -> &[HostPattern] {
        &self.whitelist_patterns
    }

    /// Whitelisted schemes, in configured order.
    pub fn whitelist_schemes(&self) -> &[String] {
        &self.whitelist_schemes
    }

    /// Restricted host patterns, in configured order.
    pub fn restricted_patterns(&self) -> &[HostPattern] {
        &self.restricted_patterns
    }

    /// Restricted schemes, in configured order.
    pub fn restricted_schemes(&self) -> &[String] {
        &self.restricted_schemes
    }

    /// Returns true if no list has any entry.
    pub fn is_empty(&self) -> bool {
        self.whitelist_patterns.is_empty()
            && self.whitelist_schemes.is_empty()
            && self.restricted_patterns.is_empty()
            && self.restricted_schemes.is_empty()
    }

    /// Convert back to plain string lists.
    pub fn to_lists(&self) -> RuleLists {
        let patterns = |ps: &[HostPattern]| -> Vec<String> {
            ps.iter().map(|p| p.as_str().to_string()).collect()
        };
        RuleLists {
            whitelist_patterns: patterns(&self.whitelist_patterns),
            whitelist_schemes: self.whitelist_schemes.clone(),
            restricted_patterns: patterns(&self.restricted_patterns),
            restricted_schemes: self.restricted_schemes.clone(),
        }
    }
}

impl TryFrom<&RuleLists> for RuleSet {
    type Error = ConfigError;

    fn try_from(lists: &RuleLists) -> Result<Self, Self::Error> {
        Self::from_lists(lists)
    }
}

fn compile_patterns(
    patterns: &[String],
    list: &'static str,
) -> Result<Vec<HostPattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| HostPattern::compile(p, list))
        .collect()
}

fn check_schemes(schemes: &[String], list: &'static str) -> Result<Vec<String>, ConfigError> {
    if schemes.iter().any(String::is_empty) {
        return Err(ConfigError::EmptyScheme { list });
    }
    Ok(schemes.to_vec())
}

/// Builder for creating rule sets with a fluent API.
///
/// # Example
///
/// ```rust
/// use navgate::RuleSet;
///
/// let rules = RuleSet::builder()
///     .whitelist_scheme("https")
///     .restrict_pattern("*all.app.link")
///     .restrict_scheme("itms-appss")
///     .build()
///     .expect("valid rules");
/// assert_eq!(rules.restricted_patterns().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RuleSetBuilder {
    lists: RuleLists,
}

impl RuleSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing lists.
    pub fn from_lists(lists: RuleLists) -> Self {
        Self { lists }
    }

    /// Always allow hosts matching `pattern`.
    pub fn whitelist_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.lists.whitelist_patterns.push(pattern.into());
        self
    }

    /// Always allow URLs with this scheme.
    pub fn whitelist_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.lists.whitelist_schemes.push(scheme.into());
        self
    }

    /// Require confirmation for hosts matching `pattern`.
    pub fn restrict_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.lists.restricted_patterns.push(pattern.into());
        self
    }

    /// Require confirmation for URLs with this scheme.
    pub fn restrict_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.lists.restricted_schemes.push(scheme.into());
        self
    }

    /// Compile the rule set.
    pub fn build(self) -> Result<RuleSet, ConfigError> {
        RuleSet::from_lists(&self.lists)
    }
}
