//! Engine configuration.
//!
//! Everything the host application supplies once at startup: the rule lists,
//! the page to open first, prompt wording, an optional confirmation timeout and
//! cosmetic stylesheet payloads. The payloads are carried through untouched for
//! the presentation layer; the engine never looks at them.
//!
//! Configs are plain JSON. Every field is optional and falls back to
//! [`EngineConfig::default`]:
//!
//! ```json
//! {
//!   "initial_url": "https://shop.example",
//!   "rules": {
//!     "whitelist_schemes": ["mailto"],
//!     "restricted_patterns": ["*all.app.link", "app.link"],
//!     "restricted_schemes": ["itms-appss"]
//!   },
//!   "decision_timeout": 60000
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::PromptText;
use crate::rules::{RuleLists, RuleSet};
use crate::target::NavigationUrl;

/// Page opened when a session starts.
pub const DEFAULT_INITIAL_URL: &str = "https://www.google.com";

/// Startup configuration for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page a new session starts on.
    pub initial_url: String,
    /// Whitelist and restricted lists.
    pub rules: RuleLists,
    /// Wording of the confirmation prompt.
    pub prompt: PromptText,
    /// Deny prompts left unanswered this long. `None` waits indefinitely.
    #[serde(with = "optional_duration_ms")]
    pub decision_timeout: Option<Duration>,
    /// Stylesheets for the presentation layer to inject into loaded pages.
    pub inject_css: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_url: DEFAULT_INITIAL_URL.to_string(),
            rules: RuleLists::deeplink_defaults(),
            prompt: PromptText::default(),
            decision_timeout: None,
            inject_css: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile the rule lists.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        RuleSet::from_lists(&self.rules)
    }

    /// Parse the initial URL.
    pub fn initial_url(&self) -> Result<NavigationUrl, ConfigError> {
        NavigationUrl::parse(&self.initial_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.initial_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Helper for serializing an optional Duration as milliseconds
mod optional_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_millis()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = Option::<u64>::deserialize(deserializer)?;
        Ok(ms.map(Duration::from_millis))
    }
}
