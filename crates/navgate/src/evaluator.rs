//! Classification of navigation targets against a [`RuleSet`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rules::RuleSet;
use crate::target::NavigationUrl;

/// Outcome of classifying a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Load without asking.
    Allow,
    /// Ask the user before loading.
    Confirm,
}

impl Classification {
    /// Returns true if the URL may load without a prompt.
    pub fn is_allow(&self) -> bool {
        matches!(self, Classification::Allow)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Allow => f.write_str("allow"),
            Classification::Confirm => f.write_str("confirm"),
        }
    }
}

/// The rule that decided a classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "entry", rename_all = "snake_case")]
pub enum RuleMatch {
    /// Scheme listed in `whitelist_schemes`.
    WhitelistScheme(String),
    /// Host matched a `whitelist_patterns` entry.
    WhitelistPattern(String),
    /// Scheme listed in `restricted_schemes`.
    RestrictedScheme(String),
    /// Host matched a `restricted_patterns` entry.
    RestrictedPattern(String),
    /// Nothing matched.
    Default,
}

impl fmt::Display for RuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMatch::WhitelistScheme(s) => write!(f, "whitelisted scheme {s:?}"),
            RuleMatch::WhitelistPattern(p) => write!(f, "whitelisted pattern {p:?}"),
            RuleMatch::RestrictedScheme(s) => write!(f, "restricted scheme {s:?}"),
            RuleMatch::RestrictedPattern(p) => write!(f, "restricted pattern {p:?}"),
            RuleMatch::Default => f.write_str("no matching rule"),
        }
    }
}

/// A classification together with the rule that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// The classification.
    pub classification: Classification,
    /// The deciding rule.
    pub rule: RuleMatch,
}

/// One step of the precedence order.
#[derive(Clone, Copy, Debug)]
enum Stage {
    WhitelistScheme,
    WhitelistPattern,
    RestrictedScheme,
    RestrictedPattern,
}

/// Whitelist stages come first so either kind of whitelist entry overrides
/// every restricted entry.
const STAGES: [Stage; 4] = [
    Stage::WhitelistScheme,
    Stage::WhitelistPattern,
    Stage::RestrictedScheme,
    Stage::RestrictedPattern,
];

impl Stage {
    fn classification(self) -> Classification {
        match self {
            Stage::WhitelistScheme | Stage::WhitelistPattern => Classification::Allow,
            Stage::RestrictedScheme | Stage::RestrictedPattern => Classification::Confirm,
        }
    }

    fn check(self, rules: &RuleSet, url: &NavigationUrl) -> Option<RuleMatch> {
        let scheme = url.scheme();
        match self {
            Stage::WhitelistScheme => rules
                .whitelist_schemes()
                .iter()
                .find(|s| s.as_str() == scheme)
                .map(|s| RuleMatch::WhitelistScheme(s.clone())),
            Stage::WhitelistPattern => rules
                .whitelist_patterns()
                .iter()
                .find(|p| p.matches(url))
                .map(|p| RuleMatch::WhitelistPattern(p.as_str().to_string())),
            Stage::RestrictedScheme => rules
                .restricted_schemes()
                .iter()
                .find(|s| s.as_str() == scheme)
                .map(|s| RuleMatch::RestrictedScheme(s.clone())),
            Stage::RestrictedPattern => rules
                .restricted_patterns()
                .iter()
                .find(|p| p.matches(url))
                .map(|p| RuleMatch::RestrictedPattern(p.as_str().to_string())),
        }
    }
}

/// Classifies URLs against a shared, immutable [`RuleSet`].
///
/// Cheap to clone; clones share the rule set.
#[derive(Clone, Debug, Default)]
pub struct PolicyEvaluator {
    rules: Arc<RuleSet>,
}

impl PolicyEvaluator {
    /// Create an evaluator over `rules`.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// The rule set this evaluator reads.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify `url`, reporting which rule decided.
    ///
    /// Precedence: whitelisted scheme, whitelisted pattern, restricted scheme,
    /// restricted pattern, then allow by default.
    pub fn evaluate(&self, url: &NavigationUrl) -> Evaluation {
        STAGES
            .iter()
            .find_map(|stage| {
                stage.check(&self.rules, url).map(|rule| Evaluation {
                    classification: stage.classification(),
                    rule,
                })
            })
            .unwrap_or(Evaluation {
                classification: Classification::Allow,
                rule: RuleMatch::Default,
            })
    }

    /// Classify `url`.
    pub fn classify(&self, url: &NavigationUrl) -> Classification {
        self.evaluate(url).classification
    }
}
