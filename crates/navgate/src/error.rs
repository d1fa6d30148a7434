//! Error types for the navigation engine.

use thiserror::Error;

/// Errors raised while building a [`RuleSet`](crate::RuleSet) or loading an
/// [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pattern was empty, or a wildcard pattern had no domain after `*all.`.
    #[error("empty host pattern in {list}")]
    EmptyPattern {
        /// Which rule list contained the pattern.
        list: &'static str,
    },
    /// A scheme entry was empty.
    #[error("empty scheme in {list}")]
    EmptyScheme {
        /// Which rule list contained the scheme.
        list: &'static str,
    },
    /// A wildcard pattern could not be compiled.
    #[error("invalid host pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why compilation failed.
        reason: String,
    },
    /// A configured URL (such as the initial URL) does not parse.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// IO error while reading a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON config
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors describing a navigation target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The target could not be parsed into scheme and host.
    #[error("malformed URL {url:?}: {reason}")]
    MalformedUrl {
        /// The raw target text.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Errors from the confirmation path of the [`DecisionGate`](crate::DecisionGate).
///
/// None of these reach the browsing surface: the gate maps every one of them
/// to [`Verdict::Deny`](crate::Verdict::Deny) or ignores it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// No UI is available to present the prompt, or it went away before
    /// answering.
    #[error("no presentation surface available")]
    NoPresentationSurface,
    /// The decision was already resolved (or never existed).
    #[error("decision {0} already resolved")]
    DuplicateResolution(u64),
    /// The prompt was not answered within the configured timeout.
    #[error("confirmation timed out")]
    TimedOut,
}
