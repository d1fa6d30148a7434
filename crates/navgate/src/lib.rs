//! navgate: navigation policy engine
//!
//! Decides, for every URL a browsing surface is about to load, whether it may
//! load silently or only after the user confirms. Restricted targets (by host
//! pattern or scheme) are turned into a two-option prompt; whitelisted targets
//! always load. Main-frame navigations are recorded in a deduplicated log for
//! the host application to display.
//!
//! ```rust
//! use navgate::gate::FixedSurface;
//! use navgate::{EngineConfig, FrameKind, Navigator, Verdict};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let navigator = Navigator::configure(EngineConfig::default()).unwrap();
//! let session = navigator.open_session(FixedSurface::stay());
//!
//! let outcome = session
//!     .on_navigation_attempt("https://promo.app.link/offer", FrameKind::MainFrame)
//!     .await;
//! assert!(outcome.prompted);
//! assert_eq!(outcome.verdict, Verdict::Deny);
//! assert_eq!(session.log_snapshot().len(), 1);
//! # });
//! ```

mod config;
mod error;
mod evaluator;
mod log;
mod pattern;
mod rules;
mod session;
mod target;

pub mod gate;

pub use config::{DEFAULT_INITIAL_URL, EngineConfig};
pub use error::{ConfigError, GateError, NavigationError};
pub use evaluator::{Classification, Evaluation, PolicyEvaluator, RuleMatch};
pub use gate::{DecisionGate, PendingDecision, Verdict};
pub use log::NavigationLog;
pub use pattern::{HostPattern, WILDCARD_PREFIX, matches};
pub use rules::{
    DEEPLINK_RESTRICTED_PATTERNS, DEEPLINK_RESTRICTED_SCHEMES, RuleLists, RuleSet, RuleSetBuilder,
};
pub use session::{BrowsingSession, FrameKind, NavigationOutcome, Navigator};
pub use target::{BLANK_PAGE, NavigationUrl};
