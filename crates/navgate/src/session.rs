//! Engine entry points: one [`Navigator`] per application, one
//! [`BrowsingSession`] per browsing surface.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{ConfigError, NavigationError};
use crate::evaluator::{Classification, Evaluation, PolicyEvaluator};
use crate::gate::{ConfirmationSurface, DecisionGate, Verdict};
use crate::log::NavigationLog;
use crate::target::NavigationUrl;

/// Which frame a navigation replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// The primary document of the browsing surface.
    MainFrame,
    /// An embedded frame or sub-resource.
    SubFrame,
}

impl FrameKind {
    /// Returns true for main-frame top-level navigations.
    pub fn is_main_frame(&self) -> bool {
        matches!(self, FrameKind::MainFrame)
    }
}

/// What happened to one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    /// The parsed target, or `None` if it could not be parsed.
    pub url: Option<NavigationUrl>,
    /// Classification and deciding rule, if the target parsed.
    pub evaluation: Option<Evaluation>,
    /// Whether the user was asked.
    pub prompted: bool,
    /// Whether the attempt was appended to the navigation log.
    pub recorded: bool,
    /// Final verdict
    pub verdict: Verdict,
}

impl NavigationOutcome {
    /// Returns true if the surface should load the target.
    pub fn is_allowed(&self) -> bool {
        self.verdict.is_allowed()
    }

    /// The classification, if the target parsed.
    pub fn classification(&self) -> Option<Classification> {
        self.evaluation.as_ref().map(|e| e.classification)
    }
}

/// The configured engine.
///
/// Built once at startup with [`Navigator::configure`]. The compiled rule set
/// is shared read-only by every session opened from it.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: EngineConfig,
    evaluator: PolicyEvaluator,
    initial_url: NavigationUrl,
}

impl Navigator {
    /// Validate `config` and compile its rules.
    pub fn configure(config: EngineConfig) -> Result<Self, ConfigError> {
        let evaluator = PolicyEvaluator::new(config.rule_set()?);
        let initial_url = config.initial_url()?;
        tracing::debug!(
            whitelist_patterns = evaluator.rules().whitelist_patterns().len(),
            whitelist_schemes = evaluator.rules().whitelist_schemes().len(),
            restricted_patterns = evaluator.rules().restricted_patterns().len(),
            restricted_schemes = evaluator.rules().restricted_schemes().len(),
            "navigator configured"
        );
        Ok(Self {
            config,
            evaluator,
            initial_url,
        })
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared evaluator.
    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    /// Page new sessions start on.
    pub fn initial_url(&self) -> &NavigationUrl {
        &self.initial_url
    }

    /// Stylesheet payloads for the presentation layer.
    pub fn inject_css(&self) -> &[String] {
        &self.config.inject_css
    }

    /// Classify a raw target without opening a session.
    pub fn evaluate(&self, target: &str) -> Result<Evaluation, NavigationError> {
        let url = NavigationUrl::parse(target)?;
        Ok(self.evaluator.evaluate(&url))
    }

    /// Open a session for a browsing surface that asks through `surface`.
    pub fn open_session(&self, surface: impl ConfirmationSurface + 'static) -> BrowsingSession {
        self.open_session_with(Arc::new(surface))
    }

    /// Open a session over a shared surface.
    pub fn open_session_with(&self, surface: Arc<dyn ConfirmationSurface>) -> BrowsingSession {
        let gate = DecisionGate::from_arc(surface)
            .with_text(self.config.prompt.clone())
            .with_timeout(self.config.decision_timeout);
        BrowsingSession::new(self.evaluator.clone(), gate, self.initial_url.clone())
    }
}

#[derive(Debug)]
struct SessionState {
    log: NavigationLog,
    current: NavigationUrl,
}

/// Navigation pipeline of a single browsing surface.
///
/// Attempts may be submitted concurrently from several tasks; each one that
/// needs confirmation waits on its own prompt. The navigation log and the
/// current URL are owned by the session and only touched between awaits.
pub struct BrowsingSession {
    evaluator: PolicyEvaluator,
    gate: DecisionGate,
    initial_url: NavigationUrl,
    state: Mutex<SessionState>,
}

impl fmt::Debug for BrowsingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowsingSession")
            .field("gate", &self.gate)
            .field("initial_url", &self.initial_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BrowsingSession {
    /// Create a session from its parts.
    pub fn new(evaluator: PolicyEvaluator, gate: DecisionGate, initial_url: NavigationUrl) -> Self {
        Self {
            evaluator,
            gate,
            state: Mutex::new(SessionState {
                log: NavigationLog::new(),
                current: initial_url.clone(),
            }),
            initial_url,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether the surface may load `target`.
    ///
    /// Main-frame attempts are logged before any decision is made, so denied
    /// targets appear in the log too. Targets that do not parse are allowed and
    /// not logged.
    pub async fn on_navigation_attempt(&self, target: &str, frame: FrameKind) -> NavigationOutcome {
        match NavigationUrl::parse(target) {
            Ok(url) => self.navigate(url, frame).await,
            Err(err) => {
                tracing::debug!(error = %err, "unparseable navigation target, allowing");
                NavigationOutcome {
                    url: None,
                    evaluation: None,
                    prompted: false,
                    recorded: false,
                    verdict: Verdict::Allow,
                }
            }
        }
    }

    /// Decide whether the surface may load an already parsed `url`.
    pub async fn navigate(&self, url: NavigationUrl, frame: FrameKind) -> NavigationOutcome {
        let recorded = frame.is_main_frame() && self.state().log.record(&url);

        let evaluation = self.evaluator.evaluate(&url);
        tracing::debug!(
            url = %url,
            ?frame,
            classification = %evaluation.classification,
            rule = %evaluation.rule,
            "classified navigation"
        );

        let (verdict, prompted) = match evaluation.classification {
            Classification::Allow => (Verdict::Allow, false),
            Classification::Confirm => (self.gate.request_confirmation(&url).await, true),
        };

        if verdict.is_allowed() && frame.is_main_frame() {
            self.state().current = url.clone();
        }

        NavigationOutcome {
            url: Some(url),
            evaluation: Some(evaluation),
            prompted,
            recorded,
            verdict,
        }
    }

    /// Logged URLs, in first-seen order.
    pub fn log_snapshot(&self) -> Vec<NavigationUrl> {
        self.state().log.snapshot()
    }

    /// Number of logged URLs.
    pub fn log_len(&self) -> usize {
        self.state().log.len()
    }

    /// The last main-frame URL that was allowed to load.
    pub fn current_url(&self) -> NavigationUrl {
        self.state().current.clone()
    }

    /// Pick the logged URL at `index` to load again and make it current.
    ///
    /// The host still submits the load through
    /// [`on_navigation_attempt`](Self::on_navigation_attempt).
    pub fn select_logged(&self, index: usize) -> Option<NavigationUrl> {
        let mut state = self.state();
        let url = state.log.get(index)?.clone();
        state.current = url.clone();
        Some(url)
    }

    /// Clear the log and go back to the initial URL.
    pub fn reset(&self) {
        let mut state = self.state();
        state.log.clear();
        state.current = self.initial_url.clone();
    }

    /// The gate this session asks through.
    pub fn gate(&self) -> &DecisionGate {
        &self.gate
    }
}
