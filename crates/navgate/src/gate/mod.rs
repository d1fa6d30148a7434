//! Human-in-the-loop confirmation of restricted navigations.
//!
//! A [`DecisionGate`] turns a [`Classification::Confirm`](crate::Classification)
//! into a question for the user and always comes back with exactly one
//! [`Verdict`]. The question is asked through a [`ConfirmationSurface`]
//! supplied by the host application, which keeps the policy side free of any
//! UI code.
//!
//! The gate never leaves a decision hanging:
//!
//! - a surface that cannot show the prompt yields [`Verdict::Deny`]
//! - a surface that goes away before answering yields [`Verdict::Deny`]
//! - with a timeout configured, an unanswered prompt yields [`Verdict::Deny`]
//!
//! ## Example
//!
//! ```rust
//! use navgate::gate::{DecisionGate, FixedSurface, Verdict};
//! use navgate::NavigationUrl;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let gate = DecisionGate::new(FixedSurface::leave());
//! let url = NavigationUrl::parse("https://promo.app.link/x").unwrap();
//! assert_eq!(gate.request_confirmation(&url).await, Verdict::Allow);
//! # });
//! ```

mod channel;
mod surface;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

pub use channel::{ChannelSurface, PromptRequest, PromptResponder, prompt_channel};
pub use surface::{
    ConfirmationPrompt, ConfirmationSurface, DetachedSurface, FALLBACK_HOST_LABEL, FixedSurface,
    HOST_PLACEHOLDER, PromptText, UserChoice,
};

use crate::error::GateError;
use crate::target::NavigationUrl;

/// Final answer for a navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Load the target.
    Allow,
    /// Do not load the target.
    Deny,
}

impl Verdict {
    /// Returns true if the target may load.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => f.write_str("allow"),
            Verdict::Deny => f.write_str("deny"),
        }
    }
}

/// A single navigation attempt waiting for the user.
///
/// Holds the target captured when the question was opened and a single-use
/// slot for the answer. Resolving twice reports
/// [`GateError::DuplicateResolution`] and sends nothing. Dropping an
/// unresolved decision resolves it to [`Verdict::Deny`].
pub struct PendingDecision {
    id: u64,
    url: NavigationUrl,
    slot: Option<oneshot::Sender<Verdict>>,
}

impl fmt::Debug for PendingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDecision")
            .field("id", &self.id)
            .field("url", &self.url.as_str())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl PendingDecision {
    /// Open a decision whose answer is delivered on `slot`.
    pub fn new(id: u64, url: NavigationUrl, slot: oneshot::Sender<Verdict>) -> Self {
        Self {
            id,
            url,
            slot: Some(slot),
        }
    }

    /// Decision id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The target this decision is about.
    pub fn url(&self) -> &NavigationUrl {
        &self.url
    }

    /// Returns true once an answer has been delivered.
    pub fn is_resolved(&self) -> bool {
        self.slot.is_none()
    }

    /// Deliver the answer.
    pub fn resolve(&mut self, verdict: Verdict) -> Result<(), GateError> {
        let slot = self
            .slot
            .take()
            .ok_or(GateError::DuplicateResolution(self.id))?;
        // The waiter may have given up already; the decision is still spent.
        let _ = slot.send(verdict);
        Ok(())
    }
}

impl Drop for PendingDecision {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            tracing::debug!(id = self.id, url = %self.url, "pending decision dropped, denying");
            let _ = slot.send(Verdict::Deny);
        }
    }
}

/// Asks the user about restricted navigations.
pub struct DecisionGate {
    surface: Arc<dyn ConfirmationSurface>,
    text: PromptText,
    timeout: Option<Duration>,
}

impl fmt::Debug for DecisionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionGate")
            .field("text", &self.text)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl DecisionGate {
    /// Create a gate that asks through `surface` with the default wording and
    /// no timeout.
    pub fn new(surface: impl ConfirmationSurface + 'static) -> Self {
        Self::from_arc(Arc::new(surface))
    }

    /// Create a gate over a shared surface.
    pub fn from_arc(surface: Arc<dyn ConfirmationSurface>) -> Self {
        Self {
            surface,
            text: PromptText::default(),
            timeout: None,
        }
    }

    /// Use `text` for prompts.
    pub fn with_text(mut self, text: PromptText) -> Self {
        self.text = text;
        self
    }

    /// Deny prompts that are not answered within `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prompt wording
    pub fn text(&self) -> &PromptText {
        &self.text
    }

    /// Ask whether to load `url`.
    ///
    /// Suspends only the calling navigation; concurrent calls are asked and
    /// answered independently. Always resolves.
    pub async fn request_confirmation(&self, url: &NavigationUrl) -> Verdict {
        let prompt = self.text.render(url);
        let asked = self.surface.present_confirmation(prompt);

        let answer = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, asked)
                .await
                .unwrap_or(Err(GateError::TimedOut)),
            None => asked.await,
        };

        match answer {
            Ok(verdict) => {
                tracing::info!(url = %url, %verdict, "navigation confirmed by user");
                verdict
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "confirmation unavailable, denying");
                Verdict::Deny
            }
        }
    }
}
