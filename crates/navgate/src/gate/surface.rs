//! The presentation capability the gate asks questions through.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Verdict;
use crate::error::GateError;
use crate::target::NavigationUrl;

/// Placeholder in [`PromptText::message`] replaced by the host label.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Host label used when the target has no host.
pub const FALLBACK_HOST_LABEL: &str = "this site";

/// The answer a user gives to a confirmation prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChoice {
    /// Stay on the current page; the navigation is cancelled.
    Stay,
    /// Leave for the target.
    Leave,
}

impl UserChoice {
    /// The verdict this answer stands for.
    pub fn verdict(self) -> Verdict {
        match self {
            UserChoice::Stay => Verdict::Deny,
            UserChoice::Leave => Verdict::Allow,
        }
    }
}

impl FromStr for UserChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" | "s" | "n" | "no" => Ok(UserChoice::Stay),
            "leave" | "l" | "y" | "yes" => Ok(UserChoice::Leave),
            other => Err(format!("expected 'stay' or 'leave', got {other:?}")),
        }
    }
}

impl fmt::Display for UserChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserChoice::Stay => f.write_str("stay"),
            UserChoice::Leave => f.write_str("leave"),
        }
    }
}

/// Wording of the confirmation prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptText {
    /// Prompt title
    pub title: String,
    /// Prompt body; `{host}` is replaced by the target host.
    pub message: String,
    /// Label of the option that cancels the navigation.
    pub stay_label: String,
    /// Label of the option that proceeds.
    pub leave_label: String,
}

impl Default for PromptText {
    fn default() -> Self {
        Self {
            title: "Leaving? You'll miss out on Cash Back.".to_string(),
            message: format!("Do you really want to visit {HOST_PLACEHOLDER}?"),
            stay_label: "Keep shopping".to_string(),
            leave_label: "Leave".to_string(),
        }
    }
}

impl PromptText {
    /// Fill in the prompt for `url`.
    pub fn render(&self, url: &NavigationUrl) -> ConfirmationPrompt {
        let host_label = match url.host() {
            "" => FALLBACK_HOST_LABEL.to_string(),
            host => host.to_string(),
        };
        ConfirmationPrompt {
            url: url.clone(),
            message: self.message.replace(HOST_PLACEHOLDER, &host_label),
            host_label,
            title: self.title.clone(),
            stay_label: self.stay_label.clone(),
            leave_label: self.leave_label.clone(),
        }
    }
}

/// A two-option question about one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmationPrompt {
    /// The target, captured when the decision was opened.
    pub url: NavigationUrl,
    /// Host shown to the user.
    pub host_label: String,
    /// Prompt title
    pub title: String,
    /// Prompt body
    pub message: String,
    /// Label producing [`UserChoice::Stay`].
    pub stay_label: String,
    /// Label producing [`UserChoice::Leave`].
    pub leave_label: String,
}

/// A UI able to ask the user about a navigation.
///
/// Implementations return [`GateError::NoPresentationSurface`] when they have
/// nowhere to show the prompt, or when the UI goes away before answering.
/// Each call must be independent: one unanswered prompt may not hold up
/// another.
#[async_trait]
pub trait ConfirmationSurface: Send + Sync {
    /// Show `prompt` and wait for the answer.
    async fn present_confirmation(&self, prompt: ConfirmationPrompt) -> Result<Verdict, GateError>;
}

// Implement ConfirmationSurface for Arc<dyn ConfirmationSurface> to allow dynamic dispatch
#[async_trait]
impl ConfirmationSurface for Arc<dyn ConfirmationSurface> {
    async fn present_confirmation(&self, prompt: ConfirmationPrompt) -> Result<Verdict, GateError> {
        (**self).present_confirmation(prompt).await
    }
}

/// A surface that answers every prompt with the same choice.
///
/// Useful for non-interactive hosts and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedSurface {
    choice: UserChoice,
}

impl FixedSurface {
    /// Answer every prompt with `choice`.
    pub fn new(choice: UserChoice) -> Self {
        Self { choice }
    }

    /// Always leave.
    pub fn leave() -> Self {
        Self::new(UserChoice::Leave)
    }

    /// Always stay.
    pub fn stay() -> Self {
        Self::new(UserChoice::Stay)
    }
}

#[async_trait]
impl ConfirmationSurface for FixedSurface {
    async fn present_confirmation(&self, _prompt: ConfirmationPrompt) -> Result<Verdict, GateError> {
        Ok(self.choice.verdict())
    }
}

/// A surface with no UI attached, e.g. after its window was torn down.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedSurface;

#[async_trait]
impl ConfirmationSurface for DetachedSurface {
    async fn present_confirmation(&self, _prompt: ConfirmationPrompt) -> Result<Verdict, GateError> {
        Err(GateError::NoPresentationSurface)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let url = NavigationUrl::parse("https://promo.app.link/x").unwrap();
        let prompt = PromptText::default().render(&url);

        assert_eq!(prompt.host_label, "promo.app.link");
        assert_eq!(prompt.message, "Do you really want to visit promo.app.link?");
        assert_eq!(prompt.url, url);
        assert_eq!(prompt.stay_label, "Keep shopping");
        assert_eq!(prompt.leave_label, "Leave");
    }

    #[test]
    fn test_render_prompt_without_host() {
        let url = NavigationUrl::parse("itms-appss:app/id1").unwrap();
        let prompt = PromptText::default().render(&url);
        assert_eq!(prompt.host_label, FALLBACK_HOST_LABEL);
        assert_eq!(prompt.message, "Do you really want to visit this site?");
    }

    #[test]
    fn test_choice_verdicts() {
        assert_eq!(UserChoice::Stay.verdict(), Verdict::Deny);
        assert_eq!(UserChoice::Leave.verdict(), Verdict::Allow);
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!("leave".parse::<UserChoice>().unwrap(), UserChoice::Leave);
        assert_eq!(" Y\n".parse::<UserChoice>().unwrap(), UserChoice::Leave);
        assert_eq!("stay".parse::<UserChoice>().unwrap(), UserChoice::Stay);
        assert!("maybe".parse::<UserChoice>().is_err());
    }

    #[test]
    fn test_prompt_text_partial_json() {
        let text: PromptText = serde_json::from_str(r#"{"title": "Heads up"}"#).unwrap();
        assert_eq!(text.title, "Heads up");
        assert_eq!(text.leave_label, PromptText::default().leave_label);
    }

    #[tokio::test]
    async fn test_fixed_surface() {
        let url = NavigationUrl::parse("https://app.link").unwrap();
        let prompt = PromptText::default().render(&url);

        let verdict = FixedSurface::leave()
            .present_confirmation(prompt.clone())
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Allow);

        let verdict = FixedSurface::stay()
            .present_confirmation(prompt)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Deny);
    }

    #[tokio::test]
    async fn test_detached_surface() {
        let url = NavigationUrl::parse("https://app.link").unwrap();
        let err = DetachedSurface
            .present_confirmation(PromptText::default().render(&url))
            .await
            .unwrap_err();
        assert_eq!(err, GateError::NoPresentationSurface);
    }
}
