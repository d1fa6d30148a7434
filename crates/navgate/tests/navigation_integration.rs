//! End-to-end tests for the navigation engine.
//!
//! These tests drive sessions the way a browsing surface would:
//! - classification and whitelist precedence
//! - confirmation prompts answered through a channel-backed UI
//! - navigation log ordering and deduplication
//! - prompts that are never answered

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use navgate::gate::{DetachedSurface, FixedSurface, PromptRequest, UserChoice, prompt_channel};
use navgate::{
    BLANK_PAGE, Classification, EngineConfig, FrameKind, GateError, NavigationUrl, Navigator,
    RuleLists, RuleMatch, Verdict,
};
use tokio::sync::mpsc;

fn navigator(rules: RuleLists) -> Navigator {
    Navigator::configure(EngineConfig {
        rules,
        ..EngineConfig::default()
    })
    .expect("valid config")
}

fn restricted(patterns: &[&str]) -> RuleLists {
    RuleLists {
        restricted_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        ..RuleLists::default()
    }
}

async fn next_prompt(rx: &mut mpsc::Receiver<PromptRequest>) -> PromptRequest {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("prompt in time")
        .expect("channel open")
}

// =============================================================================
// Scenarios
// =============================================================================

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_restricted_wildcard_then_leave() {
        let nav = navigator(restricted(&["*all.app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://promo.app.link/x", FrameKind::MainFrame)
                    .await
            }
        });

        let request = next_prompt(&mut rx).await;
        assert_eq!(request.prompt.host_label, "promo.app.link");
        responder.resolve(request.id, UserChoice::Leave).unwrap();

        let outcome = attempt.await.unwrap();
        assert_eq!(outcome.classification(), Some(Classification::Confirm));
        assert!(outcome.prompted);
        assert_eq!(outcome.verdict, Verdict::Allow);

        let logged: Vec<_> = session
            .log_snapshot()
            .iter()
            .map(|u| u.as_str().to_string())
            .collect();
        assert_eq!(logged, vec!["https://promo.app.link/x"]);
    }

    #[tokio::test]
    async fn test_whitelist_scheme_overrides_restricted_pattern() {
        let nav = navigator(RuleLists {
            whitelist_schemes: vec!["https".into()],
            restricted_patterns: vec!["app.link".into()],
            ..RuleLists::default()
        });
        let (surface, responder, _rx) = prompt_channel(8);
        let session = nav.open_session(surface);

        let outcome = session
            .on_navigation_attempt("https://app.link/x", FrameKind::MainFrame)
            .await;

        assert_eq!(outcome.verdict, Verdict::Allow);
        assert!(!outcome.prompted);
        assert_eq!(
            outcome.evaluation.unwrap().rule,
            RuleMatch::WhitelistScheme("https".into())
        );
        assert_eq!(responder.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_page_main_frame() {
        let nav = navigator(RuleLists::default());
        let session = nav.open_session(DetachedSurface);

        let outcome = session
            .on_navigation_attempt(BLANK_PAGE, FrameKind::MainFrame)
            .await;

        assert_eq!(outcome.classification(), Some(Classification::Allow));
        assert_eq!(outcome.verdict, Verdict::Allow);
        assert!(session.log_snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_store_scheme_confirms_with_defaults() {
        let nav = Navigator::configure(EngineConfig::default()).unwrap();
        let session = nav.open_session(FixedSurface::stay());

        let outcome = session
            .on_navigation_attempt("itms-appss://unlisted.example/app/id1", FrameKind::MainFrame)
            .await;

        assert_eq!(outcome.classification(), Some(Classification::Confirm));
        assert_eq!(outcome.verdict, Verdict::Deny);
    }
}

// =============================================================================
// Navigation Log
// =============================================================================

mod navigation_log {
    use super::*;

    #[tokio::test]
    async fn test_dedup_and_order() {
        let nav = navigator(RuleLists::default());
        let session = nav.open_session(DetachedSurface);

        for target in [
            "https://a.example/",
            "https://b.example/",
            "https://a.example/",
            "https://c.example/",
        ] {
            session
                .on_navigation_attempt(target, FrameKind::MainFrame)
                .await;
        }

        let logged: Vec<_> = session
            .log_snapshot()
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            logged,
            vec![
                "https://a.example/",
                "https://b.example/",
                "https://c.example/"
            ]
        );
    }

    #[tokio::test]
    async fn test_logged_before_decision() {
        let nav = navigator(restricted(&["app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://app.link/a", FrameKind::MainFrame)
                    .await
            }
        });

        // While the prompt is open the URL is already in the log.
        let request = next_prompt(&mut rx).await;
        assert_eq!(session.log_len(), 1);

        responder.resolve(request.id, UserChoice::Stay).unwrap();
        let outcome = attempt.await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Deny);
        assert_eq!(session.log_len(), 1);
    }

    #[tokio::test]
    async fn test_log_follows_observation_order_not_decision_order() {
        let nav = navigator(restricted(&["slow.example"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let slow = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://slow.example/", FrameKind::MainFrame)
                    .await
            }
        });
        let request = next_prompt(&mut rx).await;

        let fast = session
            .on_navigation_attempt("https://fast.example/", FrameKind::MainFrame)
            .await;
        assert!(fast.is_allowed());

        responder.resolve(request.id, UserChoice::Leave).unwrap();
        assert!(slow.await.unwrap().is_allowed());

        let logged: Vec<_> = session
            .log_snapshot()
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(logged, vec!["https://slow.example/", "https://fast.example/"]);
        // The slow one was decided last, so it is the current page.
        assert_eq!(session.current_url().as_str(), "https://slow.example/");
    }
}

// =============================================================================
// Decision Gate
// =============================================================================

mod decision_gate {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_prompts_resolve_independently() {
        let nav = navigator(restricted(&["*all.app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let spawn_attempt = |target: &'static str| {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .on_navigation_attempt(target, FrameKind::MainFrame)
                    .await
            })
        };

        let first = spawn_attempt("https://one.app.link/");
        let first_prompt = next_prompt(&mut rx).await;
        let second = spawn_attempt("https://two.app.link/");
        let second_prompt = next_prompt(&mut rx).await;

        assert_eq!(responder.pending_count(), 2);

        // Answer out of order.
        responder
            .resolve(second_prompt.id, UserChoice::Leave)
            .unwrap();
        let second = second.await.unwrap();
        assert_eq!(second.verdict, Verdict::Allow);
        assert_eq!(second.url.unwrap().as_str(), "https://two.app.link/");

        responder.resolve(first_prompt.id, UserChoice::Stay).unwrap();
        let first = first.await.unwrap();
        assert_eq!(first.verdict, Verdict::Deny);
        assert_eq!(first.url.unwrap().as_str(), "https://one.app.link/");

        assert_eq!(responder.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_answer_has_no_effect() {
        let nav = navigator(restricted(&["app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://app.link/", FrameKind::MainFrame)
                    .await
            }
        });

        let request = next_prompt(&mut rx).await;
        responder.resolve(request.id, UserChoice::Stay).unwrap();
        assert_eq!(
            responder.resolve(request.id, UserChoice::Leave),
            Err(GateError::DuplicateResolution(request.id))
        );

        let outcome = attempt.await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Deny);
        // The second answer did not move the session to the target.
        assert_eq!(session.current_url(), *nav.initial_url());
    }

    #[tokio::test]
    async fn test_ui_torn_down_denies() {
        let nav = navigator(restricted(&["app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://app.link/", FrameKind::MainFrame)
                    .await
            }
        });

        let _request = next_prompt(&mut rx).await;
        drop(rx);

        let outcome = tokio::time::timeout(Duration::from_secs(5), attempt)
            .await
            .expect("resolved after teardown")
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::Deny);
        assert_eq!(responder.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_dismiss_all_denies_open_prompts() {
        let nav = navigator(restricted(&["app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://app.link/", FrameKind::MainFrame)
                    .await
            }
        });

        let _request = next_prompt(&mut rx).await;
        assert_eq!(responder.dismiss_all(), 1);

        assert_eq!(attempt.await.unwrap().verdict, Verdict::Deny);
        assert_eq!(responder.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_no_surface_denies() {
        let nav = navigator(restricted(&["app.link"]));
        let session = nav.open_session(DetachedSurface);

        let outcome = session
            .on_navigation_attempt("https://app.link/", FrameKind::MainFrame)
            .await;
        assert!(outcome.prompted);
        assert_eq!(outcome.verdict, Verdict::Deny);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_prompt_times_out() {
        let nav = Navigator::configure(EngineConfig {
            rules: restricted(&["app.link"]),
            decision_timeout: Some(Duration::from_secs(60)),
            ..EngineConfig::default()
        })
        .unwrap();
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = nav.open_session(surface);

        let outcome = session
            .on_navigation_attempt("https://app.link/", FrameKind::MainFrame)
            .await;
        assert_eq!(outcome.verdict, Verdict::Deny);
        assert_eq!(responder.pending_count(), 0);

        // The prompt was delivered; answering it now changes nothing.
        let request = rx.recv().await.unwrap();
        assert!(responder.resolve(request.id, UserChoice::Leave).is_err());
    }

    #[tokio::test]
    async fn test_prompt_carries_captured_url() {
        let nav = navigator(restricted(&["app.link"]));
        let (surface, responder, mut rx) = prompt_channel(8);
        let session = Arc::new(nav.open_session(surface));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move {
                session
                    .on_navigation_attempt("https://app.link/original", FrameKind::MainFrame)
                    .await
            }
        });

        let request = next_prompt(&mut rx).await;
        // The surface moves on while the prompt is open.
        session
            .on_navigation_attempt("https://elsewhere.example/", FrameKind::MainFrame)
            .await;

        responder.resolve(request.id, UserChoice::Leave).unwrap();
        let outcome = attempt.await.unwrap();

        let expected = NavigationUrl::parse("https://app.link/original").unwrap();
        assert_eq!(request.prompt.url, expected);
        assert_eq!(outcome.url, Some(expected.clone()));
        assert_eq!(session.current_url(), expected);
    }
}
