//! Deeplink Prompt Example
//!
//! Runs a browsing session with the built-in deeplink rules and a simulated UI
//! task that answers confirmation prompts:
//!
//! 1. A plain page loads without a prompt.
//! 2. An attribution link is held until the "user" answers.
//! 3. An App Store deeplink is refused.
//!
//! Run with: cargo run -p navgate --example deeplink_prompt

use std::sync::Arc;

use navgate::gate::{UserChoice, prompt_channel};
use navgate::{EngineConfig, FrameKind, Navigator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let navigator = Navigator::configure(EngineConfig::default())?;
    let (surface, responder, mut prompts) = prompt_channel(8);
    let session = Arc::new(navigator.open_session(surface));

    // Simulated UI: leave for attribution links, stay for everything else.
    let ui = tokio::spawn(async move {
        while let Some(request) = prompts.recv().await {
            println!("\n[{}] {}", request.prompt.title, request.prompt.message);
            println!(
                "  ({} / {})",
                request.prompt.stay_label, request.prompt.leave_label
            );

            let choice = if request.prompt.url.host().ends_with("app.link") {
                UserChoice::Leave
            } else {
                UserChoice::Stay
            };
            println!("  -> user chose {choice}");
            let _ = responder.resolve(request.id, choice);
        }
    });

    for target in [
        "https://www.google.com/search?q=shoes",
        "https://promo.app.link/spring-sale",
        "itms-appss://apps.apple.com/app/id123456",
    ] {
        let outcome = session
            .on_navigation_attempt(target, FrameKind::MainFrame)
            .await;
        println!("{target}: {}", outcome.verdict);
    }

    println!("\nNavigation log:");
    for (i, url) in session.log_snapshot().iter().enumerate() {
        println!("  {i}: {url}");
    }

    // Dropping the session closes the prompt channel and ends the UI task.
    drop(session);
    ui.await?;

    Ok(())
}
