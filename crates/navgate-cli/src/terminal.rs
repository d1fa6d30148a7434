//! Confirmation prompts on the terminal.

use async_trait::async_trait;
use navgate::gate::{ConfirmationPrompt, ConfirmationSurface, UserChoice};
use navgate::{GateError, Verdict};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Asks on stderr and reads answers from stdin, one prompt at a time.
#[derive(Debug)]
pub struct TerminalSurface {
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationSurface for TerminalSurface {
    async fn present_confirmation(&self, prompt: ConfirmationPrompt) -> Result<Verdict, GateError> {
        let mut input = self.input.lock().await;

        eprintln!("\n{}", prompt.title);
        eprintln!("{}", prompt.message);
        loop {
            eprintln!(
                "  [s] {}   [l] {}",
                prompt.stay_label, prompt.leave_label
            );
            eprint!("> ");

            match input.next_line().await {
                Ok(Some(line)) => match line.parse::<UserChoice>() {
                    Ok(choice) => return Ok(choice.verdict()),
                    Err(e) => eprintln!("{e}"),
                },
                // stdin closed: nobody left to answer
                Ok(None) => return Err(GateError::NoPresentationSurface),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read answer");
                    return Err(GateError::NoPresentationSurface);
                }
            }
        }
    }
}
