//! Channel-backed confirmation surface.
//!
//! The gate side ([`ChannelSurface`]) pushes each prompt onto an mpsc channel
//! and waits on a per-prompt oneshot. The UI side drains the channel and
//! answers through a [`PromptResponder`]. Pending prompts are kept in a
//! registry keyed by id so answers can arrive in any order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::surface::{ConfirmationPrompt, ConfirmationSurface, UserChoice};
use super::{PendingDecision, Verdict};
use crate::error::GateError;

type Registry = Arc<Mutex<HashMap<u64, PendingDecision>>>;

/// A prompt waiting for the UI, as received from the channel.
#[derive(Clone, Debug)]
pub struct PromptRequest {
    /// Id to answer with.
    pub id: u64,
    /// What to show.
    pub prompt: ConfirmationPrompt,
}

/// Create a connected surface/responder pair.
///
/// `buffer` bounds how many prompts may sit in the channel before the UI
/// picks them up.
pub fn prompt_channel(
    buffer: usize,
) -> (ChannelSurface, PromptResponder, mpsc::Receiver<PromptRequest>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let pending: Registry = Arc::new(Mutex::new(HashMap::new()));
    let surface = ChannelSurface {
        tx,
        pending: Arc::clone(&pending),
        next_id: AtomicU64::new(1),
    };
    (surface, PromptResponder { pending }, rx)
}

/// Surface that forwards prompts to a UI task over a channel.
#[derive(Debug)]
pub struct ChannelSurface {
    tx: mpsc::Sender<PromptRequest>,
    pending: Registry,
    next_id: AtomicU64,
}

impl ChannelSurface {
    /// Number of prompts still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        pending_len(&self.pending)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl ConfirmationSurface for ChannelSurface {
    async fn present_confirmation(&self, prompt: ConfirmationPrompt) -> Result<Verdict, GateError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();

        // Register the pending decision
        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| GateError::NoPresentationSurface)?;
            pending.insert(id, PendingDecision::new(id, prompt.url.clone(), tx));
        }
        // Removes the entry however this future ends, including cancellation.
        let _registration = Registration {
            pending: &self.pending,
            id,
        };

        self.tx
            .send(PromptRequest { id, prompt })
            .await
            .map_err(|_| GateError::NoPresentationSurface)?;

        tokio::select! {
            biased;
            verdict = rx => verdict.map_err(|_| GateError::NoPresentationSurface),
            () = self.tx.closed() => Err(GateError::NoPresentationSurface),
        }
    }
}

/// Drops a registry entry when the waiting future finishes.
struct Registration<'a> {
    pending: &'a Registry,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let removed = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&self.id));
        // Dropped outside the lock; an unresolved decision denies itself.
        drop(removed);
    }
}

/// Handle the UI uses to answer prompts.
#[derive(Clone, Debug)]
pub struct PromptResponder {
    pending: Registry,
}

impl PromptResponder {
    /// Answer prompt `id`.
    ///
    /// The first answer wins. Answering again, or answering an id that timed
    /// out or never existed, returns [`GateError::DuplicateResolution`] and
    /// changes nothing.
    pub fn resolve(&self, id: u64, choice: UserChoice) -> Result<(), GateError> {
        let entry = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&id));

        match entry {
            Some(mut decision) => decision.resolve(choice.verdict()),
            None => {
                tracing::debug!(id, "ignoring answer for unknown or resolved decision");
                Err(GateError::DuplicateResolution(id))
            }
        }
    }

    /// Deny every open prompt, e.g. when the UI is torn down.
    ///
    /// Returns how many prompts were open.
    pub fn dismiss_all(&self) -> usize {
        let drained: Vec<PendingDecision> = match self.pending.lock() {
            Ok(mut pending) => pending.drain().map(|(_, d)| d).collect(),
            Err(_) => Vec::new(),
        };
        let count = drained.len();
        for mut decision in drained {
            let _ = decision.resolve(Verdict::Deny);
        }
        count
    }

    /// Number of prompts still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        pending_len(&self.pending)
    }
}

fn pending_len(pending: &Registry) -> usize {
    pending.lock().map(|p| p.len()).unwrap_or(0)
}
