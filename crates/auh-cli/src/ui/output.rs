//! Public output API used by commands and by the core through [`Reporter`].

use std::sync::{OnceLock, mpsc};

use auh_core::Reporter;

use super::actor::{UiActor, UiEvent};

static UI_ACTOR: OnceLock<mpsc::Sender<UiEvent>> = OnceLock::new();

fn actor_sender() -> mpsc::Sender<UiEvent> {
    UI_ACTOR
        .get_or_init(|| {
            let actor = UiActor::spawn();
            let sender = actor.sender();
            // The actor lives for the whole process.
            std::mem::forget(actor);
            sender
        })
        .clone()
}

/// Cloneable handle sending events to the terminal actor.
#[derive(Clone, Debug)]
pub struct Output {
    sender: mpsc::Sender<UiEvent>,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Handle on the process-wide actor, spawning it on first use.
    pub fn new() -> Self {
        Self {
            sender: actor_sender(),
        }
    }

    fn send(&self, event: UiEvent) {
        let _ = self.sender.send(event);
    }

    /// Wait until every event sent so far has been written.
    pub async fn wait(&self) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send(UiEvent::Sync(tx));
        let _ = rx.await;
    }
}

impl Reporter for Output {
    fn prepare_batch(&self, packages: &[String], backend: &str) {
        self.send(UiEvent::Batch {
            packages: packages.to_vec(),
            backend: backend.to_string(),
        });
    }

    fn fetching(&self, name: &str) {
        self.send(UiEvent::Fetching(name.to_string()));
    }

    fn building(&self, name: &str) {
        self.send(UiEvent::Building(name.to_string()));
    }

    fn working(&self, name: &str, action: &str) {
        self.send(UiEvent::Working {
            name: name.to_string(),
            action: action.to_string(),
        });
    }

    fn done(&self, name: &str, detail: &str) {
        self.send(UiEvent::Done {
            name: name.to_string(),
            detail: detail.to_string(),
        });
    }

    fn skipped(&self, name: &str, reason: &str) {
        self.send(UiEvent::Skipped {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    fn failed(&self, name: &str, reason: &str) {
        self.send(UiEvent::Failed {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    fn info(&self, msg: &str) {
        self.send(UiEvent::Info(msg.to_string()));
    }

    fn success(&self, msg: &str) {
        self.send(UiEvent::Success(msg.to_string()));
    }

    fn warning(&self, msg: &str) {
        self.send(UiEvent::Warning(msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.send(UiEvent::Error(msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_after_pending_events() {
        let output = Output::new();
        output.info("first");
        output.done("yay", "installed");
        output.wait().await;
    }
}
