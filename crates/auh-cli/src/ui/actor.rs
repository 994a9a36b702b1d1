//! UI actor: the only writer to the terminal.
//!
//! Pipelines run concurrently and report from many tasks at once. They only
//! send [`UiEvent`]s; a single thread owns stdout/stderr and renders events
//! in arrival order, so lines from different packages never interleave
//! mid-line.

use std::io::Write;
use std::sync::mpsc;
use std::thread;

use crossterm::style::Stylize;

use super::theme::Theme;

/// Messages to the actor.
#[derive(Debug)]
pub enum UiEvent {
    /// Packages of a batch and the backend serving them
    Batch {
        /// Names in request order.
        packages: Vec<String>,
        /// "registry" or "mirror".
        backend: String,
    },
    /// Recipe clone started.
    Fetching(String),
    /// Build tool started.
    Building(String),
    /// Local package manager step started.
    Working {
        /// Package or target.
        name: String,
        /// Verb shown as status, e.g. "removing".
        action: String,
    },
    /// Package finished successfully.
    Done {
        /// Package or target.
        name: String,
        /// Status text.
        detail: String,
    },
    /// Nothing to do for this package.
    Skipped {
        /// Package name.
        name: String,
        /// Why it was skipped.
        reason: String,
    },
    /// Package failed.
    Failed {
        /// Package name as requested.
        name: String,
        /// Error text.
        reason: String,
    },
    /// Plain informational line.
    Info(String),
    /// Bold success line.
    Success(String),
    /// Warning line on stderr.
    Warning(String),
    /// Error line on stderr.
    Error(String),
    /// Acknowledge once every earlier event has been written
    Sync(tokio::sync::oneshot::Sender<()>),
    /// Stop the actor thread.
    Shutdown,
}

/// Where a rendered line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Progress and results.
    Stdout,
    /// Failures, warnings and errors.
    Stderr,
}

/// Owner of the terminal; events are rendered on its own thread.
pub struct UiActor {
    sender: mpsc::Sender<UiEvent>,
    _handle: thread::JoinHandle<()>,
}

impl std::fmt::Debug for UiActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiActor").finish_non_exhaustive()
    }
}

impl UiActor {
    /// Start the actor thread.
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || run_event_loop(&receiver));
        Self {
            sender,
            _handle: handle,
        }
    }

    /// New sender for this actor.
    pub fn sender(&self) -> mpsc::Sender<UiEvent> {
        self.sender.clone()
    }
}

impl Drop for UiActor {
    fn drop(&mut self) {
        let _ = self.sender.send(UiEvent::Shutdown);
    }
}

fn run_event_loop(receiver: &mpsc::Receiver<UiEvent>) {
    let theme = Theme::default();

    while let Ok(event) = receiver.recv() {
        match event {
            UiEvent::Sync(tx) => {
                let _ = std::io::stdout().flush();
                let _ = tx.send(());
            }
            UiEvent::Shutdown => break,
            event => {
                if let Some((stream, line)) = render(&event, &theme) {
                    match stream {
                        Stream::Stdout => println!("{line}"),
                        Stream::Stderr => eprintln!("{line}"),
                    }
                }
            }
        }
    }
    let _ = std::io::stdout().flush();
}

fn package_line(theme: &Theme, icon: String, name: &str, status: String) -> String {
    let padded = format!("{name:<width$}", width = theme.name_width);
    format!(
        "  {icon} {} {status}",
        padded.with(theme.colors.package_name)
    )
}

/// Format one event. Control events render nothing.
pub fn render(event: &UiEvent, theme: &Theme) -> Option<(Stream, String)> {
    let c = &theme.colors;
    let i = &theme.icons;
    let line = match event {
        UiEvent::Batch { packages, backend } => {
            let plural = if packages.len() == 1 { "" } else { "s" };
            let mut out = format!(
                "Installing {} package{plural} from the {backend}",
                packages.len()
            )
            .bold()
            .to_string();
            for name in packages {
                out.push('\n');
                out.push_str(&package_line(
                    theme,
                    i.pending.with(c.secondary).to_string(),
                    name,
                    "queued".with(c.secondary).to_string(),
                ));
            }
            (Stream::Stdout, out)
        }
        UiEvent::Fetching(name) => (
            Stream::Stdout,
            package_line(
                theme,
                i.active.with(c.active).to_string(),
                name,
                "cloning".with(c.secondary).to_string(),
            ),
        ),
        UiEvent::Building(name) => (
            Stream::Stdout,
            package_line(
                theme,
                i.active.with(c.active).to_string(),
                name,
                "building".with(c.secondary).to_string(),
            ),
        ),
        UiEvent::Working { name, action } => (
            Stream::Stdout,
            package_line(
                theme,
                i.active.with(c.active).to_string(),
                name,
                action.as_str().with(c.secondary).to_string(),
            ),
        ),
        UiEvent::Done { name, detail } => (
            Stream::Stdout,
            package_line(
                theme,
                i.success.with(c.success).to_string(),
                name,
                detail.as_str().with(c.success).to_string(),
            ),
        ),
        UiEvent::Skipped { name, reason } => (
            Stream::Stdout,
            package_line(
                theme,
                i.warning.with(c.warning).to_string(),
                name,
                reason.as_str().with(c.secondary).to_string(),
            ),
        ),
        UiEvent::Failed { name, reason } => (
            Stream::Stderr,
            package_line(
                theme,
                i.error.with(c.error).to_string(),
                name,
                reason.as_str().with(c.error).to_string(),
            ),
        ),
        UiEvent::Info(msg) => (Stream::Stdout, format!("  {} {msg}", i.info)),
        UiEvent::Success(msg) => (
            Stream::Stdout,
            format!("{} {}", i.success.with(c.success), msg.as_str().bold()),
        ),
        UiEvent::Warning(msg) => (
            Stream::Stderr,
            format!("{} {}", i.warning.with(c.warning), msg.as_str().with(c.warning)),
        ),
        UiEvent::Error(msg) => (
            Stream::Stderr,
            format!("{} {}", i.error.with(c.error), msg.as_str().with(c.error).bold()),
        ),
        UiEvent::Sync(_) | UiEvent::Shutdown => return None,
    };
    Some(line)
}
