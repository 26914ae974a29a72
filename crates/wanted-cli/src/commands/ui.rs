use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;
use wanted_core::PollOutcome;

/// Spinner shown while waiting on pending downloads.
///
/// Without a terminal it logs progress instead.
pub struct PendingUi {
    spinner: Option<ProgressBar>,
}

impl PendingUi {
    pub fn new(pending: usize) -> Self {
        let spinner = if is_interactive() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message(format!("Waiting on {} pending downloads...", pending));
            Some(spinner)
        } else {
            tracing::info!(
                operation = "pending_wait",
                mode = "non_interactive",
                pending,
                "Waiting on pending downloads"
            );
            None
        };
        Self { spinner }
    }

    pub fn update(&self, outcome: &PollOutcome) {
        let message = match outcome {
            PollOutcome::Idle => return,
            PollOutcome::Rescheduled { resolved, remaining } => format!(
                "{} resolved, {} still pending",
                resolved.len(),
                remaining
            ),
            PollOutcome::Settled { resolved } => format!("{} resolved, nothing pending", resolved.len()),
            PollOutcome::GaveUp { abandoned, .. } => {
                format!("Gave up on {} downloads with unknown status", abandoned.len())
            }
        };
        match &self.spinner {
            Some(spinner) => spinner.set_message(message),
            None => tracing::info!(operation = "pending_wait", message = %message, "Pending update"),
        }
    }

    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

fn is_interactive() -> bool {
    std::io::stderr().is_terminal() && std::env::var("RUST_LOG_JSON").map(|v| v != "true").unwrap_or(true)
}
