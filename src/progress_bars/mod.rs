use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::{sync::mpsc::Receiver, task::JoinHandle};

const SPINNER_TEMPLATE: &str = "{spinner:.green.bold} {elapsed_precise:.bold} {wide_msg}";

/// Shows the notifications of the queue on a single spinner line.
///
/// Job boundaries and errors are kept above the spinner, everything else only replaces the
/// current message.
#[derive(Debug)]
pub struct SpinnerRenderer {
    bar: ProgressBar,
}

impl SpinnerRenderer {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");

        let bar = ProgressBar::new_spinner().with_style(style);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    fn render(&self, message: &str) {
        if message.starts_with("Error:") || message.starts_with("Job failed") {
            self.bar.println(message.bold().red().to_string());
        } else if message.starts_with("Starting job")
            || message.starts_with("Finished job")
            || message.starts_with("Completed")
            || message.starts_with("All jobs finished")
        {
            self.bar.println(message.bold().green().to_string());
        } else if message.starts_with("Already queued") || message.contains("API limit") {
            self.bar.println(message.bold().yellow().to_string());
        } else {
            self.bar.set_message(message.to_string());
        }
    }

    /// Drains `messages` until every sender is gone.
    pub fn spawn(self, mut messages: Receiver<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                self.render(&message);
            }
            self.bar.finish_and_clear();
        })
    }
}
