use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

pub const BANNER_LINGER: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone)]
pub struct SpinnerConfig {
    pub frames: String,
    pub interval: u64,
    pub success_symbol: String,
    pub failure_symbol: String,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        SpinnerConfig {
            frames: "-\\|/ ".to_string(),
            interval: 100,
            success_symbol: "✓".to_string(),
            failure_symbol: "✗".to_string(),
        }
    }
}

/// Spinner shown while a question moves through the pipeline. Hidden when
/// stderr is not a terminal.
pub struct QuestionSpinner {
    bar: ProgressBar,
    config: SpinnerConfig,
    no_color: bool,
}

impl QuestionSpinner {
    pub fn start(message: &str, no_color: bool) -> Self {
        let config = SpinnerConfig::default();
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars(&config.frames)
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(config.interval));
        QuestionSpinner { bar, config, no_color }
    }

    pub fn succeed(self, message: &str) {
        let symbol = if self.no_color {
            self.config.success_symbol.clone()
        } else {
            self.config.success_symbol.green().to_string()
        };
        self.bar.finish_with_message(format!("{} {}", symbol, message));
    }

    pub fn fail(self, message: &str) {
        let symbol = if self.no_color {
            self.config.failure_symbol.clone()
        } else {
            self.config.failure_symbol.red().to_string()
        };
        self.bar.abandon_with_message(format!("{} {}", symbol, message));
    }

    /// Remove the spinner line entirely.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}

/// Show a one-line status message that removes itself after `linger`.
/// Nothing is drawn when stderr is not a terminal.
pub async fn flash_banner(text: String, linger: Duration) {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(text);
    bar.tick();
    tokio::time::sleep(linger).await;
    bar.finish_and_clear();
}
