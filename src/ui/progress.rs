//! Interactive progress bar for `--ui full`.

use super::ProgressSink;
use crate::progress::{ProgressUpdate, strip_ansi};
use crate::runner::RunOutcome;
use crate::ui::icons::{CHECK, CROSS, FOLDER, GEAR, MUSIC};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal UI for one conversion, rendered as a single `indicatif` bar.
///
/// The bar runs 0..=100 and its message is the current phase label. Setup
/// stages are printed above the bar; raw tool output is printed above it
/// too, but only in verbose mode.
pub struct ConversionUI {
    bar: ProgressBar,
    verbose: bool,
}

impl ConversionUI {
    pub fn new(verbose: bool) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} {spinner} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix(format!("{}", MUSIC));
        bar.set_message("Ready");
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar, verbose }
    }

    fn print_line(&self, msg: impl AsRef<str>) {
        if self.bar.is_hidden() {
            eprintln!("{}", msg.as_ref());
        } else {
            self.bar.println(msg.as_ref());
        }
    }
}

impl ProgressSink for ConversionUI {
    fn stage(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
        self.print_line(format!("{} {}", GEAR, style(message).dim()));
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        self.bar.set_position(update.clamped_percent() as u64);
        self.bar.set_message(update.label.clone());
    }

    fn output(&mut self, line: &str) {
        if self.verbose {
            self.print_line(format!("    {}", style(strip_ansi(line)).dim()));
        }
    }

    fn finish(&mut self, outcome: &RunOutcome) {
        if outcome.success {
            self.bar.set_position(100);
            self.bar.finish_with_message(format!("{} Done", CHECK));
            self.print_line(format!(
                "{} Charts written to {}",
                FOLDER,
                style(outcome.output_dir.display()).cyan()
            ));
        } else {
            let code = outcome
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            self.bar.set_position(0);
            self.bar.abandon_with_message(format!(
                "{} Conversion failed (exit: {}). Ready",
                CROSS,
                style(code).red()
            ));
        }
    }

    fn abort(&mut self, message: &str) {
        self.bar.set_position(0);
        self.bar
            .abandon_with_message(format!("{} {}", CROSS, style(message).red()));
    }
}
