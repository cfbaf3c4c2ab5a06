//! Line-oriented sinks for non-interactive use (pipes, CI, other programs).

use super::ProgressSink;
use crate::progress::{ProgressUpdate, strip_ansi};
use crate::runner::RunOutcome;
use serde::Serialize;
use std::io::Write;

/// Prints `[ 45%] Separating vocals` whenever the label or percent changes.
pub struct PlainSink<W: Write + Send> {
    out: W,
    verbose: bool,
    last: Option<(String, u32)>,
}

impl PlainSink<std::io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(std::io::stdout(), verbose)
    }
}

impl<W: Write + Send> PlainSink<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::debug!(error = %e, "failed to write progress line");
        }
    }
}

impl<W: Write + Send> ProgressSink for PlainSink<W> {
    fn stage(&mut self, message: &str) {
        self.write_line(&format!("==> {}", message));
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        let current = (update.label.clone(), update.clamped_percent());
        if self.last.as_ref() == Some(&current) {
            return;
        }
        self.write_line(&format!("[{:>3}%] {}", current.1, current.0));
        self.last = Some(current);
    }

    fn output(&mut self, line: &str) {
        if self.verbose {
            self.write_line(&format!("    {}", strip_ansi(line)));
        }
    }

    fn finish(&mut self, outcome: &RunOutcome) {
        if outcome.success {
            self.write_line("[100%] Done");
            self.write_line(&format!("Output: {}", outcome.output_dir.display()));
        } else {
            let code = outcome
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            self.write_line(&format!("[  0%] Ready (conversion failed, exit: {})", code));
        }
    }

    fn abort(&mut self, message: &str) {
        self.write_line(&format!("[  0%] Ready ({})", message));
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Stage {
        message: &'a str,
    },
    Progress {
        label: &'a str,
        percent: u32,
        source: crate::progress::Heuristic,
    },
    Output {
        line: &'a str,
    },
    Finished {
        success: bool,
        exit_code: Option<i32>,
        output_dir: String,
    },
    Aborted {
        message: &'a str,
    },
}

/// Emits one JSON object per event, newline-delimited.
pub struct JsonSink<W: Write + Send> {
    out: W,
    verbose: bool,
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(std::io::stdout(), verbose)
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        let result = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out));
        if let Err(e) = result {
            tracing::debug!(error = %e, "failed to write JSON event");
        }
    }
}

impl<W: Write + Send> ProgressSink for JsonSink<W> {
    fn stage(&mut self, message: &str) {
        self.emit(&JsonEvent::Stage { message });
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        self.emit(&JsonEvent::Progress {
            label: &update.label,
            percent: update.clamped_percent(),
            source: update.source,
        });
    }

    fn output(&mut self, line: &str) {
        if self.verbose {
            let clean = strip_ansi(line);
            self.emit(&JsonEvent::Output { line: &clean });
        }
    }

    fn finish(&mut self, outcome: &RunOutcome) {
        self.emit(&JsonEvent::Finished {
            success: outcome.success,
            exit_code: outcome.exit_code,
            output_dir: outcome.output_dir.display().to_string(),
        });
    }

    fn abort(&mut self, message: &str) {
        self.emit(&JsonEvent::Aborted { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Heuristic;
    use std::path::PathBuf;

    fn outcome(success: bool, code: Option<i32>) -> RunOutcome {
        RunOutcome {
            success,
            exit_code: code,
            last_update: None,
            output_dir: PathBuf::from("/songs/output"),
        }
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_plain_sink_skips_repeats_and_clamps() {
        let mut sink = PlainSink::new(Vec::new(), false);
        sink.stage("Converting...");
        sink.progress(&ProgressUpdate::new("Separating vocals", 45, Heuristic::BarePercent));
        sink.progress(&ProgressUpdate::new("Separating vocals", 45, Heuristic::BarePercent));
        sink.progress(&ProgressUpdate::new("Downloading item 5 of 4", 125, Heuristic::ItemCount));
        sink.output("hidden unless verbose");
        sink.finish(&outcome(true, Some(0)));

        assert_eq!(
            text(sink.into_inner()),
            "==> Converting...\n\
             [ 45%] Separating vocals\n\
             [100%] Downloading item 5 of 4\n\
             [100%] Done\n\
             Output: /songs/output\n"
        );
    }

    #[test]
    fn test_plain_sink_verbose_output_is_stripped() {
        let mut sink = PlainSink::new(Vec::new(), true);
        sink.output("\x1b[31merror\x1b[0m");
        assert_eq!(text(sink.into_inner()), "    error\n");
    }

    #[test]
    fn test_plain_sink_failure() {
        let mut sink = PlainSink::new(Vec::new(), false);
        sink.finish(&outcome(false, Some(1)));
        sink.abort("Docker not found");
        assert_eq!(
            text(sink.into_inner()),
            "[  0%] Ready (conversion failed, exit: 1)\n[  0%] Ready (Docker not found)\n"
        );
    }

    #[test]
    fn test_json_sink_events() {
        let mut sink = JsonSink::new(Vec::new(), false);
        sink.stage("Checking Docker...");
        sink.progress(&ProgressUpdate::new("Working...", 88, Heuristic::AnyPercent));
        sink.output("not emitted");
        sink.finish(&outcome(false, None));

        let out = text(sink.into_inner());
        let events: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["event"], "stage");
        assert_eq!(events[0]["message"], "Checking Docker...");
        assert_eq!(events[1]["event"], "progress");
        assert_eq!(events[1]["percent"], 88);
        assert_eq!(events[1]["label"], "Working...");
        assert_eq!(events[1]["source"], "any_percent");
        assert_eq!(events[2]["event"], "finished");
        assert_eq!(events[2]["success"], false);
        assert!(events[2]["exit_code"].is_null());
    }

    #[test]
    fn test_json_sink_verbose_output() {
        let mut sink = JsonSink::new(Vec::new(), true);
        sink.output("\x1b[32mhello\x1b[0m");
        let out = text(sink.into_inner());
        let event: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(event["event"], "output");
        assert_eq!(event["line"], "hello");
    }
}
