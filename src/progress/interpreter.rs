use super::heuristics::{LabelSource, first_match, strip_ansi};
use super::types::{DEFAULT_LABEL, Heuristic, InterpreterState, ProgressUpdate};
use regex::Regex;

/// Literal inside the brackets that marks UltraSinger's own phase messages.
pub const DEFAULT_TAG: &str = "UltraSinger";

/// Line-by-line progress interpreter.
///
/// Holds the state of one conversion run. Feed lines in the order they
/// arrive; each call returns the update to show, or `None` when the line
/// carried nothing new.
///
/// Labels from `Downloading item N of M` lines apply to that update only;
/// the phase label announced through the tag stays in place for later
/// lines.
#[derive(Debug, Clone)]
pub struct Interpreter {
    tag_regex: Regex,
    state: InterpreterState,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter recognising the `[UltraSinger]` tag.
    pub fn new() -> Self {
        Self::with_tag(DEFAULT_TAG)
    }

    /// Interpreter recognising `[<tag>]` as the phase marker.
    pub fn with_tag(tag: &str) -> Self {
        // Greedy prefix: the last tag on the line wins.
        let pattern = format!(r"^.*\[{}\](.*)$", regex::escape(tag));
        Self {
            tag_regex: Regex::new(&pattern).expect("escaped tag is a valid pattern"),
            state: InterpreterState::default(),
        }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Forget everything from the previous run.
    pub fn reset(&mut self) {
        self.state = InterpreterState::default();
    }

    /// Interpret one raw output line.
    pub fn interpret(&mut self, raw_line: &str) -> Option<ProgressUpdate> {
        let line = strip_ansi(raw_line.trim_end_matches(['\r', '\n']));

        let label_changed = self.extract_label(&line);

        if let Some((heuristic, reading)) = first_match(&line) {
            self.state.percent = reading.percent;
            let label = match reading.label {
                LabelSource::Current => self.state.label.clone(),
                LabelSource::Override(label) => label,
            };
            tracing::debug!(%heuristic, percent = reading.percent, %label, "progress update");
            return Some(ProgressUpdate::new(label, reading.percent, heuristic));
        }

        if label_changed {
            return Some(ProgressUpdate::new(
                self.state.label.clone(),
                self.state.percent,
                Heuristic::Tag,
            ));
        }

        None
    }

    /// Update the phase label from a tagged line. Returns whether it changed.
    fn extract_label(&mut self, line: &str) -> bool {
        let Some(caps) = self.tag_regex.captures(line) else {
            return false;
        };
        let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let label = if text.is_empty() { DEFAULT_LABEL } else { text };

        if label == self.state.label {
            return false;
        }
        tracing::debug!(label, "label set");
        self.state.label = label.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::FALLBACK_LABEL;

    fn feed(interpreter: &mut Interpreter, lines: &[&str]) -> Vec<ProgressUpdate> {
        lines
            .iter()
            .filter_map(|line| interpreter.interpret(line))
            .collect()
    }

    #[test]
    fn test_item_count_matches_floor_formula() {
        for tot in 1..=40u64 {
            for cur in 0..=tot {
                let mut interpreter = Interpreter::new();
                let update = interpreter
                    .interpret(&format!("Downloading item {} of {}", cur, tot))
                    .unwrap();
                assert_eq!(update.percent as u64, cur * 100 / tot);
                assert_eq!(update.label, format!("Downloading item {} of {}", cur, tot));
                assert_eq!(update.source, Heuristic::ItemCount);
            }
        }
    }

    #[test]
    fn test_bracketed_download_truncates() {
        let mut interpreter = Interpreter::new();
        let update = interpreter.interpret("[download] 37.5%").unwrap();
        assert_eq!(update.percent, 37);
        assert_eq!(update.label, "Working");
        assert_eq!(update.source, Heuristic::BracketedDownload);
    }

    #[test]
    fn test_bare_percent() {
        let mut interpreter = Interpreter::new();
        let update = interpreter.interpret("  45%").unwrap();
        assert_eq!(update.percent, 45);
        assert_eq!(update.source, Heuristic::BarePercent);
    }

    #[test]
    fn test_ratio_count() {
        let mut interpreter = Interpreter::new();
        let update = interpreter.interpret("12/552").unwrap();
        assert_eq!(update.percent, 2);
        assert_eq!(update.source, Heuristic::RatioCount);
    }

    #[test]
    fn test_fallback_uses_generic_label() {
        let mut interpreter = Interpreter::new();
        let update = interpreter.interpret("random text 88% done").unwrap();
        assert_eq!(update.percent, 88);
        assert_eq!(update.label, FALLBACK_LABEL);
        assert_eq!(update.source, Heuristic::AnyPercent);
        // The generic label is not remembered.
        assert_eq!(interpreter.state().label, "Working");
    }

    #[test]
    fn test_tag_sets_label_for_following_lines() {
        let mut interpreter = Interpreter::new();
        let updates = feed(
            &mut interpreter,
            &["\x1b[32m[UltraSinger]\x1b[0m Separating vocals", "  45%"],
        );
        assert_eq!(interpreter.state().label, "Separating vocals");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], ProgressUpdate::new("Separating vocals", 0, Heuristic::Tag));
        assert_eq!(
            updates[1],
            ProgressUpdate::new("Separating vocals", 45, Heuristic::BarePercent)
        );
    }

    #[test]
    fn test_tag_after_prefix_text() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("2024-01-01 12:00 [UltraSinger] Transcribing with whisper");
        assert_eq!(interpreter.state().label, "Transcribing with whisper");
    }

    #[test]
    fn test_blank_tag_falls_back_to_default_label() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[UltraSinger] Pitching");
        let update = interpreter.interpret("[UltraSinger]    ").unwrap();
        assert_eq!(update.label, "Working");
        assert_eq!(interpreter.state().label, "Working");
    }

    #[test]
    fn test_repeated_tag_is_not_new_information() {
        let mut interpreter = Interpreter::new();
        assert!(interpreter.interpret("[UltraSinger] Creating plot").is_some());
        assert!(interpreter.interpret("[UltraSinger] Creating plot").is_none());
    }

    #[test]
    fn test_tag_keeps_last_percent() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[download] 60.0%");
        let update = interpreter.interpret("[UltraSinger] Pitching").unwrap();
        assert_eq!(update.percent, 60);
        assert_eq!(update.source, Heuristic::Tag);
    }

    #[test]
    fn test_item_label_is_transient() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[UltraSinger] Fetching");
        let update = interpreter.interpret("Downloading item 2 of 4").unwrap();
        assert_eq!(update.label, "Downloading item 2 of 4");
        assert_eq!(interpreter.state().label, "Fetching");

        let update = interpreter.interpret("3/4").unwrap();
        assert_eq!(update.label, "Fetching");
        assert_eq!(update.percent, 75);
    }

    #[test]
    fn test_degenerate_item_count_is_skipped() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[download] 10%");
        assert!(interpreter.interpret("Downloading item 5 of 0").is_none());
        assert_eq!(interpreter.state().percent, 10);
    }

    #[test]
    fn test_non_matching_line_is_idempotent() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[UltraSinger] Separating vocals");
        interpreter.interpret("  45%");
        let before = interpreter.state().clone();

        assert!(interpreter.interpret("Loading model weights").is_none());
        assert!(interpreter.interpret("Loading model weights").is_none());
        assert_eq!(interpreter.state(), &before);
    }

    #[test]
    fn test_item_count_outranks_fallback() {
        let mut interpreter = Interpreter::new();
        let update = interpreter
            .interpret("Downloading item 1 of 2 - 13% done")
            .unwrap();
        assert_eq!(update.source, Heuristic::ItemCount);
        assert_eq!(update.percent, 50);
    }

    #[test]
    fn test_trailing_newlines_and_carriage_returns() {
        let mut interpreter = Interpreter::new();
        assert_eq!(interpreter.interpret("  45%\r\n").unwrap().percent, 45);
        assert_eq!(
            interpreter.interpret("[UltraSinger] Done\n").unwrap().label,
            "Done"
        );
    }

    #[test]
    fn test_colored_percentage() {
        let mut interpreter = Interpreter::new();
        let update = interpreter.interpret("\x1b[0;94m[download]\x1b[0m  12.0%").unwrap();
        assert_eq!(update.percent, 12);
        assert_eq!(update.source, Heuristic::BracketedDownload);
    }

    #[test]
    fn test_custom_tag() {
        let mut interpreter = Interpreter::with_tag("Karaoke.Bot");
        interpreter.interpret("[Karaoke.Bot] Aligning");
        assert_eq!(interpreter.state().label, "Aligning");
        // The dot is literal, not a wildcard.
        assert!(interpreter.interpret("[KaraokexBot] Nope").is_none());
    }

    #[test]
    fn test_reset() {
        let mut interpreter = Interpreter::new();
        interpreter.interpret("[UltraSinger] Pitching");
        interpreter.interpret("50%");
        interpreter.reset();
        assert_eq!(interpreter.state(), &InterpreterState::default());
    }

    #[test]
    fn test_realistic_session() {
        let mut interpreter = Interpreter::new();
        let updates = feed(
            &mut interpreter,
            &[
                "[UltraSinger] Checking input",
                "[youtube] Extracting URL: https://www.youtube.com/watch?v=abc",
                "[download] Destination: song.mp4",
                "[download]   5.0% of 3.50MiB at 1.00MiB/s ETA 00:03",
                "[download] 100% of 3.50MiB",
                "[UltraSinger] Separating vocals",
                " 50%|█████     | 5/10 [00:05<00:05]",
                "[UltraSinger] Transcribing",
                "12/552",
                "Some warning without numbers",
            ],
        );
        let summary: Vec<(String, u32)> = updates
            .into_iter()
            .map(|u| (u.label, u.percent))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Checking input".to_string(), 0),
                ("Checking input".to_string(), 5),
                ("Checking input".to_string(), 100),
                ("Separating vocals".to_string(), 100),
                ("Separating vocals".to_string(), 50),
                ("Transcribing".to_string(), 50),
                ("Transcribing".to_string(), 2),
            ]
        );
    }
}
