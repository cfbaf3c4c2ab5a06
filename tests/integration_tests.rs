//! Integration tests for yt2ultrastar
//!
//! Everything here runs without Docker: conversions are stopped at input
//! validation or at the runtime check.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a yt2ultrastar Command
fn yt2us() -> Command {
    let mut cmd = cargo_bin_cmd!("yt2ultrastar");
    cmd.env_remove("YT2US_IMAGE")
        .env_remove("YT2US_DOCKER_CMD")
        .env_remove("YT2US_SONGS_DIR");
    cmd
}

/// Helper to create a temporary project directory
fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

const SAMPLE_LOG: &str = "\x1b[32m[UltraSinger]\x1b[0m Separating vocals\n 10%\r 45%\nDownloading item 3 of 4\n";

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        yt2us()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("convert"))
            .stdout(predicate::str::contains("interpret"));
    }

    #[test]
    fn test_version() {
        yt2us().arg("--version").assert().success();
    }

    #[test]
    fn test_flags_lists_catalogue() {
        yt2us()
            .arg("flags")
            .assert()
            .success()
            .stdout(predicate::str::contains("whisper"))
            .stdout(predicate::str::contains("large-v2"))
            .stdout(predicate::str::contains("disable_hyphenation"));
    }

    #[test]
    fn test_unknown_command_fails() {
        yt2us().arg("karaoke").assert().failure();
    }
}

// =============================================================================
// Log Interpretation
// =============================================================================

mod interpret {
    use super::*;

    #[test]
    fn test_interpret_stdin_minimal() {
        yt2us()
            .args(["interpret", "--tag", "UltraSinger", "--ui", "minimal"])
            .write_stdin(SAMPLE_LOG)
            .assert()
            .success()
            .stdout(predicate::str::contains("[  0%] Separating vocals"))
            .stdout(predicate::str::contains("[ 10%] Separating vocals"))
            .stdout(predicate::str::contains("[ 45%] Separating vocals"))
            .stdout(predicate::str::contains("[ 75%] Downloading item 3 of 4"));
    }

    #[test]
    fn test_interpret_file_json() {
        let dir = create_temp_project();
        let log = dir.path().join("ultrasinger.log");
        fs::write(&log, "[download]  12.7% of 3.2MiB\nfinished 250%\n").unwrap();

        let output = yt2us()
            .args(["interpret", "--tag", "UltraSinger", "--ui", "json"])
            .arg(&log)
            .output()
            .unwrap();
        assert!(output.status.success());

        let events: Vec<serde_json::Value> = String::from_utf8(output.stdout)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "progress");
        assert_eq!(events[0]["percent"], 12);
        assert_eq!(events[0]["source"], "bracketed_download");
        assert_eq!(events[1]["percent"], 100);
        assert_eq!(events[1]["label"], "Working...");
    }

    #[test]
    fn test_interpret_custom_tag_from_config() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".yt2ultrastar")).unwrap();
        fs::write(
            dir.path().join(".yt2ultrastar/config.toml"),
            "[progress]\ntag = \"Karaoke\"\n",
        )
        .unwrap();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["interpret", "--ui", "minimal"])
            .write_stdin("[Karaoke] Pitching\n[UltraSinger] Ignored\n 30%\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("[ 30%] Pitching"))
            .stdout(predicate::str::contains("Ignored").not());
    }

    #[test]
    fn test_interpret_missing_file_fails() {
        yt2us()
            .args(["interpret", "--tag", "UltraSinger", "/no/such/ultrasinger.log"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to open log file"));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No config.toml found"))
            .stdout(predicate::str::contains("rakuri255/ultrasinger:latest"));
    }

    #[test]
    fn test_config_init_creates_toml() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created config.toml"));

        let content = fs::read_to_string(dir.path().join(".yt2ultrastar/config.toml")).unwrap();
        assert!(content.contains("[container]"));
        assert!(content.contains("UltraSinger"));

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_validate_reports_bad_flags() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".yt2ultrastar")).unwrap();
        fs::write(
            dir.path().join(".yt2ultrastar/config.toml"),
            "[defaults]\nflags = [\"whisper=huge\", \"bogus\"]\n",
        )
        .unwrap();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings"))
            .stdout(predicate::str::contains("whisper=huge"))
            .stdout(predicate::str::contains("bogus"));
    }

    #[test]
    fn test_config_validate_no_config() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Using defaults (valid)"));
    }

    #[test]
    fn test_env_override_shown() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .env("YT2US_IMAGE", "example/ultrasinger:dev")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("image = \"example/ultrasinger:dev\""));
    }
}

// =============================================================================
// Conversion (stopped before any container work)
// =============================================================================

mod convert {
    use super::*;

    #[test]
    fn test_convert_empty_input_fails() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["convert", "  ", "--ui", "minimal"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Enter a YouTube URL"));
    }

    #[test]
    fn test_convert_unsupported_file_fails() {
        let dir = create_temp_project();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "la la la").unwrap();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .arg("convert")
            .arg(&input)
            .args(["--ui", "minimal"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported input file"));
    }

    #[test]
    fn test_convert_unknown_flag_fails() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["convert", "https://youtu.be/abc", "-f", "bogus", "--ui", "minimal"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown UltraSinger flag 'bogus'"));
    }

    #[test]
    fn test_convert_invalid_choice_fails() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["convert", "https://youtu.be/abc", "-f", "whisper=huge", "--ui", "minimal"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid value 'huge'"));
    }

    #[test]
    fn test_convert_without_docker_resets_to_ready() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .env("YT2US_DOCKER_CMD", "yt2ultrastar-no-such-docker")
            .args(["convert", "https://youtu.be/abc", "--ui", "minimal"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("==> Checking Docker..."))
            .stdout(predicate::str::contains("[  0%] Ready (Docker not found"));

        assert!(!dir.path().join("songs").exists());
    }

    #[test]
    fn test_convert_save_flags_writes_defaults() {
        let dir = create_temp_project();

        yt2us()
            .arg("--project-dir")
            .arg(dir.path())
            .env("YT2US_DOCKER_CMD", "yt2ultrastar-no-such-docker")
            .args([
                "convert",
                "https://youtu.be/abc",
                "-f",
                "language=de",
                "-f",
                "disable_hyphenation",
                "--save-flags",
                "--ui",
                "json",
            ])
            .assert()
            .failure();

        let content = fs::read_to_string(dir.path().join(".yt2ultrastar/config.toml")).unwrap();
        assert!(content.contains("language=de"));
        assert!(content.contains("disable_hyphenation"));
    }
}
