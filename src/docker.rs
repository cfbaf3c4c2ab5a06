//! Thin wrapper around the `docker` and `docker compose` command line.

use crate::compose::{CONTAINER_SRC_DIR, SongsLayout};
use crate::errors::ConvertError;
use crate::options::ConversionOptions;
use crate::source::shell_quote;
use std::process::Stdio;
use tokio::process::Command;

const MUSESCORE_INSTALL: &str = "apt-get update && DEBIAN_FRONTEND=noninteractive apt-get install -y musescore3 && apt-get clean";

/// Docker CLI bound to one container.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
    container: String,
}

impl DockerCli {
    /// # Arguments
    /// * `program`: docker binary, usually `"docker"`
    /// * `container`: container name from the compose file
    pub fn new(program: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            container: container.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether both `docker` and the compose plugin answer.
    pub async fn is_available(&self) -> bool {
        let checks: [&[&str]; 2] = [&["--version"], &["compose", "version"]];
        for args in checks {
            let status = Command::new(&self.program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            match status {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    tracing::debug!(?args, code = ?status.code(), "docker check failed");
                    return false;
                }
                Err(e) => {
                    tracing::debug!(?args, error = %e, "docker check could not run");
                    return false;
                }
            }
        }
        true
    }

    /// `docker compose -f compose-nogpu.yml up -d --force-recreate` in the songs folder.
    pub async fn compose_up(&self, layout: &SongsLayout) -> Result<(), ConvertError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["compose", "-f"])
            .arg(layout.compose_path())
            .args(["up", "-d", "--force-recreate"])
            .current_dir(layout.root());
        self.run_step("Starting container", cmd).await
    }

    /// Install MuseScore inside the running container (needed for sheet export).
    pub async fn install_musescore(&self) -> Result<(), ConvertError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.exec_args(MUSESCORE_INSTALL));
        self.run_step("Installing MuseScore", cmd).await
    }

    /// The long-running conversion command.
    ///
    /// stdout carries the merged UltraSinger output; stderr only carries
    /// messages from the docker client itself.
    pub fn conversion_command(&self, options: &ConversionOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.exec_args(&conversion_script(options)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// `exec -u root <container> bash -lc <script>`
    pub fn exec_args(&self, script: &str) -> Vec<String> {
        vec![
            "exec".to_string(),
            "-u".to_string(),
            "root".to_string(),
            self.container.clone(),
            "bash".to_string(),
            "-lc".to_string(),
            script.to_string(),
        ]
    }

    async fn run_step(&self, step: &str, mut cmd: Command) -> Result<(), ConvertError> {
        tracing::info!(step, "running");
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConvertError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(step, stderr = %stderr.trim(), "step failed");
            return Err(ConvertError::StepFailed {
                step: step.to_string(),
                code: output.status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

/// Shell script run inside the container for one conversion.
///
/// UltraSinger's stderr is folded into its stdout so phase messages and
/// progress bars reach the interpreter as one ordered stream.
pub fn conversion_script(options: &ConversionOptions) -> String {
    let mut script = format!(
        "cd {} && python UltraSinger.py -i {}",
        CONTAINER_SRC_DIR,
        shell_quote(&options.source().container_argument())
    );
    for arg in options.to_args() {
        script.push(' ');
        script.push_str(&shell_quote(&arg));
    }
    script.push_str(" 2>&1");
    script
}
