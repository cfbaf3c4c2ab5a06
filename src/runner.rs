//! End-to-end conversion: container setup, then a supervised UltraSinger run.
//!
//! Output handling is split across tasks so the presentation loop never
//! blocks on the child:
//!
//! ```text
//! stdout (2>&1) ─pump─ lines ─> interpreter task ─ RunEvent ─> sink (caller's task)
//! stderr ─────── tail kept for diagnostics
//! ```
//!
//! The tool's stderr is merged into stdout before it leaves the container,
//! so the interpreter sees a single stream. The interpreter task is the
//! only owner of the [`Interpreter`] and handles lines one at a time in
//! the order they were written.

use crate::compose::{ComposeFile, SongsLayout};
use crate::config::ToolConfig;
use crate::docker::DockerCli;
use crate::errors::ConvertError;
use crate::options::ConversionOptions;
use crate::progress::{Interpreter, ProgressUpdate};
use crate::source::Source;
use crate::stream::LineReader;
use crate::ui::ProgressSink;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 256;
const STDERR_TAIL_LINES: usize = 20;

/// Events delivered from the interpreter task to the presentation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Raw line from the tool, color codes included.
    Output(String),
    /// Interpreted progress.
    Progress(ProgressUpdate),
}

/// Result of a finished conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub last_update: Option<ProgressUpdate>,
    pub output_dir: PathBuf,
}

/// Drives one conversion through every stage.
#[derive(Debug, Clone)]
pub struct Runner {
    docker: DockerCli,
    layout: SongsLayout,
    image: String,
    container_name: String,
    tag: String,
    skip_musescore: bool,
}

impl Runner {
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            docker: DockerCli::new(config.docker_cmd(), config.container_name()),
            layout: SongsLayout::new(config.songs_dir()),
            image: config.image(),
            container_name: config.container_name().to_string(),
            tag: config.tag().to_string(),
            skip_musescore: false,
        }
    }

    /// Skip the MuseScore installation step (already installed in the image).
    pub fn skip_musescore(mut self, skip: bool) -> Self {
        self.skip_musescore = skip;
        self
    }

    pub fn layout(&self) -> &SongsLayout {
        &self.layout
    }

    /// Run every stage and supervise the conversion until its output ends.
    pub async fn run(
        &self,
        options: &ConversionOptions,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, ConvertError> {
        sink.stage("Checking Docker...");
        if !self.docker.is_available().await {
            return Err(ConvertError::DockerUnavailable);
        }

        sink.stage("Writing compose file...");
        self.layout.ensure_directories()?;
        if let Source::LocalFile(path) = options.source() {
            let staged = self.layout.stage_input(path)?;
            tracing::info!(path = %staged.display(), "input staged");
        }
        ComposeFile::for_layout(&self.layout, &self.image, &self.container_name)
            .write(&self.layout)?;

        sink.stage("Starting container...");
        self.docker.compose_up(&self.layout).await?;

        if self.skip_musescore {
            tracing::info!("skipping MuseScore installation");
        } else {
            sink.stage("Installing MuseScore...");
            self.docker.install_musescore().await?;
        }

        sink.stage("Converting...");
        tracing::info!(
            source = %options.source(),
            flags = ?options.flag_strings(),
            "starting conversion"
        );
        let cmd = self.docker.conversion_command(options);
        let outcome = supervise(
            cmd,
            self.docker.program(),
            Interpreter::with_tag(&self.tag),
            sink,
            self.layout.output_dir(),
        )
        .await?;

        sink.finish(&outcome);
        Ok(outcome)
    }
}

/// Spawn `cmd`, stream its stdout through `interpreter` into `sink`, and
/// wait for it to exit.
///
/// `cmd` must have stdout piped and its tool output merged into stdout.
/// A piped stderr is not interpreted; its last lines are logged when the
/// process fails.
pub async fn supervise(
    mut cmd: Command,
    program: &str,
    interpreter: Interpreter,
    sink: &mut dyn ProgressSink,
    output_dir: PathBuf,
) -> Result<RunOutcome, ConvertError> {
    let mut child = cmd.spawn().map_err(|source| ConvertError::SpawnFailed {
        program: program.to_string(),
        source,
    })?;
    tracing::debug!(pid = child.id().unwrap_or(0), "conversion process spawned");

    let diagnostics = child.stderr.take().map(|stderr| tokio::spawn(stderr_tail(stderr)));

    let (line_tx, line_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let pump = child.stdout.take().map(|stdout| spawn_pump(stdout, line_tx));

    let last_update = drain_events(line_rx, interpreter, sink).await;

    if let Some(pump) = pump {
        let _ = pump.await;
    }
    let status = child.wait().await.map_err(|e| {
        ConvertError::Other(anyhow::Error::new(e).context("Failed to wait for conversion"))
    })?;
    tracing::info!(code = ?status.code(), "conversion process exited");

    if let Some(diagnostics) = diagnostics {
        let tail = diagnostics.await.unwrap_or_default();
        if !status.success() && !tail.is_empty() {
            tracing::warn!(stderr = %tail.join("\n"), "conversion process reported errors");
        }
    }

    Ok(RunOutcome {
        success: status.success(),
        exit_code: status.code(),
        last_update,
        output_dir,
    })
}

/// Interpret an arbitrary byte stream (a saved log, stdin) into `sink`.
///
/// Returns the last update produced.
pub async fn interpret_stream<R>(
    reader: R,
    interpreter: Interpreter,
    sink: &mut dyn ProgressSink,
) -> Option<ProgressUpdate>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (line_tx, line_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let pump = spawn_pump(reader, line_tx);
    let last = drain_events(line_rx, interpreter, sink).await;
    let _ = pump.await;
    last
}

/// Run the interpreter task and apply its events to `sink` until the
/// line channel closes.
async fn drain_events(
    line_rx: mpsc::Receiver<String>,
    interpreter: Interpreter,
    sink: &mut dyn ProgressSink,
) -> Option<ProgressUpdate> {
    let (event_tx, mut event_rx) = mpsc::channel::<RunEvent>(CHANNEL_CAPACITY);
    let worker = tokio::spawn(interpret_lines(line_rx, interpreter, event_tx));

    let mut last_update = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            RunEvent::Output(line) => sink.output(&line),
            RunEvent::Progress(update) => {
                sink.progress(&update);
                last_update = Some(update);
            }
        }
    }

    if let Err(e) = worker.await {
        tracing::warn!(error = %e, "interpreter task ended abnormally");
    }
    last_update
}

/// Interpreter task: one line at a time, in arrival order.
async fn interpret_lines(
    mut line_rx: mpsc::Receiver<String>,
    mut interpreter: Interpreter,
    event_tx: mpsc::Sender<RunEvent>,
) {
    while let Some(line) = line_rx.recv().await {
        let update = interpreter.interpret(&line);
        if event_tx.send(RunEvent::Output(line)).await.is_err() {
            return;
        }
        if let Some(update) = update
            && event_tx.send(RunEvent::Progress(update)).await.is_err()
        {
            return;
        }
    }
}

/// Last lines of a pipe that is not interpreted.
async fn stderr_tail<R>(reader: R) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = LineReader::new(reader);
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read process stderr");
                break;
            }
        }
    }
    tail.into()
}

/// Forward lines from the output pipe into the line channel.
fn spawn_pump<R>(reader: R, tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = LineReader::new(reader);
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        return;
                    }
                }
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read process output");
                    return;
                }
            }
        }
    })
}
