//! Offline progress interpretation: `yt2ultrastar interpret`.

use anyhow::{Context, Result};
use std::path::Path;

use super::super::Cli;

pub async fn cmd_interpret(
    project_dir: &Path,
    cli: &Cli,
    file: Option<&Path>,
    tag: Option<&str>,
    ui: &str,
) -> Result<()> {
    use yt2ultrastar::config::ToolConfig;
    use yt2ultrastar::progress::Interpreter;
    use yt2ultrastar::runner::interpret_stream;
    use yt2ultrastar::ui::{UiMode, make_sink};

    let tag = match tag {
        Some(tag) => tag.to_string(),
        None => ToolConfig::new(project_dir.to_path_buf(), cli.verbose)?
            .tag()
            .to_string(),
    };
    let interpreter = Interpreter::with_tag(&tag);
    let mut sink = make_sink(UiMode::parse(ui), cli.verbose);

    let last = match file {
        Some(path) => {
            let log = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            interpret_stream(log, interpreter, sink.as_mut()).await
        }
        None => interpret_stream(tokio::io::stdin(), interpreter, sink.as_mut()).await,
    };

    match last {
        Some(update) => tracing::info!(
            label = %update.label,
            percent = update.clamped_percent(),
            "final progress"
        ),
        None => tracing::info!("no progress found in input"),
    }

    Ok(())
}
