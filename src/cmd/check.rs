//! Container runtime check: `yt2ultrastar check`.

use anyhow::Result;
use console::style;

use super::super::Cli;

pub async fn cmd_check(project_dir: &std::path::Path, cli: &Cli) -> Result<()> {
    use yt2ultrastar::config::ToolConfig;
    use yt2ultrastar::docker::DockerCli;
    use yt2ultrastar::errors::ConvertError;
    use yt2ultrastar::ui::icons::{CHECK, CROSS};

    let config = ToolConfig::new(project_dir.to_path_buf(), cli.verbose)?;
    let docker = DockerCli::new(config.docker_cmd(), config.container_name());

    if docker.is_available().await {
        println!(
            "{} {} and compose plugin found",
            CHECK,
            style(docker.program()).cyan()
        );
        println!("  image:     {}", config.image());
        println!("  container: {}", config.container_name());
        println!("  songs:     {}", config.songs_dir().display());
        Ok(())
    } else {
        println!("{} {} not usable", CROSS, style(docker.program()).red());
        Err(ConvertError::DockerUnavailable.into())
    }
}
