//! Configuration view and validation commands: `yt2ultrastar config`.

use anyhow::Result;

use super::super::ConfigCommands;

fn print_sections(toml: &yt2ultrastar::config::ToolToml) {
    println!("[container]");
    println!("  image = \"{}\"", toml.container.image);
    println!("  name = \"{}\"", toml.container.name);
    println!("  docker_cmd = \"{}\"", toml.container.docker_cmd);
    println!();

    println!("[paths]");
    println!("  songs_dir = \"{}\"", toml.paths.songs_dir.display());
    println!();

    println!("[progress]");
    println!("  tag = \"{}\"", toml.progress.tag);
    println!();

    println!("[defaults]");
    let flags: Vec<String> = toml
        .defaults
        .flags
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect();
    println!("  flags = [{}]", flags.join(", "));
    println!();
}

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use yt2ultrastar::config::{CONFIG_FILE_NAME, ToolConfig, ToolToml, get_config_dir};

    let config_dir = get_config_dir(project_dir);
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("yt2ultrastar Configuration");
            println!("==========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                print_sections(&ToolToml::load(&config_path)?);
            } else {
                println!("No config.toml found at {}", config_path.display());
                println!();
                println!("Using default configuration:");
                print_sections(&ToolToml::default());
                println!("Run 'yt2ultrastar config init' to create a config.toml file.");
                println!();
            }

            println!("Effective values (with env overrides):");
            let config = ToolConfig::new(project_dir.to_path_buf(), false)?;
            println!("  image = \"{}\"", config.image());
            println!("  docker_cmd = \"{}\"", config.docker_cmd());
            println!("  songs_dir = \"{}\"", config.songs_dir().display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No config.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = ToolToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("config.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            ToolToml::default().save(&config_path)?;

            println!("Created config.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [container] image, name, docker_cmd");
            println!("  - [paths] songs_dir");
            println!("  - [progress] tag");
            println!("  - [defaults] flags (see 'yt2ultrastar flags')");
            println!();
        }
    }

    Ok(())
}
