use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "yt2ultrastar")]
#[command(version, about = "Turn a YouTube video or local MP3/MP4 into an UltraStar chart with UltraSinger")]
pub struct Cli {
    /// Show raw tool output and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding .yt2ultrastar/ and the songs folder (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a YouTube URL or local MP3/MP4 into a karaoke chart
    Convert {
        /// YouTube URL or local file (prompted for when omitted)
        input: Option<String>,

        /// UltraSinger flag as NAME or NAME=VALUE (repeatable)
        #[arg(short, long = "flag", value_name = "FLAG")]
        flags: Vec<String>,

        /// Ignore the default flags from config.toml
        #[arg(long)]
        no_defaults: bool,

        /// Remember the effective flags as defaults in config.toml
        #[arg(long)]
        save_flags: bool,

        /// Skip installing MuseScore inside the container
        #[arg(long)]
        skip_musescore: bool,

        /// Open the output folder when the conversion succeeds
        #[arg(long)]
        open: bool,

        /// UI output mode: full, minimal, json
        #[arg(long, default_value = "full")]
        ui: String,
    },
    /// List the UltraSinger flags that can be passed with --flag
    Flags,
    /// Interpret a saved UltraSinger log (or stdin) and print the progress it implies
    Interpret {
        /// Log file to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Phase tag to recognise, without brackets (defaults to config.toml)
        #[arg(long)]
        tag: Option<String>,

        /// UI output mode: full, minimal, json
        #[arg(long, default_value = "minimal")]
        ui: String,
    },
    /// Check that docker and docker compose are available
    Check,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default config.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    yt2ultrastar::logging::init(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Convert {
            input,
            flags,
            no_defaults,
            save_flags,
            skip_musescore,
            open,
            ui,
        } => {
            cmd::cmd_convert(
                &project_dir,
                &cli,
                cmd::ConvertArgs {
                    input: input.clone(),
                    flags: flags.clone(),
                    no_defaults: *no_defaults,
                    save_flags: *save_flags,
                    skip_musescore: *skip_musescore,
                    open: *open,
                    ui: ui.clone(),
                },
            )
            .await?;
        }
        Commands::Flags => cmd::cmd_flags(),
        Commands::Interpret { file, tag, ui } => {
            cmd::cmd_interpret(&project_dir, &cli, file.as_deref(), tag.as_deref(), ui).await?
        }
        Commands::Check => cmd::cmd_check(&project_dir, &cli).await?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
