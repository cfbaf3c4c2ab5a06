//! Conversion: `yt2ultrastar convert`.

use anyhow::{Context, Result};

use super::super::Cli;

/// Arguments of `yt2ultrastar convert`.
pub struct ConvertArgs {
    pub input: Option<String>,
    pub flags: Vec<String>,
    pub no_defaults: bool,
    pub save_flags: bool,
    pub skip_musescore: bool,
    pub open: bool,
    pub ui: String,
}

pub async fn cmd_convert(
    project_dir: &std::path::Path,
    cli: &Cli,
    args: ConvertArgs,
) -> Result<()> {
    use dialoguer::Input;
    use yt2ultrastar::config::ToolConfig;
    use yt2ultrastar::options::{ConversionOptions, parse_selections};
    use yt2ultrastar::runner::Runner;
    use yt2ultrastar::source::Source;
    use yt2ultrastar::ui::{UiMode, make_sink};

    let mut config = ToolConfig::new(project_dir.to_path_buf(), cli.verbose)?;

    let raw_input = match args.input {
        Some(input) => input,
        None => Input::<String>::new()
            .with_prompt("Input (YouTube URL or local MP3/MP4)")
            .interact_text()
            .context("Failed to read input")?,
    };
    let source = Source::parse(&raw_input)?;

    let mut selections = if args.no_defaults {
        Vec::new()
    } else {
        config.default_flags()?
    };
    selections.extend(parse_selections(&args.flags)?);
    let options = ConversionOptions::new(source, selections);

    if args.save_flags {
        let path = config.save_default_flags(options.flag_strings())?;
        eprintln!("Saved default flags to {}", path.display());
    }

    let mut sink = make_sink(UiMode::parse(&args.ui), cli.verbose);
    let runner = Runner::from_config(&config).skip_musescore(args.skip_musescore);

    let outcome = match runner.run(&options, sink.as_mut()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            sink.abort(&e.to_string());
            return Err(e.into());
        }
    };

    if !outcome.success {
        match outcome.exit_code {
            Some(code) => anyhow::bail!("UltraSinger exited with code {}", code),
            None => anyhow::bail!("UltraSinger was terminated by a signal"),
        }
    }

    if args.open {
        open::that(&outcome.output_dir).with_context(|| {
            format!("Failed to open {}", outcome.output_dir.display())
        })?;
    }

    Ok(())
}
