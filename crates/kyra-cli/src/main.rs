//! Kyra - render assistant messages and their sources in the terminal

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kyra_core::{MarkupRenderer, RenderConfig};

mod logging;
mod present;

use present::TextPresenter;

#[derive(Parser, Debug)]
#[command(name = "kyra", version, about = "Render assistant messages safely")]
struct Cli {
    /// Render config file (defaults to ~/.kyra/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render raw message text
    Render {
        /// Message file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Citation accompanying the message (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Citations come from the curated retrieval set
        #[arg(long)]
        curated: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render a chat response JSON payload
    Payload {
        /// Payload file (reads stdin when omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Emit OSC 8 terminal hyperlinks instead of numbered footnotes
    #[arg(long)]
    hyperlinks: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Plain text with links wired to their targets
    Text,
    /// The typed tree and its link registry
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let renderer = MarkupRenderer::new(load_config(cli.config.as_deref())?);

    let output = match cli.command {
        Commands::Render {
            input,
            sources,
            curated,
            output,
        } => {
            let raw = read_input(input.as_deref())?;
            let message = renderer.render_message(&raw, &sources, curated);
            match output.format {
                Format::Json => serde_json::to_string_pretty(&message)?,
                Format::Text => TextPresenter::new(&message.registry, output.hyperlinks)
                    .present(message.nodes()),
            }
        }
        Commands::Payload { input, output } => {
            let json = read_input(input.as_deref())?;
            let message = renderer
                .render_payload_str(&json)
                .context("Failed to render chat payload")?;
            match output.format {
                Format::Json => serde_json::to_string_pretty(&message)?,
                Format::Text => TextPresenter::new(&message.registry, output.hyperlinks)
                    .present(message.nodes()),
            }
        }
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Load the config from an explicit path, or the default location when it exists
fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    match path {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match RenderConfig::load_default() {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable default config");
                Ok(RenderConfig::default())
            }
        },
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
