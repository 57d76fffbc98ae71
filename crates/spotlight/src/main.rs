//! Spotlight CLI - locate and describe the main character of a video.
//!
//! Spotlight asks a video-understanding model (TwelveLabs Pegasus on Bedrock)
//! who the main character is and what happens, and pins that character to
//! pixel coordinates on the first frame with an image model on OpenRouter.
//!
//! # Usage
//!
//! ```bash
//! # Annotate a video, printing the report to stdout
//! spotlight annotate --video-path clip.mp4
//!
//! # Write the report to a file, keeping raw provider responses
//! spotlight annotate --video-path clip.mp4 --raw-output --output results.json
//!
//! # Print the assistant tool definitions
//! spotlight tools list
//!
//! # Ask a hosted assistant, answering its tool calls locally
//! spotlight assistant ask --thread-id <id> "Get all stats for clip.mp4"
//!
//! # View configuration
//! spotlight config show
//! ```

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cli;
mod logging;

/// Exit code for a run stopped by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// Spotlight - locate and describe the main character of a video.
#[derive(Parser, Debug)]
#[command(name = "spotlight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Locate the main character, their coordinates, and describe the video
    Annotate(cli::annotate::AnnotateArgs),

    /// Assistant tool definitions and local tool calls
    Tools(cli::tools::ToolsArgs),

    /// Talk to a hosted chat assistant that can call the tools
    Assistant(cli::assistant::AssistantArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // API keys commonly live in a .env next to the videos.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match spotlight_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `spotlight config path`."
            );
            spotlight_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Spotlight v{}", spotlight_core::VERSION);

    let run = async {
        match cli.command {
            Commands::Annotate(args) => cli::annotate::execute(args, &config).await,
            Commands::Tools(args) => cli::tools::execute(args, &config).await,
            Commands::Assistant(args) => cli::assistant::execute(args, &config).await,
            Commands::Config(args) => cli::config::execute(args).await,
        }
    };

    tokio::select! {
        result = run => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["spotlight", "config", "path", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
