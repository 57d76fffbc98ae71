//! The `spotlight tools` command: assistant tool definitions and local calls.

use clap::{Args, Subcommand};
use spotlight_core::tools::{definitions, result_content, ConfiguredTools, ToolCall, ToolExecutor};
use spotlight_core::Config;

/// Arguments for the `tools` command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub command: ToolsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// Print the function-tool definitions as JSON
    List,

    /// Run a tool call locally and print the tool result
    Call {
        /// Tool name (process_video or get_all_stats)
        name: String,

        /// JSON-encoded arguments object
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

/// Execute the tools command.
pub async fn execute(args: ToolsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ToolsCommand::List => {
            println!("{}", serde_json::to_string_pretty(&definitions())?);
        }

        ToolsCommand::Call { name, arguments } => {
            let call = ToolCall {
                id: None,
                name,
                arguments,
            };
            let result = ConfiguredTools::new(config.clone()).execute(&call).await;
            // Failures are part of the tool result, as an assistant would see them.
            println!("{}", result_content(&result));
            result?;
        }
    }

    Ok(())
}
