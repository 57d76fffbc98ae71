//! The `spotlight assistant` command: drive a hosted chat assistant that can
//! call the annotation tools.

use clap::{Args, Subcommand};
use spotlight_core::assistant::{training_videos, AssistantProfile};
use spotlight_core::output::write_json;
use spotlight_core::tools::ConfiguredTools;
use spotlight_core::{AssistantClient, AssistantReply, Config};
use std::path::PathBuf;

/// Arguments for the `assistant` command.
#[derive(Args, Debug)]
pub struct AssistantArgs {
    #[command(subcommand)]
    pub command: AssistantCommand,
}

#[derive(Subcommand, Debug)]
pub enum AssistantCommand {
    /// Create an assistant with the annotation tools registered
    Create,

    /// Open a new thread on an assistant
    Thread {
        assistant_id: String,
    },

    /// Send a message; tool calls are run locally and answered
    Ask {
        /// Thread to post to
        #[arg(long)]
        thread_id: String,

        message: String,

        /// LLM provider (defaults to the configured one)
        #[arg(long)]
        llm_provider: Option<String>,

        /// Model name (defaults to the configured one)
        #[arg(long)]
        model_name: Option<String>,
    },

    /// Store a memory on an assistant
    Remember {
        assistant_id: String,
        content: String,
    },

    /// List an assistant's memories
    Memories {
        assistant_id: String,
    },

    /// Process every training video and remember what the assistant found
    Train {
        assistant_id: String,

        /// Thread to use (a new one is opened when omitted)
        #[arg(long)]
        thread_id: Option<String>,

        /// Directory holding the training videos
        #[arg(long, default_value = "training_videos")]
        dir: PathBuf,

        /// Video file extension
        #[arg(long, default_value = "mov")]
        extension: String,
    },
}

/// Execute the assistant command.
pub async fn execute(args: AssistantArgs, config: &Config) -> anyhow::Result<()> {
    let client = AssistantClient::from_config(&config.assistant)?;
    let tools = ConfiguredTools::new(config.clone());

    match args.command {
        AssistantCommand::Create => {
            let id = client.create_assistant(&AssistantProfile::default()).await?;
            println!("{id}");
        }

        AssistantCommand::Thread { assistant_id } => {
            println!("{}", client.create_thread(&assistant_id).await?);
        }

        AssistantCommand::Ask {
            thread_id,
            message,
            llm_provider,
            model_name,
        } => {
            let client = client.with_model(
                llm_provider.as_deref().unwrap_or(&config.assistant.llm_provider),
                model_name.as_deref().unwrap_or(&config.assistant.model_name),
            );
            match client.query(&thread_id, &message, &tools).await? {
                AssistantReply::Text(text) => println!("{text}"),
                AssistantReply::Stats(stats) => {
                    write_json(std::io::stdout().lock(), &stats, config.output.pretty)?
                }
            }
        }

        AssistantCommand::Remember {
            assistant_id,
            content,
        } => {
            let memory = client.create_memory(&assistant_id, &content).await?;
            write_json(std::io::stdout().lock(), &memory, config.output.pretty)?;
        }

        AssistantCommand::Memories { assistant_id } => {
            let memories = client.memories(&assistant_id).await?;
            write_json(std::io::stdout().lock(), &memories, config.output.pretty)?;
        }

        AssistantCommand::Train {
            assistant_id,
            thread_id,
            dir,
            extension,
        } => {
            let videos = training_videos(&dir, &extension)?;
            if videos.is_empty() {
                anyhow::bail!("No .{extension} videos found in {}", dir.display());
            }
            let thread_id = match thread_id {
                Some(id) => id,
                None => client.create_thread(&assistant_id).await?,
            };
            let stored = client
                .train(&assistant_id, &thread_id, &videos, &tools)
                .await?;
            println!("Stored {stored} of {} memories", videos.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: AssistantCommand,
    }

    #[test]
    fn train_defaults() {
        let cli = TestCli::try_parse_from(["spotlight", "train", "a1"]).unwrap();
        match cli.command {
            AssistantCommand::Train {
                assistant_id,
                thread_id,
                dir,
                extension,
            } => {
                assert_eq!(assistant_id, "a1");
                assert!(thread_id.is_none());
                assert_eq!(dir, PathBuf::from("training_videos"));
                assert_eq!(extension, "mov");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn ask_requires_thread() {
        assert!(TestCli::try_parse_from(["spotlight", "ask", "hello"]).is_err());
        assert!(TestCli::try_parse_from(["spotlight", "ask", "--thread-id", "t1", "hello"]).is_ok());
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let mut config = Config::default();
        config.assistant.api_key = "${DEFINITELY_NOT_SET_SPOTLIGHT_654}".to_string();
        let args = AssistantArgs {
            command: AssistantCommand::Create,
        };
        let err = execute(args, &config).await.unwrap_err();
        assert!(err.to_string().contains("BACKBOARD_API_KEY"), "got: {err}");
    }
}
