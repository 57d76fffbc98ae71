//! The `spotlight annotate` command.

use clap::Args;
use spotlight_core::output::{write_json, write_report};
use spotlight_core::video::ensure_video_file;
use spotlight_core::{AnnotateOptions, Annotator, Config};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the `annotate` command.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Video file to annotate
    #[arg(long)]
    pub video_path: PathBuf,

    /// AWS region for Bedrock
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// TwelveLabs Pegasus model id (e.g. us.twelvelabs.pegasus-1-2-v1:0)
    #[arg(long, env = "TWELVELABS_MODEL_ID")]
    pub model_id: Option<String>,

    /// Image model for coordinate extraction (defaults to the configured model)
    #[arg(long, env = "GEMINI_MODEL_ID")]
    pub gemini_model_id: Option<String>,

    /// Locate-main prompt text (overrides the prompt file)
    #[arg(long)]
    pub locate_prompt: Option<String>,

    /// Describe prompt text (overrides the prompt file)
    #[arg(long)]
    pub describe_prompt: Option<String>,

    /// Skip first-frame coordinate extraction
    #[arg(long)]
    pub no_coordinates: bool,

    /// Keep raw provider responses instead of extracted text
    #[arg(long)]
    pub raw_output: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl AnnotateArgs {
    fn options(&self) -> AnnotateOptions {
        AnnotateOptions {
            locate_prompt: self.locate_prompt.clone(),
            describe_prompt: self.describe_prompt.clone(),
            image_model: self.gemini_model_id.clone(),
            extract_coordinates: !self.no_coordinates,
            raw_output: self.raw_output,
        }
    }
}

/// Execute the annotate command.
pub async fn execute(args: AnnotateArgs, config: &Config) -> anyhow::Result<()> {
    ensure_video_file(&args.video_path)?;

    let annotator =
        Annotator::from_config(config, args.region.as_deref(), args.model_id.as_deref())?;

    let spinner = create_spinner(&args.video_path);
    let result = annotator.annotate(&args.video_path, &args.options()).await;
    spinner.finish_and_clear();
    let report = result?;

    let pretty = config.output.pretty && !args.compact;
    match &args.output {
        Some(path) => {
            write_report(path, &report, pretty)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => write_json(std::io::stdout().lock(), &report, pretty)?,
    }

    Ok(())
}

/// Spinner on stderr while the remote models work.
fn create_spinner(video: &Path) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Annotating {}...", video.display()));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
