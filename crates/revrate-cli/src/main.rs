use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use revrate_ai::{ChatClient, ChatConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, Rater};
use revrate_cli::input;
use revrate_cli::run::{self, JobConfig};
use revrate_core::Scale;
use revrate_store::{ColumnarSink, DuckSink};
use tracing::info;

/// Rate product-review comments against named attributes with a chat model.
#[derive(Parser)]
#[command(name = "revrate", version)]
struct Cli {
    /// Comments file: JSON array of {id, title, body}.
    #[arg(long)]
    comments: PathBuf,

    /// Attributes file: JSON array of {name, category}.
    #[arg(long)]
    attributes: PathBuf,

    /// Product line named in the prompt.
    #[arg(long)]
    product_line: String,

    /// Rating scale variant.
    #[arg(long, value_enum, default_value_t = ScaleArg::Five)]
    scale: ScaleArg,

    /// API key for the chat endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Chat model name.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat endpoint base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Cap on completion tokens.
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f32>,

    /// Output store: database file (duck) or Arrow IPC file (columnar).
    #[arg(long)]
    out: PathBuf,

    /// Storage variant.
    #[arg(long, value_enum, default_value_t = Format::Duck)]
    format: Format,

    /// DuckDB table name.
    #[arg(long, default_value = "comment_score")]
    table: String,

    /// Delete the existing store before running.
    #[arg(long)]
    overwrite: bool,

    /// Directory for periodic columnar checkpoints.
    #[arg(long, default_value = "temp")]
    checkpoint_dir: PathBuf,

    /// Courtesy pause between remote calls, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,

    /// Columnar variant: checkpoint after this many newly scored cells.
    #[arg(long, default_value_t = 20)]
    checkpoint_every: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScaleArg {
    /// 1 = Strongly Disagree … 5 = Strongly Agree.
    Five,
    /// 0 = Strongly Disagree … 10 = Strongly Agree.
    Ten,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Duck,
    Columnar,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let comments = input::load_comments(&cli.comments)?;
    let attributes = input::load_attributes(&cli.attributes)?;
    info!(
        comments = comments.len(),
        attributes = attributes.len(),
        "inputs loaded"
    );

    let rater = Rater::new(ChatClient::new(ChatConfig {
        api_key: cli.api_key,
        base_url: cli.base_url,
        model: cli.model,
        max_tokens: cli.max_tokens,
        temperature: cli.temperature,
    }));

    let job = JobConfig {
        product_line: cli.product_line,
        scale: match cli.scale {
            ScaleArg::Five => Scale::OneToFive,
            ScaleArg::Ten => Scale::ZeroToTen,
        },
        pause: Duration::from_millis(cli.pause_ms),
        checkpoint_every: cli.checkpoint_every,
    };

    let stats = match cli.format {
        Format::Duck => {
            let mut sink = DuckSink::open(&cli.out, &cli.table, cli.overwrite)
                .context("opening DuckDB store")?;
            run::run_duck(&rater, &mut sink, &comments, &attributes, &job).await?
        }
        Format::Columnar => {
            let names: Vec<String> = attributes.iter().map(|a| a.name.clone()).collect();
            let mut sink = ColumnarSink::open(&cli.out, &names, cli.overwrite)
                .context("opening columnar store")?;
            run::run_columnar(
                &rater,
                &mut sink,
                &comments,
                &attributes,
                &cli.checkpoint_dir,
                &job,
            )
            .await?
        }
    };

    info!(
        scored = stats.scored,
        not_applicable = stats.not_applicable,
        errored = stats.errored,
        skipped = stats.skipped,
        elapsed_secs = stats.elapsed_secs,
        "run complete"
    );
    Ok(())
}
