//! # vecgate CLI Application
//!
//! This module implements the command-line interface for the embedding
//! gateway.
//!
//! ## Subcommands
//!
//! - `embed`: embed texts from arguments, a file or stdin
//! - `split`: split a document into sentences
//! - `embed-sentences`: split a document and embed every sentence
//! - `batch`: run a JSONL file of requests concurrently against one service
//! - `info`: show the effective configuration
//!
//! Configuration comes from the environment (see `EmbeddingConfig::from_env`);
//! `--fake` forces the deterministic offline embedder and `--provider gemini`
//! embeds through the Gemini API (`GEMINI_API_KEY`) instead of Vertex AI.

mod telemetry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tracing::{info, instrument, warn};
use vecgate::prelude::*;
use vecgate::request::new_correlation_id;

#[derive(Parser)]
#[command(author, version, about = "Deduplicating, rate-limited gateway for text embeddings", long_about = None)]
struct Cli {
    /// Use deterministic offline embeddings
    #[arg(long, global = true)]
    fake: bool,

    /// Remote embedding provider
    #[arg(long, global = true, value_enum, default_value_t = Provider::Vertex)]
    provider: Provider,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Provider {
    /// Vertex AI `:predict` (VERTEX_PROJECT_ID, gcloud credentials)
    Vertex,
    /// Gemini API through rig (GEMINI_API_KEY)
    Gemini,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed texts and print the response as JSON
    Embed(EmbedArgs),

    /// Split a document into sentences
    Split(SplitArgs),

    /// Split a document into sentences and embed each one
    EmbedSentences(EmbedSentencesArgs),

    /// Process a JSONL file of requests against one shared service
    Batch(BatchArgs),

    /// Show the effective configuration
    Info,
}

#[derive(Args, Debug)]
struct EmbedArgs {
    /// Texts to embed (read from --file or stdin when omitted)
    texts: Vec<String>,

    /// File with one text per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Correlation id for logs and the response
    #[arg(short, long)]
    correlation_id: Option<String>,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Document text
    #[arg(required = true)]
    text: String,
}

#[derive(Args, Debug)]
struct EmbedSentencesArgs {
    /// Document text
    #[arg(required = true)]
    text: String,

    /// Correlation id for logs and the response
    #[arg(short, long)]
    correlation_id: Option<String>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSONL file, one request object per line
    #[arg(short, long, required = true)]
    file: PathBuf,

    /// Number of requests in flight at once
    #[arg(short, long, default_value = "4")]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber()?;

    let command = match cli.command {
        Some(Commands::Split(args)) => return split_command(args),
        Some(command) => command,
        None => {
            let _ = Cli::parse_from(["vecgate", "--help"]);
            return Ok(());
        }
    };

    let config = load_config(cli.fake)?;
    match cli.provider {
        Provider::Vertex => run_command(&EmbeddingService::vertex(config)?, command).await,
        Provider::Gemini => {
            let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
            run_command(&GeminiEmbeddingService::gemini(config, &api_key)?, command).await
        }
    }
}

fn load_config(fake: bool) -> anyhow::Result<EmbeddingConfig> {
    let mut config = EmbeddingConfig::from_env()?;
    if fake {
        config.use_fake_embeddings = true;
    }
    Ok(config)
}

async fn run_command<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Embed(args) => embed_command(service, args).await,
        Commands::Split(args) => split_command(args),
        Commands::EmbedSentences(args) => embed_sentences_command(service, args).await,
        Commands::Batch(args) => batch_command(service, args).await,
        Commands::Info => info_command(service),
    }
}

/// Validate, embed and wrap one request under `correlation_id`
async fn run_request<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    request: &EmbedRequest,
    correlation_id: &str,
) -> Result<EmbedResponse> {
    request.validate(&service.config().limits)?;

    let start = Instant::now();
    let embeddings = service
        .generate_embeddings(&request.texts, correlation_id)
        .await?;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        correlation_id = %correlation_id,
        count = embeddings.len(),
        processing_time_ms,
        "Request completed"
    );
    Ok(EmbedResponse::new(
        embeddings,
        service.model_label(),
        processing_time_ms,
        correlation_id,
    ))
}

#[instrument(skip(service))]
async fn embed_command<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    args: EmbedArgs,
) -> anyhow::Result<()> {
    let texts = read_texts(args.texts, args.file.as_deref()).await?;

    let mut request = EmbedRequest::new(texts);
    request.correlation_id = args.correlation_id;

    let correlation_id = request.correlation_id_or_new();
    let response = run_request(service, &request, &correlation_id).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn split_command(args: SplitArgs) -> anyhow::Result<()> {
    let sentences = RegexSentenceSplitter::new().split(&args.text);
    println!("{}", serde_json::to_string_pretty(&sentences)?);
    Ok(())
}

#[instrument(skip_all)]
async fn embed_sentences_command<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    args: EmbedSentencesArgs,
) -> anyhow::Result<()> {
    let sentences = RegexSentenceSplitter::new().split(&args.text);
    if sentences.is_empty() {
        anyhow::bail!("no sentences found in the input text");
    }

    let mut request = EmbedRequest::new(sentences.clone());
    request.correlation_id = args.correlation_id;

    let correlation_id = request.correlation_id_or_new();
    let response = run_request(service, &request, &correlation_id).await?;
    let response = SentenceEmbedResponse::new(sentences, response);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[instrument(skip(service))]
async fn batch_command<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    args: BatchArgs,
) -> anyhow::Result<()> {
    let requests = read_requests(&args.file).await?;

    let progress_bar = ProgressBar::new(requests.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Embedding requests...");

    let start_time = Instant::now();
    let progress = &progress_bar;
    let results: Vec<serde_json::Value> = stream::iter(requests)
        .map(|request| async move {
            let line = batch_line(service, request).await;
            progress.inc(1);
            line
        })
        .buffered(args.concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<std::result::Result<_, _>>()?;

    progress_bar.finish_with_message("Batch completed");
    for line in &results {
        println!("{}", serde_json::to_string(line)?);
    }
    eprintln!(
        "Processed {} requests in {:.2?}",
        results.len(),
        start_time.elapsed()
    );
    Ok(())
}

fn info_command<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
) -> anyhow::Result<()> {
    let config = service.config();
    let info = serde_json::json!({
        "service": "vecgate",
        "version": env!("CARGO_PKG_VERSION"),
        "model": service.model_label(),
        "dimension": config.embedding_dim,
        "fakeEmbeddings": service.is_deterministic(),
        "maxCallsPerMinute": config.max_calls_per_minute,
        "batchSize": config.effective_batch_size(),
        "taskType": config.task_type,
        "project": config.vertex.project(),
        "location": config.vertex.location,
        "maxTextsPerRequest": config.limits.max_texts_per_request,
        "maxTextLength": config.limits.max_text_length,
        "maxTotalChars": config.limits.max_total_chars,
    });
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Output line for one batch entry; the correlation id is chosen once and
/// used for the logs and the line alike
async fn batch_line<P: EmbeddingProvider + 'static>(
    service: &EmbeddingService<P>,
    parsed: std::result::Result<EmbedRequest, String>,
) -> serde_json::Result<serde_json::Value> {
    let request = match parsed {
        Ok(request) => request,
        Err(message) => {
            let correlation_id = new_correlation_id();
            warn!(correlation_id = %correlation_id, error = %message, "Skipping unparseable request");
            return Ok(error_line(&message, &correlation_id));
        }
    };

    let correlation_id = request.correlation_id_or_new();
    match run_request(service, &request, &correlation_id).await {
        Ok(response) => serde_json::to_value(response),
        Err(e) => {
            warn!(correlation_id = %correlation_id, error = %e, "Request failed");
            Ok(error_line(&e.to_string(), &correlation_id))
        }
    }
}

fn error_line(message: &str, correlation_id: &str) -> serde_json::Value {
    serde_json::json!({
        "error": message,
        "correlationId": correlation_id,
    })
}

/// Texts from arguments, else from a file, else from stdin; one per line
async fn read_texts(texts: Vec<String>, file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    if !texts.is_empty() {
        return Ok(texts);
    }

    let content = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut content = String::new();
            tokio::io::stdin().read_to_string(&mut content).await?;
            content
        }
    };
    Ok(lines_of(&content))
}

fn lines_of(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// One parsed request per non-blank line; unparseable lines become errors
async fn read_requests(path: &Path) -> anyhow::Result<Vec<std::result::Result<EmbedRequest, String>>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<EmbedRequest>(line)
                .map_err(|e| format!("line {}: invalid request: {}", number + 1, e))
        })
        .collect())
}
