use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use report_retrieval::{
    ChatCompletionsConfig, ChatCompletionsGenerator, RetrievalConfig, RetrievalEngine,
    StructuredAnswer,
};
use report_text_chunker::ChunkerConfig;
use report_vector_store::{Embedder, EmbedderKind, EMBEDDING_MODE_ENV};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "report-lens")]
#[command(about = "Ask questions about annual reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Vector length for the hash embedder
    #[arg(long, global = true, default_value_t = 384)]
    dimension: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and persist a plain-text report
    Index(IndexArgs),

    /// Print the chunks of a saved index nearest to a question
    Query(QueryArgs),

    /// Answer a question about a plain-text report
    Ask(AskArgs),
}

#[derive(Args)]
struct ChunkingArgs {
    /// Words per chunk
    #[arg(long, default_value_t = report_text_chunker::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Words shared by consecutive chunks
    #[arg(long, default_value_t = report_text_chunker::DEFAULT_OVERLAP)]
    overlap: usize,
}

impl ChunkingArgs {
    fn retrieval_config(&self, top_k: usize) -> RetrievalConfig {
        RetrievalConfig {
            chunker: ChunkerConfig {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
                ..ChunkerConfig::for_annual_reports()
            },
            top_k,
        }
    }
}

#[derive(Args)]
struct IndexArgs {
    /// Plain-text report to index
    file: PathBuf,

    /// Directory receiving the index artifacts
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    chunking: ChunkingArgs,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Directory written by `index`
    dir: PathBuf,

    /// Question to search for
    question: String,

    /// Number of chunks to return
    #[arg(short = 'k', long, default_value_t = report_retrieval::DEFAULT_TOP_K)]
    k: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Plain-text report to ingest
    file: PathBuf,

    /// Question about the report
    question: String,

    /// Chunks passed to the model as context
    #[arg(short = 'k', long, default_value_t = report_retrieval::DEFAULT_TOP_K)]
    k: usize,

    /// Chat-completions model id
    #[arg(long)]
    model: Option<String>,

    #[command(flatten)]
    chunking: ChunkingArgs,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Hash,
    Http,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            EmbedMode::Hash => "hash",
            EmbedMode::Http => "http",
        }
    }
}

#[derive(Serialize)]
struct IndexOutput<'a> {
    file: &'a Path,
    out: &'a Path,
    chunks: usize,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    question: &'a str,
    chunks: Vec<String>,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    question: &'a str,
    #[serde(flatten)]
    answer: StructuredAnswer,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(mode) = cli.embed_mode {
        env::set_var(EMBEDDING_MODE_ENV, mode.as_str());
    }

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Query(args) => args.json,
        Commands::Ask(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let embedder = EmbedderKind::from_env()?
        .build(cli.dimension)
        .context("Failed to configure embedder")?;

    match cli.command {
        Commands::Index(args) => run_index(args, embedder).await?,
        Commands::Query(args) => run_query(args, embedder).await?,
        Commands::Ask(args) => run_ask(args, embedder).await?,
    }

    Ok(())
}

fn read_report(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn build_engine(
    config: RetrievalConfig,
    embedder: Arc<dyn Embedder>,
    model: Option<String>,
) -> Result<RetrievalEngine> {
    let mut generator_config = ChatCompletionsConfig::default();
    if let Some(model) = model {
        generator_config.model = model;
    }
    let generator = Arc::new(ChatCompletionsGenerator::new(generator_config)?);
    RetrievalEngine::new(config, embedder, generator).context("Invalid retrieval configuration")
}

/// Chunk, embed and save a report
async fn run_index(args: IndexArgs, embedder: Arc<dyn Embedder>) -> Result<()> {
    let text = read_report(&args.file)?;
    let config = args.chunking.retrieval_config(report_retrieval::DEFAULT_TOP_K);
    let mut engine = build_engine(config, embedder, None)?;

    engine.ingest(&text).await.context("Failed to ingest report")?;
    engine
        .save_index(&args.out)
        .await
        .with_context(|| format!("Failed to save index to {}", args.out.display()))?;

    let chunks = engine.chunk_count().await;
    if args.json {
        let output = IndexOutput {
            file: &args.file,
            out: &args.out,
            chunks,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!("Indexed {} chunks into {}", chunks, args.out.display());
    }
    Ok(())
}

/// Print the nearest chunks from a saved index
async fn run_query(args: QueryArgs, embedder: Arc<dyn Embedder>) -> Result<()> {
    let mut engine = build_engine(RetrievalConfig::default(), embedder, None)?;
    engine
        .load_index(&args.dir)
        .await
        .with_context(|| format!("Failed to load index from {}", args.dir.display()))?;

    let chunks = engine.retrieve(&args.question, args.k).await?;

    if args.json {
        let output = QueryOutput {
            question: &args.question,
            chunks,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (i, chunk) in chunks.iter().enumerate() {
            println!("{}. {}", i + 1, chunk);
            println!();
        }
    }
    Ok(())
}

/// Ingest a report and print a structured answer
async fn run_ask(args: AskArgs, embedder: Arc<dyn Embedder>) -> Result<()> {
    let text = read_report(&args.file)?;
    let config = args.chunking.retrieval_config(args.k);
    let mut engine = build_engine(config, embedder, args.model)?;

    engine.ingest(&text).await.context("Failed to ingest report")?;
    let answer = engine
        .answer(&args.question)
        .await
        .context("Failed to answer question")?;

    if args.json {
        let output = AskOutput {
            question: &args.question,
            answer,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Key Findings\n{}\n", answer.key_findings);
        println!("Detailed Analysis\n{}\n", answer.detailed_analysis);
        println!("Summary\n{}", answer.summary);
    }
    Ok(())
}
