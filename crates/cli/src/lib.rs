use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use disclosure_cache::CacheError;
use disclosure_index::IndexError;
use disclosure_protocol::{
    serialize_json, serialize_json_pretty, ErrorCode, ErrorEnvelope, Response,
};
use disclosure_search::{QueryOrchestrator, SearchError};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod engine;

pub use engine::{build_orchestrator, load_index, resolve_config, EngineOptions};

/// Queries run by `demo`, one per family of sample skills
const DEMO_QUERIES: [&str; 3] = ["多代理", "上下文", "工具设计"];

#[derive(Parser)]
#[command(name = "disclosure")]
#[command(about = "Progressive disclosure loader for agent skills", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Descriptor catalog (JSON or TOML); defaults to the built-in sample skills
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory with payload files; without it payloads are rendered from metadata
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Engine config file (TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Query budget in estimated tokens (overrides config and DISCLOSURE_BUDGET)
    #[arg(long, global = true, allow_hyphen_values = true)]
    budget: Option<i64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every descriptor (metadata only)
    List,

    /// Search descriptors by name, description or tag
    Search(SearchArgs),

    /// Show a truncated description without loading content
    Preview(PreviewArgs),

    /// Search, select within budget, and materialize content
    Query(QueryArgs),

    /// Materialize the given ids ahead of time
    Preload(PreloadArgs),

    /// Show index and cache statistics
    Stats,

    /// Run the sample agent queries against one shared engine
    Demo,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
}

#[derive(Args)]
struct PreviewArgs {
    id: String,

    /// Maximum characters before the truncation marker
    #[arg(long)]
    max_length: Option<usize>,
}

#[derive(Args)]
struct QueryArgs {
    query: String,

    /// Include materialized content in the output
    #[arg(long)]
    show_content: bool,
}

#[derive(Args)]
struct PreloadArgs {
    #[arg(required = true)]
    ids: Vec<String>,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

pub async fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let options = EngineOptions {
        catalog: cli.catalog.clone(),
        content_dir: cli.content_dir.clone(),
        config: cli.config.clone(),
        budget: cli.budget,
    };

    let (response, code) = match run(&cli.command, &options).await {
        Ok(data) => (Response::ok(&data)?, ExitCode::SUCCESS),
        Err(err) => {
            log::error!("{err:#}");
            (Response::error(classify_error(&err)), ExitCode::FAILURE)
        }
    };

    let text = if cli.pretty {
        serialize_json_pretty(&response)?
    } else {
        serialize_json(&response)?
    };
    print_stdout(&text)?;
    Ok(code)
}

async fn run(command: &Commands, options: &EngineOptions) -> Result<Value> {
    let engine = build_orchestrator(options)?;
    match command {
        Commands::List => run_list(&engine),
        Commands::Search(args) => run_search(&engine, args),
        Commands::Preview(args) => run_preview(&engine, args),
        Commands::Query(args) => run_query(&engine, args).await,
        Commands::Preload(args) => run_preload(&engine, args).await,
        Commands::Stats => run_stats(&engine),
        Commands::Demo => run_demo(&engine).await,
    }
}

fn run_list(engine: &QueryOrchestrator) -> Result<Value> {
    let index = engine.index();
    Ok(json!({
        "total": index.len(),
        "total_weight": index.total_weight(),
        "descriptors": index.summaries(),
    }))
}

fn run_search(engine: &QueryOrchestrator, args: &SearchArgs) -> Result<Value> {
    let candidates = engine.index().search(&args.query);
    Ok(json!({
        "query": args.query,
        "matched": candidates.len(),
        "candidates": candidates,
    }))
}

fn run_preview(engine: &QueryOrchestrator, args: &PreviewArgs) -> Result<Value> {
    let preview = match args.max_length {
        Some(max_length) => engine.preview_with_length(&args.id, max_length)?,
        None => engine.preview(&args.id)?,
    };
    let index = engine.index();
    Ok(json!({
        "id": args.id,
        "preview": preview,
        "prerequisites": index.prerequisites_of(&args.id),
        "related": index.related_of(&args.id),
    }))
}

async fn run_query(engine: &QueryOrchestrator, args: &QueryArgs) -> Result<Value> {
    let budget = engine.config().budget;
    if args.show_content {
        let outcome = engine.materialize_contents(&args.query, budget).await;
        return Ok(serde_json::to_value(outcome)?);
    }
    let stats = engine.handle_query(&args.query, budget).await;
    Ok(serde_json::to_value(stats)?)
}

async fn run_preload(engine: &QueryOrchestrator, args: &PreloadArgs) -> Result<Value> {
    let report = engine.preload(&args.ids).await;
    Ok(json!({
        "report": report,
        "statistics": engine.statistics(),
    }))
}

fn run_stats(engine: &QueryOrchestrator) -> Result<Value> {
    let index = engine.index();
    Ok(json!({
        "index": {
            "total": index.len(),
            "total_weight": index.total_weight(),
        },
        "cache": engine.statistics(),
        "config": engine.config(),
    }))
}

async fn run_demo(engine: &QueryOrchestrator) -> Result<Value> {
    let mut queries = Vec::with_capacity(DEMO_QUERIES.len());
    for query in DEMO_QUERIES {
        queries.push(engine.handle_query_default(query).await);
    }
    Ok(json!({
        "budget": engine.config().budget,
        "queries": queries,
        "statistics": engine.statistics(),
    }))
}

fn classify_error(err: &anyhow::Error) -> ErrorEnvelope {
    let message = format!("{err:#}");
    for cause in err.chain() {
        if let Some(index_err) = cause.downcast_ref::<IndexError>() {
            return classify_index_error(index_err, message);
        }
        if let Some(search_err) = cause.downcast_ref::<SearchError>() {
            return match search_err {
                SearchError::Index(index_err) => classify_index_error(index_err, message),
                SearchError::Cache(CacheError::NotFound(_)) => {
                    ErrorEnvelope::new(ErrorCode::NotFound, message)
                }
                SearchError::Cache(_) => ErrorEnvelope::new(ErrorCode::Internal, message),
                SearchError::InvalidConfig(_) | SearchError::ConfigParse(_) => {
                    ErrorEnvelope::new(ErrorCode::InvalidConfig, message)
                }
            };
        }
    }
    ErrorEnvelope::new(ErrorCode::Internal, message)
}

fn classify_index_error(err: &IndexError, message: String) -> ErrorEnvelope {
    match err {
        IndexError::NotFound(_) => ErrorEnvelope::new(ErrorCode::NotFound, message)
            .with_hint("Run `disclosure list` to see known ids."),
        IndexError::DuplicateIdentifier(_) => {
            ErrorEnvelope::new(ErrorCode::DuplicateIdentifier, message)
                .with_hint("Every descriptor id in a catalog must be unique.")
        }
        IndexError::Catalog(_) | IndexError::Io(_) => {
            ErrorEnvelope::new(ErrorCode::InvalidCatalog, message)
        }
    }
}
