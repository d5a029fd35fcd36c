use anyhow::Context;
use clap::{Parser, Subcommand};
use shortlist_api::RestApi;
use shortlist_engine::{evaluate, load_dataset, EngineConfig, ProviderConfig, RetrievalEngine};
use shortlist_storage::load_corpus_dir;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Recommends assessments for free-text hiring queries
#[derive(Parser, Debug)]
#[command(name = "shortlist")]
#[command(about = "Assessment recommendation retrieval", long_about = None)]
struct Args {
    /// Directory holding index.bin and metadata.json
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// JSON file with engine tunables; missing fields keep their defaults
    #[arg(long)]
    engine_config: Option<PathBuf>,

    /// API key for the chat completions endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    chat_api_key: String,

    #[arg(long, default_value = shortlist_engine::config::DEFAULT_CHAT_BASE_URL)]
    chat_base_url: String,

    #[arg(long, default_value = shortlist_engine::config::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// API key for the embedding endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    embedding_api_key: String,

    #[arg(long, default_value = shortlist_engine::config::DEFAULT_EMBEDDING_BASE_URL)]
    embedding_base_url: String,

    #[arg(long, default_value = shortlist_engine::config::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 8000)]
        http_port: u16,
    },
    /// Print recommendations for one query
    Recommend {
        query: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Score Recall@K over a labelled dataset
    Evaluate {
        /// JSON array of {query, assessment_url} pairs
        dataset: PathBuf,

        /// Where to write per-query results
        #[arg(short, long, default_value = "evaluation_results.json")]
        output: PathBuf,

        #[arg(short, long, default_value_t = 10)]
        k: usize,

        #[arg(long, default_value_t = 3)]
        attempts: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Shortlist v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let engine = Arc::new(build_engine(&args)?);
    let corpus = engine.corpus();
    info!(
        "Loaded {} assessments with {}-dimensional embeddings",
        corpus.len(),
        corpus.dim()
    );

    match args.command {
        Command::Serve { http_port } => serve(engine, http_port).await,
        Command::Recommend { ref query, top_k } => {
            let top_k = top_k.unwrap_or(engine.config().top_k);
            let recs = engine.retrieve(query, top_k).await?;
            for (rank, rec) in recs.iter().enumerate() {
                let types = rec
                    .test_type
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!(
                    "{:>2}. {} [{}] {:.3}",
                    rank + 1,
                    rec.name,
                    types,
                    rec.similarity_score.unwrap_or_default()
                );
                println!("    {}", rec.url);
            }
            Ok(())
        }
        Command::Evaluate {
            ref dataset,
            ref output,
            k,
            attempts,
        } => {
            let pairs = load_dataset(dataset)?;
            let report = evaluate(&engine, &pairs, k, attempts).await;
            for (i, q) in report.queries.iter().enumerate() {
                println!(
                    "Query {}: Recall@{} = {:.3} ({}/{} matched)",
                    i + 1,
                    k,
                    q.recall,
                    q.matches,
                    q.ground_truth_count
                );
            }
            println!("Average Recall@{}: {:.3}", k, report.mean_recall);

            let data = serde_json::to_vec_pretty(&report)?;
            std::fs::write(output, data)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Saved detailed results to {}", output.display());
            Ok(())
        }
    }
}

fn build_engine(args: &Args) -> anyhow::Result<RetrievalEngine> {
    let config = match &args.engine_config {
        Some(path) => read_engine_config(path)?,
        None => EngineConfig::default(),
    };

    let mut providers = ProviderConfig::new(&args.chat_api_key, &args.embedding_api_key);
    providers.chat_base_url = args.chat_base_url.clone();
    providers.chat_model = args.chat_model.clone();
    providers.embedding_base_url = args.embedding_base_url.clone();
    providers.embedding_model = args.embedding_model.clone();

    let corpus = Arc::new(load_corpus_dir(&args.data_dir)?);
    Ok(RetrievalEngine::with_providers(corpus, &providers, config)?)
}

fn read_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("invalid engine config {}", path.display()))
}

async fn serve(engine: Arc<RetrievalEngine>, http_port: u16) -> anyhow::Result<()> {
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(engine, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("Shortlist started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
