//! CLI entry point for the gitrag backend (for dev and testing).

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Args, Parser};
use gitrag_core::config::config_path;
use gitrag_core::{
    app_data_dir, chunk_collection, index_partition, load_config, status, Blacklists,
    Config, GitSource, Ingestor, OllamaClient, OllamaRetriever, OwnedCollection, Partition,
    Retriever, SearchResponse, SyntectGuesser,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitrag")]
#[command(about = "gitrag: index a git repository by language and query it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Show where gitrag stores its config.
    DataDir,
    /// Print the effective config as TOML.
    Config,
    /// Clone a repository and list its files grouped by detected language.
    Ingest {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the full collections (documents, ids, metadatas) as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Clone a repository and show how its documents would be chunked.
    Chunks {
        #[command(flatten)]
        source: SourceArgs,
        /// Maximum characters per chunk (default from config).
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Clone, index with Ollama embeddings, and run one query.
    Search {
        #[command(flatten)]
        source: SourceArgs,
        /// Query text.
        query: String,
        /// Number of results.
        #[arg(short, default_value_t = 5)]
        k: usize,
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// `owner/name` on GitHub, a git URL, or a local repository path.
    #[arg(value_name = "REPO")]
    locator: String,
    /// Comma-separated directory names to skip at the repository root.
    #[arg(long, value_delimiter = ',')]
    dir_blacklist: Option<Vec<String>>,
    /// Comma-separated file extensions to skip anywhere (e.g. `.png,.lock`).
    #[arg(long, value_delimiter = ',')]
    ext_blacklist: Option<Vec<String>>,
}

impl SourceArgs {
    fn blacklists(&self, config: &Config) -> Blacklists {
        let dirs = self
            .dir_blacklist
            .clone()
            .unwrap_or_else(|| config.ingest.dir_blacklist.clone());
        let exts = self
            .ext_blacklist
            .clone()
            .unwrap_or_else(|| config.ingest.ext_blacklist.clone());
        Blacklists::new(dirs, exts)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    let result = match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("gitrag backend");
            println!("  core: {}", status());
            Ok(())
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => {
                println!("{}", p.display());
                Ok(())
            }
            None => Err("Could not determine app data directory.".to_string()),
        },
        Commands::Config => show_config(&config),
        Commands::Ingest { source, json } => ingest(&config, &source)
            .await
            .and_then(|p| print_partition(&p, json)),
        Commands::Chunks { source, chunk_size } => ingest(&config, &source).await.map(|p| {
            let size = chunk_size.unwrap_or(config.index.chunk_size);
            for collection in p.collections() {
                let chunks = chunk_collection(&collection, size);
                println!(
                    "{:<12} {:>5} file(s) {:>6} chunk(s)",
                    collection.language(),
                    collection.len(),
                    chunks.len()
                );
            }
        }),
        Commands::Search {
            source,
            query,
            k,
            chunk_size,
        } => search(&config, &source, &query, k, chunk_size).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn show_config(config: &Config) -> Result<(), String> {
    if let Some(path) = config_path() {
        println!("# {}", path.display());
    }
    let s = toml::to_string_pretty(config).map_err(|e| e.to_string())?;
    print!("{}", s);
    Ok(())
}

/// Ingestion is blocking (clone + file reads), so it runs off the async workers.
async fn ingest(config: &Config, source: &SourceArgs) -> Result<Partition, String> {
    let blacklists = source.blacklists(config);
    let locator = source.locator.clone();
    let mut git = GitSource::new();
    if let Some(token) = &config.ingest.git_token {
        git = git.with_token(token.clone());
    }
    let ingestor = Ingestor::new(git, SyntectGuesser::new()).with_sampling(config.ingest.sample);

    tokio::task::spawn_blocking(move || ingestor.ingest(&locator, &blacklists))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn print_partition(partition: &Partition, json: bool) -> Result<(), String> {
    if json {
        let collections: BTreeMap<String, OwnedCollection> = partition
            .to_collections()
            .into_iter()
            .map(|(tag, c)| (tag.to_string(), c))
            .collect();
        let s = serde_json::to_string_pretty(&collections).map_err(|e| e.to_string())?;
        println!("{}", s);
        return Ok(());
    }
    println!("Ingested {} file(s)", partition.len());
    for collection in partition.collections() {
        println!("  {:<12} {}", collection.language(), collection.len());
        for id in collection.ids() {
            println!("    {}", id);
        }
    }
    Ok(())
}

async fn search(
    config: &Config,
    source: &SourceArgs,
    query: &str,
    k: usize,
    chunk_size: Option<usize>,
) -> Result<(), String> {
    let partition = ingest(config, source).await?;
    let client = OllamaClient::from_url(&config.index.ollama_url)
        .map_err(|e| e.to_string())?
        .with_embed_model(config.index.embed_model.clone());
    let mut retriever = OllamaRetriever::new(client);

    let index_name = source.locator.replace('/', "_");
    let size = chunk_size.unwrap_or(config.index.chunk_size);
    let report = index_partition(&mut retriever, &index_name, &partition, size)
        .await
        .map_err(|e| e.to_string())?;
    tracing::info!(
        "Index {} built: {} primary chunk(s) of {}",
        report.handle.name,
        report.handle.chunks,
        report.primary
    );

    let hits = retriever
        .search(&index_name, query, k)
        .await
        .map_err(|e| e.to_string())?;
    let response: SearchResponse = hits.into_iter().collect();
    let s = serde_json::to_string_pretty(&response).map_err(|e| e.to_string())?;
    println!("{}", s);
    Ok(())
}
