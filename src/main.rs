use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use newsthreads::batch;
use newsthreads::classify::Classifier;
use newsthreads::config::Config;
use newsthreads::logging::{configure_cli_logging, configure_logging};
use newsthreads::server;
use newsthreads::util::to_json_pretty;

#[derive(Parser)]
#[clap(
    name = "newsthreads",
    about = "Group news articles into story threads",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIMESTAMP"), ")")
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List English and Russian articles
    Languages {
        /// Directory of HTML articles
        source_dir: PathBuf,
    },

    /// List articles that read like news
    News {
        /// Directory of HTML articles
        source_dir: PathBuf,
    },

    /// Group news articles by category
    Categories {
        /// Directory of HTML articles
        source_dir: PathBuf,
    },

    /// Group news articles into story threads
    Threads {
        /// Directory of HTML articles
        source_dir: PathBuf,
    },

    /// Serve the indexing and ranking HTTP API
    Server {
        /// Port to listen on; defaults to the configured port
        port: Option<u16>,
    },
}

fn print_json<T: Serialize>(value: &T, indent: usize) -> Result<()> {
    println!("{}", to_json_pretty(value, indent)?);
    Ok(())
}

fn run_batch(config: &Config, command: Commands) -> Result<()> {
    let classifier = Classifier::from_config(config)?;
    let indent = config.json_indent;

    match command {
        Commands::Languages { source_dir } => {
            print_json(&batch::languages(&classifier, &source_dir)?, indent)
        }
        Commands::News { source_dir } => print_json(&batch::news(&classifier, &source_dir)?, indent),
        Commands::Categories { source_dir } => {
            print_json(&batch::categories(&classifier, &source_dir)?, indent)
        }
        Commands::Threads { source_dir } => print_json(
            &batch::threads(&classifier, config.clustering, &source_dir)?,
            indent,
        ),
        Commands::Server { .. } => anyhow::bail!("server is not a batch command"),
    }
}

fn configure_rayon(workers: usize) {
    // Only the first call can size the global pool
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build_global();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { port } => {
            configure_logging();
            let config = Config::load()?;
            configure_rayon(config.server.workers);
            info!(
                "Starting newsthreads {} ({}) with {} workers, index in {}",
                env!("CARGO_PKG_VERSION"),
                option_env!("GIT_HASH").unwrap_or("unknown"),
                config.server.workers,
                config.server.index_dir.display()
            );
            let port = config.server.listen_port(port);
            server::serve(config, port).await
        }
        command => {
            configure_cli_logging();
            let config = Config::load()?;
            configure_rayon(config.server.workers);
            tokio::task::spawn_blocking(move || run_batch(&config, command)).await?
        }
    }
}
