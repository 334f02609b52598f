//! NewsCheck CLI - analyze articles from the terminal or serve the web page

mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use newscheck_core::analysis::{AnalysisKind, AnalysisSelection, Analyzer};
use newscheck_core::capability::{CapabilityRegistry, GuardedInvoker};
use newscheck_core::config::NewsCheckConfig;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "newscheck")]
#[command(about = "NewsCheck AI: best-effort news article analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// Extra configuration file, layered under NEWSCHECK_* env overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the single-page web UI
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Analyze an article and print the result cards
    Analyze {
        /// Read the article from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Comma-separated analyses to run, or "all"
        #[arg(short, long)]
        only: Option<AnalysisSelection>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured capability providers
    Capabilities,
    /// Version information
    Version,
}

fn load_config(path: Option<&PathBuf>) -> Result<NewsCheckConfig> {
    Ok(NewsCheckConfig::load_with(path)?)
}

fn build_analyzer(config: &NewsCheckConfig) -> Result<Analyzer> {
    let registry = CapabilityRegistry::from_commands(&config.providers)
        .context("Failed to register providers")?;
    tracing::info!(providers = registry.len(), "Capability registry ready");
    let invoker = GuardedInvoker::with_config(Arc::new(registry), config.dispatcher.clone());
    Ok(Analyzer::new(invoker))
}

fn read_article(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read article from {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read article from stdin")?;
            Ok(text)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("newscheck {}", env!("CARGO_PKG_VERSION"));
            println!("newscheck-core {}", newscheck_core::VERSION);
        }
        Commands::Capabilities => {
            let config = load_config(cli.config.as_ref())?;
            let registry = CapabilityRegistry::from_commands(&config.providers)?;
            if registry.is_empty() {
                println!("No providers configured; every analysis will show a placeholder.");
            }
            // Resolving first loads command providers so their operations list below.
            let statuses: Vec<_> = AnalysisKind::ALL
                .into_iter()
                .map(|kind| {
                    let capability = kind.capability();
                    let status = match registry.resolve(&capability) {
                        Ok(_) => "available".to_string(),
                        Err(error) => error.category().to_string(),
                    };
                    (kind, capability, status)
                })
                .collect();

            for summary in registry.list() {
                let operations = if summary.loaded {
                    summary.operations.join(", ")
                } else {
                    "(not loaded)".to_string()
                };
                println!("[{}] {}", summary.id, operations);
            }
            if !registry.is_empty() {
                println!();
            }

            for (kind, capability, status) in statuses {
                println!(
                    "{} {:<22} {:<32} {}",
                    kind.icon(),
                    kind.title(),
                    capability.to_string(),
                    status
                );
            }
        }
        Commands::Analyze { file, only, json } => {
            let config = load_config(cli.config.as_ref())?;
            let analyzer = build_analyzer(&config)?;
            let selection = only.unwrap_or(config.analyses);
            let text = read_article(file.as_ref())?;

            let report = analyzer.analyze(&text, &selection).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for card in &report.cards {
                    println!("{} {}: {}", card.icon, card.title, card.text());
                }
            }
        }
        Commands::Serve { bind } => {
            let config = load_config(cli.config.as_ref())?;
            let analyzer = build_analyzer(&config)?;
            let bind_addr = bind.unwrap_or_else(|| config.server.bind.clone());

            let app = server::app_router(server::AppState::new(analyzer, config.analyses));

            tracing::info!("newscheck server starting on {}", bind_addr);
            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("Failed to bind {}", bind_addr))?;

            axum::serve(listener, app).await.context("Server failed")?;
        }
    }

    Ok(())
}
