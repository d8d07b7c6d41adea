use std::sync::Arc;

use clap::Parser;
use tracing::info;

use ao_core::{Config, Result};
use ao_pipeline::OptimizationOrchestrator;
use ao_web::AppState;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Rewrites repository articles against top-ranking reference content",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Optimize one article (the latest when no id is given)
    Optimize { id: Option<u64> },
    /// Optimize several articles (every known article when no ids are given)
    Batch { ids: Vec<u64> },
    /// Serve the HTTP wrapper around the optimizer
    Serve {
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let orchestrator = Arc::new(OptimizationOrchestrator::from_config(&config));

    match Cli::parse().command.unwrap_or(Commands::Optimize { id: None }) {
        Commands::Optimize { id } => {
            match id {
                Some(id) => info!("🚀 Optimizing article {}", id),
                None => info!("🚀 Optimizing the latest article"),
            }
            let result = orchestrator.run_one(id).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Batch { ids } => {
            if ids.is_empty() {
                info!("🚀 Optimizing every article in the repository");
            } else {
                info!("🚀 Optimizing {} article(s)", ids.len());
            }
            let ids = if ids.is_empty() { None } else { Some(ids) };
            let results = orchestrator.run_batch(ids).await?;
            let succeeded = results.iter().filter(|r| r.success).count();
            info!(
                "🏁 Batch finished: {}/{} article(s) optimized",
                succeeded,
                results.len()
            );
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Serve { port } => {
            ao_web::serve(
                AppState {
                    orchestrator: orchestrator.clone(),
                },
                port,
            )
            .await?;
        }
    }

    Ok(())
}
