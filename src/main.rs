use anyhow::Result;
use tracing::{error, info};

mod cli;
mod crawler;
mod error;
mod parser;
mod profiler;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so the verbose flag can shape
    // the log filter
    let args = cli::parse_args();

    utils::init_logging(args.verbose)?;

    info!("Starting wordcrawl v{}", env!("CARGO_PKG_VERSION"));

    // Process commands
    match cli::process_command(args).await {
        Ok(_) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
