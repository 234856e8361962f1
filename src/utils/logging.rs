use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system
pub fn init_logging(verbose: bool) -> Result<()> {
    // Create an environment filter
    let env_filter = if verbose {
        EnvFilter::from_default_env()
            .add_directive("wordcrawl=debug".parse()?)
            .add_directive("warn".parse()?)
    } else {
        EnvFilter::from_default_env()
            .add_directive("wordcrawl=info".parse()?)
            .add_directive("warn".parse()?)
    };

    // Configure the logging format
    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
