pub mod commands;
pub mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl from a seed URL and count words across the visited pages
    Crawl {
        /// Seed URL to start crawling from
        #[arg(required = true)]
        url: String,

        /// Configuration profile to use
        #[arg(short, long)]
        profile: Option<String>,

        /// Maximum crawling depth
        #[arg(short, long)]
        depth: Option<u32>,

        /// Crawl time budget in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Number of pages processed concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Skip URLs matching this pattern in full (repeatable)
        #[arg(short, long, value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Write the full result as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration profiles
    Config {
        /// Profile name to manage
        #[arg(required = false)]
        profile: Option<String>,

        /// List all available profiles
        #[arg(short, long)]
        list: bool,
    },
}

/// Parse command line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Process the command
pub async fn process_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Crawl {
            url,
            profile,
            depth,
            timeout,
            parallelism,
            exclude,
            output,
        } => {
            info!("Starting crawl from {}", url);
            commands::crawl(url, profile, depth, timeout, parallelism, exclude, output).await
        }
        Commands::Config { profile, list } => {
            if list {
                info!("Listing all configuration profiles");
                commands::list_profiles().await
            } else if let Some(profile_name) = profile {
                info!("Managing configuration profile: {}", profile_name);
                commands::manage_profile(profile_name).await
            } else {
                info!("Showing current configuration");
                commands::show_config().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn crawl_flags_override_nothing_by_default() {
        let cli = Cli::try_parse_from(["wordcrawl", "crawl", "https://example.com"])
            .expect("minimal crawl invocation should parse");

        match cli.command {
            Commands::Crawl {
                url,
                profile,
                depth,
                timeout,
                parallelism,
                exclude,
                output,
            } => {
                assert_eq!(url, "https://example.com");
                assert!(profile.is_none());
                assert!(depth.is_none());
                assert!(timeout.is_none());
                assert!(parallelism.is_none());
                assert!(exclude.is_empty());
                assert!(output.is_none());
            }
            _ => panic!("expected the crawl subcommand"),
        }
    }

    #[test]
    fn exclude_flag_repeats() {
        let cli = Cli::try_parse_from([
            "wordcrawl",
            "crawl",
            "https://example.com",
            "--exclude",
            r".*\.pdf",
            "--exclude",
            r".*\.zip",
        ])
        .expect("repeated exclude flags should parse");

        match cli.command {
            Commands::Crawl { exclude, .. } => {
                assert_eq!(exclude, vec![r".*\.pdf".to_string(), r".*\.zip".to_string()]);
            }
            _ => panic!("expected the crawl subcommand"),
        }
    }
}
