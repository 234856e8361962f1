use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::config::CrawlerConfig;
use crate::crawler::engine::{CrawlEngine, CrawlResult};
use crate::parser::{HtmlPageParser, PageParser};
use crate::profiler::Profiler;

/// Run a crawl from a seed URL and report its word counts
pub async fn crawl(
    url: String,
    profile: Option<String>,
    depth: Option<u32>,
    timeout: Option<u64>,
    parallelism: Option<usize>,
    exclude: Vec<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &profile {
        Some(name) => CrawlerConfig::load_profile(name)
            .context(format!("Failed to load profile: {}", name))?,
        None => CrawlerConfig::load_default()?,
    };

    // Override configuration with command line parameters if provided
    if let Some(d) = depth {
        config.crawler.max_depth = d;
    }

    if let Some(t) = timeout {
        config.crawler.timeout_secs = t;
    }

    if let Some(p) = parallelism {
        config.crawler.parallelism = p;
    }

    if !exclude.is_empty() {
        config.crawler.excluded_urls.extend(exclude);
    }

    if output.is_some() {
        config.report.result_path = output;
    }

    // The profiler wraps the parser so every page fetch is timed
    let profiler = Profiler::new();
    let parser = HtmlPageParser::new(&config.fetcher)?;
    let parser: Arc<dyn PageParser> = Arc::new(profiler.wrap(parser)?);

    let engine = CrawlEngine::new(&config.crawler, parser)?;

    let started = Instant::now();
    let result = engine.crawl(&url).await;
    info!(
        "Processed {} URLs in {:.2?}",
        result.urls_visited,
        started.elapsed()
    );

    match &config.report.result_path {
        Some(path) => write_result(&result, path)?,
        None => print_summary(&result, config.report.popular_word_count),
    }

    match &config.report.profile_path {
        Some(path) => profiler.append_to_file(path).context(format!(
            "Failed to append profile report to {}",
            path.display()
        ))?,
        None => profiler.write_report(&mut std::io::stdout().lock())?,
    }

    Ok(())
}

/// Write the full crawl result as JSON
fn write_result(result: &CrawlResult, path: &Path) -> Result<()> {
    let contents =
        serde_json::to_string_pretty(result).context("Failed to serialize crawl result")?;

    fs::write(path, contents)
        .context(format!("Failed to write result file: {}", path.display()))?;

    info!("Results written to {}", path.display());
    Ok(())
}

/// Print the word-count summary for an interactive run
fn print_summary(result: &CrawlResult, popular_word_count: usize) {
    println!(
        "Processed {} URLs, {} distinct words",
        result.urls_visited,
        result.word_counts.len()
    );

    if result.word_counts.is_empty() {
        return;
    }

    println!("Most frequent words:");
    for (word, count) in result.top_words(popular_word_count) {
        println!("{:>8}  {}", count, word);
    }
}

/// List all available configuration profiles
pub async fn list_profiles() -> Result<()> {
    let profiles = CrawlerConfig::list_profiles()?;

    if profiles.is_empty() {
        println!("No configuration profiles found");
        return Ok(());
    }

    println!("Available configuration profiles:");
    for profile in profiles {
        println!("  - {}", profile);
    }

    Ok(())
}

/// Manage a specific configuration profile
pub async fn manage_profile(profile_name: String) -> Result<()> {
    match CrawlerConfig::load_profile(&profile_name) {
        Ok(config) => {
            // Display the configuration
            println!("Profile: {}", profile_name);
            println!("{:#?}", config);
        }
        Err(_) => {
            // Profile doesn't exist, create a new one
            warn!(
                "Profile '{}' does not exist. Creating a default profile.",
                profile_name
            );
            let config = CrawlerConfig::default();
            config.save_as_profile(&profile_name)?;
            println!("Created default profile: {}", profile_name);
        }
    }

    Ok(())
}

/// Show the current configuration
pub async fn show_config() -> Result<()> {
    let config = CrawlerConfig::load_default()?;
    println!("Current configuration:");
    println!("{:#?}", config);

    Ok(())
}
