use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, error, info};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrawlerConfig {
    pub crawler: CrawlerSettings,
    pub fetcher: FetcherSettings,
    pub report: ReportSettings,
}

/// Crawl policy settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrawlerSettings {
    /// Maximum link-following depth; the seed counts as depth one
    pub max_depth: u32,

    /// Wall-clock budget for a whole crawl, in seconds
    pub timeout_secs: u64,

    /// Number of pages processed concurrently
    pub parallelism: usize,

    /// URLs matching any of these patterns in full are never crawled
    pub excluded_urls: Vec<String>,
}

/// Page fetching and parsing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetcherSettings {
    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout, in seconds
    pub fetch_timeout_secs: u64,

    /// Words matching any of these patterns in full are not counted
    pub ignored_words: Vec<String>,
}

/// Result and profile reporting settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportSettings {
    /// How many of the most frequent words the summary shows
    pub popular_word_count: usize,

    /// Write the full result as JSON here instead of printing a summary
    pub result_path: Option<PathBuf>,

    /// Append the profiler report here instead of printing it
    pub profile_path: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            crawler: CrawlerSettings {
                max_depth: 3,
                timeout_secs: 300,
                parallelism: thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4),
                excluded_urls: vec![],
            },
            fetcher: FetcherSettings {
                user_agent: format!("wordcrawl/{}", env!("CARGO_PKG_VERSION")),
                fetch_timeout_secs: 30,
                // Drop words of three letters or fewer
                ignored_words: vec!["^.{1,3}$".to_string()],
            },
            report: ReportSettings {
                popular_word_count: 10,
                result_path: None,
                profile_path: None,
            },
        }
    }
}

impl CrawlerConfig {
    /// Get the path to the config directory
    fn config_dir() -> PathBuf {
        let mut path = if let Some(proj_dirs) =
            directories::ProjectDirs::from("com", "wordcrawl", "wordcrawl")
        {
            proj_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("./config")
        };

        // Create the profiles directory if it doesn't exist
        path.push("profiles");
        if !path.exists() {
            if let Err(e) = fs::create_dir_all(&path) {
                error!("Failed to create config directory: {}", e);
            }
        }

        // Move back up to the config directory
        path.pop();
        path
    }

    /// Load the default configuration
    pub fn load_default() -> Result<Self> {
        let config_dir = Self::config_dir();
        let config_path = config_dir.join("default.yaml");

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            // Create and save the default configuration
            info!("Default configuration not found. Creating...");
            let config = Self::default();
            config.save_as_default()?;
            Ok(config)
        }
    }

    /// Load a configuration profile
    pub fn load_profile(profile: &str) -> Result<Self> {
        let config_dir = Self::config_dir();
        let profile_path = config_dir.join("profiles").join(format!("{}.yaml", profile));

        if profile_path.exists() {
            Self::load_from_file(&profile_path)
        } else {
            anyhow::bail!("Profile '{}' not found", profile)
        }
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read configuration file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .context(format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save the configuration as the default
    pub fn save_as_default(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = config_dir.join("default.yaml");

        self.save_to_file(&config_path)
    }

    /// Save the configuration as a profile
    pub fn save_as_profile(&self, profile: &str) -> Result<()> {
        let config_dir = Self::config_dir();
        let profiles_dir = config_dir.join("profiles");

        if !profiles_dir.exists() {
            fs::create_dir_all(&profiles_dir).context(format!(
                "Failed to create profiles directory: {}",
                profiles_dir.display()
            ))?;
        }

        let profile_path = profiles_dir.join(format!("{}.yaml", profile));
        self.save_to_file(&profile_path)
    }

    /// Save the configuration to a file
    fn save_to_file(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let contents =
            serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(path, contents)
            .context(format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// List all available profiles
    pub fn list_profiles() -> Result<Vec<String>> {
        let config_dir = Self::config_dir();
        let profiles_dir = config_dir.join("profiles");

        if !profiles_dir.exists() {
            return Ok(vec![]);
        }

        let mut profiles = Vec::new();

        for entry in fs::read_dir(profiles_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && path.extension().map_or(false, |ext| ext == "yaml") {
                if let Some(stem) = path.file_stem() {
                    if let Some(name) = stem.to_str() {
                        profiles.push(name.to_string());
                    }
                }
            }
        }

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_edits() {
        let config = CrawlerConfig::default();

        assert!(config.crawler.parallelism >= 1);
        assert!(config.crawler.max_depth >= 1);
        assert!(config.fetcher.fetch_timeout_secs > 0);
        assert!(config.report.popular_word_count > 0);
        assert!(config.report.result_path.is_none());
    }

    #[test]
    fn configuration_round_trips_through_yaml() {
        let mut config = CrawlerConfig::default();
        config.crawler.max_depth = 7;
        config.crawler.excluded_urls = vec![r".*\.pdf".to_string()];
        config.report.result_path = Some(PathBuf::from("out/result.json"));

        let yaml = serde_yaml::to_string(&config).expect("config should serialize");
        let loaded: CrawlerConfig = serde_yaml::from_str(&yaml).expect("config should parse");

        assert_eq!(loaded.crawler.max_depth, 7);
        assert_eq!(loaded.crawler.excluded_urls, config.crawler.excluded_urls);
        assert_eq!(loaded.report.result_path, config.report.result_path);
        assert_eq!(loaded.fetcher.user_agent, config.fetcher.user_agent);
    }
}
