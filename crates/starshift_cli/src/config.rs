//! Configuration file support for starshift.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STARSHIFT_`, e.g., `STARSHIFT_SOURCE_TOKEN`)
//! 3. Config file (~/.config/starshift/config.toml or ./starshift.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [source]
//! token = "ghp_..."  # or use STARSHIFT_SOURCE_TOKEN env var
//!
//! [target]
//! token = "ghp_..."  # or use STARSHIFT_TARGET_TOKEN env var
//!
//! [migrate]
//! page_size = 100
//! concurrency = 20
//! max_retries = 10
//! task_delay_ms = 1000
//! remove_original_stars = true
//!
//! [audit]
//! log_file = "github-star-migration.log"
//! failed_repos_file = "failed-repos.csv"
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use starshift::migrate::{
    DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_TASK_DELAY_MS, MAX_TRANSIENT_RETRIES,
};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source account (stars are read and optionally removed here).
    pub source: AccountConfig,
    /// Target account (stars are created here).
    pub target: AccountConfig,
    /// Migration tuning.
    pub migrate: MigrateConfig,
    /// Audit file locations.
    pub audit: AuditConfig,
}

/// Credentials for one GitHub account.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Personal access token.
    /// Can also be set via STARSHIFT_SOURCE_TOKEN / STARSHIFT_TARGET_TOKEN.
    pub token: Option<String>,
}

/// Migration tuning knobs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Repositories fetched per page.
    pub page_size: usize,
    /// Maximum concurrent API requests.
    pub concurrency: usize,
    /// Maximum retry attempts for transient directory errors.
    pub max_retries: usize,
    /// Delay after each migration task, in milliseconds.
    pub task_delay_ms: u64,
    /// Whether to remove the source-side star after a successful migration.
    pub remove_original_stars: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: MAX_TRANSIENT_RETRIES as usize,
            task_delay_ms: DEFAULT_TASK_DELAY_MS,
            remove_original_stars: true,
        }
    }
}

/// Audit file locations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Append-only event log.
    pub log_file: PathBuf,
    /// CSV of repositories that failed to migrate.
    pub failed_repos_file: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("github-star-migration.log"),
            failed_repos_file: PathBuf::from("failed-repos.csv"),
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/starshift/config.toml)
    /// 3. Local config file (./starshift.toml)
    /// 4. Environment variables with STARSHIFT_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "starshift") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Local config file takes priority over the XDG one
        let local_config = PathBuf::from("starshift.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./starshift.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. STARSHIFT_SOURCE_TOKEN -> source.token
        builder = builder.add_source(
            Environment::with_prefix("STARSHIFT")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the default config file path.
    #[allow(dead_code)]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "starshift").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
