//! Helpers shared between the migrate and check commands.

use std::time::Duration;

use starshift::github::GitHubDirectory;
use starshift::retry::{RetryConfig, RetryingDirectory};

use crate::config::Config;

/// Which account a credential belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Account {
    Source,
    Target,
}

impl Account {
    fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Self::Source => "STARSHIFT_SOURCE_TOKEN",
            Self::Target => "STARSHIFT_TARGET_TOKEN",
        }
    }
}

/// Resolve the token for one account, with a usable error message.
pub(crate) fn require_token(config: &Config, account: Account) -> Result<String, String> {
    let token = match account {
        Account::Source => config.source.token.clone(),
        Account::Target => config.target.token.clone(),
    };
    token.ok_or_else(|| {
        format!(
            "No {} token configured. Set {} or add it to the config file \
             (see `starshift --help` for locations).",
            account.name(),
            account.env_var()
        )
    })
}

/// Build a retrying GitHub directory for one account.
pub(crate) fn build_directory(
    config: &Config,
    account: Account,
) -> Result<RetryingDirectory<GitHubDirectory>, Box<dyn std::error::Error>> {
    let token = require_token(config, account)?;
    let directory = GitHubDirectory::new(&token)?.with_page_size(config.migrate.page_size);

    let retry = RetryConfig {
        max_retries: config.migrate.max_retries,
        ..RetryConfig::default()
    };
    Ok(RetryingDirectory::new(directory, retry))
}

/// Task delay from config.
pub(crate) fn task_delay(config: &Config) -> Duration {
    Duration::from_millis(config.migrate.task_delay_ms)
}
