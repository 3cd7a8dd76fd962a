//! The `check` command: verify both credentials and print starred
//! counts without mutating anything.

use starshift::directory::StarDirectory;

use crate::commands::shared::{Account, build_directory};
use crate::config::Config;

pub async fn handle_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let source = build_directory(config, Account::Source)?;
    let target = build_directory(config, Account::Target)?;

    let source_identity = source.who_am_i().await?;
    let source_count = source.count_starred().await?;
    println!(
        "Source: {} ({} public repositories, {} starred)",
        source_identity.username, source_identity.public_repos, source_count
    );

    let target_identity = target.who_am_i().await?;
    println!(
        "Target: {} ({} public repositories)",
        target_identity.username, target_identity.public_repos
    );

    if source_identity.username == target_identity.username {
        println!("Warning: source and target are the same account.");
    }

    Ok(())
}
