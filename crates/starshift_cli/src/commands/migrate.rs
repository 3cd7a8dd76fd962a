//! The `migrate` command: collect starred repos from the source
//! account and star them on the target.

use std::sync::Arc;
use std::time::Duration;

use starshift::audit::FileAuditSink;
use starshift::migrate::{MigrateOptions, MigrationExecutor, collect_starred};
use starshift::queue::{QueueConfig, TaskQueue};

use crate::MigrateArgs;
use crate::commands::shared::{Account, build_directory, task_delay};
use crate::config::Config;
use crate::progress::ProgressReporter;

pub async fn handle_migrate(
    args: MigrateArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let concurrency = args.concurrency.unwrap_or(config.migrate.concurrency);
    let page_size = args.page_size.unwrap_or(config.migrate.page_size);
    let remove_original_stars = !args.keep_stars && config.migrate.remove_original_stars;

    let source = Arc::new(build_directory(config, Account::Source)?);
    let target = Arc::new(build_directory(config, Account::Target)?);

    let audit = Arc::new(FileAuditSink::open(
        &config.audit.log_file,
        &config.audit.failed_repos_file,
    )?);
    tracing::debug!(
        log_file = %config.audit.log_file.display(),
        failed_repos_file = %config.audit.failed_repos_file.display(),
        "audit files opened"
    );

    let queue = TaskQueue::new(QueueConfig {
        concurrency,
        start_interval: Duration::ZERO,
    });

    let options = MigrateOptions {
        page_size,
        remove_original_stars,
        task_delay: task_delay(config),
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let repos = collect_starred(&source, &queue, &options, &*audit, Some(&callback)).await?;
    if repos.is_empty() {
        reporter.finish();
        println!("No public starred repositories to migrate.");
        return Ok(());
    }

    let executor = MigrationExecutor::new(source, target, audit, options);
    let report = executor.run(repos, &queue, Some(&callback)).await?;

    reporter.finish();
    println!("\n{report}");

    Ok(())
}
