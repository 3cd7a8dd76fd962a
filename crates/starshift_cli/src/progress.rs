//! Progress reporting for migration runs.
//!
//! Two modes:
//! - Interactive mode (TTY): animated progress bars using indicatif
//! - Logging mode (non-TTY): structured logging using tracing
//!
//! Bars are organized as one fetch bar (page collection) followed by
//! one migrate bar (per-repository outcomes).

use std::sync::{Arc, Mutex};

use console::Term;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use starshift::migrate::{MigrateProgress, ProgressCallback};

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: MigrateProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a [`ProgressCallback`] for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bars shared across event handlers, under a single lock.
#[derive(Default)]
struct BarState {
    fetch_bar: Option<ProgressBar>,
    migrate_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<BarState>,
}

impl InteractiveReporter {
    /// Create a new interactive reporter.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(BarState::default()),
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: MigrateProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            MigrateProgress::CountingStars => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_prefix(format!("{:12}", "Fetching"));
                pb.set_message("Counting starred repositories...");
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                state.fetch_bar = Some(pb);
            }

            MigrateProgress::StarsCounted {
                total,
                expected_pages,
            } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.set_length(u64::from(expected_pages));
                    pb.set_style(Self::bar_style());
                    pb.disable_steady_tick();
                    pb.set_message(format!("{} starred repos", total));
                }
            }

            MigrateProgress::FetchedPage {
                page,
                count: _,
                total_so_far,
                expected_pages: _,
            } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.set_position(u64::from(page));
                    pb.set_message(format!("Page {} ({} repos)", page, total_so_far));
                }
            }

            MigrateProgress::FetchComplete { eligible, total } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.finish_with_message(format!("✓ {}/{} public repos", eligible, total));
                }
            }

            MigrateProgress::Migrating {
                count,
                remove_original_stars,
            } => {
                let pb = self.multi.add(ProgressBar::new(count as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:12}", "Migrating"));
                let action = if remove_original_stars {
                    "Moving stars..."
                } else {
                    "Copying stars..."
                };
                pb.set_message(action.to_string());
                state.migrate_bar = Some(pb);
            }

            MigrateProgress::RepoMigrated { owner, name, .. } => {
                if let Some(ref pb) = state.migrate_bar {
                    pb.inc(1);
                    pb.set_message(format!("★ {}/{}", owner, name));
                }
            }

            MigrateProgress::RepoFailed {
                owner, name, error, ..
            } => {
                if let Some(ref pb) = state.migrate_bar {
                    pb.inc(1);
                    pb.set_message(format!("✗ {}/{}: {}", owner, name, error));
                }
            }

            MigrateProgress::UnstarFailed { owner, name, error } => {
                drop(state);
                self.multi
                    .println(format!("⚠ could not unstar {}/{}: {}", owner, name, error))
                    .ok();
            }

            MigrateProgress::Complete { report } => {
                if let Some(ref pb) = state.migrate_bar {
                    pb.finish_with_message(format!(
                        "✓ {} migrated, {} failed",
                        report.succeeded, report.failed
                    ));
                }
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref pb) = state.fetch_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
        if let Some(ref pb) = state.migrate_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self
    }

    /// Handle a progress event.
    pub fn handle(&self, event: MigrateProgress) {
        match event {
            MigrateProgress::CountingStars => {
                tracing::info!("Counting starred repositories");
            }

            MigrateProgress::StarsCounted {
                total,
                expected_pages,
            } => {
                tracing::info!(total, expected_pages, "Counted starred repositories");
            }

            MigrateProgress::FetchedPage {
                page,
                count,
                total_so_far,
                expected_pages,
            } => {
                tracing::debug!(page, count, total_so_far, expected_pages, "Fetched page");
            }

            MigrateProgress::FetchComplete { eligible, total } => {
                tracing::info!(eligible, total, "Fetch complete");
            }

            MigrateProgress::Migrating {
                count,
                remove_original_stars,
            } => {
                tracing::info!(count, remove_original_stars, "Migrating repositories");
            }

            MigrateProgress::RepoMigrated { owner, name, stats } => {
                tracing::info!(
                    repo = %format!("{}/{}", owner, name),
                    progress = %stats.progress_line(),
                    "Migrated"
                );
            }

            MigrateProgress::RepoFailed {
                owner,
                name,
                error,
                stats,
            } => {
                tracing::warn!(
                    repo = %format!("{}/{}", owner, name),
                    error = %error,
                    progress = %stats.progress_line(),
                    "Failed to migrate"
                );
            }

            MigrateProgress::UnstarFailed { owner, name, error } => {
                tracing::warn!(
                    repo = %format!("{}/{}", owner, name),
                    error = %error,
                    "Could not remove source star"
                );
            }

            MigrateProgress::Complete { report } => {
                tracing::info!(
                    succeeded = report.succeeded,
                    failed = report.failed,
                    total = report.total,
                    "Migration complete"
                );
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
