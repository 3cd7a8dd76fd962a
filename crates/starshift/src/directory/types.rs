use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::Result;

/// A starred repository as reported by a directory.
///
/// Identity is the platform-assigned `id`; everything else is display
/// metadata. Instances are created by the collector from directory
/// responses and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarredRepo {
    /// Platform-specific numeric ID.
    pub id: i64,
    /// Repository owner (user or org).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Whether the repository is private.
    pub is_private: bool,
}

impl StarredRepo {
    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// The authenticated identity behind a directory credential.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Username/login.
    pub username: String,
    /// Number of public repositories.
    pub public_repos: usize,
}

/// Trait for services that expose a user's starred repositories.
///
/// A directory is the external collaborator of the migration pipeline:
/// it can count and page through the authenticated user's stars and
/// apply or remove a star. Implementations must be safe for concurrent
/// use up to the pipeline's concurrency limit.
///
/// # Implementation notes
///
/// - `star` and `unstar` must be idempotent from the caller's
///   perspective: starring an already-starred repository (or unstarring
///   an already-unstarred one) is not an error.
/// - Transient failures should surface as
///   [`DirectoryError::Transient`](super::DirectoryError::Transient) or
///   [`DirectoryError::RateLimited`](super::DirectoryError::RateLimited)
///   so the retry decorator can classify them.
#[async_trait]
pub trait StarDirectory: Send + Sync {
    /// Get the authenticated identity, failing with
    /// [`DirectoryError::Auth`](super::DirectoryError::Auth) on an
    /// invalid or missing credential.
    async fn who_am_i(&self) -> Result<Identity>;

    /// Total number of repositories starred by the authenticated user.
    async fn count_starred(&self) -> Result<usize>;

    /// Fetch one page of starred repositories. Pages are 1-based.
    async fn list_starred_page(&self, page: u32) -> Result<Vec<StarredRepo>>;

    /// Star a repository.
    async fn star(&self, repo: &StarredRepo) -> Result<()>;

    /// Remove a star from a repository.
    async fn unstar(&self, repo: &StarredRepo) -> Result<()>;
}

// Shared directory handles delegate to the inner implementation, so
// pipeline tasks can hold `Arc<D>` clones directly.
#[async_trait]
impl<D: StarDirectory + ?Sized> StarDirectory for std::sync::Arc<D> {
    async fn who_am_i(&self) -> Result<Identity> {
        (**self).who_am_i().await
    }

    async fn count_starred(&self) -> Result<usize> {
        (**self).count_starred().await
    }

    async fn list_starred_page(&self, page: u32) -> Result<Vec<StarredRepo>> {
        (**self).list_starred_page(page).await
    }

    async fn star(&self, repo: &StarredRepo) -> Result<()> {
        (**self).star(repo).await
    }

    async fn unstar(&self, repo: &StarredRepo) -> Result<()> {
        (**self).unstar(repo).await
    }
}
