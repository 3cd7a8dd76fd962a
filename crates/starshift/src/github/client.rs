//! GitHub-backed star directory.

use std::sync::Arc;

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::directory::{DirectoryError, Identity, Result, StarDirectory, StarredRepo};
use crate::migrate::DEFAULT_PAGE_SIZE;

use super::convert::{RawStarredRepo, RawUser, to_starred_repo};
use super::error::{error_for_status, map_octocrab_error};

/// GraphQL query for the starred total; one item is enough to get the
/// aggregate count in a single round trip.
const STARRED_TOTAL_QUERY: &str =
    "query { viewer { starredRepositories(first: 1) { totalCount } } }";

/// A [`StarDirectory`] over the GitHub REST and GraphQL APIs.
///
/// One instance wraps one credential; a migration uses two of these,
/// one for the source account and one for the target.
#[derive(Clone)]
pub struct GitHubDirectory {
    inner: Arc<Octocrab>,
    per_page: usize,
}

impl GitHubDirectory {
    /// Create a directory from a personal access token.
    pub fn new(token: &str) -> Result<Self> {
        let inner = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(map_octocrab_error)?;

        Ok(Self {
            inner: Arc::new(inner),
            per_page: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the page size used for starred listings.
    #[must_use]
    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }
}

#[async_trait]
impl StarDirectory for GitHubDirectory {
    async fn who_am_i(&self) -> Result<Identity> {
        let user: RawUser = self
            .inner
            .get("/user", None::<&()>)
            .await
            .map_err(map_octocrab_error)?;

        Ok(Identity {
            username: user.login,
            public_repos: user.public_repos,
        })
    }

    async fn count_starred(&self) -> Result<usize> {
        let response: serde_json::Value = self
            .inner
            .graphql(&serde_json::json!({ "query": STARRED_TOTAL_QUERY }))
            .await
            .map_err(map_octocrab_error)?;

        response["data"]["viewer"]["starredRepositories"]["totalCount"]
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| {
                DirectoryError::api("GraphQL response missing starredRepositories.totalCount")
            })
    }

    async fn list_starred_page(&self, page: u32) -> Result<Vec<StarredRepo>> {
        let route = format!("/user/starred?per_page={}&page={}", self.per_page, page);
        let raw: Vec<RawStarredRepo> = self
            .inner
            .get(&route, None::<&()>)
            .await
            .map_err(map_octocrab_error)?;

        Ok(raw.into_iter().map(to_starred_repo).collect())
    }

    async fn star(&self, repo: &StarredRepo) -> Result<()> {
        // PUT /user/starred/{owner}/{repo}: 204 whether or not the
        // star already existed, so starring is naturally idempotent.
        let route = format!("/user/starred/{}/{}", repo.owner, repo.name);
        let response = self
            .inner
            ._put(&route, None::<&()>)
            .await
            .map_err(map_octocrab_error)?;

        match error_for_status(
            response.status().as_u16(),
            &format!("starring {}", repo.full_name()),
        ) {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    async fn unstar(&self, repo: &StarredRepo) -> Result<()> {
        let route = format!("/user/starred/{}/{}", repo.owner, repo.name);
        let response = self
            .inner
            ._delete(&route, None::<&()>)
            .await
            .map_err(map_octocrab_error)?;

        // 404 means the star was already gone; that is the state we
        // wanted, not an error.
        let status = response.status().as_u16();
        if status == 404 {
            return Ok(());
        }
        match error_for_status(status, &format!("unstarring {}", repo.full_name())) {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}
