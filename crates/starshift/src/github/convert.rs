//! Conversion from GitHub API payloads to directory types.

use serde::Deserialize;

use crate::directory::StarredRepo;

/// Subset of the starred-repository payload the pipeline cares about.
#[derive(Debug, Deserialize)]
pub(crate) struct RawStarredRepo {
    pub id: i64,
    pub name: String,
    pub private: bool,
    pub owner: RawOwner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOwner {
    pub login: String,
}

/// Authenticated-user payload from `GET /user`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    pub login: String,
    #[serde(default)]
    pub public_repos: usize,
}

pub(crate) fn to_starred_repo(raw: RawStarredRepo) -> StarredRepo {
    StarredRepo {
        id: raw.id,
        owner: raw.owner.login,
        name: raw.name,
        is_private: raw.private,
    }
}
