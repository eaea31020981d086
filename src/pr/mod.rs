pub mod bitbucket;
pub mod errors;
pub mod types;

pub use bitbucket::BitbucketPullRequestSource;
pub use errors::SourceError;
pub use types::*;

use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Where open pull requests come from.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Human readable `workspace/repository` name used in run logs
    fn repository_name(&self) -> String;

    /// Fetch every open pull request, enriched with participants and merge tasks
    async fn find_open_pull_requests(&self) -> Result<Vec<PullRequest>, SourceError>;
}
