//! Bitbucket Cloud pull request source
//!
//! Lists open pull requests through the 2.0 REST API and enriches each one with
//! its merge tasks (commit statuses) and participants. Every request passes through
//! a `governor` rate limiter so large repositories don't trip Bitbucket's quota.

use super::{
    Author, MergeTask, Participant, ParticipantRole, PullRequest, PullRequestId,
    PullRequestSource, SourceError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.bitbucket.org/2.0";

#[derive(Debug, Clone)]
pub struct BitbucketSettings {
    pub api_base_url: String,
    pub workspace: String,
    pub repository: String,
    pub username: String,
    pub token: String,
    pub page_length: u32,
    pub requests_per_second: u32,
}

#[derive(Debug)]
pub struct BitbucketPullRequestSource {
    http: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    settings: BitbucketSettings,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePullRequest {
    id: PullRequestId,
    title: String,
    created_on: DateTime<Utc>,
    author: WireUser,
    links: WireLinks,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct WireLinks {
    html: WireHref,
}

#[derive(Debug, Deserialize)]
struct WireHref {
    href: String,
}

#[derive(Debug, Deserialize)]
struct WirePullRequestDetail {
    #[serde(default)]
    participants: Vec<WireParticipant>,
}

#[derive(Debug, Deserialize)]
struct WireParticipant {
    role: ParticipantRole,
    #[serde(default)]
    approved: bool,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireErrorMessage,
}

#[derive(Debug, Deserialize)]
struct WireErrorMessage {
    message: String,
}

impl From<WireParticipant> for Participant {
    fn from(p: WireParticipant) -> Self {
        Participant {
            role: p.role,
            display_name: p.user.display_name,
            approved: p.approved,
        }
    }
}

impl BitbucketPullRequestSource {
    pub fn new(settings: BitbucketSettings) -> Result<Self, SourceError> {
        let per_second = NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));
        let http = reqwest::Client::builder()
            .user_agent(concat!("pullme/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            rate_limiter,
            settings,
        })
    }

    fn repository_url(&self) -> String {
        format!(
            "{}/repositories/{}/{}",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.workspace,
            self.settings.repository
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        self.rate_limiter.until_ready().await;
        trace!(url, "Bitbucket GET");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.settings.username, Some(&self.settings.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<WireErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Decode(format!("{url}: {e}")))
    }

    /// Follow `next` links until the listing is exhausted
    async fn get_all_pages<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            items.extend(page.values);
            next = page.next;
        }

        Ok(items)
    }

    async fn fetch_merge_tasks(&self, pr_id: PullRequestId) -> Vec<MergeTask> {
        debug!(pr_id, "Fetching merge tasks");
        let url = format!("{}/pullrequests/{pr_id}/statuses", self.repository_url());
        match self.get_all_pages::<MergeTask>(url).await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(pr_id, error = %e, "Failed to fetch merge tasks, assuming none");
                Vec::new()
            }
        }
    }

    async fn fetch_participants(&self, pr_id: PullRequestId) -> Vec<Participant> {
        debug!(pr_id, "Fetching participants");
        let url = format!("{}/pullrequests/{pr_id}", self.repository_url());
        match self.get_json::<WirePullRequestDetail>(&url).await {
            Ok(detail) => detail.participants.into_iter().map(Participant::from).collect(),
            Err(e) => {
                warn!(pr_id, error = %e, "Failed to fetch participants, assuming none");
                Vec::new()
            }
        }
    }

    async fn enrich(&self, pr: WirePullRequest) -> PullRequest {
        let (merge_tasks, participants) =
            tokio::join!(self.fetch_merge_tasks(pr.id), self.fetch_participants(pr.id));

        PullRequest {
            id: pr.id,
            title: pr.title,
            created_on: pr.created_on,
            author: Author {
                display_name: pr.author.display_name,
            },
            url: pr.links.html.href,
            participants,
            merge_tasks,
        }
    }
}

#[async_trait]
impl PullRequestSource for BitbucketPullRequestSource {
    fn repository_name(&self) -> String {
        format!("{}/{}", self.settings.workspace, self.settings.repository)
    }

    async fn find_open_pull_requests(&self) -> Result<Vec<PullRequest>, SourceError> {
        debug!("Fetching open pull requests");
        let url = format!(
            "{}/pullrequests?state=OPEN&pagelen={}",
            self.repository_url(),
            self.settings.page_length
        );
        let listed: Vec<WirePullRequest> = self.get_all_pages(url).await?;

        let pull_requests = futures::future::join_all(listed.into_iter().map(|pr| self.enrich(pr))).await;
        trace!(count = pull_requests.len(), "Fetched pull requests");

        Ok(pull_requests)
    }
}
