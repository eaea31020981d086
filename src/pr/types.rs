use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PullRequestId = u64;

/// Merge check installed by the Code Owners app. It stays pending until an owner
/// approves, so it says nothing about whether CI is still running.
pub const CODEOWNERS_MERGE_CHECK: &str = "ch.mibex.codeowner.merge-checks";

/// Snapshot of an open pull request, as seen at the start of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRequestId,
    pub title: String,
    pub created_on: DateTime<Utc>,
    pub author: Author,
    pub url: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub merge_tasks: Vec<MergeTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    Reviewer,
    Participant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub role: ParticipantRole,
    pub display_name: String,
    #[serde(default)]
    pub approved: bool,
}

impl Participant {
    pub fn is_approving_reviewer(&self) -> bool {
        self.role == ParticipantRole::Reviewer && self.approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeTaskState {
    #[serde(rename = "SUCCESSFUL")]
    Successful,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "INPROGRESS")]
    InProgress,
    #[serde(rename = "STOPPED")]
    Stopped,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeTask {
    pub key: String,
    pub state: MergeTaskState,
}

impl MergeTask {
    pub fn is_successful(&self) -> bool {
        self.state == MergeTaskState::Successful
    }
}

impl PullRequest {
    /// Number of reviewers who have approved
    pub fn approval_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.is_approving_reviewer())
            .count()
    }

    pub fn reviewers(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Reviewer)
    }
}
