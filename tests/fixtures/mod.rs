//! Shared builders and test doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pullme::notification::{
    DeliveryError, EscalationLadder, HandlerChain, HandlerKind, HandlerSettings, InMemoryNotificationHistoryStore,
    ManualClock, NotificationClient, NotificationManager, NotificationTone,
};
use pullme::pr::{Author, MergeTask, MergeTaskState, Participant, ParticipantRole, PullRequest};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()
}

pub fn pull_request(id: u64, title: &str) -> PullRequest {
    PullRequest {
        id,
        title: title.to_string(),
        created_on: Utc.with_ymd_and_hms(2024, 3, 28, 9, 0, 0).unwrap(),
        author: Author {
            display_name: "Ada Lovelace".to_string(),
        },
        url: format!("https://bitbucket.org/acme/app/pull-requests/{id}"),
        participants: vec![],
        merge_tasks: vec![],
    }
}

pub fn merge_task(key: &str, state: MergeTaskState) -> MergeTask {
    MergeTask {
        key: key.to_string(),
        state,
    }
}

pub fn reviewer(name: &str, approved: bool) -> Participant {
    Participant {
        role: ParticipantRole::Reviewer,
        display_name: name.to_string(),
        approved,
    }
}

/// Delivery double that remembers every reminder and can be told to fail for some PRs
#[derive(Debug, Default, Clone)]
pub struct RecordingClient {
    sent: Arc<Mutex<Vec<(u64, NotificationTone)>>>,
    failing: Arc<Mutex<HashSet<u64>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, pr_id: u64) {
        self.failing.lock().unwrap().insert(pr_id);
    }

    pub fn recover(&self, pr_id: u64) {
        self.failing.lock().unwrap().remove(&pr_id);
    }

    pub fn sent(&self) -> Vec<(u64, NotificationTone)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationClient for RecordingClient {
    async fn send_reminder(&self, pr: &PullRequest, tone: NotificationTone) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().contains(&pr.id) {
            return Err(DeliveryError::Api {
                method: "chat.postMessage".to_string(),
                error: "service_unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push((pr.id, tone));
        Ok(())
    }
}

pub struct Harness {
    pub store: InMemoryNotificationHistoryStore,
    pub client: RecordingClient,
    pub clock: Arc<ManualClock>,
    pub manager: NotificationManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            InMemoryNotificationHistoryStore::new(),
            EscalationLadder::default(),
            HandlerChain::from_kinds(&HandlerKind::default_order(), &HandlerSettings::default()),
        )
    }

    pub fn with(store: InMemoryNotificationHistoryStore, ladder: EscalationLadder, chain: HandlerChain) -> Self {
        let client = RecordingClient::new();
        let clock = Arc::new(ManualClock::new(start_time()));
        let manager = NotificationManager::new(Arc::new(store.clone()), Arc::new(client.clone()), ladder, chain)
            .with_clock(clock.clone());

        Self {
            store,
            client,
            clock,
            manager,
        }
    }
}
