use super::templates::{plain_text_notification, reminder_blocks};
use super::{DeliveryError, NotificationClient};
use crate::notification::clock::{Clock, SystemClock};
use crate::notification::types::NotificationTone;
use crate::pr::PullRequest;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Errors from `conversations.join` meaning the bot will never be able to post
const INACCESSIBLE_CHANNEL_ERRORS: [&str; 2] = ["not_in_channel", "channel_not_found"];

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

/// Posts reminders to a Slack channel with a bot token
#[derive(Debug, Clone)]
pub struct SlackNotificationClient {
    http: reqwest::Client,
    token: String,
    channel: String,
    api_base_url: String,
    clock: Arc<dyn Clock>,
}

impl SlackNotificationClient {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::with_base_url(token, channel, DEFAULT_API_BASE_URL)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        channel: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            channel: channel.into(),
            api_base_url: api_base_url.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use the engine's clock so "days open" matches its notion of now
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn call(&self, method: &str, body: Value) -> Result<SlackResponse, DeliveryError> {
        let url = format!("{}/{method}", self.api_base_url.trim_end_matches('/'));
        debug!(method, channel = %self.channel, "Calling Slack API");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Api {
                method: method.to_string(),
                error: format!("HTTP {status}"),
            });
        }

        Ok(response.json::<SlackResponse>().await?)
    }

    async fn ensure_bot_in_channel(&self) -> Result<(), DeliveryError> {
        let response = self
            .call("conversations.join", json!({ "channel": self.channel }))
            .await?;
        if response.ok {
            return Ok(());
        }

        let error = response.error.unwrap_or_default();
        if INACCESSIBLE_CHANNEL_ERRORS.contains(&error.as_str()) {
            return Err(DeliveryError::ChannelInaccessible {
                channel: self.channel.clone(),
            });
        }
        Err(DeliveryError::Api {
            method: "conversations.join".to_string(),
            error,
        })
    }
}

#[async_trait]
impl NotificationClient for SlackNotificationClient {
    async fn send_reminder(&self, pr: &PullRequest, tone: NotificationTone) -> Result<(), DeliveryError> {
        let days_open = (self.clock.now() - pr.created_on).num_days();

        self.ensure_bot_in_channel().await?;
        let response = self
            .call(
                "chat.postMessage",
                json!({
                    "channel": self.channel,
                    "text": plain_text_notification(tone),
                    "blocks": reminder_blocks(pr, tone, days_open),
                }),
            )
            .await?;

        if !response.ok {
            return Err(DeliveryError::Api {
                method: "chat.postMessage".to_string(),
                error: response.error.unwrap_or_default(),
            });
        }

        debug!(pr_id = pr.id, tone = tone.label(), "Reminder posted to Slack");
        Ok(())
    }
}
