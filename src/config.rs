use crate::notification::history::file::DEFAULT_TRACKER_FILE;
use crate::notification::ladder::default_tiers;
use crate::notification::{
    EscalationLadder, EscalationTier, HandlerChain, HandlerKind, HandlerSettings,
};
use crate::pr::bitbucket::{BitbucketSettings, DEFAULT_API_BASE_URL};
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "pullme.toml";

/// Main configuration structure for pullme
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PullmeConfig {
    /// Run once when unset, otherwise poll every N seconds
    pub polling_interval_seconds: Option<u64>,
    pub bitbucket: BitbucketConfig,
    pub slack: SlackConfig,
    pub notifications: NotificationConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BitbucketConfig {
    pub username: Option<String>,
    /// App password (can be set via env var)
    pub token: Option<String>,
    pub workspace: Option<String>,
    pub repository: Option<String>,
    pub api_base_url: String,
    pub page_length: u32,
    pub requests_per_second: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackConfig {
    pub token: Option<String>,
    pub channel: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub tracker_path: PathBuf,
    /// Ordered escalation tiers, first one must be 0 hours
    pub escalation: Vec<EscalationTier>,
    /// Handler order; the first handler that claims a pull request decides
    pub handlers: Vec<HandlerKind>,
    pub required_approvals: usize,
    pub ignored_merge_task_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Level name or legacy number 0-5
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            username: None,
            token: None,
            workspace: None,
            repository: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_length: 50,
            requests_per_second: 10,
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            channel: None,
            api_base_url: crate::notification::client::slack::DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        let settings = HandlerSettings::default();
        Self {
            tracker_path: PathBuf::from(DEFAULT_TRACKER_FILE),
            escalation: default_tiers(),
            handlers: HandlerKind::default_order(),
            required_approvals: settings.required_approvals,
            ignored_merge_task_keys: settings.ignored_merge_task_keys,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for PullmeConfig {
    fn default() -> Self {
        Self {
            polling_interval_seconds: None,
            bitbucket: BitbucketConfig::default(),
            slack: SlackConfig::default(),
            notifications: NotificationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl PullmeConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`pullme.toml`, or the given path)
    /// 3. Environment variables (`PULLME_SECTION__KEY`)
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&PullmeConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("PULLME")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration")?;
        let pullme_config: PullmeConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(pullme_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Check that everything needed for a run is present. Slack settings are not
    /// needed for a dry run since nothing is delivered.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        let mut required = vec![
            ("bitbucket.username (--username)", &self.bitbucket.username),
            ("bitbucket.token (--token)", &self.bitbucket.token),
            ("bitbucket.workspace (--workspace)", &self.bitbucket.workspace),
            ("bitbucket.repository (--repository)", &self.bitbucket.repository),
        ];
        if !dry_run {
            required.push(("slack.token (--slack-token)", &self.slack.token));
            required.push(("slack.channel (--channel)", &self.slack.channel));
        }

        let missing: Vec<&str> = required
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            bail!("Missing required settings: {}", missing.join(", "));
        }

        if self.polling_interval_seconds == Some(0) {
            bail!("Polling interval must be at least 1 second");
        }

        self.ladder()?;
        Ok(())
    }

    pub fn ladder(&self) -> Result<EscalationLadder> {
        EscalationLadder::new(self.notifications.escalation.clone()).context("Invalid escalation ladder")
    }

    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            required_approvals: self.notifications.required_approvals,
            ignored_merge_task_keys: self.notifications.ignored_merge_task_keys.clone(),
        }
    }

    pub fn handler_chain(&self) -> HandlerChain {
        HandlerChain::from_kinds(&self.notifications.handlers, &self.handler_settings())
    }

    pub fn polling_interval(&self) -> Option<Duration> {
        self.polling_interval_seconds.map(Duration::from_secs)
    }

    pub fn bitbucket_settings(&self) -> Result<BitbucketSettings> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .with_context(|| format!("Missing Bitbucket {name}"))
        };

        Ok(BitbucketSettings {
            api_base_url: self.bitbucket.api_base_url.clone(),
            workspace: required(&self.bitbucket.workspace, "workspace")?,
            repository: required(&self.bitbucket.repository, "repository")?,
            username: required(&self.bitbucket.username, "username")?,
            token: required(&self.bitbucket.token, "token")?,
            page_length: self.bitbucket.page_length,
            requests_per_second: self.bitbucket.requests_per_second,
        })
    }
}
