use crate::config::{PullmeConfig, DEFAULT_CONFIG_FILE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "pullme", version)]
#[command(about = "CLI tool to remind about Bitbucket pull requests")]
#[command(long_about = "pullme posts Slack reminders for open Bitbucket pull requests that are waiting on review. \
                       Reminders escalate in tone the longer a pull request waits, and pull requests that are \
                       approved, drafts, or still running merge checks are left alone.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to ./pullme.toml when present)
    #[arg(long, global = true, env = "PULLME_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub options: RunOptions,
}

/// Flags that override configuration for a reminder run
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// Bitbucket token
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Bitbucket username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Bitbucket workspace
    #[arg(short = 'w', long)]
    pub workspace: Option<String>,

    /// Bitbucket repository
    #[arg(short = 'r', long)]
    pub repository: Option<String>,

    /// Slack channel
    #[arg(short = 'c', long)]
    pub channel: Option<String>,

    /// Slack token
    #[arg(long)]
    pub slack_token: Option<String>,

    /// Polling interval in seconds; runs once when omitted
    #[arg(short = 'p', long)]
    pub polling_interval: Option<u64>,

    /// Log level: error, warn, info, debug, trace or 0-5
    #[arg(short = 'l', long)]
    pub log_level: Option<String>,

    /// Notification tracker path
    #[arg(short = 'n', long)]
    pub notification_tracker_path: Option<PathBuf>,

    /// Log reminders instead of posting them and leave the tracker untouched
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter configuration file
    Init {
        /// Where to write the configuration
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Show what the notification tracker has recorded so far
    History,
}

impl RunOptions {
    /// Command line flags take precedence over files and environment
    pub fn apply_to(&self, config: &mut PullmeConfig) {
        let overrides = [
            (&self.token, &mut config.bitbucket.token),
            (&self.username, &mut config.bitbucket.username),
            (&self.workspace, &mut config.bitbucket.workspace),
            (&self.repository, &mut config.bitbucket.repository),
            (&self.channel, &mut config.slack.channel),
            (&self.slack_token, &mut config.slack.token),
        ];
        for (flag, setting) in overrides {
            if let Some(value) = flag {
                *setting = Some(value.clone());
            }
        }

        if let Some(interval) = self.polling_interval {
            config.polling_interval_seconds = Some(interval);
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(path) = &self.notification_tracker_path {
            config.notifications.tracker_path = path.clone();
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
    }
}
