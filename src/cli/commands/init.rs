/// Init command: writes a starter `pullme.toml`
///
/// An existing file is never overwritten unless `--force` is given.
use super::Command;
use crate::config::PullmeConfig;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub struct InitCommand {
    pub path: PathBuf,
    pub force: bool,
    config: PullmeConfig,
}

impl InitCommand {
    pub fn new(path: PathBuf, force: bool, config: PullmeConfig) -> Self {
        Self { path, force, config }
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite it.",
                self.path.display()
            ));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.config.save_to_file(&self.path)?;

        println!("✅ Wrote {}", self.path.display());
        println!();
        println!("🚀 Next steps:");
        println!("   • Fill in the [bitbucket] and [slack] sections (or use PULLME_BITBUCKET__TOKEN etc.)");
        println!("   • pullme --dry-run     # See what would be sent");
        println!("   • pullme -p 600        # Check every 10 minutes");
        Ok(())
    }
}
