use anyhow::Result;

pub mod history;
pub mod init;
pub mod remind;

pub use history::HistoryCommand;
pub use init::InitCommand;
pub use remind::RemindCommand;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
