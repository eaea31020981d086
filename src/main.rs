use anyhow::Result;
use clap::Parser;
use pullme::cli::commands::{Command, HistoryCommand, InitCommand, RemindCommand};
use pullme::cli::{Cli, Commands};
use pullme::config::PullmeConfig;
use pullme::telemetry::{init_telemetry, parse_log_level};

fn main() -> Result<()> {
    let cli = Cli::parse();
    tokio::runtime::Runtime::new()?.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    PullmeConfig::load_env_file()?;
    let mut config = PullmeConfig::load_from(cli.config.as_deref())?;
    cli.options.apply_to(&mut config);

    let level = parse_log_level(&config.observability.log_level)?;
    init_telemetry(level, config.observability.json_logs)?;

    match cli.command {
        Some(Commands::Init { path, force }) => InitCommand::new(path, force, config).execute().await,
        Some(Commands::History) => HistoryCommand::new(&config)?.execute().await,
        None => RemindCommand::new(config, cli.options.dry_run).execute().await,
    }
}
