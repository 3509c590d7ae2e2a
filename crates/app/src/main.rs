mod client;
mod commands;
mod config;
mod error;
mod session;

use std::path::PathBuf;

use clap::Parser;
use engine::{Filter, Ledger, SessionProvider};

use crate::{
    client::Client,
    commands::Cli,
    error::{AppError, Result},
    session::ConfigSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let session = ConfigSession::from_config(&settings);
    let user = session
        .current_user()
        .ok_or_else(|| AppError::Settings("user_id is not set".to_string()))?;

    let client = Client::new(&settings, user.clone())?;
    let filter = Filter::current(settings.timezone()?);
    let mut ledger = Ledger::new(client.clone(), filter).with_currency(settings.currency()?);

    let output_dir = PathBuf::from(&settings.output_dir);
    let result = commands::run(cli.command, &mut ledger, &client, &user, &output_dir).await;
    if let Some(message) = ledger.error() {
        tracing::error!("{message}");
    }
    result
}
