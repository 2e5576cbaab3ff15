use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, warn};

use mistral_relay_bot::{bot, logging};
use mistral_relay_bot::config::{BotConfig, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::from_cli(cli)?;

    logging::init(config.verbose)?;

    info!(
        model = %config.model,
        api_base = %config.api_base,
        "Starting Mistral relay bot"
    );
    if config.mistral_api_key.is_none() {
        warn!("MISTRAL_API_KEY is not set; completion requests will be answered with an error");
    }

    bot::transport::run(config).await?;

    Ok(ExitCode::SUCCESS)
}
