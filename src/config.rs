use std::fmt;

use clap::Parser;
use eyre::{Result, eyre};
use url::Url;

pub const DEFAULT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_API_BASE: &str = "https://api.mistral.ai/v1/";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Mistral API key
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    mistral_api_key: Option<String>,

    /// Model used for chat completions
    #[arg(long, env = "MISTRAL_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Mistral API
    #[arg(long, env = "MISTRAL_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: Url,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

pub struct BotConfig {
    pub telegram_token: String,
    pub mistral_api_key: Option<String>,
    pub model: String,
    pub api_base: Url,
    pub verbose: bool,
}

impl BotConfig {
    /// Validates parsed arguments. Fails when the Telegram token is absent or blank.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let telegram_token = non_blank(cli.telegram_token)
            .ok_or_else(|| eyre!("TELEGRAM_BOT_TOKEN environment variable not set"))?;

        Ok(Self {
            telegram_token,
            mistral_api_key: non_blank(cli.mistral_api_key),
            model: cli.model,
            api_base: with_trailing_slash(cli.api_base),
            verbose: cli.verbose,
        })
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field(
                "mistral_api_key",
                &self.mistral_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model", &self.model)
            .field("api_base", &self.api_base.as_str())
            .field("verbose", &self.verbose)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Url::join drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
