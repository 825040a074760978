use anyhow::{Context, Result};

/// Port the liveness endpoint binds when PORT is not set.
pub const DEFAULT_HEALTH_PORT: u16 = 10000;

/// Runtime configuration drawn from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (from BotFather).
    pub bot_token: String,
    /// Channel or chat that receives alerts and summaries.
    pub channel: String,
    /// Raw TRACKED_WALLETS seed list; parsed by the wallet registry.
    pub seed_wallets: String,
    /// Port for the liveness endpoint.
    pub health_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token =
            std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let channel = std::env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID must be set")?;
        let seed_wallets = std::env::var("TRACKED_WALLETS").unwrap_or_default();
        let health_port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
            Err(_) => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            bot_token,
            channel,
            seed_wallets,
            health_port,
        })
    }
}
