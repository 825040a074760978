use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tokio::sync::{RwLock, mpsc};
use tokio::time::{Instant, interval, interval_at};
use tracing::{info, warn};

use polymarket_tracker::api;
use polymarket_tracker::commands::{self, Command};
use polymarket_tracker::config::Config;
use polymarket_tracker::dedup::SeenTxs;
use polymarket_tracker::engine::SummaryAccumulator;
use polymarket_tracker::health;
use polymarket_tracker::reporter;
use polymarket_tracker::state::{WalletRegistry, short_address};
use polymarket_tracker::telegram::TelegramClient;

/// Records fetched per wallet on the short (alert) cycle.
const NEW_TRADE_LOOKBACK: usize = 5;
/// Records fetched per wallet on the long (summary) cycle.
const SUMMARY_LOOKBACK: usize = 50;
/// Pause between per-wallet fetches during a summary pass. Politeness toward
/// the upstream API, not a correctness requirement.
const SUMMARY_PACING: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "tracker", about = "Polymarket wallet trade tracker")]
struct Args {
    /// Seconds between new-trade scans
    #[arg(long, default_value_t = 30)]
    check_interval: u64,

    /// Seconds between automatic summaries
    #[arg(long, default_value_t = 3600)]
    summary_interval: u64,

    /// Seconds before the first automatic summary
    #[arg(long, default_value_t = 60)]
    summary_warmup: u64,

    /// Path to the persisted wallet list
    #[arg(long, default_value = "wallets.json")]
    wallets_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::from_env()?;

    let registry = WalletRegistry::load(args.wallets_file.clone(), &config.seed_wallets);
    info!("Tracker initialized with {} wallet(s)", registry.len());
    for wallet in registry.snapshot() {
        info!("  - {}: {}", wallet.name, short_address(&wallet.address));
    }
    let registry = Arc::new(RwLock::new(registry));

    let data_client = api::build_client()?;
    let telegram = TelegramClient::new(&config.bot_token, config.channel.clone())?;

    let health_listener = health::bind(config.health_port).await?;
    tokio::spawn(health::serve(health_listener));

    let (summary_tx, mut summary_rx) = mpsc::channel::<i64>(8);
    tokio::spawn(run_command_loop(
        telegram.clone(),
        Arc::clone(&registry),
        summary_tx,
    ));

    let wallet_count = registry.read().await.len();
    telegram
        .notify(&format!(
            "🚀 Polymarket tracker started!\n\
             👛 {wallet_count} wallet(s) watched\n\
             ⏱️ Trade scan every {}s\n\
             📊 Summary every {}s\n\n\
             Commands: /add /remove /list /summary /help",
            args.check_interval, args.summary_interval
        ))
        .await;

    let mut seen = SeenTxs::new();
    let mut check_tick = interval(Duration::from_secs(args.check_interval));
    let mut summary_tick = interval_at(
        Instant::now() + Duration::from_secs(args.summary_warmup),
        Duration::from_secs(args.summary_interval),
    );

    info!(
        "Entering polling loop (check: {}s, summary: {}s). Press Ctrl+C to stop.",
        args.check_interval, args.summary_interval
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = check_tick.tick() => {
                check_new_trades(&data_client, &telegram, &registry, &mut seen).await;
            }
            _ = summary_tick.tick() => {
                run_summary(&data_client, &telegram, &registry, None).await;
            }
            Some(requester) = summary_rx.recv() => {
                run_summary(&data_client, &telegram, &registry, Some(requester)).await;
            }
        }
    }

    info!("Tracker stopped");
    Ok(())
}

/// Short cycle: scan every watched wallet and alert on trades not seen before.
async fn check_new_trades(
    client: &reqwest::Client,
    telegram: &TelegramClient,
    registry: &RwLock<WalletRegistry>,
    seen: &mut SeenTxs,
) {
    let wallets = registry.read().await.snapshot();
    for wallet in wallets {
        let records = api::fetch_activity(client, &wallet.address, NEW_TRADE_LOOKBACK).await;
        for record in records {
            if !record.is_trade() || record.transaction_hash.is_empty() {
                continue;
            }
            if !seen.insert(&record.transaction_hash) {
                continue;
            }
            let alert = reporter::render_trade_alert(&record, &wallet.name, Local::now());
            telegram.notify(&alert).await;
            let title: String = record.title.chars().take(40).collect();
            info!(
                "{}: {} ${:.0} on {title}...",
                wallet.name, record.side, record.usdc_size
            );
        }
    }
}

/// Long cycle: aggregate recent history per market and deliver the ranked
/// summary. Re-reads history fresh each pass, independent of the dedup set.
async fn run_summary(
    client: &reqwest::Client,
    telegram: &TelegramClient,
    registry: &RwLock<WalletRegistry>,
    requester: Option<i64>,
) {
    info!("Generating market summary...");
    let wallets = registry.read().await.snapshot();
    let mut pass = SummaryAccumulator::new();
    for wallet in &wallets {
        let records = api::fetch_activity(client, &wallet.address, SUMMARY_LOOKBACK).await;
        for record in &records {
            pass.fold(record, wallet);
        }
        tokio::time::sleep(SUMMARY_PACING).await;
    }

    match pass.into_report(wallets.len()) {
        Some(report) => {
            info!(
                "Summary covers {} market(s) from {} trade(s)",
                report.markets.len(),
                report.total_trades
            );
            telegram
                .notify(&reporter::render_summary(&report, Local::now()))
                .await;
        }
        None => {
            info!("No trade data for summary");
            if let Some(chat_id) = requester {
                telegram.reply(chat_id, "⚠️ No trade data found").await;
            }
        }
    }
}

/// Long-poll Telegram for commands and dispatch them against the registry.
async fn run_command_loop(
    telegram: TelegramClient,
    registry: Arc<RwLock<WalletRegistry>>,
    summary_tx: mpsc::Sender<i64>,
) {
    let mut offset = 0i64;
    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {e}");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            let Some(command) = Command::parse(&text) else {
                continue;
            };
            let reply = commands::respond(command, &registry, &summary_tx, message.chat.id).await;
            telegram.reply(message.chat.id, &reply).await;
        }
    }
}
