use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::state::{WalletRegistry, normalize_address, short_address};

const START_TEXT: &str = "🤖 Polymarket Wallet Tracker\n\n\
    Commands:\n\
    /add 0xADDRESS name - Watch a wallet\n\
    /remove 0xADDRESS - Stop watching a wallet\n\
    /list - Watched wallets\n\
    /summary - Immediate summary\n\
    /help - Help";

const HELP_TEXT: &str = "📖 Help:\n\n\
    ➕ Watch a wallet:\n\
    /add 0xbb015bb...e5 WhaleAlpha\n\n\
    ➖ Stop watching:\n\
    /remove 0xbb015bb...e5\n\n\
    📋 Watched wallets:\n\
    /list\n\n\
    📊 Immediate summary:\n\
    /summary";

const ADD_USAGE: &str = "Usage: /add 0xADDRESS wallet_name\n\
    Example: /add 0xbb015bb...e5 WhaleAlpha";

/// A parsed bot command. Argument presence is validated at dispatch so
/// missing arguments produce usage replies instead of silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add {
        address: Option<String>,
        name: Option<String>,
    },
    Remove {
        address: Option<String>,
    },
    List,
    Summary,
}

impl Command {
    /// Parse a message text. Tolerates the `@BotName` suffix Telegram
    /// appends to commands sent in groups. Non-commands return `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?;
        if !head.starts_with('/') {
            return None;
        }
        let name = head[1..].split('@').next().unwrap_or_default();
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "list" => Some(Self::List),
            "summary" => Some(Self::Summary),
            "add" => {
                let address = parts.next().map(str::to_string);
                let rest: Vec<&str> = parts.collect();
                let name = if rest.is_empty() {
                    None
                } else {
                    Some(rest.join(" "))
                };
                Some(Self::Add { address, name })
            }
            "remove" => Some(Self::Remove {
                address: parts.next().map(str::to_string),
            }),
            _ => None,
        }
    }
}

/// Execute a command and produce the reply text.
///
/// `/summary` is forwarded to the scheduler task over `summary_tx` (payload:
/// the requesting chat, so an empty pass can be reported back there).
pub async fn respond(
    command: Command,
    registry: &RwLock<WalletRegistry>,
    summary_tx: &mpsc::Sender<i64>,
    chat_id: i64,
) -> String {
    match command {
        Command::Start => START_TEXT.to_string(),
        Command::Help => HELP_TEXT.to_string(),
        Command::List => {
            let registry = registry.read().await;
            if registry.is_empty() {
                return "No wallets are being watched".to_string();
            }
            let mut lines = vec![format!("📋 Watched wallets ({}):\n", registry.len())];
            for (i, wallet) in registry.snapshot().iter().enumerate() {
                lines.push(format!(
                    "{}. {}\n   {}",
                    i + 1,
                    wallet.name,
                    short_address(&wallet.address)
                ));
            }
            lines.join("\n")
        }
        Command::Summary => {
            if summary_tx.send(chat_id).await.is_err() {
                warn!("Summary trigger channel closed");
                return "⚠️ Summary worker is not running".to_string();
            }
            "⏳ Crunching recent trades...".to_string()
        }
        Command::Add { address, name } => {
            let Some(raw) = address else {
                return ADD_USAGE.to_string();
            };
            let address = match normalize_address(&raw) {
                Ok(address) => address,
                Err(_) => return "❌ Invalid address. It must start with 0x".to_string(),
            };
            let name = name.unwrap_or_else(|| {
                let short: String = address.chars().take(8).collect();
                format!("Wallet {short}")
            });

            let mut registry = registry.write().await;
            registry.insert(address.clone(), name.clone());
            if let Err(e) = registry.save() {
                warn!("Failed to save wallet list: {e}");
            }
            info!("Wallet added: {name} ({})", short_address(&address));
            format!(
                "✅ Wallet added!\n\
                 📛 Name: {name}\n\
                 👛 Address: {}\n\
                 📊 Total wallets: {}",
                short_address(&address),
                registry.len()
            )
        }
        Command::Remove { address } => {
            let Some(raw) = address else {
                return "Usage: /remove 0xADDRESS".to_string();
            };
            let address = raw.trim().to_lowercase();
            let mut registry = registry.write().await;
            match registry.remove(&address) {
                Some(name) => {
                    if let Err(e) = registry.save() {
                        warn!("Failed to save wallet list: {e}");
                    }
                    info!("Wallet removed: {name}");
                    format!("✅ Wallet removed: {name}")
                }
                None => "❌ Wallet not found".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // ── parse ──────────────────────────────────────────────────────

    #[test]
    fn parse_simple_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/list"), Some(Command::List));
        assert_eq!(Command::parse("/summary"), Some(Command::Summary));
    }

    #[test]
    fn parse_tolerates_bot_suffix() {
        assert_eq!(Command::parse("/list@TrackerBot"), Some(Command::List));
        assert_eq!(
            Command::parse("/add@TrackerBot 0xabc Whale"),
            Some(Command::Add {
                address: Some("0xabc".to_string()),
                name: Some("Whale".to_string()),
            })
        );
    }

    #[test]
    fn parse_add_with_multiword_name() {
        assert_eq!(
            Command::parse("/add 0xabc Big Whale Nine"),
            Some(Command::Add {
                address: Some("0xabc".to_string()),
                name: Some("Big Whale Nine".to_string()),
            })
        );
    }

    #[test]
    fn parse_add_without_arguments() {
        assert_eq!(
            Command::parse("/add"),
            Some(Command::Add {
                address: None,
                name: None
            })
        );
    }

    #[test]
    fn parse_remove() {
        assert_eq!(
            Command::parse("/remove 0xabc"),
            Some(Command::Remove {
                address: Some("0xabc".to_string())
            })
        );
        assert_eq!(Command::parse("/remove"), Some(Command::Remove { address: None }));
    }

    #[test]
    fn parse_rejects_non_commands() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("/unknown"), None);
    }

    // ── respond ────────────────────────────────────────────────────

    fn test_registry(dir: &tempfile::TempDir) -> Arc<RwLock<WalletRegistry>> {
        Arc::new(RwLock::new(WalletRegistry::load(
            dir.path().join("wallets.json"),
            "",
        )))
    }

    fn trigger() -> (mpsc::Sender<i64>, mpsc::Receiver<i64>) {
        mpsc::channel(4)
    }

    #[tokio::test]
    async fn add_normalizes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        let reply = respond(
            Command::Add {
                address: Some("0XAb12".to_string()),
                name: Some("Whale".to_string()),
            },
            &registry,
            &tx,
            1,
        )
        .await;

        assert!(reply.starts_with("✅ Wallet added!"));
        assert!(reply.contains("Whale"));
        assert!(reply.contains("Total wallets: 1"));
        let guard = registry.read().await;
        assert_eq!(guard.snapshot()[0].address, "0xab12");

        // Persisted in full on mutation.
        let saved = std::fs::read_to_string(dir.path().join("wallets.json")).unwrap();
        assert!(saved.contains("0xab12"));
    }

    #[tokio::test]
    async fn add_without_name_derives_default() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        respond(
            Command::Add {
                address: Some("0xbb015bb99".to_string()),
                name: None,
            },
            &registry,
            &tx,
            1,
        )
        .await;

        assert_eq!(registry.read().await.snapshot()[0].name, "Wallet 0xbb015b");
    }

    #[tokio::test]
    async fn add_rejects_invalid_address() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        let reply = respond(
            Command::Add {
                address: Some("deadbeef".to_string()),
                name: None,
            },
            &registry,
            &tx,
            1,
        )
        .await;

        assert!(reply.starts_with("❌ Invalid address"));
        assert!(registry.read().await.is_empty());
    }

    #[tokio::test]
    async fn add_without_address_shows_usage() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        let reply = respond(
            Command::Add {
                address: None,
                name: None,
            },
            &registry,
            &tx,
            1,
        )
        .await;
        assert!(reply.starts_with("Usage: /add"));
    }

    #[tokio::test]
    async fn remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        registry
            .write()
            .await
            .insert("0xab12cd34".to_string(), "Whale".to_string());

        let reply = respond(
            Command::Remove {
                address: Some("0XAB12CD34".to_string()),
            },
            &registry,
            &tx,
            1,
        )
        .await;
        assert_eq!(reply, "✅ Wallet removed: Whale");

        let reply = respond(
            Command::Remove {
                address: Some("0xab12cd34".to_string()),
            },
            &registry,
            &tx,
            1,
        )
        .await;
        assert_eq!(reply, "❌ Wallet not found");
    }

    #[tokio::test]
    async fn list_empty_and_populated() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, _rx) = trigger();

        let reply = respond(Command::List, &registry, &tx, 1).await;
        assert_eq!(reply, "No wallets are being watched");

        registry.write().await.insert(
            "0xbb015bb1234567890abcdef1234567890abcde5".to_string(),
            "Whale".to_string(),
        );
        let reply = respond(Command::List, &registry, &tx, 1).await;
        assert!(reply.contains("📋 Watched wallets (1):"));
        assert!(reply.contains("1. Whale"));
        assert!(reply.contains("0xbb015bb1...cde5"));
    }

    #[tokio::test]
    async fn summary_forwards_requesting_chat() {
        let dir = tempfile::tempdir().unwrap();
        let registry = test_registry(&dir);
        let (tx, mut rx) = trigger();

        let reply = respond(Command::Summary, &registry, &tx, 77).await;
        assert!(reply.starts_with("⏳"));
        assert_eq!(rx.recv().await, Some(77));
    }
}
