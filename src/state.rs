use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::types::WatchedWallet;

/// Shorten an address for display: first 10 chars, ellipsis, last 4.
pub fn short_address(address: &str) -> String {
    let count = address.chars().count();
    if count <= 14 {
        return address.to_string();
    }
    let head: String = address.chars().take(10).collect();
    let tail: String = address.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}

/// Normalize and validate a user-supplied wallet address.
///
/// Trimmed and lowercased; must be non-empty and carry the `0x` prefix.
pub fn normalize_address(raw: &str) -> Result<String> {
    let address = raw.trim().to_lowercase();
    if !address.starts_with("0x") {
        anyhow::bail!("address must start with 0x");
    }
    Ok(address)
}

/// Parse the TRACKED_WALLETS seed list (comma or whitespace separated).
///
/// Entries without the `0x` prefix are dropped; each wallet gets a default
/// name derived from its first 8 characters.
pub fn parse_seed_list(raw: &str) -> BTreeMap<String, String> {
    let mut wallets = BTreeMap::new();
    for token in raw.replace(',', " ").split_whitespace() {
        let address = token.to_lowercase();
        if !address.starts_with("0x") {
            continue;
        }
        let short: String = address.chars().take(8).collect();
        wallets.insert(address, format!("Wallet {short}"));
    }
    wallets
}

/// The watched-wallet registry: address → display name.
///
/// Persisted as a JSON object and rewritten in full on every mutation.
/// `BTreeMap` keeps iteration order deterministic across cycles.
pub struct WalletRegistry {
    wallets: BTreeMap<String, String>,
    path: PathBuf,
}

impl WalletRegistry {
    /// Load the registry: env seed first, then the saved file on top
    /// (saved names win). A missing or unreadable file is not an error.
    pub fn load(path: PathBuf, seed: &str) -> Self {
        let mut wallets = parse_seed_list(seed);
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(saved) => wallets.extend(saved),
                Err(e) => warn!("Ignoring malformed wallet file {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not read wallet file {}: {e}", path.display()),
        }
        Self { wallets, path }
    }

    /// Rewrite the whole wallet file.
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.wallets)
            .context("failed to serialize wallet list")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn insert(&mut self, address: String, name: String) {
        self.wallets.insert(address, name);
    }

    /// Remove a wallet, returning its display name if it was present.
    pub fn remove(&mut self, address: &str) -> Option<String> {
        self.wallets.remove(address)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Clone the current wallet set for one polling cycle. Wallets added or
    /// removed mid-cycle take effect starting with the next cycle.
    pub fn snapshot(&self) -> Vec<WatchedWallet> {
        self.wallets
            .iter()
            .map(|(address, name)| WatchedWallet {
                address: address.clone(),
                name: name.clone(),
            })
            .collect()
    }
}
