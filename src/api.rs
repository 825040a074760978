use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::DATA_API_BASE;
use crate::types::ActivityRecord;

/// Per-request timeout. One slow wallet must not stall a whole pass.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the HTTP client used for all data-API requests.
pub fn build_client() -> Result<Client> {
    let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
    Ok(client)
}

/// Fetch recent activity records for one wallet.
///
/// The upstream API is flaky; every failure mode (transport, timeout, bad
/// status, unparseable body) degrades to an empty batch so one wallet cannot
/// abort a polling pass. There are no retries — the next cycle is the retry.
pub async fn fetch_activity(client: &Client, address: &str, limit: usize) -> Vec<ActivityRecord> {
    match try_fetch(client, address, limit).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Activity fetch failed for {address}: {e}");
            Vec::new()
        }
    }
}

async fn try_fetch(client: &Client, address: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
    let resp = client
        .get(format!("{DATA_API_BASE}/activity"))
        .query(&[("user", address), ("limit", &limit.to_string())])
        .send()
        .await?;

    if !resp.status().is_success() {
        anyhow::bail!("data API returned {}", resp.status());
    }

    // Elements are deserialized one by one: a single malformed entry (or a
    // non-object) is skipped instead of failing the batch.
    let raw: Vec<Value> = resp.json().await?;
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;
    for value in raw {
        match serde_json::from_value::<ActivityRecord>(value) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} malformed activity records for {address}");
    }
    Ok(records)
}
