use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A wallet being watched, keyed by its lowercase `0x` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedWallet {
    pub address: String,
    pub name: String,
}

/// One record from `GET /activity` on the public data API.
///
/// The API is schema-less in practice, so every field defaults: a sparse or
/// oddly-typed record deserializes to something usable instead of poisoning
/// the whole batch. Numeric fields accept numbers, numeric strings, or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub usdc_size: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub price: f64,
}

impl ActivityRecord {
    pub fn is_trade(&self) -> bool {
        self.activity_type == "TRADE"
    }
}

/// Accept a JSON number, a numeric string, or anything else as 0.0.
fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Display emphasis for a market, tiered by its buy count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyIntensity {
    Cold,
    Warm,
    Hot,
    Scorching,
}

impl BuyIntensity {
    pub fn for_buy_count(count: u32) -> Self {
        if count >= 5 {
            Self::Scorching
        } else if count >= 3 {
            Self::Hot
        } else if count >= 2 {
            Self::Warm
        } else {
            Self::Cold
        }
    }

    /// Marker prepended to the buy/sell line of a summary entry.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Cold => "",
            Self::Warm => "🔥 ",
            Self::Hot => "🔥🔥 ",
            Self::Scorching => "🔥🔥🔥 ",
        }
    }
}

/// One market entry in a ranked summary.
#[derive(Debug, Clone)]
pub struct RankedMarket {
    pub title: String,
    pub buy_count: u32,
    pub sell_count: u32,
    pub distinct_wallets: usize,
    pub total_usdc: f64,
    pub avg_price: f64,
    pub intensity: BuyIntensity,
    /// Most frequent outcome label, ties resolved to first-encountered.
    pub top_outcome: Option<String>,
    /// Distinct trader display names in encounter order.
    pub traders: Vec<String>,
}

/// A ranked, size-bounded snapshot of one aggregation pass.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub markets: Vec<RankedMarket>,
    pub wallet_count: usize,
    pub total_trades: u64,
}
