use std::collections::{HashMap, HashSet};

use crate::types::{ActivityRecord, BuyIntensity, RankedMarket, SummaryReport, WatchedWallet};

/// Maximum markets included in one ranked summary.
pub const MAX_RANKED_MARKETS: usize = 15;

/// Per-market statistics accumulated over one summary pass.
#[derive(Debug, Clone, Default)]
pub struct MarketAggregate {
    /// Contributing wallet addresses (distinct).
    pub wallets: HashSet<String>,
    /// Contributing wallet names, one per folded trade (duplicates allowed).
    pub wallet_names: Vec<String>,
    /// Distinct trader names in encounter order.
    pub trader_names: Vec<String>,
    pub buy_count: u32,
    pub sell_count: u32,
    /// Notional volume across both sides.
    pub total_usdc: f64,
    /// Observed prices (> 0 only).
    pub prices: Vec<f64>,
    /// Observed outcome labels (non-empty only).
    pub outcomes: Vec<String>,
    /// Sequence number of the pass's first trade on this market.
    /// Tie-breaker so equal buy counts rank in encounter order.
    first_seen: usize,
}

/// Accumulates one aggregation pass across all watched wallets.
///
/// Created fresh per pass and consumed by [`Self::into_report`]; no state
/// survives between passes.
#[derive(Debug, Default)]
pub struct SummaryAccumulator {
    markets: HashMap<String, MarketAggregate>,
    total_trades: u64,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Fold one activity record into the pass.
    ///
    /// Returns true iff the record counted as a trade (type `TRADE` with a
    /// non-empty title). Sides other than BUY/SELL still contribute volume
    /// but increment neither counter.
    pub fn fold(&mut self, record: &ActivityRecord, wallet: &WatchedWallet) -> bool {
        if !record.is_trade() || record.title.is_empty() {
            return false;
        }
        self.total_trades += 1;

        let next_seen = self.markets.len();
        let agg = self
            .markets
            .entry(record.title.clone())
            .or_insert_with(|| MarketAggregate {
                first_seen: next_seen,
                ..Default::default()
            });

        agg.wallets.insert(wallet.address.clone());
        agg.wallet_names.push(wallet.name.clone());
        if !agg.trader_names.iter().any(|n| n == &wallet.name) {
            agg.trader_names.push(wallet.name.clone());
        }
        agg.total_usdc += record.usdc_size;
        if record.price > 0.0 {
            agg.prices.push(record.price);
        }
        if !record.outcome.is_empty() {
            agg.outcomes.push(record.outcome.clone());
        }
        match record.side.to_uppercase().as_str() {
            "BUY" => agg.buy_count += 1,
            "SELL" => agg.sell_count += 1,
            _ => {}
        }
        true
    }

    /// Rank the accumulated markets into a report.
    ///
    /// Sorted by buy count descending, ties in encounter order, truncated to
    /// [`MAX_RANKED_MARKETS`]. Returns `None` when the pass folded no trades,
    /// which signals that no summary should be sent.
    pub fn into_report(self, wallet_count: usize) -> Option<SummaryReport> {
        if self.markets.is_empty() {
            return None;
        }

        let mut entries: Vec<(String, MarketAggregate)> = self.markets.into_iter().collect();
        entries.sort_by(|a, b| {
            b.1.buy_count
                .cmp(&a.1.buy_count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        entries.truncate(MAX_RANKED_MARKETS);

        let markets = entries
            .into_iter()
            .map(|(title, agg)| {
                let avg_price = if agg.prices.is_empty() {
                    0.0
                } else {
                    agg.prices.iter().sum::<f64>() / agg.prices.len() as f64
                };
                RankedMarket {
                    title,
                    buy_count: agg.buy_count,
                    sell_count: agg.sell_count,
                    distinct_wallets: agg.wallets.len(),
                    total_usdc: agg.total_usdc,
                    avg_price,
                    intensity: BuyIntensity::for_buy_count(agg.buy_count),
                    top_outcome: most_common(&agg.outcomes),
                    traders: agg.trader_names,
                }
            })
            .collect();

        Some(SummaryReport {
            markets,
            wallet_count,
            total_trades: self.total_trades,
        })
    }
}

/// Most frequent label; ties resolve to the first one encountered.
fn most_common(labels: &[String]) -> Option<String> {
    let mut counts: Vec<(&String, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    let mut best: Option<(&String, usize)> = None;
    for (label, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label.clone())
}
