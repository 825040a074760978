use chrono::{DateTime, Local};

use crate::types::{ActivityRecord, SummaryReport};

/// Market titles are cut to this many characters in a summary line.
const TITLE_WIDTH: usize = 55;

/// Render the per-trade alert message.
///
/// Pure formatting; the caller supplies the timestamp so rendering stays
/// deterministic under test.
pub fn render_trade_alert(
    record: &ActivityRecord,
    wallet_name: &str,
    at: DateTime<Local>,
) -> String {
    let emoji = if record.side == "BUY" { "🟢" } else { "🔴" };
    let side = if record.side.is_empty() {
        "N/A"
    } else {
        record.side.as_str()
    };
    let title = if record.title.is_empty() {
        "Unknown"
    } else {
        record.title.as_str()
    };
    format!(
        "{emoji} {side} - {wallet_name}\n\n\
         📊 {title}\n\
         🎯 Outcome: {outcome}\n\
         💰 ${amount} @ {price:.2}\n\
         ⏰ {time}",
        outcome = record.outcome,
        amount = format_usd(record.usdc_size, 2),
        price = record.price,
        time = at.format("%H:%M:%S"),
    )
}

/// Render the ranked per-market summary message.
pub fn render_summary(report: &SummaryReport, at: DateTime<Local>) -> String {
    let mut lines = vec![
        "📊 WALLET BUYS SUMMARY".to_string(),
        format!("⏰ {}", at.format("%d/%m/%Y %H:%M")),
        format!(
            "👛 {} wallets | {} trades",
            report.wallet_count, report.total_trades
        ),
        format!("{}\n", "=".repeat(30)),
    ];

    for (i, market) in report.markets.iter().enumerate() {
        lines.push(format!(
            "{}. {}",
            i + 1,
            truncate_chars(&market.title, TITLE_WIDTH)
        ));
        lines.push(format!(
            "   {}BUY: {} | SELL: {} | Wallets: {}",
            market.intensity.marker(),
            market.buy_count,
            market.sell_count,
            market.distinct_wallets
        ));
        let outcome = market
            .top_outcome
            .as_ref()
            .map(|o| format!(" → {o}"))
            .unwrap_or_default();
        lines.push(format!(
            "   Vol: ${} | Avg price: {:.2}{}",
            format_usd(market.total_usdc, 0),
            market.avg_price,
            outcome
        ));
        lines.push(format!("   👛 {}", market.traders.join(", ")));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Format a dollar amount with thousands separators.
pub fn format_usd(amount: f64, decimals: usize) -> String {
    let formatted = format!("{amount:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
