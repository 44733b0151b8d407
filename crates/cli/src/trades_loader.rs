//! Loads closed trades from CSV.
//!
//! Expected header: `pnl,entry_time,exit_time,risk_percentage,r_multiple`.
//! Times are RFC 3339; the two risk columns may be left empty.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use trade_analytics_core::TradeOutcome;

/// Reads trades from a CSV file, ordered by exit time.
pub fn load_trades(path: &Path) -> Result<Vec<TradeOutcome>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open trades file: {}", path.display()))?;
    let trades =
        read_trades(file).with_context(|| format!("Failed to parse trades file: {}", path.display()))?;

    tracing::info!("Loaded {} trades from {}", trades.len(), path.display());
    Ok(trades)
}

/// Reads trades from any CSV source, ordered by exit time.
pub fn read_trades<R: Read>(source: R) -> Result<Vec<TradeOutcome>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut trades = Vec::new();
    for (row, record) in reader.deserialize::<TradeOutcome>().enumerate() {
        // Header is line 1
        let trade = record.with_context(|| format!("Invalid trade on line {}", row + 2))?;
        trades.push(trade);
    }

    trades.sort_by_key(|t| t.exit_time);
    Ok(trades)
}
