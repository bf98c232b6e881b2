//! Per-transaction derived metrics.

use insider_core::Transaction;

/// Ownership delta reported when the pre-trade position is unknown or empty.
pub const NEW_POSITION_DELTA_PCT: f64 = 100.0;

/// Floor for the pre-trade balance divisor.
const MIN_PRE_TRADE_SHARES: f64 = 1e-9;

/// Dollar value of the trade: shares * price.
#[inline]
pub fn trade_value(tx: &Transaction) -> f64 {
    tx.shares * tx.price_per_share
}

/// Shares held before the trade, if it can be determined.
#[inline]
pub fn pre_trade_shares(tx: &Transaction) -> Option<f64> {
    let before = tx.shares_owned_after - tx.shares;
    (tx.shares_owned_after > 0.0 && before > 0.0).then_some(before)
}

/// Percentage increase of the insider's position caused by the trade.
///
/// When the pre-trade balance is unknown (`shares_owned_after` missing) or
/// non-positive, the whole post-trade position is treated as new and the
/// result is exactly 100.
pub fn ownership_delta_pct(tx: &Transaction) -> f64 {
    match pre_trade_shares(tx) {
        Some(before) => tx.shares / before.max(MIN_PRE_TRADE_SHARES) * 100.0,
        None => NEW_POSITION_DELTA_PCT,
    }
}
