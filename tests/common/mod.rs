//! Shared test utilities.

use trade_ledger::{Exchange, TradeCreateRequest, TradeSide};

/// The canonical BTC/USDT buy used across scenarios.
pub fn btc_buy() -> TradeCreateRequest {
    TradeCreateRequest::new(Exchange::Binance, "BTC", "USDT", TradeSide::Buy, "0.5")
}

/// A request that differs from [`btc_buy`] only in amount.
pub fn btc_buy_amount(amount: &str) -> TradeCreateRequest {
    let mut request = btc_buy();
    request.amount = amount.to_string();
    request
}
