//! Trade creation request and stored trade record.
//!
//! Amounts and fees travel as decimal strings and are stored exactly as
//! supplied. Validation reads them as plain decimal literals
//! (`[+-]digits[.digits][e[+-]digits]`) and judges their sign from the
//! digits, so magnitudes beyond [`Decimal`]'s range are still accepted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exchange, TradeSide};

/// Input to [`Ledger::create`](crate::ledger::Ledger::create).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TradeCreateRequest {
    pub exchange: Exchange,
    pub base_asset: String,
    pub quote_asset: String,
    pub side: TradeSide,
    /// Positive decimal, e.g. `"0.5"`.
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    /// Required iff `fee` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_asset: Option<String>,
}

impl TradeCreateRequest {
    /// Creates a request without a fee.
    #[must_use]
    pub fn new(
        exchange: Exchange,
        base_asset: &str,
        quote_asset: &str,
        side: TradeSide,
        amount: &str,
    ) -> Self {
        Self {
            exchange,
            base_asset: base_asset.to_string(),
            quote_asset: quote_asset.to_string(),
            side,
            amount: amount.to_string(),
            fee: None,
            fee_asset: None,
        }
    }

    /// Sets the fee and the asset it was charged in.
    #[must_use]
    pub fn with_fee(mut self, fee: &str, fee_asset: &str) -> Self {
        self.fee = Some(fee.to_string());
        self.fee_asset = Some(fee_asset.to_string());
        self
    }

    /// Checks every field rule, returning the first violation found.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first rule that failed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_asset.is_empty() {
            return Err(ValidationError::EmptyBaseAsset);
        }
        if self.quote_asset.is_empty() {
            return Err(ValidationError::EmptyQuoteAsset);
        }

        match decimal_sign(&self.amount) {
            None => {
                return Err(ValidationError::InvalidAmount {
                    amount: self.amount.clone(),
                });
            }
            Some(DecimalSign::Positive) => {}
            Some(DecimalSign::Zero | DecimalSign::Negative) => {
                return Err(ValidationError::NonPositiveAmount {
                    amount: self.amount.clone(),
                });
            }
        }

        match (&self.fee, &self.fee_asset) {
            (Some(_), None) => Err(ValidationError::FeeWithoutAsset),
            (None, Some(_)) => Err(ValidationError::FeeAssetWithoutFee),
            (None, None) => Ok(()),
            (Some(fee), Some(fee_asset)) => {
                let sign = decimal_sign(fee)
                    .ok_or_else(|| ValidationError::InvalidFee { fee: fee.clone() })?;
                if sign == DecimalSign::Negative {
                    return Err(ValidationError::NegativeFee { fee: fee.clone() });
                }
                if fee_asset.is_empty() {
                    return Err(ValidationError::EmptyFeeAsset);
                }
                Ok(())
            }
        }
    }
}

/// A recorded trade. Produced only by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    pub exchange: Exchange,
    pub base_asset: String,
    pub quote_asset: String,
    pub side: TradeSide,
    pub amount: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_asset: Option<String>,
}

impl TradeRecord {
    /// Builds a record from a validated request, moving every field across
    /// untouched.
    pub(crate) fn from_request(
        id: String,
        timestamp: DateTime<Utc>,
        request: TradeCreateRequest,
    ) -> Self {
        let TradeCreateRequest {
            exchange,
            base_asset,
            quote_asset,
            side,
            amount,
            fee,
            fee_asset,
        } = request;

        Self {
            id,
            exchange,
            base_asset,
            quote_asset,
            side,
            amount,
            timestamp,
            fee,
            fee_asset,
        }
    }

    /// Traded amount as a decimal.
    ///
    /// `None` if the amount cannot be held by [`Decimal`] without rounding,
    /// e.g. more than 28 fractional digits.
    #[must_use]
    pub fn amount_decimal(&self) -> Option<Decimal> {
        parse_decimal(&self.amount)
    }

    /// Fee as a decimal, if one was recorded.
    #[must_use]
    pub fn fee_decimal(&self) -> Option<Decimal> {
        self.fee.as_deref().and_then(parse_decimal)
    }

    /// Asset pair in `BASE/QUOTE` form.
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base_asset, self.quote_asset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecimalSign {
    Negative,
    Zero,
    Positive,
}

/// Sign of `raw` if it is a decimal literal. Either side of the point may be
/// empty, but not both; `-0` counts as zero.
fn decimal_sign(raw: &str) -> Option<DecimalSign> {
    let bytes = raw.as_bytes();
    let (negative, rest) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let (mantissa, exponent) = match rest.iter().position(|b| matches!(b, b'e' | b'E')) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let (int_digits, frac_digits) = match mantissa.iter().position(|&b| b == b'.') {
        Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
        None => (mantissa, &mantissa[mantissa.len()..]),
    };

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    if !int_digits.iter().chain(frac_digits).all(u8::is_ascii_digit) {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = match exponent.split_first() {
            Some((b'+' | b'-', digits)) => digits,
            _ => exponent,
        };
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
    }

    let sign = if int_digits.iter().chain(frac_digits).all(|&b| b == b'0') {
        DecimalSign::Zero
    } else if negative {
        DecimalSign::Negative
    } else {
        DecimalSign::Positive
    };
    Some(sign)
}

/// Exact [`Decimal`] value of a decimal literal; `None` if malformed or if
/// it would need rounding to fit.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    decimal_sign(raw)?;
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    if unsigned.contains(['e', 'E']) {
        Decimal::from_scientific(unsigned).ok()
    } else {
        Decimal::from_str_exact(unsigned).ok()
    }
}

/// Reason a [`TradeCreateRequest`] was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("baseAsset must not be empty")]
    EmptyBaseAsset,
    #[error("quoteAsset must not be empty")]
    EmptyQuoteAsset,
    #[error("amount {amount:?} is not a decimal number")]
    InvalidAmount { amount: String },
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: String },
    #[error("fee is set but feeAsset is missing")]
    FeeWithoutAsset,
    #[error("feeAsset is set but fee is missing")]
    FeeAssetWithoutFee,
    #[error("fee {fee:?} is not a decimal number")]
    InvalidFee { fee: String },
    #[error("fee must not be negative, got {fee}")]
    NegativeFee { fee: String },
    #[error("feeAsset must not be empty")]
    EmptyFeeAsset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_buy(amount: &str) -> TradeCreateRequest {
        TradeCreateRequest::new(Exchange::Binance, "BTC", "USDT", TradeSide::Buy, amount)
    }

    #[test]
    fn accepts_plain_request() {
        assert_eq!(btc_buy("0.5").validate(), Ok(()));
    }

    #[test]
    fn accepts_request_with_fee() {
        let request = btc_buy("0.5").with_fee("0.01", "USDT");
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn zero_fee_is_allowed() {
        assert_eq!(btc_buy("1").with_fee("0", "BNB").validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in ["0", "-1", "0.000", "-0.5"] {
            assert_eq!(
                btc_buy(amount).validate(),
                Err(ValidationError::NonPositiveAmount {
                    amount: amount.to_string()
                }),
                "amount {amount}"
            );
        }
    }

    #[test]
    fn rejects_unparseable_amounts() {
        for amount in ["abc", "", "1.2.3", "0x10"] {
            assert!(
                matches!(
                    btc_buy(amount).validate(),
                    Err(ValidationError::InvalidAmount { .. })
                ),
                "amount {amount:?}"
            );
        }
    }

    #[test]
    fn accepts_amounts_beyond_decimal_range() {
        for amount in [
            "0.000000000000000000000000000001",
            "100000000000000000000000000000",
            "1e-30",
        ] {
            assert_eq!(btc_buy(amount).validate(), Ok(()), "amount {amount}");
        }
    }

    #[test]
    fn rejects_digit_separators() {
        assert_eq!(
            btc_buy("1_000").validate(),
            Err(ValidationError::InvalidAmount {
                amount: "1_000".to_string()
            })
        );
        assert_eq!(
            btc_buy("1").with_fee("0_1", "USDT").validate(),
            Err(ValidationError::InvalidFee {
                fee: "0_1".to_string()
            })
        );
    }

    #[test]
    fn literal_grammar() {
        for amount in ["+0.5", ".5", "5.", "2E3", "5e-1", "1e+2", "007"] {
            assert_eq!(btc_buy(amount).validate(), Ok(()), "amount {amount}");
        }
        for amount in [".", "-", "1e", "e5", "1e1.5", " 1", "1 ", "--1", "NaN", "inf"] {
            assert!(
                matches!(
                    btc_buy(amount).validate(),
                    Err(ValidationError::InvalidAmount { .. })
                ),
                "amount {amount:?}"
            );
        }
        for amount in ["-0", "+0", "0e9", "-.0"] {
            assert!(
                matches!(
                    btc_buy(amount).validate(),
                    Err(ValidationError::NonPositiveAmount { .. })
                ),
                "amount {amount:?}"
            );
        }
        assert_eq!(btc_buy("1").with_fee("-0", "BNB").validate(), Ok(()));
    }

    #[test]
    fn decimal_view_is_exact_or_absent() {
        let record = |amount: &str| {
            TradeRecord::from_request("TRD-000001".to_string(), Utc::now(), btc_buy(amount))
        };

        assert_eq!(record("+0.25").amount_decimal(), Some(dec!(0.25)));
        assert_eq!(record("5e-1").amount_decimal(), Some(dec!(0.5)));
        assert_eq!(record("100000000000000000000000000000").amount_decimal(), None);
        assert_eq!(record("0.000000000000000000000000000001").amount_decimal(), None);
    }

    #[test]
    fn rejects_empty_assets() {
        let mut request = btc_buy("1");
        request.base_asset.clear();
        assert_eq!(request.validate(), Err(ValidationError::EmptyBaseAsset));

        let mut request = btc_buy("1");
        request.quote_asset.clear();
        assert_eq!(request.validate(), Err(ValidationError::EmptyQuoteAsset));
    }

    #[test]
    fn fee_and_fee_asset_must_travel_together() {
        let mut request = btc_buy("1");
        request.fee = Some("0.01".to_string());
        assert_eq!(request.validate(), Err(ValidationError::FeeWithoutAsset));

        let mut request = btc_buy("1");
        request.fee_asset = Some("USDT".to_string());
        assert_eq!(request.validate(), Err(ValidationError::FeeAssetWithoutFee));
    }

    #[test]
    fn rejects_bad_fee_values() {
        assert!(matches!(
            btc_buy("1").with_fee("lots", "USDT").validate(),
            Err(ValidationError::InvalidFee { .. })
        ));
        assert!(matches!(
            btc_buy("1").with_fee("-0.1", "USDT").validate(),
            Err(ValidationError::NegativeFee { .. })
        ));
        assert_eq!(
            btc_buy("1").with_fee("0.1", "").validate(),
            Err(ValidationError::EmptyFeeAsset)
        );
    }

    #[test]
    fn record_keeps_request_strings_verbatim() {
        let request = btc_buy("0.50000").with_fee("0.0100", "usdt");
        let record = TradeRecord::from_request("TRD-000001".to_string(), Utc::now(), request);

        assert_eq!(record.amount, "0.50000");
        assert_eq!(record.fee.as_deref(), Some("0.0100"));
        assert_eq!(record.fee_asset.as_deref(), Some("usdt"));
        assert_eq!(record.amount_decimal(), Some(dec!(0.5)));
        assert_eq!(record.fee_decimal(), Some(dec!(0.01)));
        assert_eq!(record.symbol(), "BTC/USDT");
    }

    #[test]
    fn request_serializes_camel_case_without_absent_fee() {
        let value = serde_json::to_value(btc_buy("0.5")).unwrap();

        assert_eq!(value["exchange"], "binance");
        assert_eq!(value["baseAsset"], "BTC");
        assert_eq!(value["quoteAsset"], "USDT");
        assert_eq!(value["side"], "BUY");
        assert_eq!(value["amount"], "0.5");
        assert!(value.get("fee").is_none());
        assert!(value.get("feeAsset").is_none());
    }

    #[test]
    fn request_rejects_caller_supplied_id() {
        let json = r#"{
            "id": "42",
            "exchange": "kraken",
            "baseAsset": "ETH",
            "quoteAsset": "EUR",
            "side": "SELL",
            "amount": "2.0"
        }"#;

        assert!(serde_json::from_str::<TradeCreateRequest>(json).is_err());
    }
}
