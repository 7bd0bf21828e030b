//! Inbound trade validation
//!
//! Frames are parsed into [`InboundTrade`], where every field is optional so
//! that a missing field is reported by name instead of as a generic parse
//! failure. Validation happens before any `Trade` is constructed.

use serde::Deserialize;
use serde_json::Number;

use common::{wire::parse_timestamp, Error, Result, SecurityId, Side, Trade};
use storage::SecurityStore;

/// An inbound trade frame as received, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundTrade {
    pub trade_id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(alias = "indicator")]
    pub side: Option<String>,
    #[serde(alias = "stockId")]
    pub security_id: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<Number>,
}

impl InboundTrade {
    /// Parse a JSON frame. Malformed JSON is a validation failure.
    pub fn parse(frame: &str) -> Result<Self> {
        serde_json::from_str(frame)
            .map_err(|e| Error::validation(format!("malformed trade frame: {}", e)))
    }

    /// Best-effort id for log context
    pub fn trade_id_hint(&self) -> &str {
        self.trade_id.as_deref().unwrap_or("<unknown>")
    }

    /// Check every field and build the trade.
    pub fn into_trade(self) -> Result<Trade> {
        let trade_id = require(self.trade_id, "tradeId")?;
        let timestamp = require(self.timestamp, "timestamp")?;
        let side = require(self.side, "side")?;
        let security_id = require(self.security_id, "securityId")?;
        let price = require(self.price, "price")?;
        let quantity = require(self.quantity, "quantity")?;

        let side: Side = side.parse()?;
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::validation(format!(
                "trade {} has non-positive price {}",
                trade_id, price
            )));
        }
        let quantity = match quantity.as_u64() {
            Some(q) if q > 0 => q,
            _ => {
                return Err(Error::validation(format!(
                    "trade {} has invalid quantity {}, expected a positive integer",
                    trade_id, quantity
                )))
            }
        };
        let timestamp = parse_timestamp(&timestamp)?;

        Trade::new(trade_id, security_id, timestamp, quantity, price, side)
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::validation(format!("missing field '{}'", field)))
}

/// Parse and validate `frame`, also requiring that its security is known.
pub fn validate_frame(frame: &str, securities: &SecurityStore) -> Result<Trade> {
    let trade = InboundTrade::parse(frame)?.into_trade()?;
    ensure_known(trade.security_id(), securities)?;
    Ok(trade)
}

fn ensure_known(id: &SecurityId, securities: &SecurityStore) -> Result<()> {
    if securities.contains(id) {
        Ok(())
    } else {
        Err(Error::validation(format!("unknown security '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Security, SecurityClass};

    fn store() -> SecurityStore {
        let store = SecurityStore::new();
        store
            .add(Security::new("STK1", "TEA", SecurityClass::Common, 0.0, 0.0, 100.0).unwrap())
            .unwrap();
        store
    }

    const VALID: &str = r#"{"tradeId":"t-1","timestamp":"2024-03-01T10:15:00Z","side":"BUY",
                            "securityId":"STK1","price":101.25,"quantity":7}"#;

    #[test]
    fn test_valid_frame() {
        let trade = validate_frame(VALID, &store()).unwrap();
        assert_eq!(trade.side(), Side::Buy);
        assert_eq!(trade.quantity(), 7);
        assert_eq!(trade.price(), 101.25);
    }

    #[test]
    fn test_legacy_field_names() {
        let frame = r#"{"tradeId":"t-1","timestamp":"2024-03-01T10:15:00.123456","indicator":"sell",
                        "stockId":"STK1","price":10,"quantity":1}"#;
        let trade = validate_frame(frame, &store()).unwrap();
        assert_eq!(trade.side(), Side::Sell);
    }

    #[test]
    fn test_missing_quantity_named() {
        let frame = r#"{"tradeId":"t-1","timestamp":"2024-03-01T10:15:00Z","side":"buy",
                        "securityId":"STK1","price":10}"#;
        let err = validate_frame(frame, &store()).unwrap_err();
        assert_eq!(err, Error::validation("missing field 'quantity'"));
    }

    #[test]
    fn test_rejections() {
        let store = store();
        let cases = [
            r#"not json"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"hold","securityId":"STK1","price":1,"quantity":1}"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":0,"quantity":1}"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":1,"quantity":-3}"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":1,"quantity":1.5}"#,
            r#"{"tradeId":"t","timestamp":"noon","side":"buy","securityId":"STK1","price":1,"quantity":1}"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK9","price":1,"quantity":1}"#,
            r#"{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":"1","quantity":1}"#,
        ];
        for frame in cases {
            let err = validate_frame(frame, &store).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{frame}: {err}");
        }
    }

    #[test]
    fn test_quantity_kept_exactly() {
        let frame = r#"{"tradeId":"t-1","timestamp":"2024-03-01T10:15:00Z","side":"buy",
                        "securityId":"STK1","price":1,"quantity":9007199254740993}"#;
        let trade = validate_frame(frame, &store()).unwrap();
        assert_eq!(trade.quantity(), 9_007_199_254_740_993);

        let max = format!(
            r#"{{"tradeId":"t-2","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":1,"quantity":{}}}"#,
            u64::MAX
        );
        assert_eq!(validate_frame(&max, &store()).unwrap().quantity(), u64::MAX);
    }

    #[test]
    fn test_quantity_out_of_range_rejected() {
        let store = store();
        for quantity in ["18446744073709551616", "0", "1e3", "2.0"] {
            let frame = format!(
                r#"{{"tradeId":"t","timestamp":"2024-03-01T10:15:00Z","side":"buy","securityId":"STK1","price":1,"quantity":{quantity}}}"#
            );
            let err = validate_frame(&frame, &store).unwrap_err();
            assert!(matches!(&err, Error::Validation(msg) if msg.contains("quantity")), "{quantity}: {err}");
        }
    }

    #[test]
    fn test_trade_id_hint() {
        let inbound = InboundTrade::parse(r#"{"tradeId":"t-7"}"#).unwrap();
        assert_eq!(inbound.trade_id_hint(), "t-7");
        assert_eq!(InboundTrade::default().trade_id_hint(), "<unknown>");
    }
}
