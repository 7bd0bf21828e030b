//! JSON records carried on the `trades` and `windows` topics
//!
//! Frames are parsed with serde into these explicit schemas. Field names are
//! camelCase on the wire; the legacy names `stockId` and `indicator` are
//! accepted on input.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::trade::Trade;
use crate::types::{SecurityId, Side, TradeId};

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 strings keep their offset (converted to UTC); naive strings such
/// as `2024-03-01T10:15:00.123456` are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::validation(format!("invalid timestamp '{}'", raw)))
}

/// A fully-formed trade record, as carried inside a window message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub trade_id: TradeId,
    pub timestamp: String,
    #[serde(alias = "indicator")]
    pub side: Side,
    #[serde(alias = "stockId")]
    pub security_id: SecurityId,
    pub price: f64,
    pub quantity: u64,
}

impl From<&Trade> for TradeRecord {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id().clone(),
            timestamp: trade.timestamp().to_rfc3339(),
            side: trade.side(),
            security_id: trade.security_id().clone(),
            price: trade.price(),
            quantity: trade.quantity(),
        }
    }
}

impl TryFrom<TradeRecord> for Trade {
    type Error = Error;

    fn try_from(record: TradeRecord) -> Result<Self> {
        let timestamp = parse_timestamp(&record.timestamp)?;
        Trade::new(
            record.trade_id,
            record.security_id,
            timestamp,
            record.quantity,
            record.price,
            record.side,
        )
    }
}

/// A published trade window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMessage {
    #[serde(alias = "stockId")]
    pub security_id: SecurityId,
    pub window_time: DateTime<Utc>,
    pub trades: Vec<TradeRecord>,
}

impl WindowMessage {
    /// Serialize to a JSON frame
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON frame
    pub fn from_json(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:15:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T11:15:00+01:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:15:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01 10:15:00.000").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_trade_record_legacy_aliases() {
        let frame = r#"{"tradeId":"t-1","timestamp":"2024-03-01T10:15:00","indicator":"sell",
                        "stockId":"STK3","price":12.5,"quantity":4}"#;
        let record: TradeRecord = serde_json::from_str(frame).unwrap();
        assert_eq!(record.side, Side::Sell);
        assert_eq!(record.security_id.as_str(), "STK3");

        let trade = Trade::try_from(record).unwrap();
        assert_eq!(trade.quantity(), 4);
    }

    #[test]
    fn test_window_message_field_names() {
        let trade = Trade::new("t-1", "STK1", Utc::now(), 2, 10.0, Side::Buy).unwrap();
        let msg = WindowMessage {
            security_id: SecurityId::from("STK1"),
            window_time: Utc::now(),
            trades: vec![TradeRecord::from(&trade)],
        };
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"securityId\":\"STK1\""));
        assert!(json.contains("\"windowTime\""));
        assert!(json.contains("\"tradeId\":\"t-1\""));
        assert_eq!(WindowMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_invalid_record_does_not_become_trade() {
        let record = TradeRecord {
            trade_id: TradeId::from("t-1"),
            timestamp: "2024-03-01T10:15:00Z".into(),
            side: Side::Buy,
            security_id: SecurityId::from("STK1"),
            price: 0.0,
            quantity: 1,
        };
        assert!(Trade::try_from(record).is_err());
    }
}
