//! Order data model - records, statuses and change events
//!
//! Orders live in the external realtime database; this crate only reads
//! them. Parsing is deliberately lenient: a malformed row is dropped with
//! a log line and never surfaces as an error to the caller.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// Order lifecycle status.
///
/// Unknown statuses round-trip through `Other` so an upstream schema
/// addition never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    Confirmed,
    Cooking,
    Delivered,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Other(s) => s,
        }
    }

    /// Statuses that trigger a customer notification on transition.
    pub fn is_notifiable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed | OrderStatus::Cooking | OrderStatus::Delivered
        )
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "new" => OrderStatus::New,
            "confirmed" => OrderStatus::Confirmed,
            "cooking" => OrderStatus::Cooking,
            "delivered" => OrderStatus::Delivered,
            _ => OrderStatus::Other(s.to_string()),
        })
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(OrderStatus::Other(s)))
    }
}

/// Single line item on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// An order row as stored upstream. Field names match the realtime
/// database schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "userPhone")]
    pub customer_phone: String,
    #[serde(rename = "username", default)]
    pub customer_name: String,
    #[serde(rename = "orderDate", default)]
    pub order_date: String,
    #[serde(rename = "orderTime", default)]
    pub order_time: String,
    pub status: OrderStatus,
    #[serde(
        rename = "previousStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "items_map_or_seq")]
    pub items: Vec<OrderItem>,
    pub timestamp: i64,
}

impl OrderRecord {
    /// Parse a record from raw JSON, dropping malformed rows.
    ///
    /// A row without a phone number or timestamp cannot be acted on, so
    /// it is logged and discarded rather than raised to the caller.
    pub fn from_value(value: Value) -> Option<OrderRecord> {
        match serde_json::from_value::<OrderRecord>(value) {
            Ok(record) if record.customer_phone.trim().is_empty() => {
                warn!("dropping order record with empty phone number");
                None
            }
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "dropping malformed order record");
                None
            }
        }
    }
}

/// The realtime database stores `items` as a map of push-ids to items;
/// test fixtures and newer exports use a plain array. Accept both.
fn items_map_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderItem>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(DeError::custom))
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| serde_json::from_value(v).map_err(DeError::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(DeError::custom(format!(
            "expected items array or map, got {other}"
        ))),
    }
}

/// Kind of row-level mutation reported by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
}

/// One mutation event from the change feed.
///
/// Delivery is at-least-once: the feed may replay events after a
/// reconnect, and no ordering holds across different keys.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub key: String,
    pub record: OrderRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trip() {
        for (text, status) in [
            ("new", OrderStatus::New),
            ("confirmed", OrderStatus::Confirmed),
            ("cooking", OrderStatus::Cooking),
            ("delivered", OrderStatus::Delivered),
        ] {
            let parsed: OrderStatus = serde_json::from_value(json!(text)).unwrap();
            assert_eq!(parsed, status);
            assert_eq!(serde_json::to_value(&status).unwrap(), json!(text));
        }
    }

    #[test]
    fn test_status_unknown_preserved() {
        let parsed: OrderStatus = serde_json::from_value(json!("refunded")).unwrap();
        assert_eq!(parsed, OrderStatus::Other("refunded".to_string()));
        assert!(!parsed.is_notifiable());
        assert_eq!(serde_json::to_value(&parsed).unwrap(), json!("refunded"));
    }

    #[test]
    fn test_status_case_insensitive() {
        let parsed: OrderStatus = serde_json::from_value(json!("Confirmed")).unwrap();
        assert_eq!(parsed, OrderStatus::Confirmed);
    }

    #[test]
    fn test_notifiable_set() {
        assert!(!OrderStatus::New.is_notifiable());
        assert!(OrderStatus::Confirmed.is_notifiable());
        assert!(OrderStatus::Cooking.is_notifiable());
        assert!(OrderStatus::Delivered.is_notifiable());
    }

    #[test]
    fn test_record_items_as_map() {
        let value = json!({
            "userPhone": "9876543210",
            "username": "Asha",
            "orderDate": "2026-08-26",
            "orderTime": "19:30",
            "status": "new",
            "items": {
                "-Nx1": {"name": "Pizza", "quantity": 2, "price": 400.0},
                "-Nx2": {"name": "Garlic Bread", "quantity": 1, "price": 120.0}
            },
            "timestamp": 100
        });

        let record = OrderRecord::from_value(value).unwrap();
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.timestamp, 100);
    }

    #[test]
    fn test_record_items_as_array() {
        let value = json!({
            "userPhone": "9876543210",
            "status": "new",
            "items": [{"name": "Pizza", "quantity": 2, "price": 400.0}],
            "timestamp": 100
        });

        let record = OrderRecord::from_value(value).unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].name, "Pizza");
    }

    #[test]
    fn test_record_missing_phone_dropped() {
        let value = json!({"status": "new", "timestamp": 100});
        assert!(OrderRecord::from_value(value).is_none());
    }

    #[test]
    fn test_record_empty_phone_dropped() {
        let value = json!({"userPhone": "  ", "status": "new", "timestamp": 100});
        assert!(OrderRecord::from_value(value).is_none());
    }

    #[test]
    fn test_record_previous_status() {
        let value = json!({
            "userPhone": "9876543210",
            "status": "confirmed",
            "previousStatus": "new",
            "timestamp": 101
        });

        let record = OrderRecord::from_value(value).unwrap();
        assert_eq!(record.status, OrderStatus::Confirmed);
        assert_eq!(record.previous_status, Some(OrderStatus::New));
    }

    #[test]
    fn test_change_kind_serde() {
        assert_eq!(
            serde_json::to_value(ChangeKind::Added).unwrap(),
            json!("added")
        );
        let kind: ChangeKind = serde_json::from_value(json!("modified")).unwrap();
        assert_eq!(kind, ChangeKind::Modified);
    }
}
