//! Order types.

use chrono::{DateTime, Utc};
use layercraft_core::{OrderId, OrderStatus, Price, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::appwrite::Document;

/// One purchased product on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at checkout.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::usd(self.price) * self.quantity
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub order_date: DateTime<Utc>,
}

/// Input for creating an order. The order date is set when it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
}

/// Order attributes as stored in the orders collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderRecord {
    pub user_id: UserId,
    #[serde(with = "encoded_lines")]
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderRecord {
    pub(crate) fn new(order: NewOrder, order_date: DateTime<Utc>) -> Self {
        Self {
            user_id: order.user_id,
            items: order.items,
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            order_date: Some(order_date),
        }
    }
}

impl From<Document<OrderRecord>> for Order {
    fn from(doc: Document<OrderRecord>) -> Self {
        let record = doc.data;
        Self {
            id: OrderId::new(doc.id),
            user_id: record.user_id,
            items: record.items,
            total_amount: Price::usd(record.total_amount),
            status: record.status,
            shipping_address: record.shipping_address,
            order_date: record.order_date.unwrap_or(doc.created_at),
        }
    }
}

/// Order lines live in a string-array attribute, one JSON object per entry.
///
/// Reads also accept inline objects, which is how documents created from
/// the backend console look.
mod encoded_lines {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::OrderLine;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Encoded(String),
        Inline(OrderLine),
    }

    pub fn serialize<S: Serializer>(lines: &[OrderLine], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = lines
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(S::Error::custom)?;
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderLine>, D::Error> {
        Vec::<Entry>::deserialize(deserializer)?
            .into_iter()
            .map(|entry| match entry {
                Entry::Encoded(json) => serde_json::from_str(&json).map_err(D::Error::custom),
                Entry::Inline(line) => Ok(line),
            })
            .collect()
    }
}
