//! Backend entity snapshots
//!
//! These mirror the JSON the POS backend returns. The backend owns every
//! entity; values here are transient copies used for display, filtering,
//! cart checks and report aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Money;

pub type CategoryId = i64;
pub type ProductId = i64;
pub type CustomerId = i64;
pub type OrderId = i64;

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Category reference embedded in products and order items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A sellable product with its stock snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub stock_min: Option<i64>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Stock at or below the configured minimum (missing minimum counts as 0)
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.stock_min.unwrap_or(0)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Value of the units on hand
    pub fn stock_value(&self) -> Money {
        self.price * self.stock.max(0) as u32
    }

    /// Category id, falling back to the nested category reference
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
            .or_else(|| self.category.as_ref().and_then(|c| c.id))
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.name.as_deref())
    }

    /// True when `term` is exactly this product's code, barcode or id
    pub fn matches_code(&self, term: &str) -> bool {
        self.code.as_deref() == Some(term)
            || self.barcode.as_deref() == Some(term)
            || self.id.to_string() == term
    }
}

/// Short order reference embedded in customer payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: OrderId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub orders: Vec<OrderRef>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.name, last),
            _ => self.name.clone(),
        }
    }

    /// Most recent order timestamp from the embedded order list
    pub fn last_purchase(&self) -> Option<DateTime<Utc>> {
        self.orders.iter().filter_map(|o| o.created_at).max()
    }
}

/// Customer reference embedded in order payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Join-table association carrying the quantity of an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(default)]
    pub amount: Option<u32>,
}

/// One product line of a completed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(rename = "OrderProduct", default)]
    pub order_product: Option<OrderProduct>,
}

impl OrderItem {
    /// Quantity sold; a missing association counts as one unit
    pub fn quantity(&self) -> u32 {
        self.order_product
            .as_ref()
            .and_then(|op| op.amount)
            .unwrap_or(1)
    }

    pub fn line_total(&self) -> Money {
        self.price * self.quantity()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
            .or_else(|| self.category.as_ref().and_then(|c| c.id))
    }
}

/// A completed sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn units(&self) -> u32 {
        self.items.iter().map(OrderItem::quantity).sum()
    }

    pub fn customer_name(&self) -> String {
        match &self.customer {
            Some(c) => {
                let first = c.name.as_deref().unwrap_or("");
                let last = c.last_name.as_deref().unwrap_or("");
                format!("{} {}", first, last).trim().to_string()
            }
            None => String::new(),
        }
    }
}

/// Authenticated user as returned by `/auth/login` and `/auth/verify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
