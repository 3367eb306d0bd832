//! Request and response payloads for the POS backend
//!
//! Field names follow the backend's camelCase JSON contract.

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, CustomerId, Money, OrderId, ProductId, User};

// ============================================
// Requests
// ============================================

/// Body of `POST /categories`
#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub image: String,
}

/// Body of `PATCH /categories/{id}`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body of `POST /products`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub price: Money,
    pub description: String,
    pub image: String,
    pub category_id: CategoryId,
    pub stock: i64,
    pub stock_min: i64,
}

/// Body of `PATCH /products/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_min: Option<i64>,
}

/// Login account created together with a customer
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomerUser {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl NewCustomerUser {
    pub fn customer(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: "customer".to_string(),
        }
    }
}

/// Body of `POST /customers`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub user: NewCustomerUser,
}

/// Body of `PATCH /customers/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: CustomerId,
}

/// Body of `POST /orders/add-item`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub amount: u32,
}

/// Server-side product query parameters for `GET /products`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub price: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

impl ProductQuery {
    pub fn is_empty(&self) -> bool {
        *self == ProductQuery::default()
    }

    /// Encode as a query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        let pairs = [
            ("limit", self.limit.map(|v| v.to_string())),
            ("offset", self.offset.map(|v| v.to_string())),
            ("price", self.price.map(|v| v.to_string())),
            ("price_min", self.price_min.map(|v| v.to_string())),
            ("price_max", self.price_max.map(|v| v.to_string())),
        ];

        pairs
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// ============================================
// Responses
// ============================================

/// A list endpoint answers either with a bare array or `{ "data": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Collection<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Collection<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Collection::Bare(items) => items,
            Collection::Wrapped { data } => data,
        }
    }
}

/// `POST /orders` answers `{ "newOrder": {...} }` or the bare order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CreatedOrder {
    Wrapped {
        #[serde(rename = "newOrder")]
        new_order: CreatedOrderBody,
    },
    Bare(CreatedOrderBody),
}

/// Only the id is needed from a freshly created order
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedOrderBody {
    pub id: OrderId,
}

impl CreatedOrder {
    pub(crate) fn id(&self) -> OrderId {
        match self {
            CreatedOrder::Wrapped { new_order } => new_order.id,
            CreatedOrder::Bare(body) => body.id,
        }
    }
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Response of `GET /auth/verify`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Error body returned by the backend on 4xx/5xx
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[test]
    fn test_collection_accepts_both_shapes() {
        let bare: Collection<Category> =
            serde_json::from_str(r#"[{"id": 1, "name": "Drinks"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: Collection<Category> =
            serde_json::from_str(r#"{"data": [{"id": 1, "name": "Drinks"}, {"id": 2, "name": "Snacks"}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_vec().len(), 2);
    }

    #[test]
    fn test_created_order_shapes() {
        let wrapped: CreatedOrder =
            serde_json::from_str(r#"{"message": "ok", "newOrder": {"id": 15, "customerId": 2}}"#)
                .unwrap();
        assert_eq!(wrapped.id(), 15);

        let bare: CreatedOrder = serde_json::from_str(r#"{"id": 16}"#).unwrap();
        assert_eq!(bare.id(), 16);
    }

    #[test]
    fn test_product_query_string() {
        let query = ProductQuery {
            limit: Some(20),
            offset: Some(40),
            price_min: Some(10),
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "limit=20&offset=40&price_min=10");
        assert!(ProductQuery::default().is_empty());
    }

    #[test]
    fn test_new_order_item_wire_names() {
        let item = NewOrderItem {
            order_id: 3,
            product_id: 9,
            amount: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["orderId"], 3);
        assert_eq!(json["productId"], 9);
        assert_eq!(json["amount"], 2);
    }
}
