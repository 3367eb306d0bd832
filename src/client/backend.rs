//! Backend seam
//!
//! The sales workflow and the report loader only need a handful of calls.
//! They go through this trait so they can run against [`PosClient`] or an
//! in-memory backend in tests.

use async_trait::async_trait;

use super::{ClientResult, NewOrderItem, PosClient};
use crate::domain::{Category, Customer, CustomerId, Order, OrderId, Product};

/// Calls used by the sales session and the report dashboard
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_categories(&self) -> ClientResult<Vec<Category>>;

    async fn fetch_products(&self) -> ClientResult<Vec<Product>>;

    async fn fetch_customers(&self) -> ClientResult<Vec<Customer>>;

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>>;

    /// Create an empty order and return its id
    async fn open_order(&self, customer_id: CustomerId) -> ClientResult<OrderId>;

    /// Attach one line to an open order
    async fn attach_item(&self, item: &NewOrderItem) -> ClientResult<()>;

    /// Delete an order (compensation for a partially written sale)
    async fn cancel_order(&self, order_id: OrderId) -> ClientResult<()>;
}

#[async_trait]
impl Backend for PosClient {
    async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        self.list_categories().await
    }

    async fn fetch_products(&self) -> ClientResult<Vec<Product>> {
        self.list_products().await
    }

    async fn fetch_customers(&self) -> ClientResult<Vec<Customer>> {
        self.list_customers().await
    }

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        self.list_orders().await
    }

    async fn open_order(&self, customer_id: CustomerId) -> ClientResult<OrderId> {
        self.create_order(customer_id).await
    }

    async fn attach_item(&self, item: &NewOrderItem) -> ClientResult<()> {
        self.add_order_item(item).await
    }

    async fn cancel_order(&self, order_id: OrderId) -> ClientResult<()> {
        self.delete_order(order_id).await
    }
}
