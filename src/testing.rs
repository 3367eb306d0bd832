//! In-memory backend used by the sales and report tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{Backend, ClientError, ClientResult, NewOrderItem};
use crate::domain::{Category, Customer, CustomerId, Order, OrderId, Product, ProductId};

#[derive(Default)]
pub(crate) struct State {
    next_order: OrderId,
    opened: Vec<(OrderId, CustomerId)>,
    attached: Vec<NewOrderItem>,
    cancelled: Vec<OrderId>,
    /// Remaining failures per product id
    item_failures: HashMap<ProductId, u32>,
    /// Attaches that are applied but answered with a timeout
    item_timeouts: HashMap<ProductId, u32>,
    fail_open: bool,
    fail_cancel: bool,
    fail_products: bool,
    fail_customers: bool,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub(crate) state: Mutex<State>,
}

fn rejected(message: &str) -> ClientError {
    ClientError::ApiError {
        status: 500,
        message: message.to_string(),
    }
}

impl FakeBackend {
    pub fn with_catalog(products: Vec<Product>, customers: Vec<Customer>) -> Self {
        Self {
            products,
            customers,
            ..Default::default()
        }
    }

    /// Make the next `times` attach calls for `product_id` fail
    pub fn fail_item(&self, product_id: ProductId, times: u32) {
        self.state.lock().unwrap().item_failures.insert(product_id, times);
    }

    /// Apply the next `times` attach calls for `product_id` but report a timeout
    pub fn time_out_item(&self, product_id: ProductId, times: u32) {
        self.state.lock().unwrap().item_timeouts.insert(product_id, times);
    }

    pub fn fail_open(&self) {
        self.state.lock().unwrap().fail_open = true;
    }

    pub fn fail_cancel(&self) {
        self.state.lock().unwrap().fail_cancel = true;
    }

    pub fn fail_products(&self) {
        self.state.lock().unwrap().fail_products = true;
    }

    pub fn fail_customers(&self) {
        self.state.lock().unwrap().fail_customers = true;
    }

    pub fn opened_orders(&self) -> Vec<(OrderId, CustomerId)> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn attached_items(&self) -> Vec<NewOrderItem> {
        self.state.lock().unwrap().attached.clone()
    }

    pub fn cancelled_orders(&self) -> Vec<OrderId> {
        self.state.lock().unwrap().cancelled.clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_categories(&self) -> ClientResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn fetch_products(&self) -> ClientResult<Vec<Product>> {
        if self.state.lock().unwrap().fail_products {
            return Err(rejected("products unavailable"));
        }
        Ok(self.products.clone())
    }

    async fn fetch_customers(&self) -> ClientResult<Vec<Customer>> {
        if self.state.lock().unwrap().fail_customers {
            return Err(rejected("customers unavailable"));
        }
        Ok(self.customers.clone())
    }

    async fn fetch_orders(&self) -> ClientResult<Vec<Order>> {
        Ok(self.orders.clone())
    }

    async fn open_order(&self, customer_id: CustomerId) -> ClientResult<OrderId> {
        let mut state = self.state.lock().unwrap();
        if state.fail_open {
            return Err(rejected("cannot create order"));
        }
        state.next_order += 1;
        let id = 100 + state.next_order;
        state.opened.push((id, customer_id));
        Ok(id)
    }

    async fn attach_item(&self, item: &NewOrderItem) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.item_failures.get_mut(&item.product_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(rejected("cannot add item"));
            }
        }
        state.attached.push(item.clone());
        if let Some(remaining) = state.item_timeouts.get_mut(&item.product_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClientError::Timeout);
            }
        }
        Ok(())
    }

    async fn cancel_order(&self, order_id: OrderId) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_cancel {
            return Err(rejected("cannot delete order"));
        }
        state.cancelled.push(order_id);
        Ok(())
    }
}
