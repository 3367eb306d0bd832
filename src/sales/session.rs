//! Sales entry session
//!
//! Holds the catalog and customer snapshots, the cart, the selected customer
//! and the two pickers. Every user-facing result is also pushed to the
//! session's [`NotificationCenter`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::cart::{Cart, CartChange, CartError, CartTotals, DEFAULT_ADD_DEBOUNCE, DEFAULT_SURCHARGE_PERCENT};
use super::checkout::{submit_order, CheckoutOutcome, CheckoutPolicy};
use crate::client::{Backend, ClientError};
use crate::domain::{Customer, CustomerId, Product, ProductId};
use crate::listing::{CatalogSearch, CustomerSearch, ListView, Page, DEFAULT_PAGE_SIZE};
use crate::notify::{NoticeKind, NotificationCenter};

/// Reasons a sale is not sent to the backend, plus order creation failure
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("The cart is empty")]
    EmptyCart,

    #[error("No customers are available, register one first")]
    NoCustomers,

    #[error("Select a customer for the sale")]
    NoCustomerSelected,

    #[error("Insufficient stock for {name}: {requested} requested, {available} available")]
    StockExceeded {
        name: String,
        requested: u32,
        available: i64,
    },

    #[error("{0} is no longer in the catalog, remove it from the cart")]
    ProductUnavailable(String),

    #[error("Could not create the order: {0}")]
    Backend(#[from] ClientError),
}

impl SubmitError {
    fn notice_kind(&self) -> NoticeKind {
        match self {
            SubmitError::EmptyCart | SubmitError::NoCustomerSelected => NoticeKind::Warning,
            _ => NoticeKind::Error,
        }
    }
}

/// Tunables of a sales session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub add_debounce: Duration,
    pub surcharge_percent: u32,
    pub picker_page_size: usize,
    pub checkout: CheckoutPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            add_debounce: DEFAULT_ADD_DEBOUNCE,
            surcharge_percent: DEFAULT_SURCHARGE_PERCENT,
            picker_page_size: DEFAULT_PAGE_SIZE,
            checkout: CheckoutPolicy::default(),
        }
    }
}

pub struct SalesSession<B: ?Sized> {
    backend: Arc<B>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    cart: Cart,
    customer: Option<CustomerId>,
    product_picker: ListView<CatalogSearch>,
    customer_picker: ListView<CustomerSearch>,
    policy: CheckoutPolicy,
    notices: NotificationCenter,
}

impl<B: Backend + ?Sized> SalesSession<B> {
    pub fn new(backend: Arc<B>, settings: SessionSettings) -> Self {
        Self {
            backend,
            products: Vec::new(),
            customers: Vec::new(),
            cart: Cart::new(settings.add_debounce, settings.surcharge_percent),
            customer: None,
            product_picker: ListView::new(CatalogSearch::default(), settings.picker_page_size),
            customer_picker: ListView::new(CustomerSearch::default(), settings.picker_page_size),
            policy: settings.checkout,
            notices: NotificationCenter::default(),
        }
    }

    /// Fetch products and customers concurrently
    ///
    /// A failed fetch keeps the previous snapshot and raises an error notice.
    /// Returns true when both fetches succeeded.
    pub async fn refresh(&mut self) -> bool {
        let (products, customers) = tokio::join!(
            self.backend.fetch_products(),
            self.backend.fetch_customers()
        );
        let now = Instant::now();
        let mut ok = true;

        match products {
            Ok(products) => self.products = products,
            Err(e) => {
                ok = false;
                self.notices
                    .push(NoticeKind::Error, format!("Could not load products: {}", e), now);
            }
        }

        match customers {
            Ok(customers) => {
                self.customers = customers;
                if let Some(id) = self.customer {
                    if !self.customers.iter().any(|c| c.id == id) {
                        self.customer = None;
                    }
                }
            }
            Err(e) => {
                ok = false;
                self.notices
                    .push(NoticeKind::Error, format!("Could not load customers: {}", e), now);
            }
        }

        tracing::debug!(
            products = self.products.len(),
            customers = self.customers.len(),
            "sales session refreshed"
        );
        ok
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn notices(&mut self) -> &mut NotificationCenter {
        &mut self.notices
    }

    // ============================================
    // Pickers
    // ============================================

    pub fn search_products(&mut self, term: &str) {
        self.product_picker.set_filter(CatalogSearch {
            term: term.to_string(),
        });
    }

    pub fn product_page(&mut self, page: usize) -> Page<&Product> {
        self.product_picker.set_page(page);
        self.product_picker.render(&self.products)
    }

    pub fn search_customers(&mut self, term: &str) {
        self.customer_picker.set_filter(CustomerSearch {
            term: term.to_string(),
        });
    }

    pub fn customer_page(&mut self, page: usize) -> Page<&Customer> {
        self.customer_picker.set_page(page);
        self.customer_picker.render(&self.customers)
    }

    /// Product whose code, barcode or id is exactly `term`
    pub fn find_by_code(&self, term: &str) -> Option<&Product> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.products.iter().find(|p| p.matches_code(term))
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.customer
            .and_then(|id| self.customers.iter().find(|c| c.id == id))
    }

    pub fn select_customer(&mut self, id: CustomerId) -> bool {
        match self.customers.iter().find(|c| c.id == id) {
            Some(customer) => {
                let message = format!("Customer {} selected", customer.full_name());
                self.customer = Some(id);
                self.notices.info(message);
                true
            }
            None => {
                self.notices.warning(format!("Customer {} not found", id));
                false
            }
        }
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    // ============================================
    // Cart
    // ============================================

    pub fn add_product(&mut self, product_id: ProductId, now: Instant) -> Result<CartChange, CartError> {
        let product = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| CartError::UnknownProduct(product_id.to_string()));

        let result = product.and_then(|product| self.cart.add(&product, now));
        self.report_cart(product_id, &result, now);
        result
    }

    /// Exact code, barcode or id lookup followed by an add
    pub fn add_by_code(&mut self, term: &str, now: Instant) -> Result<CartChange, CartError> {
        match self.find_by_code(term).map(|p| p.id) {
            Some(id) => self.add_product(id, now),
            None => {
                let err = CartError::UnknownProduct(term.trim().to_string());
                self.notices.push(NoticeKind::Warning, err.to_string(), now);
                Err(err)
            }
        }
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<CartChange, CartError> {
        let result = self.cart.set_quantity(product_id, quantity, &self.products);
        self.report_cart(product_id, &result, Instant::now());
        result
    }

    pub fn increment(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.cart.increment(product_id, &self.products);
        self.report_cart(product_id, &result, Instant::now());
        result
    }

    pub fn decrement(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.cart.decrement(product_id, &self.products);
        self.report_cart(product_id, &result, Instant::now());
        result
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.cart.remove(product_id);
        self.report_cart(product_id, &result, Instant::now());
        result
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    fn report_cart(&mut self, product_id: ProductId, result: &Result<CartChange, CartError>, now: Instant) {
        let name = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", product_id));

        let (kind, message) = match result {
            Ok(CartChange::Added) => (NoticeKind::Success, format!("{} added to the cart", name)),
            Ok(CartChange::Incremented { quantity }) => (
                NoticeKind::Info,
                format!("{} already in the cart, quantity now {}", name, quantity),
            ),
            Ok(CartChange::Updated { .. }) => return,
            Ok(CartChange::Removed) => (NoticeKind::Info, format!("{} removed from the cart", name)),
            Err(CartError::Debounced) => return,
            Err(CartError::OutOfStock(_)) => (NoticeKind::Error, result_message(result)),
            Err(_) => (NoticeKind::Warning, result_message(result)),
        };
        self.notices.push(kind, message, now);
    }

    // ============================================
    // Submission
    // ============================================

    fn precheck(&self) -> Result<CustomerId, SubmitError> {
        if self.cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }
        if self.customers.is_empty() {
            return Err(SubmitError::NoCustomers);
        }
        let customer_id = self
            .selected_customer()
            .map(|c| c.id)
            .ok_or(SubmitError::NoCustomerSelected)?;

        if let Some(line) = self.cart.over_stock_lines(&self.products).first() {
            let listed = self.products.iter().find(|p| p.id == line.product.id);
            return Err(match listed {
                Some(product) => SubmitError::StockExceeded {
                    name: line.product.name.clone(),
                    requested: line.quantity,
                    available: product.stock,
                },
                None => SubmitError::ProductUnavailable(line.product.name.clone()),
            });
        }

        Ok(customer_id)
    }

    /// Check the sale, write it, and clear the cart if every line made it
    ///
    /// The stock check uses the last fetched snapshot; a concurrent sale on
    /// another terminal can still oversell.
    pub async fn submit(&mut self) -> Result<CheckoutOutcome, SubmitError> {
        let now = Instant::now();
        let customer_id = match self.precheck() {
            Ok(id) => id,
            Err(e) => {
                self.notices.push(e.notice_kind(), e.to_string(), now);
                return Err(e);
            }
        };

        let lines = self.cart.lines().to_vec();
        let outcome = match submit_order(self.backend.as_ref(), customer_id, &lines, &self.policy).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = SubmitError::from(e);
                self.notices.error(err.to_string());
                return Err(err);
            }
        };

        if outcome.is_completed() {
            self.notices.success(outcome.summary());
            self.cart.clear();
            self.customer = None;
            // stock moved on the backend
            self.refresh().await;
        } else {
            self.notices.error(outcome.summary());
        }

        Ok(outcome)
    }
}

fn result_message(result: &Result<CartChange, CartError>) -> String {
    match result {
        Err(e) => e.to_string(),
        Ok(_) => String::new(),
    }
}
