//! Client-side payload validation
//!
//! Create/update payloads are checked before they are sent. A failing check
//! blocks the submission and is reported field by field.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::client::{
    CategoryUpdate, Credentials, CustomerUpdate, NewCategory, NewCustomer, NewOrder,
    NewOrderItem, NewProduct, ProductQuery, ProductUpdate,
};
use crate::domain::Money;

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field checks that failed for one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has at least one error
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn check_length(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(field, format!("must be at least {} characters", min));
        } else if len > max {
            self.push(field, format!("must be at most {} characters", max));
        }
    }

    fn check_required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    fn check_url(&mut self, field: &'static str, value: &str) {
        if reqwest::Url::parse(value).is_err() {
            self.push(field, "must be a valid URL");
        }
    }

    fn check_email(&mut self, field: &'static str, value: &str) {
        if !email_regex().is_match(value) {
            self.push(field, "must be a valid email address");
        }
    }

    fn check_price(&mut self, field: &'static str, price: Money) {
        if !price.is_whole() {
            self.push(field, "must be a whole amount");
        } else if price < Money::from_cents(MIN_PRICE * 100) {
            self.push(field, format!("must be at least {}", MIN_PRICE));
        }
    }

    fn check_non_negative(&mut self, field: &'static str, value: i64) {
        if value < 0 {
            self.push(field, "cannot be negative");
        }
    }
}

/// Lowest price the backend accepts, in whole currency units
pub const MIN_PRICE: i64 = 10;

/// Largest page the backend serves for `GET /products`
pub const MAX_QUERY_LIMIT: u32 = 50;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Payloads that can be checked before submission
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_length("name", &self.name, 3, 15);
        errors.check_url("image", &self.image);
        errors.into_result()
    }
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_length("name", name, 3, 15);
        }
        if let Some(image) = &self.image {
            errors.check_url("image", image);
        }
        errors.into_result()
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_length("name", &self.name, 3, 15);
        errors.check_price("price", self.price);
        errors.check_length("description", &self.description, 10, 100);
        errors.check_url("image", &self.image);
        if self.category_id < 1 {
            errors.push("categoryId", "must be 1 or greater");
        }
        errors.check_non_negative("stock", self.stock);
        errors.check_non_negative("stockMin", self.stock_min);
        errors.into_result()
    }
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_length("name", name, 3, 15);
        }
        if let Some(price) = self.price {
            errors.check_price("price", price);
        }
        if let Some(description) = &self.description {
            errors.check_length("description", description, 10, 100);
        }
        if let Some(image) = &self.image {
            errors.check_url("image", image);
        }
        if matches!(self.category_id, Some(id) if id < 1) {
            errors.push("categoryId", "must be 1 or greater");
        }
        if let Some(stock) = self.stock {
            errors.check_non_negative("stock", stock);
        }
        if let Some(stock_min) = self.stock_min {
            errors.check_non_negative("stockMin", stock_min);
        }
        errors.into_result()
    }
}

impl Validate for NewCustomer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_length("name", &self.name, 3, 30);
        errors.check_required("lastName", &self.last_name);
        errors.check_required("phone", &self.phone);
        if let Some(address) = &self.address {
            errors.check_required("address", address);
        }
        errors.check_email("user.email", &self.user.email);
        if self.user.password.chars().count() < 6 {
            errors.push("user.password", "must be at least 6 characters");
        }
        if self.user.role != "customer" {
            errors.push("user.role", "must be 'customer'");
        }
        errors.into_result()
    }
}

impl Validate for CustomerUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_length("name", name, 3, 30);
        }
        errors.into_result()
    }
}

impl Validate for NewOrder {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_non_negative("customerId", self.customer_id);
        errors.into_result()
    }
}

impl Validate for NewOrderItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_non_negative("orderId", self.order_id);
        errors.check_non_negative("productId", self.product_id);
        if self.amount < 1 {
            errors.push("amount", "must be at least 1");
        }
        errors.into_result()
    }
}

impl Validate for ProductQuery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(limit) = self.limit {
            if !(1..=MAX_QUERY_LIMIT).contains(&limit) {
                errors.push("limit", format!("must be between 1 and {}", MAX_QUERY_LIMIT));
            }
        }
        for (field, value) in [
            ("price", self.price),
            ("price_min", self.price_min),
            ("price_max", self.price_max),
        ] {
            if matches!(value, Some(v) if v < MIN_PRICE) {
                errors.push(field, format!("must be at least {}", MIN_PRICE));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if max < min {
                errors.push("price_max", "must be greater than or equal to price_min");
            }
        }
        errors.into_result()
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_required("email", &self.email);
        errors.check_required("password", &self.password);
        errors.into_result()
    }
}
