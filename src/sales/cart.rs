//! Sales cart
//!
//! Lines live only for one sales-entry session. Stock checks use the product
//! snapshot taken when the catalog was last fetched; nothing is reserved on
//! the backend.

use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Money, Product, ProductId};

/// Minimum gap between two accepted adds
pub const DEFAULT_ADD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Surcharge applied on top of the subtotal, in percent
pub const DEFAULT_SURCHARGE_PERCENT: u32 = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CartError {
    #[error("Add ignored: repeated within the debounce window")]
    Debounced,

    #[error("Product {0} has no stock")]
    OutOfStock(String),

    #[error("Insufficient stock for {name}, only {available} available")]
    InsufficientStock { name: String, available: i64 },

    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("No product matches {0}")]
    UnknownProduct(String),
}

/// What an accepted cart action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Incremented { quantity: u32 },
    Updated { quantity: u32 },
    Removed,
}

/// One product line with its snapshot and quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }
}

#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    last_add: Option<Instant>,
    debounce: Duration,
    surcharge_percent: u32,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(DEFAULT_ADD_DEBOUNCE, DEFAULT_SURCHARGE_PERCENT)
    }
}

impl Cart {
    pub fn new(debounce: Duration, surcharge_percent: u32) -> Self {
        Self {
            lines: Vec::new(),
            last_add: None,
            debounce,
            surcharge_percent,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product_id)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product.id == product_id)
    }

    /// Add one unit of `product`
    ///
    /// Rejected while inside the debounce window, when the product has no
    /// stock, or when the cart already holds every unit in stock.
    pub fn add(&mut self, product: &Product, now: Instant) -> Result<CartChange, CartError> {
        if let Some(last) = self.last_add {
            if now.saturating_duration_since(last) < self.debounce {
                return Err(CartError::Debounced);
            }
        }

        if product.stock <= 0 {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        let change = match self.position(product.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                if i64::from(line.quantity) >= product.stock {
                    return Err(CartError::InsufficientStock {
                        name: product.name.clone(),
                        available: product.stock,
                    });
                }
                line.quantity += 1;
                // keep the freshest snapshot
                line.product = product.clone();
                CartChange::Incremented {
                    quantity: line.quantity,
                }
            }
            None => {
                self.lines.push(CartLine {
                    product: product.clone(),
                    quantity: 1,
                });
                CartChange::Added
            }
        };

        self.last_add = Some(now);
        Ok(change)
    }

    /// Set the quantity of a line; 0 removes it
    ///
    /// The cap is the stock of the product in `catalog`, falling back to the
    /// line's own snapshot when the product is no longer listed.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        catalog: &[Product],
    ) -> Result<CartChange, CartError> {
        let idx = self
            .position(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        if quantity == 0 {
            self.lines.remove(idx);
            return Ok(CartChange::Removed);
        }

        let line = &mut self.lines[idx];
        let stock = catalog
            .iter()
            .find(|p| p.id == product_id)
            .map_or(line.product.stock, |p| p.stock);

        if i64::from(quantity) > stock {
            return Err(CartError::InsufficientStock {
                name: line.product.name.clone(),
                available: stock,
            });
        }

        line.quantity = quantity;
        Ok(CartChange::Updated { quantity })
    }

    pub fn increment(&mut self, product_id: ProductId, catalog: &[Product]) -> Result<CartChange, CartError> {
        let current = self.quantity_of(product_id);
        self.set_quantity(product_id, current + 1, catalog)
    }

    /// Take one unit off; a line at 1 is removed
    pub fn decrement(&mut self, product_id: ProductId, catalog: &[Product]) -> Result<CartChange, CartError> {
        let current = self.quantity_of(product_id);
        self.set_quantity(product_id, current.saturating_sub(1), catalog)
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<CartChange, CartError> {
        let idx = self
            .position(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        self.lines.remove(idx);
        Ok(CartChange::Removed)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_add = None;
    }

    pub fn units(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn surcharge_percent(&self) -> u32 {
        self.surcharge_percent
    }

    pub fn surcharge(&self) -> Money {
        self.subtotal().percent(self.surcharge_percent)
    }

    pub fn total(&self) -> Money {
        self.subtotal() + self.surcharge()
    }

    /// Lines asking for more units than `catalog` has in stock
    ///
    /// A line whose product is missing from `catalog` counts as having no stock.
    pub fn over_stock_lines<'a>(&'a self, catalog: &[Product]) -> Vec<&'a CartLine> {
        self.lines
            .iter()
            .filter(|line| {
                let stock = catalog
                    .iter()
                    .find(|p| p.id == line.product.id)
                    .map_or(0, |p| p.stock);
                i64::from(line.quantity) > stock
            })
            .collect()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            lines: self.len(),
            units: self.units(),
            subtotal: self.subtotal(),
            surcharge: self.surcharge(),
            total: self.total(),
        }
    }
}

/// Totals block shown under the cart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartTotals {
    pub lines: usize,
    pub units: u32,
    pub subtotal: Money,
    pub surcharge: Money,
    pub total: Money,
}

#[cfg(test)]
pub(crate) fn product(id: ProductId, name: &str, cents: i64, stock: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        code: Some(format!("C{}", id)),
        barcode: None,
        description: None,
        price: Money::from_cents(cents),
        stock,
        stock_min: Some(1),
        category_id: Some(1),
        category: None,
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_debounce() -> Cart {
        Cart::new(Duration::ZERO, DEFAULT_SURCHARGE_PERCENT)
    }

    #[test]
    fn test_totals_with_surcharge() {
        let soap = product(1, "Soap", 350, 10);
        let rice = product(2, "Rice", 1000, 10);
        let catalog = vec![soap.clone(), rice.clone()];

        let mut cart = no_debounce();
        let now = Instant::now();
        cart.add(&soap, now).unwrap();
        cart.add(&rice, now).unwrap();
        cart.set_quantity(1, 2, &catalog).unwrap();

        assert_eq!(cart.subtotal(), Money::from_cents(1700));
        assert_eq!(cart.surcharge(), Money::from_cents(170));
        assert_eq!(cart.total(), Money::from_cents(1870));
        assert_eq!(cart.total().to_string(), "18.70");
    }

    #[test]
    fn test_add_is_capped_by_stock() {
        let soap = product(1, "Soap", 350, 2);
        let mut cart = no_debounce();
        let now = Instant::now();

        assert_eq!(cart.add(&soap, now), Ok(CartChange::Added));
        assert_eq!(
            cart.add(&soap, now),
            Ok(CartChange::Incremented { quantity: 2 })
        );
        assert_eq!(
            cart.add(&soap, now),
            Err(CartError::InsufficientStock {
                name: "Soap".to_string(),
                available: 2
            })
        );
        assert_eq!(cart.quantity_of(1), 2);
    }

    #[test]
    fn test_out_of_stock_is_rejected() {
        let empty = product(1, "Soap", 350, 0);
        let mut cart = no_debounce();
        assert_eq!(
            cart.add(&empty, Instant::now()),
            Err(CartError::OutOfStock("Soap".to_string()))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_debounce_window() {
        let soap = product(1, "Soap", 350, 10);
        let mut cart = Cart::default();
        let now = Instant::now();

        cart.add(&soap, now).unwrap();
        assert_eq!(
            cart.add(&soap, now + Duration::from_millis(200)),
            Err(CartError::Debounced)
        );
        assert!(cart.add(&soap, now + Duration::from_millis(500)).is_ok());
        assert_eq!(cart.quantity_of(1), 2);
    }

    #[test]
    fn test_set_quantity_rejects_above_stock() {
        let soap = product(1, "Soap", 350, 3);
        let catalog = vec![soap.clone()];
        let mut cart = no_debounce();
        cart.add(&soap, Instant::now()).unwrap();

        assert!(matches!(
            cart.set_quantity(1, 4, &catalog),
            Err(CartError::InsufficientStock { available: 3, .. })
        ));
        assert_eq!(cart.quantity_of(1), 1);
        assert_eq!(cart.increment(1, &catalog), Ok(CartChange::Updated { quantity: 2 }));
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let soap = product(1, "Soap", 350, 3);
        let catalog = vec![soap.clone()];
        let mut cart = no_debounce();
        cart.add(&soap, Instant::now()).unwrap();

        assert_eq!(cart.decrement(1, &catalog), Ok(CartChange::Removed));
        assert!(cart.is_empty());
        assert_eq!(cart.decrement(1, &catalog), Err(CartError::NotInCart(1)));
    }

    #[test]
    fn test_over_stock_after_refresh() {
        let soap = product(1, "Soap", 350, 5);
        let mut cart = no_debounce();
        let now = Instant::now();
        for _ in 0..3 {
            cart.add(&soap, now).unwrap();
        }

        let refreshed = vec![product(1, "Soap", 350, 2)];
        let over = cart.over_stock_lines(&refreshed);
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].quantity, 3);
    }

    #[test]
    fn test_delisted_product_is_over_stock() {
        let soap = product(1, "Soap", 350, 5);
        let rice = product(2, "Rice", 1000, 5);
        let mut cart = no_debounce();
        let now = Instant::now();
        cart.add(&soap, now).unwrap();
        cart.add(&rice, now).unwrap();

        let refreshed = vec![product(1, "Soap", 350, 5)];
        let over = cart.over_stock_lines(&refreshed);
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].product.id, 2);
    }
}
