//! Search and state filters for the list views

use std::str::FromStr;

use serde::Serialize;

use crate::domain::{CategoryId, Customer, Order, Product};

/// Predicate applied to every row before pagination
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Stock state filter for the product list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockState {
    /// stock <= stockMin
    Low,
    /// stock > stockMin
    Normal,
}

impl FromStr for StockState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(StockState::Low),
            "normal" => Ok(StockState::Normal),
            other => Err(format!("Unknown stock state: {}. Use: low, normal", other)),
        }
    }
}

/// Product list filter: search term, category, stock state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: String,
    pub category_id: Option<CategoryId>,
    pub stock: Option<StockState>,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        if product.name.is_empty() {
            return false;
        }

        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || contains_ci(&product.name, &term)
            || product
                .code
                .as_deref()
                .is_some_and(|code| contains_ci(code, &term));

        let matches_category = self
            .category_id
            .map_or(true, |id| product.category_id() == Some(id));

        let matches_stock = match self.stock {
            None => true,
            Some(StockState::Low) => product.is_low_stock(),
            Some(StockState::Normal) => !product.is_low_stock(),
        };

        matches_search && matches_category && matches_stock
    }
}

/// Customer activity level derived from the number of orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// No orders yet
    New,
    /// One to four orders
    Active,
    /// Five or more orders
    Frequent,
}

/// Orders needed for a customer to count as frequent
pub const FREQUENT_CUSTOMER_ORDERS: usize = 5;

impl CustomerStatus {
    pub fn of(customer: &Customer) -> Self {
        match customer.orders.len() {
            0 => CustomerStatus::New,
            n if n >= FREQUENT_CUSTOMER_ORDERS => CustomerStatus::Frequent,
            _ => CustomerStatus::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CustomerStatus::New => "new",
            CustomerStatus::Active => "active",
            CustomerStatus::Frequent => "frequent",
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(CustomerStatus::New),
            "active" => Ok(CustomerStatus::Active),
            "frequent" => Ok(CustomerStatus::Frequent),
            other => Err(format!(
                "Unknown customer status: {}. Use: new, active, frequent",
                other
            )),
        }
    }
}

/// Customer list filter: search term and activity status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub search: String,
    pub status: Option<CustomerStatus>,
}

impl Filter<Customer> for CustomerFilter {
    fn matches(&self, customer: &Customer) -> bool {
        let raw = self.search.trim();
        let term = raw.to_lowercase();

        let matches_search = term.is_empty()
            || contains_ci(&customer.name, &term)
            || customer
                .last_name
                .as_deref()
                .is_some_and(|last| contains_ci(last, &term))
            || customer
                .phone
                .as_deref()
                .is_some_and(|phone| phone.contains(raw));

        let matches_status = self
            .status
            .map_or(true, |status| CustomerStatus::of(customer) == status);

        matches_search && matches_status
    }
}

/// Sales history filter: customer name, phone or order id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub search: String,
}

impl Filter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        let raw = self.search.trim();
        if raw.is_empty() {
            return true;
        }

        let term = raw.to_lowercase();
        let phone = order
            .customer
            .as_ref()
            .and_then(|c| c.phone.as_deref())
            .unwrap_or("");

        order.customer_name().to_lowercase().contains(&term)
            || phone.contains(raw)
            || order.id.to_string().contains(raw)
    }
}

/// Product search used while entering a sale: name, id, code or barcode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSearch {
    pub term: String,
}

impl Filter<Product> for CatalogSearch {
    fn matches(&self, product: &Product) -> bool {
        let raw = self.term.trim();
        if raw.is_empty() {
            return true;
        }

        let term = raw.to_lowercase();
        contains_ci(&product.name, &term)
            || product.id.to_string().contains(raw)
            || product
                .code
                .as_deref()
                .is_some_and(|code| contains_ci(code, &term))
            || product
                .barcode
                .as_deref()
                .is_some_and(|barcode| contains_ci(barcode, &term))
    }
}

/// Customer picker search used while entering a sale: full name, phone, email
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerSearch {
    pub term: String,
}

impl Filter<Customer> for CustomerSearch {
    fn matches(&self, customer: &Customer) -> bool {
        let raw = self.term.trim();
        if raw.is_empty() {
            return true;
        }

        let term = raw.to_lowercase();
        contains_ci(&customer.full_name(), &term)
            || customer
                .phone
                .as_deref()
                .is_some_and(|phone| phone.contains(raw))
            || customer
                .email
                .as_deref()
                .is_some_and(|email| contains_ci(email, &term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerRef, Money, OrderRef};
    use chrono::{TimeZone, Utc};

    fn product(id: i64, name: &str, code: &str, stock: i64, stock_min: i64, category: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            code: Some(code.to_string()),
            barcode: None,
            description: None,
            price: Money::from_cents(1000),
            stock,
            stock_min: Some(stock_min),
            category_id: Some(category),
            category: None,
            image: None,
        }
    }

    fn customer(id: i64, name: &str, last: &str, phone: &str, orders: usize) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            last_name: Some(last.to_string()),
            phone: Some(phone.to_string()),
            address: None,
            email: None,
            orders: (0..orders)
                .map(|i| OrderRef {
                    id: i as i64,
                    created_at: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_product_search_name_or_code() {
        let filter = ProductFilter {
            search: "ric".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&product(1, "Brown RICE", "X1", 5, 1, 1)));
        assert!(filter.matches(&product(2, "Beans", "RIC-2", 5, 1, 1)));
        assert!(!filter.matches(&product(3, "Beans", "B-3", 5, 1, 1)));
    }

    #[test]
    fn test_product_without_name_is_skipped() {
        let filter = ProductFilter::default();
        assert!(!filter.matches(&product(1, "", "X", 5, 1, 1)));
    }

    #[test]
    fn test_product_category_and_stock_state() {
        let low = product(1, "Milk", "M", 5, 10, 2);
        let boundary = product(2, "Bread", "B", 10, 10, 2);
        let normal = product(3, "Eggs", "E", 30, 10, 3);

        let low_filter = ProductFilter {
            stock: Some(StockState::Low),
            ..Default::default()
        };
        assert!(low_filter.matches(&low));
        assert!(low_filter.matches(&boundary));
        assert!(!low_filter.matches(&normal));

        let category_filter = ProductFilter {
            category_id: Some(2),
            stock: Some(StockState::Normal),
            ..Default::default()
        };
        assert!(!category_filter.matches(&low));
        assert!(!category_filter.matches(&normal));
    }

    #[test]
    fn test_customer_status_thresholds() {
        assert_eq!(CustomerStatus::of(&customer(1, "Ana", "Diaz", "1", 0)), CustomerStatus::New);
        assert_eq!(CustomerStatus::of(&customer(1, "Ana", "Diaz", "1", 4)), CustomerStatus::Active);
        assert_eq!(CustomerStatus::of(&customer(1, "Ana", "Diaz", "1", 5)), CustomerStatus::Frequent);
    }

    #[test]
    fn test_customer_filter() {
        let ana = customer(1, "Ana", "Diaz", "987654321", 6);
        let filter = CustomerFilter {
            search: "DIAZ".to_string(),
            status: Some(CustomerStatus::Frequent),
        };
        assert!(filter.matches(&ana));

        let by_phone = CustomerFilter {
            search: "6543".to_string(),
            status: None,
        };
        assert!(by_phone.matches(&ana));
    }

    fn order(id: i64, customer: Option<(&str, &str, &str)>) -> Order {
        Order {
            id,
            customer_id: customer.map(|_| 3),
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            customer: customer.map(|(name, last, phone)| CustomerRef {
                name: Some(name.to_string()),
                last_name: Some(last.to_string()),
                phone: Some(phone.to_string()),
            }),
            items: Vec::new(),
        }
    }

    fn order_search(term: &str) -> OrderFilter {
        OrderFilter {
            search: term.to_string(),
        }
    }

    #[test]
    fn test_order_search_by_customer_name() {
        let sale = order(120, Some(("Lucia", "Rojas", "912345678")));
        assert!(order_search("lucia rojas").matches(&sale));
        assert!(order_search("ROJ").matches(&sale));
        assert!(!order_search("diaz").matches(&sale));
    }

    #[test]
    fn test_order_search_by_phone_and_id() {
        let sale = order(120, Some(("Lucia", "Rojas", "912345678")));
        assert!(order_search("2345").matches(&sale));
        assert!(order_search("20").matches(&sale));
        assert!(!order_search("999").matches(&sale));
    }

    #[test]
    fn test_order_search_without_customer() {
        let sale = order(87, None);
        assert!(order_search("").matches(&sale));
        assert!(order_search("87").matches(&sale));
        assert!(!order_search("lucia").matches(&sale));
    }

    #[test]
    fn test_catalog_search_matches_barcode_and_id() {
        let mut milk = product(42, "Milk", "MLK", 5, 1, 1);
        milk.barcode = Some("7750001".to_string());

        let search = |term: &str| CatalogSearch {
            term: term.to_string(),
        };
        assert!(search("7750").matches(&milk));
        assert!(search("42").matches(&milk));
        assert!(search("mlk").matches(&milk));
        assert!(!search("bread").matches(&milk));
    }

    #[test]
    fn test_stock_state_parse() {
        assert_eq!("LOW".parse::<StockState>().unwrap(), StockState::Low);
        assert!("empty".parse::<StockState>().is_err());
    }
}
