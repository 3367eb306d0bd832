//! List Views
//!
//! Every list screen fetches its whole collection and then filters and
//! paginates in memory. [`ListView`] holds the filter and the current page;
//! changing the filter always goes back to page 1.
//!
//! Fetching everything is fine for a small shop. Larger catalogs should use
//! [`crate::client::ProductQuery`] to push limits to the backend.

mod filters;
mod pagination;

pub use filters::{
    CatalogSearch, CustomerFilter, CustomerSearch, CustomerStatus, Filter, OrderFilter,
    ProductFilter, StockState, FREQUENT_CUSTOMER_ORDERS,
};
pub use pagination::{clamp_page, page_count, paginate, Page, DEFAULT_PAGE_SIZE};

use serde::Serialize;

use crate::domain::{Customer, Money, Product};

/// Filter plus page cursor for one list screen
#[derive(Debug, Clone)]
pub struct ListView<F> {
    filter: F,
    page: usize,
    page_size: usize,
}

impl<F: Default> Default for ListView<F> {
    fn default() -> Self {
        Self::new(F::default(), DEFAULT_PAGE_SIZE)
    }
}

impl<F> ListView<F> {
    pub fn new(filter: F, page_size: usize) -> Self {
        Self {
            filter,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the filter and go back to the first page
    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    /// Edit the filter in place and go back to the first page
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filter);
        self.page = 1;
    }

    /// Request a page; it is clamped against the filtered count on the next render
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filter `items` and cut the current page
    pub fn render<'a, T>(&mut self, items: &'a [T]) -> Page<&'a T>
    where
        F: Filter<T>,
    {
        let filtered: Vec<&T> = items.iter().filter(|item| self.filter.matches(item)).collect();
        let page = paginate(filtered, self.page, self.page_size);
        self.page = page.page;
        page
    }

    /// Number of rows passing the filter
    pub fn filtered_count<T>(&self, items: &[T]) -> usize
    where
        F: Filter<T>,
    {
        items.iter().filter(|item| self.filter.matches(item)).count()
    }
}

/// Header figures of the product list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductStats {
    pub total: usize,
    pub low_stock: usize,
    pub without_image: usize,
    pub inventory_value: Money,
}

impl ProductStats {
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            total: products.len(),
            low_stock: products.iter().filter(|p| p.is_low_stock()).count(),
            without_image: products
                .iter()
                .filter(|p| p.image.as_deref().map_or(true, str::is_empty))
                .count(),
            inventory_value: products.iter().map(Product::stock_value).sum(),
        }
    }
}

/// Header figures of the customer list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerStats {
    pub total: usize,
    pub new: usize,
    pub frequent: usize,
    pub total_orders: usize,
}

impl CustomerStats {
    pub fn from_customers(customers: &[Customer]) -> Self {
        Self {
            total: customers.len(),
            new: customers
                .iter()
                .filter(|c| CustomerStatus::of(c) == CustomerStatus::New)
                .count(),
            frequent: customers
                .iter()
                .filter(|c| CustomerStatus::of(c) == CustomerStatus::Frequent)
                .count(),
            total_orders: customers.iter().map(|c| c.orders.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        (1..=25)
            .map(|i| Product {
                id: i,
                // 12 of the 25 products are soaps
                name: if i <= 12 {
                    format!("Soap {}", i)
                } else {
                    format!("Rice {}", i)
                },
                code: Some(format!("P{:03}", i)),
                barcode: None,
                description: None,
                price: Money::from_cents(250),
                stock: i,
                stock_min: Some(10),
                category_id: Some(if i % 2 == 0 { 1 } else { 2 }),
                category: None,
                image: None,
            })
            .collect()
    }

    #[test]
    fn test_search_twelve_of_twenty_five() {
        let products = catalog();
        let mut view = ListView::new(ProductFilter::default(), 10);
        view.update_filter(|f| f.search = "soap".to_string());
        view.set_page(2);

        let page = view.render(&products);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, 11);
        assert_eq!(page.items[1].id, 12);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let products = catalog();
        let mut view = ListView::new(ProductFilter::default(), 10);
        view.set_page(3);
        assert_eq!(view.render(&products).page, 3);

        view.update_filter(|f| f.category_id = Some(1));
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_page_stays_in_range_for_filter_combinations() {
        let products = catalog();
        let searches = ["", "soap", "rice", "p01", "zzz"];
        let categories = [None, Some(1), Some(2), Some(9)];
        let stocks = [None, Some(StockState::Low), Some(StockState::Normal)];

        for search in searches {
            for category_id in categories {
                for stock in stocks {
                    for requested in [1, 2, 5] {
                        let mut view = ListView::new(
                            ProductFilter {
                                search: search.to_string(),
                                category_id,
                                stock,
                            },
                            10,
                        );
                        view.set_page(requested);
                        let filtered = view.filtered_count(&products);
                        let page = view.render(&products);

                        assert!(page.items.len() <= filtered);
                        assert_eq!(page.total_pages, page_count(filtered, 10));
                        assert!(page.page >= 1 && page.page <= page.total_pages.max(1));
                    }
                }
            }
        }
    }

    #[test]
    fn test_product_stats() {
        let stats = ProductStats::from_products(&catalog());
        assert_eq!(stats.total, 25);
        assert_eq!(stats.low_stock, 10);
        assert_eq!(stats.without_image, 25);
        // 2.50 * (1 + 2 + ... + 25) = 2.50 * 325
        assert_eq!(stats.inventory_value, Money::from_cents(81_250));
    }
}
