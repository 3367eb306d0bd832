//! Reductions over fetched collections
//!
//! Pure functions; the dashboard loader feeds them whatever it fetched.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, CategoryId, Customer, CustomerId, Money, Order, Product, ProductId};

/// Number of entries kept in inventory detail lists
pub const INVENTORY_DETAIL_LIMIT: usize = 10;

/// Default length of the ranked lists
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    pub revenue: Money,
    pub units: u64,
    pub transactions: usize,
    pub unique_customers: usize,
}

pub fn summarize<'a, I>(orders: I) -> SalesSummary
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut summary = SalesSummary::default();
    let mut customers: HashSet<Option<CustomerId>> = HashSet::new();

    for order in orders {
        summary.revenue += order.total();
        summary.units += u64::from(order.units());
        summary.transactions += 1;
        customers.insert(order.customer_id);
    }

    summary.unique_customers = customers.len();
    summary
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub id: ProductId,
    pub name: String,
    pub code: Option<String>,
    pub category: Option<String>,
    pub units: u64,
    pub revenue: Money,
}

/// Products ranked by units sold, highest first
///
/// Ties keep ascending product id order.
pub fn top_products(orders: &[Order], limit: usize) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<ProductId, ProductSales> = BTreeMap::new();

    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let entry = by_product.entry(item.id).or_insert_with(|| ProductSales {
            id: item.id,
            name: item.name.clone(),
            code: item.code.clone(),
            category: item.category.as_ref().and_then(|c| c.name.clone()),
            units: 0,
            revenue: Money::ZERO,
        });
        entry.units += u64::from(item.quantity());
        entry.revenue += item.line_total();
    }

    let mut ranked: Vec<ProductSales> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.units.cmp(&a.units));
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub id: CategoryId,
    pub name: String,
    pub revenue: Money,
    pub units: u64,
}

/// Revenue per known category, in category list order
///
/// Items whose category is not in `categories` are not counted, and
/// categories without revenue are left out.
pub fn revenue_by_category(orders: &[Order], categories: &[Category]) -> Vec<CategorySales> {
    let mut totals: HashMap<CategoryId, (Money, u64)> = categories
        .iter()
        .map(|c| (c.id, (Money::ZERO, 0)))
        .collect();

    for item in orders.iter().flat_map(|o| o.items.iter()) {
        if let Some(slot) = item.category_id().and_then(|id| totals.get_mut(&id)) {
            slot.0 += item.line_total();
            slot.1 += u64::from(item.quantity());
        }
    }

    categories
        .iter()
        .filter_map(|c| {
            let (revenue, units) = totals.get(&c.id).copied()?;
            (revenue > Money::ZERO).then(|| CategorySales {
                id: c.id,
                name: c.name.clone(),
                revenue,
                units,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRanking {
    pub id: CustomerId,
    pub name: String,
    pub orders: usize,
    pub revenue: Money,
    pub last_purchase: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerReport {
    pub total: usize,
    /// Customers with at least one order
    pub active: usize,
    pub inactive: usize,
    pub top_by_orders: Vec<CustomerRanking>,
    pub top_by_revenue: Vec<CustomerRanking>,
}

/// Per-customer order counts and revenue, from the orders collection
pub fn customer_report(customers: &[Customer], orders: &[Order], limit: usize) -> CustomerReport {
    let mut per_customer: HashMap<CustomerId, (usize, Money, Option<DateTime<Utc>>)> = HashMap::new();
    for order in orders {
        if let Some(id) = order.customer_id {
            let slot = per_customer.entry(id).or_insert((0, Money::ZERO, None));
            slot.0 += 1;
            slot.1 += order.total();
            slot.2 = slot.2.max(Some(order.created_at));
        }
    }

    let rankings: Vec<CustomerRanking> = customers
        .iter()
        .map(|c| {
            let (orders, revenue, last) = per_customer
                .get(&c.id)
                .copied()
                .unwrap_or((0, Money::ZERO, None));
            CustomerRanking {
                id: c.id,
                name: c.full_name(),
                orders,
                revenue,
                last_purchase: last,
            }
        })
        .collect();

    let active = rankings.iter().filter(|r| r.orders > 0).count();

    let mut top_by_orders: Vec<CustomerRanking> =
        rankings.iter().filter(|r| r.orders > 0).cloned().collect();
    top_by_orders.sort_by(|a, b| b.orders.cmp(&a.orders));
    top_by_orders.truncate(limit);

    let mut top_by_revenue: Vec<CustomerRanking> = rankings
        .into_iter()
        .filter(|r| r.revenue > Money::ZERO)
        .collect();
    top_by_revenue.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    top_by_revenue.truncate(limit);

    CustomerReport {
        total: customers.len(),
        active,
        inactive: customers.len() - active,
        top_by_orders,
        top_by_revenue,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockItem {
    pub id: ProductId,
    pub name: String,
    pub stock: i64,
    pub stock_min: Option<i64>,
}

impl From<&Product> for StockItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            stock: product.stock,
            stock_min: product.stock_min,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryReport {
    pub total_products: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub inventory_value: Money,
    pub categories: usize,
    /// First entries of the low-stock list, in catalog order
    pub low_stock_items: Vec<StockItem>,
    pub out_of_stock_items: Vec<StockItem>,
}

pub fn inventory_report(products: &[Product]) -> InventoryReport {
    let low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();
    let out: Vec<&Product> = products.iter().filter(|p| p.is_out_of_stock()).collect();
    let categories: HashSet<CategoryId> = products.iter().filter_map(Product::category_id).collect();

    InventoryReport {
        total_products: products.len(),
        low_stock: low.len(),
        out_of_stock: out.len(),
        inventory_value: products.iter().map(Product::stock_value).sum(),
        categories: categories.len(),
        low_stock_items: low
            .iter()
            .take(INVENTORY_DETAIL_LIMIT)
            .map(|p| StockItem::from(*p))
            .collect(),
        out_of_stock_items: out
            .iter()
            .take(INVENTORY_DETAIL_LIMIT)
            .map(|p| StockItem::from(*p))
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, Utc};

    use crate::domain::{
        Category, CategoryRef, Customer, Money, Order, OrderItem, OrderProduct, Product,
    };

    pub fn item(id: i64, name: &str, cents: i64, amount: Option<u32>, category: i64) -> OrderItem {
        OrderItem {
            id,
            name: name.to_string(),
            code: None,
            price: Money::from_cents(cents),
            image: None,
            category_id: None,
            category: Some(CategoryRef {
                id: Some(category),
                name: Some(format!("Cat{}", category)),
            }),
            order_product: amount.map(|a| OrderProduct { amount: Some(a) }),
        }
    }

    pub fn order(id: i64, customer: i64, at: DateTime<Utc>, items: Vec<OrderItem>) -> Order {
        Order {
            id,
            customer_id: Some(customer),
            created_at: at,
            customer: None,
            items,
        }
    }

    pub fn customer(id: i64, name: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            last_name: None,
            phone: None,
            address: None,
            email: None,
            orders: Vec::new(),
        }
    }

    pub fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            image: None,
        }
    }

    pub fn stock(id: i64, stock: i64, stock_min: i64, category: i64) -> Product {
        Product {
            id,
            name: format!("P{}", id),
            code: None,
            barcode: None,
            description: None,
            price: Money::from_cents(100),
            stock,
            stock_min: Some(stock_min),
            category_id: Some(category),
            category: None,
            image: None,
        }
    }

    /// Three orders spread over two customers and three days
    pub fn orders(now: DateTime<Utc>) -> Vec<Order> {
        vec![
            order(
                1,
                10,
                now - Duration::days(1),
                vec![item(1, "Soap", 350, Some(2), 1), item(2, "Rice", 1000, None, 2)],
            ),
            order(2, 10, now - Duration::days(3), vec![item(1, "Soap", 350, Some(4), 1)]),
            order(3, 11, now - Duration::days(20), vec![item(3, "Milk", 500, Some(1), 3)]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_summary() {
        let orders = orders(Utc::now());
        let summary = summarize(&orders);

        // 7.00 + 10.00 + 14.00 + 5.00
        assert_eq!(summary.revenue, Money::from_cents(3600));
        assert_eq!(summary.units, 8);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.unique_customers, 2);
    }

    #[test]
    fn test_top_products_by_units() {
        let ranked = top_products(&orders(Utc::now()), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, 1);
        assert_eq!(ranked[0].units, 6);
        assert_eq!(ranked[0].revenue, Money::from_cents(2100));
        assert_eq!(ranked[0].category.as_deref(), Some("Cat1"));
        // Rice and Milk tie at one unit; lower id wins
        assert_eq!(ranked[1].id, 2);
    }

    #[test]
    fn test_revenue_by_category_skips_empty_and_unknown() {
        let categories = vec![category(1, "Cleaning"), category(2, "Food"), category(4, "Toys")];
        let totals = revenue_by_category(&orders(Utc::now()), &categories);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Cleaning");
        assert_eq!(totals[0].revenue, Money::from_cents(2100));
        assert_eq!(totals[0].units, 6);
        assert_eq!(totals[1].name, "Food");
    }

    #[test]
    fn test_customer_report() {
        let now = Utc::now();
        let customers = vec![customer(10, "Ana"), customer(11, "Luis"), customer(12, "Eva")];
        let report = customer_report(&customers, &orders(now), 5);

        assert_eq!(report.total, 3);
        assert_eq!(report.active, 2);
        assert_eq!(report.inactive, 1);
        assert_eq!(report.top_by_orders[0].id, 10);
        assert_eq!(report.top_by_orders[0].orders, 2);
        assert_eq!(report.top_by_orders[0].last_purchase, Some(now - chrono::Duration::days(1)));
        assert_eq!(report.top_by_revenue[0].revenue, Money::from_cents(3100));
        assert_eq!(report.top_by_revenue.len(), 2);
    }

    #[test]
    fn test_inventory_report() {
        let mut products: Vec<Product> = (1..=12).map(|i| stock(i, 0, 2, i % 3)).collect();
        products.push(stock(13, 50, 5, 1));

        let report = inventory_report(&products);
        assert_eq!(report.total_products, 13);
        assert_eq!(report.low_stock, 12);
        assert_eq!(report.out_of_stock, 12);
        assert_eq!(report.low_stock_items.len(), INVENTORY_DETAIL_LIMIT);
        assert_eq!(report.out_of_stock_items[0].id, 1);
        assert_eq!(report.inventory_value, Money::from_cents(5000));
        assert_eq!(report.categories, 3);
    }
}
