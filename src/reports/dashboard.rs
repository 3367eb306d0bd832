//! Report dashboard
//!
//! Fetches the four collections once, concurrently, and runs every reduction
//! over the same snapshot. Nothing is cached between loads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::{
    customer_report, inventory_report, revenue_by_category, summarize, top_products, CategorySales,
    CustomerReport, InventoryReport, ProductSales, SalesSummary,
};
use super::period::{period_series, trend, DailyRevenue, Period};
use crate::client::{Backend, ClientResult};
use crate::domain::{Category, Customer, Order, Product};

/// Collections a dashboard is computed from
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub customers: Vec<Customer>,
}

impl ReportData {
    pub async fn fetch<B>(backend: &B) -> ClientResult<Self>
    where
        B: Backend + ?Sized,
    {
        let (orders, products, categories, customers) = tokio::try_join!(
            backend.fetch_orders(),
            backend.fetch_products(),
            backend.fetch_categories(),
            backend.fetch_customers(),
        )?;

        tracing::debug!(
            orders = orders.len(),
            products = products.len(),
            categories = categories.len(),
            customers = customers.len(),
            "report data fetched"
        );

        Ok(Self {
            orders,
            products,
            categories,
            customers,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub period: Period,
    pub generated_at: DateTime<Utc>,
    /// Every order on record
    pub summary: SalesSummary,
    /// Orders inside the period only
    pub period_summary: SalesSummary,
    pub daily: Vec<DailyRevenue>,
    pub trend: Vec<DailyRevenue>,
    pub top_products: Vec<ProductSales>,
    pub categories: Vec<CategorySales>,
    pub customers: CustomerReport,
    pub inventory: InventoryReport,
}

impl Dashboard {
    pub async fn load<B>(backend: &B, period: Period, now: DateTime<Utc>, top_n: usize) -> ClientResult<Self>
    where
        B: Backend + ?Sized,
    {
        let data = ReportData::fetch(backend).await?;
        Ok(Self::compute(&data, period, now, top_n))
    }

    pub fn compute(data: &ReportData, period: Period, now: DateTime<Utc>, top_n: usize) -> Self {
        Self {
            period,
            generated_at: now,
            summary: summarize(&data.orders),
            period_summary: summarize(period.filter(&data.orders, now)),
            daily: period_series(&data.orders, period, now),
            trend: trend(&data.orders, now),
            top_products: top_products(&data.orders, top_n),
            categories: revenue_by_category(&data.orders, &data.categories),
            customers: customer_report(&data.customers, &data.orders, top_n),
            inventory: inventory_report(&data.products),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;
    use crate::reports::aggregate::fixtures::{category, customer, orders, stock};
    use crate::testing::FakeBackend;

    fn backend(now: DateTime<Utc>) -> FakeBackend {
        FakeBackend {
            categories: vec![category(1, "Cleaning"), category(2, "Food")],
            products: vec![stock(1, 0, 2, 1), stock(2, 40, 5, 2)],
            customers: vec![customer(10, "Ana"), customer(11, "Luis")],
            orders: orders(now),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_dashboard() {
        let now = Utc::now();
        let dashboard = Dashboard::load(&backend(now), Period::LastWeek, now, 5)
            .await
            .unwrap();

        assert_eq!(dashboard.summary.transactions, 3);
        assert_eq!(dashboard.period_summary.transactions, 2);
        assert_eq!(dashboard.period_summary.revenue, Money::from_cents(3100));
        assert_eq!(dashboard.daily.len(), 7);
        assert_eq!(dashboard.trend.len(), 14);
        assert_eq!(dashboard.categories.len(), 2);
        assert_eq!(dashboard.customers.active, 2);
        assert_eq!(dashboard.inventory.out_of_stock, 1);
    }

    #[tokio::test]
    async fn test_load_fails_when_any_fetch_fails() {
        let now = Utc::now();
        let backend = backend(now);
        backend.fail_products();

        assert!(Dashboard::load(&backend, Period::LastMonth, now, 5).await.is_err());
    }
}
