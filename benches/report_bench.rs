//! Benchmarks for report aggregation and list filtering
//!
//! Run with: cargo bench

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pos_admin::domain::{
    Category, CategoryRef, Customer, Money, Order, OrderItem, OrderProduct, Product,
};
use pos_admin::listing::{ListView, ProductFilter};
use pos_admin::reports::{Dashboard, Period, ReportData};

fn create_report_data(orders: usize) -> ReportData {
    let now = Utc::now();
    let categories: Vec<Category> = (1..=8)
        .map(|id| Category {
            id,
            name: format!("Category {}", id),
            image: None,
        })
        .collect();

    let products: Vec<Product> = (1..=200)
        .map(|id| Product {
            id,
            name: format!("Product {}", id),
            code: Some(format!("P{:04}", id)),
            barcode: None,
            description: None,
            price: Money::from_cents(100 + id * 7),
            stock: id % 40,
            stock_min: Some(5),
            category_id: Some(id % 8 + 1),
            category: None,
            image: None,
        })
        .collect();

    let customers: Vec<Customer> = (1..=100)
        .map(|id| Customer {
            id,
            name: format!("Customer {}", id),
            last_name: None,
            phone: Some(format!("9{:08}", id)),
            address: None,
            email: None,
            orders: Vec::new(),
        })
        .collect();

    let orders = (0..orders as i64)
        .map(|i| Order {
            id: i + 1,
            customer_id: Some(i % 100 + 1),
            created_at: now - Duration::hours(i % (24 * 45)),
            customer: None,
            items: (0..3)
                .map(|k| {
                    let product = &products[((i * 3 + k) % 200) as usize];
                    OrderItem {
                        id: product.id,
                        name: product.name.clone(),
                        code: product.code.clone(),
                        price: product.price,
                        image: None,
                        category_id: None,
                        category: Some(CategoryRef {
                            id: product.category_id,
                            name: None,
                        }),
                        order_product: Some(OrderProduct {
                            amount: Some((k + 1) as u32),
                        }),
                    }
                })
                .collect(),
        })
        .collect();

    ReportData {
        orders,
        products,
        categories,
        customers,
    }
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");
    let now = Utc::now();

    for size in [100, 1000, 10000] {
        let data = create_report_data(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("compute_{}", size), |b| {
            b.iter(|| Dashboard::compute(black_box(&data), Period::LastMonth, now, 5))
        });
    }

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let data = create_report_data(0);

    c.bench_function("product_search_page", |b| {
        let mut view = ListView::new(ProductFilter::default(), 10);
        view.update_filter(|f| f.search = "product 1".to_string());
        b.iter(|| view.render(black_box(&data.products)).total_items)
    });
}

criterion_group!(benches, bench_dashboard, bench_listing);
criterion_main!(benches);
