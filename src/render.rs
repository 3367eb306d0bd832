//! Output Rendering
//!
//! Lists, carts and reports are printed as aligned text tables, JSON or CSV.
//! Every printable row type implements [`Tabular`].

use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Category, Customer, Money, Order, Product};
use crate::listing::{CustomerStatus, Page};
use crate::reports::{CategorySales, CustomerRanking, Dashboard, DailyRevenue, ProductSales, StockItem};
use crate::sales::{CartLine, CartTotals};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output failed: {0}")]
    Csv(String),
}

impl From<csv::Error> for RenderError {
    fn from(e: csv::Error) -> Self {
        RenderError::Csv(e.to_string())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown format: {}. Use: table, json, csv", other)),
        }
    }
}

/// Presentation settings from the `[display]` section
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub currency_symbol: String,
    pub date_format: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl DisplayOptions {
    pub fn money(&self, amount: Money) -> String {
        format!("{}{}", self.currency_symbol, amount)
    }
}

/// A row type with fixed columns
pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self, display: &DisplayOptions) -> Vec<String>;
}

impl<T: Tabular> Tabular for &T {
    fn headers() -> Vec<&'static str> {
        T::headers()
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        (**self).row(display)
    }
}

fn opt(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

// ============================================
// Row types
// ============================================

impl Tabular for Category {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Image"]
    }

    fn row(&self, _: &DisplayOptions) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), opt(self.image.as_deref())]
    }
}

impl Tabular for Product {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Code", "Name", "Category", "Price", "Stock", "Min", "State"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        let state = if self.is_out_of_stock() {
            "out"
        } else if self.is_low_stock() {
            "low"
        } else {
            "ok"
        };
        vec![
            self.id.to_string(),
            opt(self.code.as_deref()),
            self.name.clone(),
            opt(self.category_name()),
            display.money(self.price),
            self.stock.to_string(),
            self.stock_min.map_or_else(|| "-".to_string(), |m| m.to_string()),
            state.to_string(),
        ]
    }
}

impl Tabular for Customer {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Phone", "Email", "Orders", "Status"]
    }

    fn row(&self, _: &DisplayOptions) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name(),
            opt(self.phone.as_deref()),
            opt(self.email.as_deref()),
            self.orders.len().to_string(),
            CustomerStatus::of(self).label().to_string(),
        ]
    }
}

impl Tabular for Order {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Date", "Customer", "Lines", "Units", "Total"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        let customer = self.customer_name();
        vec![
            self.id.to_string(),
            self.created_at.format(&display.date_format).to_string(),
            if customer.is_empty() {
                self.customer_id
                    .map_or_else(|| "-".to_string(), |id| format!("#{}", id))
            } else {
                customer
            },
            self.items.len().to_string(),
            self.units().to_string(),
            display.money(self.total()),
        ]
    }
}

impl Tabular for CartLine {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Qty", "Price", "Total"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        vec![
            self.product.id.to_string(),
            self.product.name.clone(),
            self.quantity.to_string(),
            display.money(self.product.price),
            display.money(self.line_total()),
        ]
    }
}

impl Tabular for ProductSales {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Category", "Units", "Revenue"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(self.category.as_deref()),
            self.units.to_string(),
            display.money(self.revenue),
        ]
    }
}

impl Tabular for CategorySales {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Category", "Units", "Revenue"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.units.to_string(),
            display.money(self.revenue),
        ]
    }
}

impl Tabular for CustomerRanking {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Customer", "Orders", "Revenue", "Last purchase"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.orders.to_string(),
            display.money(self.revenue),
            self.last_purchase
                .map_or_else(|| "-".to_string(), |t| t.format(&display.date_format).to_string()),
        ]
    }
}

impl Tabular for DailyRevenue {
    fn headers() -> Vec<&'static str> {
        vec!["Date", "Orders", "Revenue"]
    }

    fn row(&self, display: &DisplayOptions) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.orders.to_string(),
            display.money(self.revenue),
        ]
    }
}

impl Tabular for StockItem {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Stock", "Min"]
    }

    fn row(&self, _: &DisplayOptions) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.stock.to_string(),
            self.stock_min.map_or_else(|| "-".to_string(), |m| m.to_string()),
        ]
    }
}

// ============================================
// Writers
// ============================================

/// Aligned text table; columns are as wide as their widest cell
pub fn table<T: Tabular>(items: &[T], display: &DisplayOptions) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(|item| item.row(display)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    let rule_width = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

pub fn csv<T: Tabular>(items: &[T], display: &DisplayOptions) -> RenderResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for item in items {
        writer.write_record(item.row(display))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| RenderError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RenderError::Csv(e.to_string()))
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> RenderResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// A list in the requested format
pub fn list<T: Tabular + Serialize>(items: &[T], format: OutputFormat, display: &DisplayOptions) -> RenderResult<String> {
    match format {
        OutputFormat::Table if items.is_empty() => Ok("No records\n".to_string()),
        OutputFormat::Table => Ok(table(items, display)),
        OutputFormat::Json => json(items),
        OutputFormat::Csv => csv(items, display),
    }
}

/// One page of a list plus its position footer
pub fn page<T: Tabular + Serialize>(page: &Page<T>, format: OutputFormat, display: &DisplayOptions) -> RenderResult<String> {
    match format {
        OutputFormat::Table => {
            let mut out = list(&page.items, format, display)?;
            let _ = writeln!(
                out,
                "Showing {}-{} of {} | page {} of {}",
                page.first_position(),
                page.last_position(),
                page.total_items,
                page.page,
                page.total_pages.max(1)
            );
            Ok(out)
        }
        OutputFormat::Json => json(page),
        OutputFormat::Csv => csv(&page.items, display),
    }
}

pub fn cart(lines: &[CartLine], totals: &CartTotals, surcharge_percent: u32, format: OutputFormat, display: &DisplayOptions) -> RenderResult<String> {
    match format {
        OutputFormat::Table => {
            let mut out = list(lines, format, display)?;
            let _ = writeln!(out, "Subtotal: {}", display.money(totals.subtotal));
            let _ = writeln!(out, "Surcharge ({}%): {}", surcharge_percent, display.money(totals.surcharge));
            let _ = writeln!(out, "Total: {}", display.money(totals.total));
            Ok(out)
        }
        OutputFormat::Json => json(&serde_json::json!({ "lines": lines, "totals": totals })),
        OutputFormat::Csv => csv(lines, display),
    }
}

/// Full dashboard; CSV carries the daily series only
pub fn dashboard(report: &Dashboard, format: OutputFormat, display: &DisplayOptions) -> RenderResult<String> {
    match format {
        OutputFormat::Json => json(report),
        OutputFormat::Csv => csv(&report.daily, display),
        OutputFormat::Table => {
            let mut out = String::new();
            let s = &report.summary;
            let p = &report.period_summary;
            let _ = writeln!(out, "== Summary ==");
            let _ = writeln!(
                out,
                "Revenue: {} | Units: {} | Transactions: {} | Customers: {}",
                display.money(s.revenue),
                s.units,
                s.transactions,
                s.unique_customers
            );
            let _ = writeln!(
                out,
                "Last {}: {} in {} transaction(s)",
                report.period,
                display.money(p.revenue),
                p.transactions
            );

            section(&mut out, &format!("Daily revenue ({})", report.period), &report.daily, display);
            section(&mut out, "Trend (14 days)", &report.trend, display);
            section(&mut out, "Top products", &report.top_products, display);
            section(&mut out, "Revenue by category", &report.categories, display);

            let c = &report.customers;
            let _ = writeln!(out, "\n== Customers ==");
            let _ = writeln!(out, "Total: {} | Active: {} | Inactive: {}", c.total, c.active, c.inactive);
            section(&mut out, "Top customers by orders", &c.top_by_orders, display);
            section(&mut out, "Top customers by revenue", &c.top_by_revenue, display);

            let i = &report.inventory;
            let _ = writeln!(out, "\n== Inventory ==");
            let _ = writeln!(
                out,
                "Products: {} | Low stock: {} | Out of stock: {} | Value: {} | Categories: {}",
                i.total_products,
                i.low_stock,
                i.out_of_stock,
                display.money(i.inventory_value),
                i.categories
            );
            section(&mut out, "Low stock", &i.low_stock_items, display);
            section(&mut out, "Out of stock", &i.out_of_stock_items, display);
            Ok(out)
        }
    }
}

fn section<T: Tabular>(out: &mut String, title: &str, items: &[T], display: &DisplayOptions) {
    let _ = writeln!(out, "\n== {} ==", title);
    if items.is_empty() {
        out.push_str("No data\n");
    } else {
        out.push_str(&table(items, display));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::paginate;
    use crate::sales::product;

    #[test]
    fn test_table_alignment() {
        let products = vec![product(1, "Soap", 350, 5), product(22, "Brown rice", 1000, 0)];
        let text = table(&products, &DisplayOptions::default());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("ID | Code | Name"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].contains("$3.50"));
        assert!(lines[3].ends_with("out"));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut soap = product(1, "Soap, lavender", 350, 5);
        soap.code = None;
        let out = csv(&[soap], &DisplayOptions::default()).unwrap();
        let mut lines = out.lines();

        assert_eq!(lines.next(), Some("ID,Code,Name,Category,Price,Stock,Min,State"));
        assert_eq!(lines.next(), Some("1,-,\"Soap, lavender\",-,$3.50,5,1,ok"));
    }

    #[test]
    fn test_page_footer() {
        let products: Vec<_> = (1..=12).map(|i| product(i, "Soap", 100, 5)).collect();
        let p = paginate(products, 2, 10);
        let out = page(&p, OutputFormat::Table, &DisplayOptions::default()).unwrap();
        assert!(out.ends_with("Showing 11-12 of 12 | page 2 of 2\n"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
