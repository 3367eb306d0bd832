//! Sales, customer and inventory reports computed client-side.

mod aggregate;
mod dashboard;
mod period;

pub use aggregate::{
    customer_report, inventory_report, revenue_by_category, summarize, top_products,
    CategorySales, CustomerRanking, CustomerReport, InventoryReport, ProductSales, SalesSummary,
    StockItem, DEFAULT_TOP_N, INVENTORY_DETAIL_LIMIT,
};
pub use dashboard::{Dashboard, ReportData};
pub use period::{daily_series, period_series, trend, DailyRevenue, Period, TREND_DAYS};
