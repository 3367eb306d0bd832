//! Report time windows and per-day series

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Money, Order};

/// Days covered by the trend series
pub const TREND_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Period {
    #[default]
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl Period {
    pub fn days(self) -> u32 {
        match self {
            Period::LastWeek => 7,
            Period::LastMonth => 30,
        }
    }

    /// Earliest `createdAt` still inside the window
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days()))
    }

    pub fn contains(self, order: &Order, now: DateTime<Utc>) -> bool {
        order.created_at >= self.cutoff(now)
    }

    pub fn filter<'a>(self, orders: &'a [Order], now: DateTime<Utc>) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.contains(o, now)).collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::LastWeek => write!(f, "7d"),
            Period::LastMonth => write!(f, "30d"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" | "7days" | "week" => Ok(Period::LastWeek),
            "30d" | "30days" | "month" => Ok(Period::LastMonth),
            other => Err(format!("Unknown period: {}. Use: 7d, 30d", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Money,
    pub orders: usize,
}

/// Revenue per UTC calendar day for the `days` days ending on `end`
///
/// Days without sales are present with zero revenue.
pub fn daily_series<'a, I>(orders: I, end: NaiveDate, days: u32) -> Vec<DailyRevenue>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mut by_day: HashMap<NaiveDate, (Money, usize)> = HashMap::new();
    for order in orders {
        let slot = by_day
            .entry(order.created_at.date_naive())
            .or_insert((Money::ZERO, 0));
        slot.0 += order.total();
        slot.1 += 1;
    }

    (0..days)
        .rev()
        .map(|back| {
            let date = end - Duration::days(i64::from(back));
            let (revenue, orders) = by_day.get(&date).copied().unwrap_or((Money::ZERO, 0));
            DailyRevenue {
                date,
                revenue,
                orders,
            }
        })
        .collect()
}

/// Daily series for the window of `period`, ending today
pub fn period_series(orders: &[Order], period: Period, now: DateTime<Utc>) -> Vec<DailyRevenue> {
    daily_series(period.filter(orders, now), now.date_naive(), period.days())
}

/// Fourteen-day series over every order, ending today
pub fn trend(orders: &[Order], now: DateTime<Utc>) -> Vec<DailyRevenue> {
    daily_series(orders, now.date_naive(), TREND_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::aggregate::fixtures::orders;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_filter() {
        let now = noon();
        let orders = orders(now);
        assert_eq!(Period::LastWeek.filter(&orders, now).len(), 2);
        assert_eq!(Period::LastMonth.filter(&orders, now).len(), 3);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let now = noon();
        let mut orders = orders(now);
        orders[2].created_at = now - Duration::days(7);
        assert_eq!(Period::LastWeek.filter(&orders, now).len(), 3);
    }

    #[test]
    fn test_period_series_has_one_entry_per_day() {
        let now = noon();
        let orders = orders(now);
        let series = period_series(&orders, Period::LastWeek, now);

        assert_eq!(series.len(), 7);
        assert_eq!(series[6].date, now.date_naive());
        assert_eq!(series[0].date, now.date_naive() - Duration::days(6));
        // order 1 was yesterday, order 2 three days ago
        assert_eq!(series[5].revenue, Money::from_cents(1700));
        assert_eq!(series[3].revenue, Money::from_cents(1400));
        assert_eq!(series[6].revenue, Money::ZERO);
    }

    #[test]
    fn test_trend_covers_fourteen_days() {
        let now = noon();
        let series = trend(&orders(now), now);
        assert_eq!(series.len(), 14);
        let total: Money = series.iter().map(|d| d.revenue).sum();
        // the 20-day-old order is outside the trend
        assert_eq!(total, Money::from_cents(3100));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!("30days".parse::<Period>().unwrap(), Period::LastMonth);
        assert_eq!("7d".parse::<Period>().unwrap(), Period::LastWeek);
        assert!("90d".parse::<Period>().is_err());
    }
}
