//! Row types returned by the analytics query library.
//!
//! Each struct maps one aggregate query's result row; field names match the
//! column aliases in the SQL.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// High-level totals from the `order_summary` view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SummaryStats {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub avg_order_value: f64,
    pub avg_profit_margin: f64,
    pub first_order_date: Option<NaiveDate>,
    pub last_order_date: Option<NaiveDate>,
}

/// Available filter options for the dashboard controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub regions: Vec<String>,
    pub segments: Vec<String>,
    pub years: Vec<i64>,
    pub first_order_date: Option<NaiveDate>,
    pub last_order_date: Option<NaiveDate>,
}

/// Monthly revenue and profit for the home trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MonthlyTrend {
    pub year: i64,
    pub month: i64,
    pub month_name: String,
    pub revenue: f64,
    pub profit: f64,
}

/// KPI block for a single year.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct YearKpis {
    pub orders: i64,
    pub revenue: f64,
    pub profit: f64,
    pub avg_margin: f64,
    pub avg_order_value: f64,
}

/// One year's aggregates for the year-over-year comparison.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct YearlyPerformance {
    pub year: i64,
    pub revenue: f64,
    pub profit: f64,
    pub orders: i64,
    pub avg_margin: f64,
}

/// Customer segment breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SegmentBreakdown {
    pub segment: String,
    pub orders: i64,
    pub revenue: f64,
    pub profit: f64,
    pub avg_margin: f64,
}

/// Per-category aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryPerformance {
    pub category: String,
    pub orders: i64,
    pub units_sold: i64,
    pub revenue: f64,
    pub profit: f64,
    pub avg_margin: f64,
}

/// Per-sub-category aggregates (treemap view).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubCategoryPerformance {
    pub category: String,
    pub sub_category: String,
    pub orders: i64,
    pub revenue: f64,
    pub avg_margin: f64,
}

/// A product ranked by revenue.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductRevenue {
    pub product_id: String,
    pub category: String,
    pub sub_category: String,
    pub revenue: f64,
    pub avg_margin: f64,
}

/// Regional aggregates with share of total revenue.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RegionPerformance {
    pub region: String,
    pub orders: i64,
    pub revenue: f64,
    pub profit: f64,
    pub avg_margin: f64,
    pub revenue_share: f64,
}

/// State-level aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatePerformance {
    pub state: String,
    pub region: String,
    pub orders: i64,
    pub revenue: f64,
    pub profit: f64,
    pub avg_margin: f64,
}

/// Ship-mode distribution within a region.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShipModeBreakdown {
    pub region: String,
    pub ship_mode: String,
    pub orders: i64,
    pub revenue: f64,
    pub avg_margin: f64,
}

/// City-level revenue.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CityRevenue {
    pub city: String,
    pub state: String,
    pub region: String,
    pub orders: i64,
    pub revenue: f64,
}

/// One month's value of the selected metric.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MetricPoint {
    pub year: i64,
    pub month: i64,
    pub month_name: String,
    pub value: f64,
}

/// Metric value per (month, year) pair for the year comparison chart.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MonthYearValue {
    pub month: i64,
    pub month_name: String,
    pub year: i64,
    pub value: f64,
}

/// Quarterly metric value with order count and margin.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuarterlyPerformance {
    pub year: i64,
    pub quarter: i64,
    pub value: f64,
    pub orders: i64,
    pub avg_margin: f64,
}

/// Category revenue per quarter (stacked area chart).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryQuarterRevenue {
    pub year: i64,
    pub quarter: i64,
    pub category: String,
    pub revenue: f64,
}

/// Year-over-year growth row: previous year's revenue and the percentage
/// change, NULL for the first year on record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct YearlyGrowth {
    pub year: i64,
    pub revenue: f64,
    pub profit: f64,
    pub orders: i64,
    pub prev_revenue: Option<f64>,
    pub revenue_growth: Option<f64>,
}
