//! The dashboard's query library: a fixed set of parameterized aggregations
//! over the orders table. Every dynamic value reaches SQL through bind
//! parameters; the only interpolated fragments are the compiled filter
//! clause (placeholders only) and the closed Metric expression.

use sqlx::sqlite::SqlitePool;

use crate::domain::error::{AppError, Result};
use crate::domain::filters::{FilterBind, Metric, OrderFilter};
use crate::domain::metrics::{
    CategoryPerformance, CategoryQuarterRevenue, CityRevenue, MetricPoint, MonthYearValue,
    MonthlyTrend, ProductRevenue, QuarterlyPerformance, RegionPerformance, SegmentBreakdown,
    ShipModeBreakdown, StatePerformance, SubCategoryPerformance, SummaryStats, YearKpis,
    YearlyGrowth, YearlyPerformance,
};

/// States need at least this many orders to appear in the ranking.
const MIN_STATE_ORDERS: i64 = 20;
const STATE_LIMIT: i64 = 15;
const CITY_LIMIT: i64 = 10;

pub struct AnalyticsRepository {
    pool: SqlitePool,
}

/// Attach a compiled filter clause's values to a query, in placeholder
/// order.
macro_rules! bind_filter {
    ($query:expr, $clause:expr) => {{
        let mut query = $query;
        for bind in &$clause.binds {
            query = match bind {
                FilterBind::Text(value) => query.bind(value.as_str()),
                FilterBind::Int(value) => query.bind(*value),
            };
        }
        query
    }};
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// High-level totals from the order_summary view.
    pub async fn summary(&self) -> Result<SummaryStats> {
        sqlx::query_as::<_, SummaryStats>(
            "SELECT total_orders, total_revenue, total_profit, avg_order_value,
                    avg_profit_margin, first_order_date, last_order_date
             FROM order_summary",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch summary: {e}")))
    }

    /// Monthly revenue and profit trend for the home chart.
    pub async fn monthly_trend(&self) -> Result<Vec<MonthlyTrend>> {
        sqlx::query_as::<_, MonthlyTrend>(
            "SELECT year, month, month_name,
                    SUM(sale_price) AS revenue,
                    SUM(profit) AS profit
             FROM orders
             GROUP BY year, month, month_name
             ORDER BY year, month",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch monthly trend: {e}")))
    }

    /// Products ranked by revenue, best-first or worst-first.
    pub async fn products_by_revenue(
        &self,
        filter: &OrderFilter,
        limit: i64,
        ascending: bool,
    ) -> Result<Vec<ProductRevenue>> {
        let clause = filter.compile();
        let direction = if ascending { "ASC" } else { "DESC" };
        let sql = format!(
            "SELECT product_id, category, sub_category,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY product_id, category, sub_category
             ORDER BY revenue {}
             LIMIT ?",
            clause.sql, direction
        );

        let query = sqlx::query_as::<_, ProductRevenue>(&sql);
        bind_filter!(query, clause)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to rank products: {e}")))
    }

    /// Regional aggregates with each region's share of total revenue.
    pub async fn region_performance(&self, filter: &OrderFilter) -> Result<Vec<RegionPerformance>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT region,
                    COUNT(DISTINCT order_id) AS orders,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(SUM(profit), 2) AS profit,
                    ROUND(AVG(profit_margin), 2) AS avg_margin,
                    ROUND(SUM(sale_price) * 100.0 / SUM(SUM(sale_price)) OVER (), 2)
                        AS revenue_share
             FROM orders
             WHERE {}
             GROUP BY region
             ORDER BY revenue DESC",
            clause.sql
        );

        let query = sqlx::query_as::<_, RegionPerformance>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch region performance: {e}")))
    }

    /// KPI block for a single year.
    pub async fn year_kpis(&self, year: i32) -> Result<YearKpis> {
        sqlx::query_as::<_, YearKpis>(
            "SELECT COUNT(*) AS orders,
                    COALESCE(SUM(sale_price), 0.0) AS revenue,
                    COALESCE(SUM(profit), 0.0) AS profit,
                    COALESCE(AVG(profit_margin), 0.0) AS avg_margin,
                    COALESCE(AVG(sale_price), 0.0) AS avg_order_value
             FROM orders
             WHERE year = ?",
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch year KPIs: {e}")))
    }

    /// Per-year aggregates for the year-over-year comparison.
    pub async fn yearly_performance(&self) -> Result<Vec<YearlyPerformance>> {
        sqlx::query_as::<_, YearlyPerformance>(
            "SELECT year,
                    SUM(sale_price) AS revenue,
                    SUM(profit) AS profit,
                    COUNT(*) AS orders,
                    AVG(profit_margin) AS avg_margin
             FROM orders
             GROUP BY year
             ORDER BY year",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch yearly performance: {e}")))
    }

    /// Customer segment breakdown, ordered by revenue.
    pub async fn segment_breakdown(&self) -> Result<Vec<SegmentBreakdown>> {
        sqlx::query_as::<_, SegmentBreakdown>(
            "SELECT segment,
                    COUNT(*) AS orders,
                    SUM(sale_price) AS revenue,
                    SUM(profit) AS profit,
                    AVG(profit_margin) AS avg_margin
             FROM orders
             GROUP BY segment
             ORDER BY revenue DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch segment breakdown: {e}")))
    }

    /// Per-category aggregates honoring the dashboard filters.
    pub async fn category_performance(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<CategoryPerformance>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT category,
                    COUNT(DISTINCT order_id) AS orders,
                    SUM(quantity) AS units_sold,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(SUM(profit), 2) AS profit,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY category
             ORDER BY revenue DESC",
            clause.sql
        );

        let query = sqlx::query_as::<_, CategoryPerformance>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to fetch category performance: {e}"))
            })
    }

    /// Per-sub-category aggregates (treemap view).
    pub async fn sub_category_performance(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<SubCategoryPerformance>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT category, sub_category,
                    COUNT(*) AS orders,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY category, sub_category
             ORDER BY revenue DESC",
            clause.sql
        );

        let query = sqlx::query_as::<_, SubCategoryPerformance>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to fetch sub-category performance: {e}"))
            })
    }

    /// Top states by revenue, limited to states with enough orders to be
    /// meaningful.
    pub async fn top_states(&self, filter: &OrderFilter) -> Result<Vec<StatePerformance>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT state, region,
                    COUNT(*) AS orders,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(SUM(profit), 2) AS profit,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY state, region
             HAVING COUNT(*) >= ?
             ORDER BY revenue DESC
             LIMIT ?",
            clause.sql
        );

        let query = sqlx::query_as::<_, StatePerformance>(&sql);
        bind_filter!(query, clause)
            .bind(MIN_STATE_ORDERS)
            .bind(STATE_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch top states: {e}")))
    }

    /// Ship-mode distribution per region; missing ship modes group under
    /// "Unknown".
    pub async fn ship_mode_by_region(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<ShipModeBreakdown>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT region,
                    COALESCE(ship_mode, 'Unknown') AS ship_mode,
                    COUNT(*) AS orders,
                    ROUND(SUM(sale_price), 2) AS revenue,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY region, ship_mode
             ORDER BY region, revenue DESC",
            clause.sql
        );

        let query = sqlx::query_as::<_, ShipModeBreakdown>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch ship modes: {e}")))
    }

    /// Top cities by revenue.
    pub async fn top_cities(&self, filter: &OrderFilter) -> Result<Vec<CityRevenue>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT city, state, region,
                    COUNT(*) AS orders,
                    ROUND(SUM(sale_price), 2) AS revenue
             FROM orders
             WHERE {}
             GROUP BY city, state, region
             ORDER BY revenue DESC
             LIMIT ?",
            clause.sql
        );

        let query = sqlx::query_as::<_, CityRevenue>(&sql);
        bind_filter!(query, clause)
            .bind(CITY_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch top cities: {e}")))
    }

    /// Monthly series of the selected metric.
    pub async fn metric_by_month(
        &self,
        metric: Metric,
        filter: &OrderFilter,
    ) -> Result<Vec<MetricPoint>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT year, month, month_name, {} AS value
             FROM orders
             WHERE {}
             GROUP BY year, month, month_name
             ORDER BY year, month",
            metric.sql_expr(),
            clause.sql
        );

        let query = sqlx::query_as::<_, MetricPoint>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch monthly series: {e}")))
    }

    /// Metric per (month, year) pair for the year comparison chart.
    pub async fn metric_by_month_year(
        &self,
        metric: Metric,
        filter: &OrderFilter,
    ) -> Result<Vec<MonthYearValue>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT month, month_name, year, {} AS value
             FROM orders
             WHERE {}
             GROUP BY month, month_name, year
             ORDER BY month, year",
            metric.sql_expr(),
            clause.sql
        );

        let query = sqlx::query_as::<_, MonthYearValue>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to fetch month/year series: {e}"))
            })
    }

    /// Quarterly metric values with order counts and margins.
    pub async fn quarterly_performance(
        &self,
        metric: Metric,
        filter: &OrderFilter,
    ) -> Result<Vec<QuarterlyPerformance>> {
        let clause = filter.compile();
        let sql = format!(
            "SELECT year, quarter, {} AS value,
                    COUNT(DISTINCT order_id) AS orders,
                    ROUND(AVG(profit_margin), 2) AS avg_margin
             FROM orders
             WHERE {}
             GROUP BY year, quarter
             ORDER BY year, quarter",
            metric.sql_expr(),
            clause.sql
        );

        let query = sqlx::query_as::<_, QuarterlyPerformance>(&sql);
        bind_filter!(query, clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to fetch quarterly performance: {e}"))
            })
    }

    /// Category revenue per quarter for the stacked area chart.
    pub async fn category_quarter_revenue(&self) -> Result<Vec<CategoryQuarterRevenue>> {
        sqlx::query_as::<_, CategoryQuarterRevenue>(
            "SELECT year, quarter, category,
                    SUM(sale_price) AS revenue
             FROM orders
             GROUP BY year, quarter, category
             ORDER BY year, quarter, category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to fetch category quarter revenue: {e}"))
        })
    }

    /// Year-over-year growth via LAG over the yearly totals. The first year
    /// on record has NULL growth.
    pub async fn yearly_growth(&self) -> Result<Vec<YearlyGrowth>> {
        sqlx::query_as::<_, YearlyGrowth>(
            "WITH yearly AS (
                 SELECT year,
                        SUM(sale_price) AS revenue,
                        SUM(profit) AS profit,
                        COUNT(*) AS orders
                 FROM orders
                 GROUP BY year
             )
             SELECT year, revenue, profit, orders,
                    LAG(revenue) OVER (ORDER BY year) AS prev_revenue,
                    ROUND((revenue - LAG(revenue) OVER (ORDER BY year)) * 100.0 /
                          NULLIF(LAG(revenue) OVER (ORDER BY year), 0), 2) AS revenue_growth
             FROM yearly
             ORDER BY year",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch yearly growth: {e}")))
    }
}
