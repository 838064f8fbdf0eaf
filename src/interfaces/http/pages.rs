//! Page-shaped endpoints: each mirrors one analysis view of the dashboard
//! and bundles the queries that view needs.

use actix_web::{get, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::filters::{Metric, OrderFilter};
use crate::domain::metrics::{
    CategoryPerformance, CategoryQuarterRevenue, CityRevenue, MetricPoint, MonthYearValue,
    ProductRevenue, QuarterlyPerformance, RegionPerformance, SegmentBreakdown, ShipModeBreakdown,
    StatePerformance, SubCategoryPerformance, YearKpis, YearlyGrowth, YearlyPerformance,
};
use crate::interfaces::http::{error_response, HttpState};

/// Product rankings show this many rows top and bottom.
const PRODUCT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub metric: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub categories: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegionsQuery {
    pub regions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub year: i32,
    pub kpis: YearKpis,
    pub yearly: Vec<YearlyPerformance>,
    pub segments: Vec<SegmentBreakdown>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub categories: Vec<CategoryPerformance>,
    pub top_products: Vec<ProductRevenue>,
    pub bottom_products: Vec<ProductRevenue>,
    pub sub_categories: Vec<SubCategoryPerformance>,
}

#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub regions: Vec<RegionPerformance>,
    pub states: Vec<StatePerformance>,
    pub ship_modes: Vec<ShipModeBreakdown>,
    pub cities: Vec<CityRevenue>,
}

#[derive(Debug, Serialize)]
pub struct TimeSeriesResponse {
    pub metric: Metric,
    pub monthly: Vec<MetricPoint>,
    pub by_month_year: Vec<MonthYearValue>,
    pub quarterly: Vec<QuarterlyPerformance>,
    pub category_quarters: Vec<CategoryQuarterRevenue>,
    pub growth: Vec<YearlyGrowth>,
}

/// Comma-separated list parameter ("Furniture,Technology").
pub(crate) fn parse_list(param: &Option<String>) -> Vec<String> {
    param
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_date(param: &Option<String>, name: &str) -> Result<Option<NaiveDate>> {
    match param.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::ValidationError(format!(
                    "Invalid date '{}' for {} (expected YYYY-MM-DD)",
                    value, name
                ))
            }),
    }
}

pub(crate) fn parse_metric(param: &Option<String>) -> Result<Metric> {
    match param.as_deref() {
        None | Some("") => Ok(Metric::default()),
        Some(value) => Metric::parse(value),
    }
}

pub(crate) fn product_filter(query: &ProductsQuery) -> Result<OrderFilter> {
    Ok(OrderFilter {
        categories: parse_list(&query.categories),
        date_from: parse_date(&query.from, "from")?,
        date_to: parse_date(&query.to, "to")?,
        ..OrderFilter::default()
    })
}

#[get("/trend/monthly")]
pub async fn trend_monthly(data: web::Data<HttpState>) -> impl Responder {
    match data.analytics.monthly_trend().await {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/overview")]
pub async fn overview(
    data: web::Data<HttpState>,
    query: web::Query<OverviewQuery>,
) -> impl Responder {
    let result = async {
        let year = match query.year {
            Some(year) => year,
            // Default to the most recent year on record.
            None => match data.orders.years().await?.last() {
                Some(&year) => year as i32,
                None => {
                    return Err(AppError::NotFound("No order data loaded".to_string()));
                }
            },
        };

        Ok(OverviewResponse {
            year,
            kpis: data.analytics.year_kpis(year).await?,
            yearly: data.analytics.yearly_performance().await?,
            segments: data.analytics.segment_breakdown().await?,
        })
    }
    .await;

    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/products")]
pub async fn products(
    data: web::Data<HttpState>,
    query: web::Query<ProductsQuery>,
) -> impl Responder {
    let result = async {
        let filter = product_filter(&query)?;
        Ok(ProductsResponse {
            categories: data.analytics.category_performance(&filter).await?,
            top_products: data
                .analytics
                .products_by_revenue(&filter, PRODUCT_LIMIT, false)
                .await?,
            bottom_products: data
                .analytics
                .products_by_revenue(&filter, PRODUCT_LIMIT, true)
                .await?,
            sub_categories: data.analytics.sub_category_performance(&filter).await?,
        })
    }
    .await;

    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/regions")]
pub async fn regions(
    data: web::Data<HttpState>,
    query: web::Query<RegionsQuery>,
) -> impl Responder {
    let filter = OrderFilter {
        regions: parse_list(&query.regions),
        ..OrderFilter::default()
    };

    let result = async {
        Ok::<_, AppError>(RegionsResponse {
            regions: data.analytics.region_performance(&filter).await?,
            states: data.analytics.top_states(&filter).await?,
            ship_modes: data.analytics.ship_mode_by_region(&filter).await?,
            cities: data.analytics.top_cities(&filter).await?,
        })
    }
    .await;

    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/timeseries")]
pub async fn timeseries(
    data: web::Data<HttpState>,
    query: web::Query<TrendQuery>,
) -> impl Responder {
    let result = async {
        let metric = parse_metric(&query.metric)?;
        let filter = OrderFilter::for_category(query.category.clone().filter(|c| !c.is_empty()));

        Ok(TimeSeriesResponse {
            metric,
            monthly: data.analytics.metric_by_month(metric, &filter).await?,
            by_month_year: data.analytics.metric_by_month_year(metric, &filter).await?,
            quarterly: data.analytics.quarterly_performance(metric, &filter).await?,
            category_quarters: data.analytics.category_quarter_revenue().await?,
            growth: data.analytics.yearly_growth().await?,
        })
    }
    .await;

    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}
