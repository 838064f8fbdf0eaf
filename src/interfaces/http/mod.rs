pub mod export;
pub mod pages;

use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::error::AppError;
use crate::domain::metrics::FilterOptions;
use crate::infrastructure::db::{AnalyticsRepository, OrderRepository};

const DASHBOARD_HTML: &str = include_str!("../../../resources/dashboard.html");

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub orders: Arc<OrderRepository>,
    pub analytics: Arc<AnalyticsRepository>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Map an error to its HTTP response: validation problems are the client's,
/// everything else is a 500.
pub(crate) fn error_response(
    logs: &Mutex<Vec<LogEntry>>,
    source: &str,
    err: AppError,
) -> HttpResponse {
    add_log(logs, "ERROR", source, &err.to_string());
    match err {
        AppError::ValidationError(_) => HttpResponse::BadRequest().body(err.to_string()),
        AppError::NotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        _ => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[get("/")]
async fn dashboard() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DASHBOARD_HTML)
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(data.orders.pool()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "HttpApi",
                &format!("Health check failed: {}", e),
            );
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

#[get("/summary")]
async fn summary(data: web::Data<HttpState>) -> impl Responder {
    match data.analytics.summary().await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/filters")]
async fn filters(data: web::Data<HttpState>) -> impl Responder {
    let result = async {
        let (first_order_date, last_order_date) = data.orders.date_range().await?;
        Ok::<_, AppError>(FilterOptions {
            categories: data.orders.categories().await?,
            regions: data.orders.regions().await?,
            segments: data.orders.segments().await?,
            years: data.orders.years().await?,
            first_order_date,
            last_order_date,
        })
    }
    .await;

    match result {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap();
    HttpResponse::Ok().json(&*logs)
}

/// Register every route; shared between the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard).service(
        web::scope("/api")
            .service(health)
            .service(summary)
            .service(filters)
            .service(get_logs)
            .service(pages::trend_monthly)
            .service(pages::overview)
            .service(pages::products)
            .service(pages::regions)
            .service(pages::timeseries)
            .service(export::export_report),
    );
}

pub fn start_server(
    orders: Arc<OrderRepository>,
    analytics: Arc<AnalyticsRepository>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let state = web::Data::new(HttpState {
        orders,
        analytics,
        logs: logs.clone(),
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // local dashboard, all origins allowed

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    add_log(
        &logs,
        "INFO",
        "System",
        &format!("Dashboard server started on {}:{}", host, port),
    );

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::SummaryStats;
    use crate::domain::order::RawOrder;
    use actix_web::{http::StatusCode, test};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn sample_state(dir: &TempDir) -> web::Data<HttpState> {
        let db_path = dir.path().join("orders.db");
        let orders = OrderRepository::connect(&db_path).await.unwrap();

        let records: Vec<_> = [
            (1, "2022-03-10", "Furniture", "South", 100.0),
            (2, "2023-03-05", "Technology", "West", 200.0),
        ]
        .into_iter()
        .map(|(id, date, category, region, list_price)| {
            RawOrder {
                order_id: id,
                order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                ship_mode: Some("Standard Class".to_string()),
                segment: "Consumer".to_string(),
                country: "United States".to_string(),
                city: "Henderson".to_string(),
                state: "Kentucky".to_string(),
                postal_code: Some("42420".to_string()),
                region: region.to_string(),
                category: category.to_string(),
                sub_category: "Misc".to_string(),
                product_id: format!("PRD-{id}"),
                cost_price: list_price / 2.0,
                list_price,
                quantity: 1,
                discount_percent: 0.0,
            }
            .finish()
        })
        .collect();
        orders.replace_all(&records).await.unwrap();

        let analytics = AnalyticsRepository::new(orders.pool().clone());
        web::Data::new(HttpState {
            orders: Arc::new(orders),
            analytics: Arc::new(analytics),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    #[actix_web::test]
    async fn summary_endpoint_returns_totals() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/summary").to_request();
        let stats: SummaryStats = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats.total_orders, 2);
        assert!((stats.total_revenue - 300.0).abs() < 1e-6);
    }

    #[actix_web::test]
    async fn filters_endpoint_lists_options() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/filters").to_request();
        let options: FilterOptions = test::call_and_read_body_json(&app, req).await;
        assert_eq!(options.categories, ["Furniture", "Technology"]);
        assert_eq!(options.years, [2022, 2023]);
    }

    #[actix_web::test]
    async fn unknown_metric_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/timeseries?metric=margin")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn dashboard_is_served_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[actix_web::test]
    async fn export_rejects_unknown_report() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/export/everything")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn export_categories_returns_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(&dir).await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/export/categories")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/csv"));

        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.starts_with("category,"));
        assert!(text.contains("Furniture"));
    }

    #[::core::prelude::v1::test]
    fn log_ring_is_capped() {
        let logs = Mutex::new(Vec::new());
        for i in 0..150 {
            add_log(&logs, "INFO", "Test", &format!("entry {i}"));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 50");
    }
}
