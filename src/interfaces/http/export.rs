//! CSV download endpoints, mirroring the dashboard's report views.

use actix_web::{get, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::filters::OrderFilter;
use crate::interfaces::http::pages::{parse_list, parse_metric, product_filter, ProductsQuery};
use crate::interfaces::http::{error_response, HttpState};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub categories: Option<String>,
    pub regions: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub metric: Option<String>,
    pub category: Option<String>,
}

/// Serialize rows into CSV text. An empty report produces an empty file.
fn to_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to finish CSV export: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("Export is not valid UTF-8: {e}")))
}

fn csv_attachment(report: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}.csv\"", report),
        ))
        .body(body)
}

#[get("/export/{report}")]
pub async fn export_report(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> impl Responder {
    let report = path.into_inner();

    let result = async {
        match report.as_str() {
            "categories" => {
                let filter = product_filter(&ProductsQuery {
                    categories: query.categories.clone(),
                    from: query.from.clone(),
                    to: query.to.clone(),
                })?;
                let rows = data.analytics.category_performance(&filter).await?;
                to_csv(&rows)
            }
            "regions" => {
                let filter = OrderFilter {
                    regions: parse_list(&query.regions),
                    ..OrderFilter::default()
                };
                let rows = data.analytics.region_performance(&filter).await?;
                to_csv(&rows)
            }
            "monthly" => {
                let metric = parse_metric(&query.metric)?;
                let filter = OrderFilter::for_category(
                    query.category.clone().filter(|c| !c.is_empty()),
                );
                let rows = data.analytics.metric_by_month(metric, &filter).await?;
                to_csv(&rows)
            }
            other => Err(AppError::NotFound(format!("Unknown report '{}'", other))),
        }
    }
    .await;

    match result {
        Ok(body) => csv_attachment(&report, body),
        Err(e) => error_response(&data.logs, "HttpApi", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::CityRevenue;

    #[test]
    fn serializes_rows_with_header() {
        let rows = vec![CityRevenue {
            city: "Henderson".to_string(),
            state: "Kentucky".to_string(),
            region: "South".to_string(),
            orders: 3,
            revenue: 123.45,
        }];
        let csv = to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("city,state,region,orders,revenue"));
        assert_eq!(lines.next(), Some("Henderson,Kentucky,South,3,123.45"));
    }

    #[test]
    fn empty_report_is_empty_file() {
        let rows: Vec<CityRevenue> = Vec::new();
        assert!(to_csv(&rows).unwrap().is_empty());
    }
}
