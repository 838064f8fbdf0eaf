//! Typed query filters for the analytics library.
//!
//! User-selected filters never reach SQL as text. A filter compiles to a
//! WHERE fragment made of placeholders plus an ordered bind list, and the
//! selectable metric is a closed enum mapping to a fixed column expression.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Dashboard filter state: empty lists and `None` mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub categories: Vec<String>,
    pub regions: Vec<String>,
    pub segment: Option<String>,
    pub year: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A compiled WHERE fragment and its bind values, in placeholder order.
#[derive(Debug, Clone)]
pub struct FilterClause {
    pub sql: String,
    pub binds: Vec<FilterBind>,
}

#[derive(Debug, Clone)]
pub enum FilterBind {
    Text(String),
    Int(i64),
}

impl OrderFilter {
    pub fn for_category(category: Option<String>) -> Self {
        Self {
            categories: category.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Compile into a WHERE fragment. An unrestricted filter compiles to
    /// `1=1` so callers can always interpolate the fragment.
    pub fn compile(&self) -> FilterClause {
        let mut clauses = Vec::new();
        let mut binds = Vec::new();

        if !self.categories.is_empty() {
            clauses.push(format!("category IN ({})", placeholders(self.categories.len())));
            binds.extend(self.categories.iter().cloned().map(FilterBind::Text));
        }

        if !self.regions.is_empty() {
            clauses.push(format!("region IN ({})", placeholders(self.regions.len())));
            binds.extend(self.regions.iter().cloned().map(FilterBind::Text));
        }

        if let Some(segment) = &self.segment {
            clauses.push("segment = ?".to_string());
            binds.push(FilterBind::Text(segment.clone()));
        }

        if let Some(year) = self.year {
            clauses.push("year = ?".to_string());
            binds.push(FilterBind::Int(i64::from(year)));
        }

        // Dates are stored as ISO-8601 text, so range comparisons are
        // lexicographic and correct.
        if let Some(from) = self.date_from {
            clauses.push("order_date >= ?".to_string());
            binds.push(FilterBind::Text(from.format("%Y-%m-%d").to_string()));
        }

        if let Some(to) = self.date_to {
            clauses.push("order_date <= ?".to_string());
            binds.push(FilterBind::Text(to.format("%Y-%m-%d").to_string()));
        }

        let sql = if clauses.is_empty() {
            "1=1".to_string()
        } else {
            clauses.join(" AND ")
        };

        FilterClause { sql, binds }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Metric selectable on the time-series views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Revenue,
    Profit,
    Orders,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Revenue
    }
}

impl Metric {
    /// The aggregate expression for this metric. `orders` is cast to REAL
    /// so every metric decodes to the same row shape.
    pub fn sql_expr(&self) -> &'static str {
        match self {
            Metric::Revenue => "SUM(sale_price)",
            Metric::Profit => "SUM(profit)",
            Metric::Orders => "CAST(COUNT(*) AS REAL)",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "revenue" => Ok(Metric::Revenue),
            "profit" => Ok(Metric::Profit),
            "orders" => Ok(Metric::Orders),
            other => Err(AppError::ValidationError(format!(
                "Unknown metric '{}' (expected revenue, profit or orders)",
                other
            ))),
        }
    }
}
