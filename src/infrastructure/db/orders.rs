use std::path::Path;

use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;

use crate::domain::error::{AppError, Result};
use crate::domain::order::Order;
use crate::infrastructure::db::connection::{apply_schema, init_db};

/// Rows inserted per transaction while seeding.
const INSERT_CHUNK_SIZE: usize = 1000;

/// Repository for the orders table itself: loading data and the lookup
/// queries that feed the dashboard filter controls.
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let pool = init_db(db_path).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Replace all order data: drop the summary view and table, re-apply
    /// the schema, then insert in chunked transactions.
    pub async fn replace_all(&self, orders: &[Order]) -> Result<u64> {
        sqlx::query("DROP VIEW IF EXISTS order_summary")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to drop order_summary: {e}")))?;

        sqlx::query("DROP TABLE IF EXISTS orders")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to drop orders table: {e}")))?;

        apply_schema(&self.pool).await?;

        for chunk in orders.chunks(INSERT_CHUNK_SIZE) {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

            for order in chunk {
                sqlx::query(
                    "INSERT INTO orders (
                        order_id, order_date, ship_mode, segment, country, city, state,
                        postal_code, region, category, sub_category, product_id,
                        cost_price, list_price, quantity, discount_percent,
                        discount, sale_price, profit, profit_margin,
                        year, month, month_name, quarter
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(order.order_id)
                .bind(order.order_date)
                .bind(&order.ship_mode)
                .bind(&order.segment)
                .bind(&order.country)
                .bind(&order.city)
                .bind(&order.state)
                .bind(&order.postal_code)
                .bind(&order.region)
                .bind(&order.category)
                .bind(&order.sub_category)
                .bind(&order.product_id)
                .bind(order.cost_price)
                .bind(order.list_price)
                .bind(order.quantity)
                .bind(order.discount_percent)
                .bind(order.discount)
                .bind(order.sale_price)
                .bind(order.profit)
                .bind(order.profit_margin)
                .bind(order.year)
                .bind(order.month)
                .bind(&order.month_name)
                .bind(order.quarter)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!(
                        "Failed to insert order {}: {e}",
                        order.order_id
                    ))
                })?;
            }

            tx.commit()
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to commit chunk: {e}")))?;
        }

        Ok(orders.len() as u64)
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count orders: {e}")))
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT category FROM orders ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch categories: {e}")))
    }

    pub async fn regions(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT region FROM orders ORDER BY region")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch regions: {e}")))
    }

    pub async fn segments(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT segment FROM orders ORDER BY segment")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch segments: {e}")))
    }

    pub async fn years(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar("SELECT DISTINCT year FROM orders ORDER BY year")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch years: {e}")))
    }

    pub async fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        sqlx::query_as(
            "SELECT MIN(order_date) AS min_date, MAX(order_date) AS max_date FROM orders",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch date range: {e}")))
    }
}
