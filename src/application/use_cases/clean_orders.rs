//! Cleaning pipeline for raw retail-orders exports.
//!
//! Loads the raw CSV, converts NA placeholders to missing values,
//! normalizes headers, computes the derived pricing and date fields, and
//! writes a cleaned CSV ready for seeding.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use once_cell::sync::Lazy;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::order::{Order, RawOrder};
use crate::infrastructure::csv::CsvTable;

/// Placeholder strings the source export uses for missing values.
static NA_PLACEHOLDERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["Not Available", "unknown", "NA", "N/A", ""].into_iter().collect());

/// Run the full cleaning pipeline: read `input`, transform, write `output`.
/// Returns the cleaned records.
pub fn clean_orders(input: &Path, output: &Path) -> Result<Vec<Order>> {
    let table = CsvTable::load(input)?;

    let mut orders = Vec::with_capacity(table.len());
    for (idx, record) in table.records().iter().enumerate() {
        orders.push(parse_row(&table, record, idx + 1)?);
    }

    write_cleaned(&orders, output)?;

    info!(
        rows = orders.len(),
        output = %output.display(),
        "Cleaned data saved"
    );
    let min = orders.iter().map(|o| o.order_date).min();
    let max = orders.iter().map(|o| o.order_date).max();
    if let (Some(min), Some(max)) = (min, max) {
        info!(first = %min, last = %max, "Order date range");
    }

    Ok(orders)
}

/// Write cleaned records as CSV with snake_case headers.
pub fn write_cleaned(orders: &[Order], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::IoError(format!("Failed to open {}: {}", path.display(), e)))?;
    for order in orders {
        writer.serialize(order)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

fn parse_row(table: &CsvTable, record: &StringRecord, row: usize) -> Result<Order> {
    let raw = RawOrder {
        order_id: required_i64(table, record, "order_id", row)?,
        order_date: required_date(table, record, "order_date", row)?,
        ship_mode: optional(table, record, "ship_mode"),
        segment: required(table, record, "segment", row)?,
        country: required(table, record, "country", row)?,
        city: required(table, record, "city", row)?,
        state: required(table, record, "state", row)?,
        postal_code: optional(table, record, "postal_code"),
        region: required(table, record, "region", row)?,
        category: required(table, record, "category", row)?,
        sub_category: required(table, record, "sub_category", row)?,
        product_id: required(table, record, "product_id", row)?,
        cost_price: required_f64(table, record, "cost_price", row)?,
        list_price: required_f64(table, record, "list_price", row)?,
        quantity: required_i64(table, record, "quantity", row)?,
        discount_percent: required_f64(table, record, "discount_percent", row)?,
    };
    Ok(raw.finish())
}

/// A field is missing when absent or one of the NA placeholders.
fn field<'a>(table: &CsvTable, record: &'a StringRecord, column: &str) -> Option<&'a str> {
    table
        .value(record, column)
        .map(str::trim)
        .filter(|value| !NA_PLACEHOLDERS.contains(value))
}

fn optional(table: &CsvTable, record: &StringRecord, column: &str) -> Option<String> {
    field(table, record, column).map(str::to_string)
}

fn required(table: &CsvTable, record: &StringRecord, column: &str, row: usize) -> Result<String> {
    field(table, record, column)
        .map(str::to_string)
        .ok_or_else(|| AppError::ParseError(format!("Row {}: missing value for {}", row, column)))
}

fn required_f64(table: &CsvTable, record: &StringRecord, column: &str, row: usize) -> Result<f64> {
    let value = required(table, record, column, row)?;
    value.parse().map_err(|_| {
        AppError::ParseError(format!("Row {}: invalid number '{}' for {}", row, value, column))
    })
}

fn required_i64(table: &CsvTable, record: &StringRecord, column: &str, row: usize) -> Result<i64> {
    let value = required(table, record, column, row)?;
    value.parse().map_err(|_| {
        AppError::ParseError(format!("Row {}: invalid integer '{}' for {}", row, value, column))
    })
}

fn required_date(
    table: &CsvTable,
    record: &StringRecord,
    column: &str,
    row: usize,
) -> Result<NaiveDate> {
    let value = required(table, record, column, row)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        AppError::ParseError(format!("Row {}: invalid date '{}' for {}", row, value, column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::CLEANED_COLUMNS;

    const SAMPLE_CSV: &str = "\
Order Id,Order Date,Ship Mode,Segment,Country,City,State,Postal Code,Region,Category,Sub Category,Product Id,cost price,List Price,Quantity,Discount Percent
1,2023-03-01,Second Class,Consumer,United States,Henderson,Kentucky,42420,South,Furniture,Bookcases,FUR-BO-10001798,240,260,2,2
2,2023-08-15,Second Class,Consumer,United States,Henderson,Kentucky,42420,South,Furniture,Chairs,FUR-CH-10000454,600,730,3,3
3,2023-01-10,Not Available,Corporate,United States,Los Angeles,California,90036,West,Office Supplies,Labels,OFF-LA-10000240,10,10,2,5
4,2022-06-18,Standard Class,Consumer,United States,Fort Lauderdale,Florida,33311,South,Furniture,Tables,FUR-TA-10000577,780,960,5,2
5,2022-07-13,unknown,Consumer,United States,Fort Lauderdale,Florida,33311,South,Office Supplies,Storage,OFF-ST-10000760,20,20,2,5
";

    fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        path
    }

    #[test]
    fn preserves_row_count_and_converts_na() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(&dir);
        let output = dir.path().join("orders_clean.csv");

        let orders = clean_orders(&input, &output).unwrap();
        assert_eq!(orders.len(), 5);
        // "Not Available" and "unknown" ship modes become missing.
        assert_eq!(orders.iter().filter(|o| o.ship_mode.is_none()).count(), 2);
    }

    #[test]
    fn computes_derived_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(&dir);
        let output = dir.path().join("orders_clean.csv");

        let orders = clean_orders(&input, &output).unwrap();
        let first = &orders[0];
        // list_price=260, discount_percent=2 -> discount=5.2, sale=254.8
        assert!((first.discount - 5.2).abs() < 1e-9);
        assert!((first.sale_price - 254.8).abs() < 1e-9);
        assert!((first.profit - 14.8).abs() < 1e-9);
        assert_eq!(first.year, 2023);
        assert_eq!(first.month_name, "March");
        assert_eq!(first.quarter, 1);
        assert_eq!(first.category, "Furniture");
    }

    #[test]
    fn writes_cleaned_csv_with_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(&dir);
        let output = dir.path().join("orders_clean.csv");

        let orders = clean_orders(&input, &output).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, CLEANED_COLUMNS.join(","));
        // header + one line per record
        assert_eq!(content.lines().count(), orders.len() + 1);
    }

    #[test]
    fn zero_prices_do_not_divide_by_zero() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "\
Order Id,Order Date,Ship Mode,Segment,Country,City,State,Postal Code,Region,Category,Sub Category,Product Id,cost price,List Price,Quantity,Discount Percent
1,2023-01-01,Standard Class,Consumer,United States,City,State,12345,South,Furniture,Chairs,PRD-001,0,0,1,5
";
        let input = dir.path().join("zero.csv");
        std::fs::write(&input, csv).unwrap();
        let output = dir.path().join("out.csv");

        let orders = clean_orders(&input, &output).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].profit_margin, 0.0);
    }

    #[test]
    fn missing_required_field_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "\
Order Id,Order Date,Ship Mode,Segment,Country,City,State,Postal Code,Region,Category,Sub Category,Product Id,cost price,List Price,Quantity,Discount Percent
1,2023-01-01,Standard Class,Consumer,United States,City,State,12345,,Furniture,Chairs,PRD-001,100,150,1,10
";
        let input = dir.path().join("bad.csv");
        std::fs::write(&input, csv).unwrap();
        let output = dir.path().join("out.csv");

        let err = clean_orders(&input, &output).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Row 1"));
        assert!(message.contains("region"));
    }
}
