use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column order of a cleaned orders CSV: the original export columns in
/// snake_case, followed by the derived columns.
pub const CLEANED_COLUMNS: [&str; 24] = [
    "order_id",
    "order_date",
    "ship_mode",
    "segment",
    "country",
    "city",
    "state",
    "postal_code",
    "region",
    "category",
    "sub_category",
    "product_id",
    "cost_price",
    "list_price",
    "quantity",
    "discount_percent",
    "discount",
    "sale_price",
    "profit",
    "profit_margin",
    "year",
    "month",
    "month_name",
    "quarter",
];

/// A cleaned retail order record: one transaction with product, geography,
/// pricing and derived profitability fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub ship_mode: Option<String>,
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_id: String,
    pub cost_price: f64,
    pub list_price: f64,
    pub quantity: i64,
    pub discount_percent: f64,
    pub discount: f64,
    pub sale_price: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
}

/// A raw order row as parsed from the source export, before derivation.
#[derive(Debug, Clone)]
pub struct RawOrder {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub ship_mode: Option<String>,
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_id: String,
    pub cost_price: f64,
    pub list_price: f64,
    pub quantity: i64,
    pub discount_percent: f64,
}

impl RawOrder {
    /// Compute the derived pricing and date fields and produce the cleaned
    /// record. Categorical columns are trimmed and title-cased here.
    pub fn finish(self) -> Order {
        let discount = self.list_price * self.discount_percent / 100.0;
        let sale_price = self.list_price - discount;
        let profit = sale_price - self.cost_price;
        // sale_price == 0 would divide by zero; margin is defined as 0 there.
        let profit_margin = if sale_price != 0.0 {
            round2(profit / sale_price * 100.0)
        } else {
            0.0
        };

        let month = self.order_date.month();

        Order {
            order_id: self.order_id,
            order_date: self.order_date,
            ship_mode: self.ship_mode,
            segment: self.segment,
            country: self.country,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            region: title_case(&self.region),
            category: title_case(&self.category),
            sub_category: title_case(&self.sub_category),
            product_id: self.product_id,
            cost_price: self.cost_price,
            list_price: self.list_price,
            quantity: self.quantity,
            discount_percent: self.discount_percent,
            discount,
            sale_price,
            profit,
            profit_margin,
            year: self.order_date.year(),
            month,
            month_name: month_name(month).to_string(),
            quarter: (month - 1) / 3 + 1,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1) % 12]
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trim and title-case a categorical value ("office  supplies" -> "Office
/// Supplies"). Word boundaries are whitespace runs, collapsed to single
/// spaces.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(list_price: f64, discount_percent: f64, cost_price: f64, date: &str) -> RawOrder {
        RawOrder {
            order_id: 1,
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            ship_mode: Some("Second Class".to_string()),
            segment: "Consumer".to_string(),
            country: "United States".to_string(),
            city: "Henderson".to_string(),
            state: "Kentucky".to_string(),
            postal_code: Some("42420".to_string()),
            region: "South".to_string(),
            category: "Furniture".to_string(),
            sub_category: "Bookcases".to_string(),
            product_id: "FUR-BO-10001798".to_string(),
            cost_price,
            list_price,
            quantity: 2,
            discount_percent,
        }
    }

    #[test]
    fn derives_discount_and_sale_price() {
        let order = raw(260.0, 2.0, 240.0, "2023-03-01").finish();
        assert!((order.discount - 5.2).abs() < 1e-9);
        assert!((order.sale_price - 254.8).abs() < 1e-9);
    }

    #[test]
    fn derives_profit_and_margin() {
        let order = raw(260.0, 2.0, 240.0, "2023-03-01").finish();
        assert!((order.profit - 14.8).abs() < 1e-9);
        let expected = round2(14.8 / 254.8 * 100.0);
        assert!((order.profit_margin - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_sale_price_has_zero_margin() {
        let order = raw(0.0, 5.0, 0.0, "2023-01-01").finish();
        assert_eq!(order.sale_price, 0.0);
        assert_eq!(order.profit_margin, 0.0);
    }

    #[test]
    fn extracts_date_components() {
        let order = raw(260.0, 2.0, 240.0, "2023-03-01").finish();
        assert_eq!(order.year, 2023);
        assert_eq!(order.month, 3);
        assert_eq!(order.month_name, "March");
        assert_eq!(order.quarter, 1);

        let order = raw(20.0, 5.0, 20.0, "2022-07-13").finish();
        assert_eq!(order.quarter, 3);
        assert_eq!(order.month_name, "July");
    }

    #[test]
    fn title_cases_categoricals() {
        let mut input = raw(10.0, 0.0, 5.0, "2023-01-01");
        input.category = " office supplies ".to_string();
        input.sub_category = "STORAGE".to_string();
        input.region = "south".to_string();
        let order = input.finish();
        assert_eq!(order.category, "Office Supplies");
        assert_eq!(order.sub_category, "Storage");
        assert_eq!(order.region, "South");
    }

    #[test]
    fn title_case_collapses_whitespace() {
        assert_eq!(title_case("  two   words "), "Two Words");
        assert_eq!(title_case(""), "");
    }
}
