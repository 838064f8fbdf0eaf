// ============================================================
// CSV READER
// ============================================================
// Read CSV exports with delimiter and encoding detection, exposing
// records by normalized (snake_case) header name.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::error::{AppError, Result};

/// A parsed CSV file: normalized headers plus raw records.
#[derive(Debug)]
pub struct CsvTable {
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl CsvTable {
    /// Load a CSV file, detecting delimiter and encoding.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_with_encoding_detection(path)?;
        let delimiter = detect_delimiter(&content);
        Self::parse(&content, delimiter)
    }

    /// Parse CSV content with an explicit delimiter.
    pub fn parse(content: &str, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            columns.entry(header.clone()).or_insert(idx);
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            records.push(record);
        }

        Ok(Self {
            headers,
            columns,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a field of a record by normalized header name.
    pub fn value<'a>(&self, record: &'a StringRecord, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|&idx| record.get(idx))
    }
}

/// Normalize a header for lookup: lowercase, non-alphanumeric runs become
/// single underscores ("Sub Category" -> "sub_category").
pub fn normalize_header(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Read a file as UTF-8, falling back to Windows-1252 for legacy exports.
fn read_with_encoding_detection(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            let (content, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(content.into_owned())
        }
    }
}

/// Detect the delimiter (comma, semicolon, tab, pipe) by scoring count
/// consistency across the first sample lines.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<_> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        if sample_lines.is_empty() {
            continue;
        }

        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_csv() {
        let content = "Order Id,Region\n1,South\n2,West";
        let table = CsvTable::parse(content, b',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.headers(), ["order_id", "region"]);
        assert_eq!(table.value(&table.records()[0], "region"), Some("South"));
        assert_eq!(table.value(&table.records()[1], "order_id"), Some("2"));
    }

    #[test]
    fn detects_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a|b|c\nd|e|f"), b'|');
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("Order Id"), "order_id");
        assert_eq!(normalize_header("cost price"), "cost_price");
        assert_eq!(normalize_header("Sub-Category"), "sub_category");
    }

    #[test]
    fn missing_column_is_none() {
        let content = "a,b\n1,2";
        let table = CsvTable::parse(content, b',').unwrap();
        assert_eq!(table.value(&table.records()[0], "missing"), None);
    }
}
