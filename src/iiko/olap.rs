//! OLAP request payloads and row normalization.

use chrono::NaiveDate;
use serde_json::{Value, json};

/// One normalized OLAP row.
#[derive(Debug, Clone, PartialEq)]
pub struct OlapRow {
    /// Raw date value as returned by the server.
    pub date: Option<String>,
    pub category_name: Option<String>,
    pub account_name: Option<String>,
    /// Unsigned amount; the sign is carried by `is_expense`.
    pub amount: f64,
    pub is_expense: bool,
}

impl OlapRow {
    /// Normalizes a raw JSON row.
    ///
    /// Accepts both the short (`category`, `account`) and the long
    /// (`categoryName`, `accountName`) field names.
    #[must_use]
    pub fn from_json(raw: &Value) -> Self {
        Self {
            date: string_field(raw, &["date", "Date"]),
            category_name: string_field(raw, &["category", "categoryName"]),
            account_name: string_field(raw, &["account", "accountName"]),
            amount: raw.get("amount").map_or(0.0, number_value),
            is_expense: raw.get("isExpense").is_some_and(truthy),
        }
    }

    /// Parses the date prefix (`YYYY-MM-DD`) of the raw date value.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?;
        let prefix = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// Extracts and normalizes the `data` array of an OLAP response.
#[must_use]
pub fn rows_from_response(body: &Value) -> Vec<OlapRow> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(OlapRow::from_json).collect())
        .unwrap_or_default()
}

/// Builds the TRANSACTIONS report request for an inclusive day range.
#[must_use]
pub fn transactions_request(from: NaiveDate, to: NaiveDate) -> Value {
    json!({
        "reportType": "TRANSACTIONS",
        "groupByRowFields": ["date", "category", "account"],
        "aggregateFields": ["amount", "isExpense"],
        "filters": {
            "filterType": "and",
            "operation": "AND",
            "filters": [
                {
                    "filterType": "date",
                    "field": "date",
                    "operation": "RANGE",
                    "valueFrom": from.format("%Y-%m-%dT00:00:00").to_string(),
                    "valueTo": to.format("%Y-%m-%dT23:59:59").to_string(),
                }
            ],
        },
    })
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn number_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_short_field_names() {
        let row = OlapRow::from_json(&json!({
            "date": "2024-03-05",
            "category": "Rent",
            "account": "Operational activity",
            "amount": 1500.5,
            "isExpense": true,
        }));
        assert_eq!(row.category_name.as_deref(), Some("Rent"));
        assert_eq!(row.account_name.as_deref(), Some("Operational activity"));
        assert!((row.amount - 1500.5).abs() < f64::EPSILON);
        assert!(row.is_expense);
    }

    #[test]
    fn test_row_long_field_names_and_string_amount() {
        let row = OlapRow::from_json(&json!({
            "categoryName": "Salary",
            "accountName": "Financial activity",
            "amount": "250,75",
        }));
        assert_eq!(row.category_name.as_deref(), Some("Salary"));
        assert!((row.amount - 250.75).abs() < f64::EPSILON);
        assert!(!row.is_expense);
        assert!(row.date.is_none());
    }

    #[test]
    fn test_row_null_amount_is_zero() {
        let row = OlapRow::from_json(&json!({"amount": null, "isExpense": 0}));
        assert!(row.amount.abs() < f64::EPSILON);
        assert!(!row.is_expense);
    }

    #[test]
    fn test_parsed_date_accepts_timestamps() {
        let row = OlapRow::from_json(&json!({"date": "2024-03-05T00:00:00"}));
        assert_eq!(row.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 5));

        let bad = OlapRow::from_json(&json!({"date": "yesterday"}));
        assert_eq!(bad.parsed_date(), None);
    }

    #[test]
    fn test_rows_from_response_without_data() {
        assert!(rows_from_response(&json!({"summary": {}})).is_empty());
        assert_eq!(rows_from_response(&json!({"data": [{}, {}]})).len(), 2);
    }

    #[test]
    fn test_transactions_request_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default();
        let request = transactions_request(from, from);
        let range = &request["filters"]["filters"][0];
        assert_eq!(range["valueFrom"], "2024-01-31T00:00:00");
        assert_eq!(range["valueTo"], "2024-01-31T23:59:59");
        assert_eq!(request["reportType"], "TRANSACTIONS");
    }
}
