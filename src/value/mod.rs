use std::cmp::Ordering;
use std::fmt;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::format::{format_date, plain_number};

/// A typed spreadsheet cell
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl Value {
    /// Mirrors spreadsheet truthiness: null, empty text, zero and false are "empty".
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => *n == 0.0 || n.is_nan(),
            Value::Text(s) => s.is_empty(),
            Value::Date(_) => false,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }

    /// Total ordering used when sorting listings. Values of different kinds group by
    /// kind (null, bool, number, date, text), then compare within the kind.
    pub(crate) fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Date(_) => 3,
            Value::Text(_) => 4,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", plain_number(*n)),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", format_date(d)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// One spreadsheet record. Keeps the column order of the source sheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub(crate) struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub(crate) fn new() -> Row {
        Row { fields: vec![] }
    }

    /// Set a column. Replaces the value in place if the column already exists.
    pub(crate) fn insert<S: Into<String>>(&mut self, column: S, value: Value) {
        let column = column.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.fields.push((column, value)),
        }
    }

    pub(crate) fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Case-insensitive column lookup, exact matches win.
    pub(crate) fn get_ignore_case(&self, column: &str) -> Option<&Value> {
        self.get(column).or_else(|| {
            let upper = column.to_uppercase();
            self.fields.iter().find(|(c, _)| c.to_uppercase() == upper).map(|(_, v)| v)
        })
    }

    pub(crate) fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (column, value) in &self.fields {
            map.insert(column.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use super::*;

    #[test]
    fn test_row_keeps_column_order() {
        let mut row = Row::new();
        row.insert("NF", Value::Number(12.0));
        row.insert("CLIFOR", "abc".into());
        row.insert("NF", Value::Number(13.0));
        assert_eq!(row.columns().collect::<Vec<&str>>(), vec!["NF", "CLIFOR"]);
        assert_eq!(row.get("NF"), Some(&Value::Number(13.0)));
        assert_eq!(row.get_ignore_case("clifor"), Some(&Value::Text("abc".to_string())));
    }

    #[test]
    fn test_value_display_and_compare() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Value::Date(date).to_string(), "05/03/2024");
        assert_eq!(Value::Number(10.0).compare(&Value::Number(9.0)), Ordering::Greater);
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ordering::Greater);
        assert!(Value::Number(0.0).is_empty());
        assert!(!Value::from("x").is_empty());
    }

    #[test]
    fn test_compare_mixed_kinds() {
        // 10 > 9 numerically but "10" < "9" as text: kinds must not mix
        assert_eq!(Value::Number(10.0).compare(&Value::Number(9.0)), Ordering::Greater);
        assert_eq!(Value::Number(10.0).compare(&Value::from("9")), Ordering::Less);
        assert_eq!(Value::Number(9.0).compare(&Value::from("10")), Ordering::Less);
        assert_eq!(Value::Null.compare(&Value::Number(-1.0)), Ordering::Less);
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
        assert_eq!(Value::Number(f64::NAN).compare(&Value::Number(f64::NAN)), Ordering::Equal);
    }
}
