pub(crate) mod chart;
pub(crate) mod earnings;
pub(crate) mod company_year;
pub(crate) mod payroll;

use chrono::NaiveDateTime;
use thiserror::Error;
use crate::db::Document;
use crate::format::{parse_date, parse_iso_datetime};
use crate::value::Value;

/// Name used when a record has no company or employee
pub(crate) const NO_NAME: &str = "Sem Nome";

#[derive(Error, Debug, PartialEq)]
pub(crate) enum AnalysisError {
    #[error("Invalid period, use mm/yyyy (e.g. 11/2024)")]
    InvalidPeriod,
    #[error("Select at least one company")]
    NoCompaniesSelected,
    #[error("No data found for the selected period")]
    NoData,
}

/// Which invoice columns hold the values an analysis needs
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnRoles {
    pub(crate) date: String,
    pub(crate) company: String,
    pub(crate) unit_value: String,
    pub(crate) gross_total: String,
    pub(crate) total: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        ColumnRoles {
            date: "EMISSÃO".to_string(),
            company: "NOME CLIFOR".to_string(),
            unit_value: "VALOR UNIT.".to_string(),
            gross_total: "TOTAL BRUTO".to_string(),
            total: "TOTAL".to_string(),
        }
    }
}

impl ColumnRoles {
    /// Look at the columns of the first document and pick the role columns.
    /// Later columns win when more than one matches.
    pub(crate) fn detect(docs: &[Document]) -> ColumnRoles {
        let mut roles = ColumnRoles::default();
        let first = match docs.first() {
            Some(doc) => doc,
            None => return roles,
        };

        for column in first.fields.columns() {
            let upper = column.to_uppercase();
            if upper.contains("EMISSÃO") || upper.contains("EMISSAO") {
                roles.date = column.to_string();
            }
            if upper.contains("NOME") && upper.contains("CLIFOR") {
                roles.company = column.to_string();
            }
            if upper == "VALOR UNIT." || upper == "VALOR UNITARIO" || upper == "VALOR UNITÁRIO" {
                roles.unit_value = column.to_string();
            }
            if upper == "TOTAL BRUTO" {
                roles.gross_total = column.to_string();
            }
            if upper == "TOTAL" {
                roles.total = column.to_string();
            }
        }
        roles
    }
}

/// Read a stored value as a date. Numbers are never dates here.
pub(crate) fn value_as_date(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value? {
        Value::Date(d) => Some(*d),
        Value::Text(s) if s.split('/').count() == 3 => parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)),
        Value::Text(s) => parse_iso_datetime(s),
        _ => None,
    }
}

/// Trimmed display name of a value, `Sem Nome` when empty
pub(crate) fn name_of(value: Option<&Value>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string().trim().to_string(),
        _ => NO_NAME.to_string(),
    }
}

/// Whether a user-typed company or employee name matches a stored one, ignoring case
/// (accented letters included) and surrounding blanks
pub(crate) fn same_name(filter: &str, name: &str) -> bool {
    filter.trim().to_lowercase() == name.trim().to_lowercase()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;
    use crate::value::Row;
    use super::*;

    pub(crate) fn doc(id: u32, fields: Vec<(&str, Value)>) -> Document {
        Document::new(id, fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Row>())
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_detect_roles() {
        let docs = vec![doc(1, vec![
            ("Emissao", Value::Null), ("Nome Clifor", Value::Null), ("Valor Unitário", Value::Null), ("total", Value::Null),
        ])];
        let roles = ColumnRoles::detect(&docs);
        assert_eq!(roles.date, "Emissao");
        assert_eq!(roles.company, "Nome Clifor");
        assert_eq!(roles.unit_value, "Valor Unitário");
        assert_eq!(roles.gross_total, "TOTAL BRUTO");
        assert_eq!(roles.total, "total");
        assert_eq!(ColumnRoles::detect(&[]), ColumnRoles::default());
    }

    #[test]
    fn test_value_as_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(value_as_date(Some(&Value::from("05/03/2024"))), Some(expected));
        assert_eq!(value_as_date(Some(&Value::from("2024-03-05"))), Some(expected));
        assert_eq!(value_as_date(Some(&date(2024, 3, 5))), Some(expected));
        assert_eq!(value_as_date(Some(&Value::Number(45356.0))), None);
        assert_eq!(value_as_date(Some(&Value::from("garbage"))), None);
        assert_eq!(value_as_date(None), None);
    }

    #[test]
    fn test_name_of() {
        assert_eq!(name_of(Some(&Value::from("  ACME "))), "ACME");
        assert_eq!(name_of(Some(&Value::from(""))), NO_NAME);
        assert_eq!(name_of(Some(&Value::Null)), NO_NAME);
        assert_eq!(name_of(None), NO_NAME);
    }

    #[test]
    fn test_same_name() {
        assert!(same_name("acme", "ACME"));
        assert!(same_name(" joão me ", "JOÃO ME"));
        assert!(!same_name("joao me", "JOÃO ME"));
        assert!(!same_name("acme", "ACME LTDA"));
    }
}
