use std::collections::HashSet;
use crate::common::RecordFamily;
use crate::db::Document;
use crate::format::{extract_number, format_date, plain_number};
use crate::value::{Row, Value};

/// How an import reacts to rows that already exist in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DuplicatePolicy {
    /// Abort the whole import when any row already exists
    Block,
    /// Drop existing rows and import the rest
    Skip,
}

impl DuplicatePolicy {
    pub(crate) fn default_for(family: RecordFamily) -> DuplicatePolicy {
        match family {
            RecordFamily::Folha => DuplicatePolicy::Block,
            RecordFamily::Nota => DuplicatePolicy::Skip,
        }
    }
}

/// An incoming row that matched a stored one
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Duplicate {
    /// Index of the row in the incoming list
    pub(crate) index: usize,
    pub(crate) label: String,
}

fn text_of(row: &Row, column: &str) -> String {
    match row.get_ignore_case(column) {
        Some(Value::Null) | None => String::new(),
        Some(v) => v.to_string().trim().to_uppercase(),
    }
}

fn number_of(row: &Row, column: &str) -> f64 {
    row.get_ignore_case(column).map(extract_number).unwrap_or(0.0)
}

/// Emission date of an invoice line as YYYY-MM-DD, whatever shape it was stored in
fn emission_date(row: &Row) -> String {
    let value = row.get_ignore_case("EMISSÃO").or_else(|| row.get_ignore_case("EMISSAO"));
    match value {
        Some(Value::Date(d)) => d.format("%Y-%m-%d").to_string(),
        Some(Value::Text(s)) => crate::format::parse_date(s)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| s.trim().to_string()),
        Some(Value::Number(serial)) => crate::format::excel_serial_to_date(*serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Derive the string identifying a row across imports.
///
/// Payroll: `EMPLOYEE-MONTH-YEAR`. Invoice line: `CUSTOMER|INVOICE|YYYY-MM-DD|TOTAL`.
pub(crate) fn natural_key(family: RecordFamily, row: &Row) -> String {
    match family {
        RecordFamily::Folha => format!(
            "{}-{}-{}",
            text_of(row, "FUNCIONARIO"),
            plain_number(number_of(row, "MES")),
            plain_number(number_of(row, "ANO"))
        ),
        RecordFamily::Nota => format!(
            "{}|{}|{}|{:.2}",
            text_of(row, "NOME CLIFOR"),
            plain_number(number_of(row, "NF")),
            emission_date(row),
            // -0 prints as "-0.00"
            number_of(row, "TOTAL") + 0.0
        ),
    }
}

/// Label shown to the user for a duplicated row
pub(crate) fn duplicate_label(family: RecordFamily, row: &Row) -> String {
    let name = |column: &str| row.get_ignore_case(column).map(|v| v.to_string().trim().to_string()).unwrap_or_default();
    match family {
        RecordFamily::Folha => format!(
            "{} - {}/{}",
            name("FUNCIONARIO"),
            plain_number(number_of(row, "MES")),
            plain_number(number_of(row, "ANO"))
        ),
        RecordFamily::Nota => {
            let date = emission_date(row);
            let date = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map(|d| format_date(&d))
                .unwrap_or(date);
            format!("{} - NF {} - {}", name("NOME CLIFOR"), plain_number(number_of(row, "NF")), date)
        }
    }
}

/// Incoming rows whose natural key is already present among the stored documents.
/// Repeats inside the incoming rows themselves are not reported.
pub(crate) fn find_duplicates(family: RecordFamily, existing: &[Document], incoming: &[Row]) -> Vec<Duplicate> {
    let existing_keys: HashSet<String> = existing.iter()
        .map(|doc| natural_key(family, &doc.fields))
        .collect();

    incoming.iter()
        .enumerate()
        .filter(|(_, row)| existing_keys.contains(&natural_key(family, row)))
        .map(|(index, row)| Duplicate { index, label: duplicate_label(family, row) })
        .collect()
}

/// Message explaining why an import was blocked, listing at most `max_shown` records
pub(crate) fn duplicate_summary(duplicates: &[Duplicate], max_shown: usize) -> String {
    let shown = duplicates.iter()
        .take(max_shown)
        .map(|d| d.label.as_str())
        .collect::<Vec<&str>>()
        .join(", ");
    let more = if duplicates.len() > max_shown {
        format!(" and {} more record(s)", duplicates.len() - max_shown)
    } else {
        String::new()
    };
    format!("Import blocked! {} record(s) already exist in the database: {}{}", duplicates.len(), shown, more)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use super::*;

    fn folha_row(name: &str, mes: Value, ano: Value) -> Row {
        vec![
            ("FUNCIONARIO".to_string(), Value::from(name)),
            ("MES".to_string(), mes),
            ("ANO".to_string(), ano),
        ].into_iter().collect()
    }

    fn nota_row(name: &str, nf: f64, emissao: Value, total: f64) -> Row {
        vec![
            ("NOME CLIFOR".to_string(), Value::from(name)),
            ("NF".to_string(), Value::Number(nf)),
            ("EMISSÃO".to_string(), emissao),
            ("TOTAL".to_string(), Value::Number(total)),
        ].into_iter().collect()
    }

    #[test]
    fn test_folha_key_normalizes_name_and_numbers() {
        let a = folha_row("  Ana Souza ", Value::Number(3.0), Value::Number(2024.0));
        let b = folha_row("ANA SOUZA", Value::from("03"), Value::from("2024"));
        assert_eq!(natural_key(RecordFamily::Folha, &a), "ANA SOUZA-3-2024");
        assert_eq!(natural_key(RecordFamily::Folha, &a), natural_key(RecordFamily::Folha, &b));
    }

    #[test]
    fn test_nota_key_normalizes_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let stored = nota_row("Acme Ltda", 5001.0, Value::Date(date), 950.0);
        let incoming = nota_row("ACME LTDA", 5001.0, Value::from("05/03/2024"), 950.0);
        assert_eq!(natural_key(RecordFamily::Nota, &stored), "ACME LTDA|5001|2024-03-05|950.00");
        assert_eq!(natural_key(RecordFamily::Nota, &stored), natural_key(RecordFamily::Nota, &incoming));
        assert_eq!(duplicate_label(RecordFamily::Nota, &incoming), "ACME LTDA - NF 5001 - 05/03/2024");
    }

    #[test]
    fn test_nota_key_zero_total() {
        let stored = nota_row("ACME LTDA", 5001.0, Value::from("05/03/2024"), 0.0);
        let incoming = nota_row("ACME LTDA", 5001.0, Value::from("05/03/2024"), -0.0);
        assert_eq!(natural_key(RecordFamily::Nota, &incoming), "ACME LTDA|5001|2024-03-05|0.00");
        assert_eq!(natural_key(RecordFamily::Nota, &stored), natural_key(RecordFamily::Nota, &incoming));
    }

    #[test]
    fn test_find_duplicates() {
        let existing = vec![Document::new(1, folha_row("ANA", Value::Number(1.0), Value::Number(2024.0)))];
        let incoming = vec![
            folha_row("ana", Value::Number(1.0), Value::Number(2024.0)),
            folha_row("ANA", Value::Number(2.0), Value::Number(2024.0)),
            folha_row("ANA", Value::Number(1.0), Value::Number(2024.0)),
        ];
        let duplicates = find_duplicates(RecordFamily::Folha, &existing, &incoming);
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0], Duplicate { index: 0, label: "ana - 1/2024".to_string() });
        assert_eq!(duplicates[1].index, 2);
    }

    #[test]
    fn test_duplicate_summary_truncates() {
        let duplicates: Vec<Duplicate> = (0..12).map(|i| Duplicate { index: i, label: format!("R{i}") }).collect();
        let summary = duplicate_summary(&duplicates, 10);
        assert!(summary.starts_with("Import blocked! 12 record(s) already exist in the database: R0, R1"));
        assert!(summary.ends_with("R9 and 2 more record(s)"));
        assert!(!summary.contains("R10"));

        let summary = duplicate_summary(&duplicates[..1], 10);
        assert_eq!(summary, "Import blocked! 1 record(s) already exist in the database: R0");
    }
}
