use std::collections::{BTreeMap, BTreeSet};
use chrono::{Datelike, NaiveDate};
use crate::analysis::{name_of, same_name, value_as_date, AnalysisError, ColumnRoles};
use crate::db::Document;
use crate::format::{extract_number, parse_month_year};
use crate::util::{months_between, same_month_last_year};

/// Companies a company × year table covers
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompanySelection {
    All,
    Only(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompanyYearRow {
    pub(crate) company: String,
    pub(crate) year_totals: BTreeMap<i32, f64>,
    pub(crate) total: f64,
}

impl CompanyYearRow {
    pub(crate) fn cell(&self, year: i32) -> f64 {
        self.year_totals.get(&year).cloned().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompanyYearTable {
    /// Ascending
    pub(crate) years: Vec<i32>,
    /// Sorted by total, largest first
    pub(crate) rows: Vec<CompanyYearRow>,
    pub(crate) year_totals: Vec<(i32, f64)>,
    pub(crate) grand_total: f64,
}

/// Sorted distinct company names
pub(crate) fn all_companies(docs: &[Document]) -> Vec<String> {
    let roles = ColumnRoles::detect(docs);
    docs.iter()
        .map(|doc| name_of(doc.fields.get(&roles.company)))
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Same month last year to this month, as `mm/yyyy`
pub(crate) fn default_period(today: NaiveDate) -> (String, String) {
    let start = same_month_last_year(today);
    (format!("{:02}/{}", start.month(), start.year()), format!("{:02}/{}", today.month(), today.year()))
}

/// Sum `TOTAL BRUTO` per company and year between the start of `start` month and the end of `end` month
pub(crate) fn company_year_table(docs: &[Document], start: &str, end: &str,
                                 selection: &CompanySelection) -> Result<CompanyYearTable, AnalysisError> {
    let start = parse_month_year(start.trim()).ok_or(AnalysisError::InvalidPeriod)?;
    let end = parse_month_year(end.trim()).ok_or(AnalysisError::InvalidPeriod)?;
    if let CompanySelection::Only(companies) = selection {
        if companies.is_empty() {
            return Err(AnalysisError::NoCompaniesSelected);
        }
    }

    let roles = ColumnRoles::detect(docs);
    let period = months_between(start, end);

    let in_period: Vec<(&Document, i32)> = docs.iter()
        .filter_map(|doc| value_as_date(doc.fields.get(&roles.date))
            .filter(|date| period.contains(date))
            .map(|date| (doc, date.year())))
        .collect();
    if in_period.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let mut grouped: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    let mut years = BTreeSet::new();
    for (doc, year) in in_period {
        let company = name_of(doc.fields.get(&roles.company));
        let selected = match selection {
            CompanySelection::All => true,
            CompanySelection::Only(companies) => companies.iter().any(|c| same_name(c, &company)),
        };
        if !selected {
            continue;
        }

        let value = doc.fields.get(&roles.gross_total).map(extract_number).unwrap_or(0.0);
        years.insert(year);
        *grouped.entry(company).or_default().entry(year).or_insert(0.0) += value;
    }

    if grouped.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let mut rows: Vec<CompanyYearRow> = grouped.into_iter()
        .map(|(company, year_totals)| {
            let total = year_totals.values().sum();
            CompanyYearRow { company, year_totals, total }
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));

    let years: Vec<i32> = years.into_iter().collect();
    let year_totals = years.iter()
        .map(|year| (*year, rows.iter().map(|r| r.cell(*year)).sum()))
        .collect();
    let grand_total = rows.iter().map(|r| r.total).sum();

    Ok(CompanyYearTable { years, rows, year_totals, grand_total })
}

#[cfg(test)]
mod tests {
    use crate::analysis::tests::{date, doc};
    use crate::value::Value;
    use super::*;

    fn docs() -> Vec<Document> {
        vec![
            doc(1, vec![("NOME CLIFOR", Value::from("ACME")), ("EMISSÃO", date(2023, 11, 30)), ("TOTAL BRUTO", Value::Number(100.0))]),
            doc(2, vec![("NOME CLIFOR", Value::from("ACME")), ("EMISSÃO", date(2024, 2, 29)), ("TOTAL BRUTO", Value::Number(50.0))]),
            doc(3, vec![("NOME CLIFOR", Value::from("BETA")), ("EMISSÃO", Value::from("10/01/2024")), ("TOTAL BRUTO", Value::from("1.000,00"))]),
            doc(4, vec![("NOME CLIFOR", Value::from("GAMA")), ("EMISSÃO", date(2024, 3, 1)), ("TOTAL BRUTO", Value::Number(999.0))]),
            doc(5, vec![("NOME CLIFOR", Value::Null), ("EMISSÃO", date(2023, 12, 1)), ("TOTAL BRUTO", Value::Number(5.0))]),
        ]
    }

    #[test]
    fn test_company_year_table() {
        let table = company_year_table(&docs(), "11/2023", "02/2024", &CompanySelection::All).unwrap();
        assert_eq!(table.years, vec![2023, 2024]);
        let companies: Vec<&str> = table.rows.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(companies, vec!["BETA", "ACME", "Sem Nome"]);
        assert_eq!(table.rows[1].cell(2023), 100.0);
        assert_eq!(table.rows[1].cell(2024), 50.0);
        assert_eq!(table.rows[0].cell(2023), 0.0);
        assert_eq!(table.year_totals, vec![(2023, 105.0), (2024, 1050.0)]);
        assert_eq!(table.grand_total, 1155.0);
    }

    #[test]
    fn test_selected_companies() {
        let selection = CompanySelection::Only(vec!["ACME".to_string()]);
        let table = company_year_table(&docs(), "01/2023", "12/2024", &selection).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.grand_total, 150.0);

        // typed names match regardless of case
        let selection = CompanySelection::Only(vec!["acme".to_string(), " beta".to_string()]);
        let table = company_year_table(&docs(), "01/2023", "12/2024", &selection).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.grand_total, 1150.0);

        let selection = CompanySelection::Only(vec!["GAMA".to_string()]);
        assert_eq!(company_year_table(&docs(), "11/2023", "02/2024", &selection), Err(AnalysisError::NoData));
    }

    #[test]
    fn test_errors() {
        assert_eq!(company_year_table(&docs(), "13/2024", "02/2024", &CompanySelection::All), Err(AnalysisError::InvalidPeriod));
        assert_eq!(company_year_table(&docs(), "", "02/2024", &CompanySelection::All), Err(AnalysisError::InvalidPeriod));
        assert_eq!(company_year_table(&docs(), "01/2024", "02/2024", &CompanySelection::Only(vec![])),
                   Err(AnalysisError::NoCompaniesSelected));
        assert_eq!(company_year_table(&docs(), "01/2010", "02/2010", &CompanySelection::All), Err(AnalysisError::NoData));
    }

    #[test]
    fn test_all_companies_and_default_period() {
        assert_eq!(all_companies(&docs()), vec!["ACME", "BETA", "GAMA", "Sem Nome"]);
        let today = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        assert_eq!(default_period(today), ("03/2023".to_string(), "03/2024".to_string()));
    }
}
