use std::collections::BTreeMap;
use chrono::NaiveDate;
use crate::analysis::{name_of, same_name, value_as_date, AnalysisError, ColumnRoles};
use crate::analysis::chart::BarChart;
use crate::db::Document;
use crate::format::{extract_number, month_key, month_key_label};
use crate::util::days_between;

/// Invoice totals of one company over the period
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompanyEarnings {
    pub(crate) name: String,
    pub(crate) total_unit_value: f64,
    pub(crate) total_gross: f64,
    pub(crate) total: f64,
    pub(crate) record_count: usize,
    pub(crate) unit_value_chart: BarChart,
    pub(crate) gross_chart: BarChart,
    pub(crate) total_chart: BarChart,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EarningsReport {
    /// Companies to display, sorted by name
    pub(crate) companies: Vec<CompanyEarnings>,
    /// Every company in the period, sorted
    pub(crate) company_names: Vec<String>,
    pub(crate) total_unit_value: f64,
    pub(crate) total_gross: f64,
    pub(crate) total: f64,
    pub(crate) companies_count: usize,
}

/// Sum invoice values per company for documents emitted between `start` and `end`, both inclusive.
/// Grand totals cover every company; `company_filter` only narrows the companies listed.
pub(crate) fn earnings_analysis(docs: &[Document], start: NaiveDate, end: NaiveDate,
                                company_filter: Option<&str>) -> Result<EarningsReport, AnalysisError> {
    let roles = ColumnRoles::detect(docs);
    let period = days_between(start, end);

    let mut grouped: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
    for doc in docs {
        match value_as_date(doc.fields.get(&roles.date)) {
            Some(date) if period.contains(&date) => {
                grouped.entry(name_of(doc.fields.get(&roles.company))).or_default().push(doc);
            },
            _ => {},
        }
    }

    if grouped.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let all: Vec<CompanyEarnings> = grouped.into_iter()
        .map(|(name, records)| company_earnings(name, &records, &roles))
        .collect();

    let report = EarningsReport {
        company_names: all.iter().map(|c| c.name.clone()).collect(),
        total_unit_value: all.iter().map(|c| c.total_unit_value).sum(),
        total_gross: all.iter().map(|c| c.total_gross).sum(),
        total: all.iter().map(|c| c.total).sum(),
        companies_count: all.len(),
        companies: match company_filter {
            Some(filter) => all.into_iter().filter(|c| same_name(filter, &c.name)).collect(),
            None => all,
        },
    };
    Ok(report)
}

fn company_earnings(name: String, records: &[&Document], roles: &ColumnRoles) -> CompanyEarnings {
    let sum = |column: &str| records.iter()
        .map(|r| r.fields.get(column).map(extract_number).unwrap_or(0.0))
        .sum::<f64>();

    CompanyEarnings {
        total_unit_value: sum(&roles.unit_value),
        total_gross: sum(&roles.gross_total),
        total: sum(&roles.total),
        record_count: records.len(),
        unit_value_chart: monthly_chart(&format!("Valor Unitário - {name}"), records, roles, &roles.unit_value),
        gross_chart: monthly_chart(&format!("Total Bruto - {name}"), records, roles, &roles.gross_total),
        total_chart: monthly_chart(&format!("Total - {name}"), records, roles, &roles.total),
        name,
    }
}

/// Monthly sums of one column, oldest month first
fn monthly_chart(title: &str, records: &[&Document], roles: &ColumnRoles, column: &str) -> BarChart {
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for r in records {
        if let Some(date) = value_as_date(r.fields.get(&roles.date)) {
            let value = r.fields.get(column).map(extract_number).unwrap_or(0.0);
            *monthly.entry(month_key(&date)).or_insert(0.0) += value;
        }
    }

    BarChart {
        title: title.to_string(),
        labels: monthly.keys().map(|k| month_key_label(k)).collect(),
        values: monthly.values().cloned().collect(),
    }
}
