use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{Cell, CellAlignment};
use log::info;
use crate::analysis::AnalysisError;
use crate::analysis::chart::{BarChart, ShareChart};
use crate::analysis::company_year::{company_year_table, default_period, CompanySelection};
use crate::analysis::earnings::earnings_analysis;
use crate::analysis::payroll::{available_years, payroll_analysis};
use crate::common::{FOLHA_COLLECTION, NOTA_COLLECTION};
use crate::db::{Database, DocumentStore};
use crate::format::{format_currency, format_date, month_name};
use crate::util::new_table;

fn money(value: f64) -> Cell {
    Cell::new(format_currency(value)).set_alignment(CellAlignment::Right)
}

fn count(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

fn print_bar_chart(chart: &BarChart) {
    if chart.is_empty() {
        return;
    }
    println!("{}", chart.title);
    println!("{}", chart.to_table());
}

fn print_share_chart(chart: &ShareChart) {
    if chart.slices.is_empty() {
        return;
    }
    println!("{}", chart.title);
    println!("{}", chart.to_table());
}

/// Earnings per company between two dates, followed by the monthly charts of each company listed
pub(crate) fn execute_earnings(db: &Database, start: NaiveDate, end: NaiveDate,
                               company: Option<&str>) -> anyhow::Result<()> {
    let docs = db.get_all_documents(NOTA_COLLECTION)?;
    let report = earnings_analysis(&docs, start, end, company)?;

    info!("Earnings from {} to {}: {} companies", format_date(&start), format_date(&end), report.companies_count);

    let mut table = new_table();
    table.set_header(vec!["Empresa", "Valor Unitário", "Total Bruto", "Total", "Registros"]);
    for c in report.companies.iter() {
        table.add_row(vec![
            Cell::new(&c.name),
            money(c.total_unit_value),
            money(c.total_gross),
            money(c.total),
            count(c.record_count),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        money(report.total_unit_value),
        money(report.total_gross),
        money(report.total),
        Cell::new(""),
    ]);
    println!("{table}");

    for c in report.companies.iter() {
        print_bar_chart(&c.unit_value_chart);
        print_bar_chart(&c.gross_chart);
        print_bar_chart(&c.total_chart);
    }
    Ok(())
}

/// Gross total per company and year
pub(crate) fn execute_company_year(db: &Database, period: Option<(String, String)>,
                                   selection: &CompanySelection) -> anyhow::Result<()> {
    let (start, end) = period.unwrap_or_else(|| default_period(Local::now().date_naive()));
    let docs = db.get_all_documents(NOTA_COLLECTION)?;
    let result = company_year_table(&docs, &start, &end, selection)?;

    info!("Gross total per company from {} to {}", start, end);

    let mut table = new_table();
    let mut header = vec!["Empresa".to_string()];
    header.extend(result.years.iter().map(|y| y.to_string()));
    header.push("Total".to_string());
    table.set_header(header);

    for row in result.rows.iter() {
        let mut cells = vec![Cell::new(&row.company)];
        cells.extend(result.years.iter().map(|y| money(row.cell(*y))));
        cells.push(money(row.total));
        table.add_row(cells);
    }

    let mut totals = vec![Cell::new("Total")];
    totals.extend(result.year_totals.iter().map(|(_, total)| money(*total)));
    totals.push(money(result.grand_total));
    table.add_row(totals);

    println!("{table}");
    Ok(())
}

/// Current year when it has payroll data, otherwise the newest year that does
fn default_year(years: &[i32], current: i32) -> Option<i32> {
    if years.contains(&current) {
        Some(current)
    } else {
        years.first().cloned()
    }
}

/// Payroll totals per employee for a year or a month, with cost charts
pub(crate) fn execute_payroll(db: &Database, year: Option<i32>, month: Option<u32>,
                              employee: Option<&str>) -> anyhow::Result<()> {
    let docs = db.get_all_documents(FOLHA_COLLECTION)?;
    let year = match year {
        Some(y) => y,
        None => default_year(&available_years(&docs), Local::now().year()).ok_or(AnalysisError::NoData)?,
    };
    let report = payroll_analysis(&docs, year, month, employee)?;

    match report.month {
        Some(m) => info!("Payroll of {} {}: {} employees", month_name(m), report.year, report.employee_count),
        None => info!("Payroll of {}: {} employees", report.year, report.employee_count),
    }

    let mut table = new_table();
    table.set_header(vec!["Funcionário", "Salário", "Líquido", "Descontos", "Adicionais", "Registros"]);
    for e in report.employees.iter() {
        table.add_row(vec![
            Cell::new(&e.name),
            money(e.total_salary),
            money(e.total_net),
            money(e.total_deductions),
            money(e.total_additions),
            count(e.record_count),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        money(report.total_salary),
        money(report.total_net),
        money(report.total_deductions),
        money(report.total_additions),
        Cell::new(""),
    ]);
    println!("{table}");

    print_bar_chart(&report.monthly_cost);
    print_share_chart(&report.cost_centres);
    print_bar_chart(&report.top_salaries);
    Ok(())
}
