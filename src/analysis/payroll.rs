use std::collections::{BTreeMap, BTreeSet, HashMap};
use crate::analysis::{name_of, same_name, AnalysisError};
use crate::analysis::chart::{BarChart, ShareChart};
use crate::db::Document;
use crate::format::{extract_number, month_abbrev};
use crate::value::Value;

const DEDUCTION_COLUMNS: [&str; 11] = [
    "INSS", "INSS13º", "INSS FERIAS", "SISTEMA S", "RAT", "FGTS", "IRRF", "IRRF FERIAS", "ODONTO", "VALE CULTURA", "FARMACIA",
];

const ADDITION_COLUMNS: [&str; 6] = ["COMISSAO+DSR", "HORAS EXTRAS", "BONUS", "INSALUBRIDADE", "FERIAS", "ADIANTAMENTO"];

/// Slices kept in the cost centre chart
const TOP_COST_CENTRES: usize = 10;

/// Employees kept in the salary chart
const TOP_SALARIES: usize = 15;

const OTHER_COST_CENTRE: &str = "Outros";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EmployeePayroll {
    pub(crate) name: String,
    pub(crate) total_salary: f64,
    pub(crate) total_net: f64,
    pub(crate) total_deductions: f64,
    pub(crate) total_additions: f64,
    pub(crate) record_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PayrollReport {
    pub(crate) year: i32,
    pub(crate) month: Option<u32>,
    /// Employees to display, sorted by name
    pub(crate) employees: Vec<EmployeePayroll>,
    pub(crate) employee_names: Vec<String>,
    pub(crate) total_salary: f64,
    pub(crate) total_net: f64,
    pub(crate) total_deductions: f64,
    pub(crate) total_additions: f64,
    pub(crate) employee_count: usize,
    pub(crate) monthly_cost: BarChart,
    pub(crate) cost_centres: ShareChart,
    pub(crate) top_salaries: BarChart,
}

fn number(doc: &Document, column: &str) -> f64 {
    doc.fields.get_ignore_case(column).map(extract_number).unwrap_or(0.0)
}

/// First non-empty value among `columns`
fn first_filled<'a>(doc: &'a Document, columns: &[&str]) -> Option<&'a Value> {
    columns.iter()
        .filter_map(|c| doc.fields.get_ignore_case(c))
        .find(|v| !v.is_empty())
}

/// Monthly salary, falling back to the base salary when missing or zero
fn salary(doc: &Document) -> f64 {
    first_filled(doc, &["SALARIO MES", "SALARIO"]).map(extract_number).unwrap_or(0.0)
}

/// Payroll years present in the collection, newest first
pub(crate) fn available_years(docs: &[Document]) -> Vec<i32> {
    docs.iter()
        .map(|doc| number(doc, "ANO"))
        .filter(|ano| *ano > 2000.0 && *ano < 2100.0)
        .map(|ano| ano as i32)
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .rev()
        .collect()
}

/// Aggregate one payroll year, or one month of it, per employee.
/// Totals and charts cover every employee; `employee_filter` only narrows the employees listed.
pub(crate) fn payroll_analysis(docs: &[Document], year: i32, month: Option<u32>,
                               employee_filter: Option<&str>) -> Result<PayrollReport, AnalysisError> {
    let filtered: Vec<&Document> = docs.iter()
        .filter(|doc| number(doc, "ANO") == year as f64)
        .filter(|doc| month.map(|m| number(doc, "MES") == m as f64).unwrap_or(true))
        .collect();
    if filtered.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let mut grouped: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
    for &doc in filtered.iter() {
        grouped.entry(name_of(doc.fields.get_ignore_case("FUNCIONARIO"))).or_default().push(doc);
    }

    let employees: Vec<EmployeePayroll> = grouped.into_iter()
        .map(|(name, records)| EmployeePayroll {
            name,
            total_salary: records.iter().map(|r| salary(r)).sum(),
            total_net: records.iter().map(|r| number(r, "SALARIO LIQUIDO")).sum(),
            total_deductions: DEDUCTION_COLUMNS.iter().map(|c| records.iter().map(|r| number(r, c)).sum::<f64>()).sum(),
            total_additions: ADDITION_COLUMNS.iter().map(|c| records.iter().map(|r| number(r, c)).sum::<f64>()).sum(),
            record_count: records.len(),
        })
        .collect();

    let monthly_cost = monthly_cost_chart(&filtered, year);
    let cost_centres = cost_centre_chart(&filtered);
    let top_salaries = top_salary_chart(&employees);

    Ok(PayrollReport {
        year,
        month,
        employee_names: employees.iter().map(|e| e.name.clone()).collect(),
        total_salary: employees.iter().map(|e| e.total_salary).sum(),
        total_net: employees.iter().map(|e| e.total_net).sum(),
        total_deductions: employees.iter().map(|e| e.total_deductions).sum(),
        total_additions: employees.iter().map(|e| e.total_additions).sum(),
        employee_count: employees.len(),
        monthly_cost,
        cost_centres,
        top_salaries,
        employees: match employee_filter {
            Some(filter) => employees.into_iter().filter(|e| same_name(filter, &e.name)).collect(),
            None => employees,
        },
    })
}

/// Salary cost per month, always Jan to Dez
fn monthly_cost_chart(docs: &[&Document], year: i32) -> BarChart {
    let mut values = vec![0.0; 12];
    for doc in docs {
        let mes = number(doc, "MES");
        if (1.0..=12.0).contains(&mes) {
            values[mes as usize - 1] += salary(doc);
        }
    }

    BarChart {
        title: format!("Custo Mensal com Folha - {year}"),
        labels: (1..=12).map(|m| month_abbrev(m).to_string()).collect(),
        values,
    }
}

/// Salary per cost centre, largest ten
fn cost_centre_chart(docs: &[&Document]) -> ShareChart {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for doc in docs {
        let centre = first_filled(doc, &["DESCRICAO CC", "CENTRO CUSTO"])
            .map(|v| v.to_string().trim().to_string())
            .unwrap_or_else(|| OTHER_COST_CENTRE.to_string());
        *totals.entry(centre).or_insert(0.0) += salary(doc);
    }

    let mut slices: Vec<(String, f64)> = totals.into_iter().collect();
    slices.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    slices.truncate(TOP_COST_CENTRES);

    ShareChart { title: "Distribuição por Centro de Custo".to_string(), slices }
}

fn top_salary_chart(employees: &[EmployeePayroll]) -> BarChart {
    let mut sorted: Vec<&EmployeePayroll> = employees.iter().collect();
    sorted.sort_by(|a, b| b.total_salary.total_cmp(&a.total_salary));
    sorted.truncate(TOP_SALARIES);

    BarChart {
        title: format!("Salário por Funcionário (Top {TOP_SALARIES})"),
        labels: sorted.iter().map(|e| e.name.clone()).collect(),
        values: sorted.iter().map(|e| e.total_salary).collect(),
    }
}
