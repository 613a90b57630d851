use std::io::Write;
use crate::config::Config;
use crate::db::Database;
use crate::parser;
use crate::parser::Statement::{CompanyYear, Delete, DeleteAll, Earnings, Export, Import, List, Name, Payroll, Show};

mod import;
mod list;
mod analysis;
mod name;

/// Parse one statement and run it against the database. Errors are returned to the prompt.
pub(crate) fn parse_and_run(db: &mut Database, config: &Config, statement: &str) -> anyhow::Result<()> {
    let statement = parser::parse(statement)?;

    match statement {
        Import(family, path, options) => import::execute_import(db, config, family, &path, &options)?,
        List(family, query) => list::execute_list(db, family, &query)?,
        Show(family, id) => list::execute_show(db, family, id)?,
        Delete(family, ids) => list::execute_delete(db, family, &ids)?,
        DeleteAll(family) => list::execute_delete_all(db, family, confirm)?,
        Export(family, file_path) => list::execute_export(db, family, &file_path)?,
        Earnings(start, end, company) => analysis::execute_earnings(db, start, end, company.as_deref())?,
        CompanyYear(period, selection) => analysis::execute_company_year(db, period, &selection)?,
        Payroll(year, month, employee) => analysis::execute_payroll(db, year, month, employee.as_deref())?,
        Name(command) => name::execute_name(db, command)?,
    }

    Ok(())
}

/// Ask a yes/no question on stdin, defaulting to no
fn confirm(question: &str) -> bool {
    print!("{question} yes or no, default is 'no': ");
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut user_input = String::new();
    match std::io::stdin().read_line(&mut user_input) {
        Ok(_) => matches!(user_input.trim().to_lowercase().as_str(), "yes" | "y"),
        Err(_) => false,
    }
}
