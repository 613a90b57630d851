use std::path::Path;
use comfy_table::{Cell, CellAlignment};
use log::info;
use crate::browse::format_value;
use crate::common::RecordFamily;
use crate::config::Config;
use crate::db::Database;
use crate::import::{import_path, ImportOptions, ImportOutcome, ImportPreview, ImportReport};
use crate::util::new_table;
use crate::value::Value;

/// Import a file or a directory of spreadsheets, then print what happened to each file
pub(crate) fn execute_import(db: &mut Database, config: &Config, family: RecordFamily, path: &str,
                             options: &ImportOptions) -> anyhow::Result<()> {
    let outcomes = import_path(db, family, Path::new(path), options, config)?;

    let mut reports = vec![];
    for outcome in outcomes {
        match outcome {
            ImportOutcome::Preview(preview) => print_preview(family, &preview),
            ImportOutcome::Imported(report) => reports.push(report),
        }
    }

    if !reports.is_empty() {
        print_reports(&reports);
    }
    Ok(())
}

fn print_preview(family: RecordFamily, preview: &ImportPreview) {
    info!("{}: {} records, {} already in the database", preview.file, preview.total_rows, preview.duplicates);

    let mut table = new_table();
    table.set_header(&preview.columns);
    for row in preview.rows.iter() {
        table.add_row(preview.columns.iter()
            .map(|c| Cell::new(format_value(family, c, row.get(c).unwrap_or(&Value::Null)))));
    }
    println!("{table}");
}

fn print_reports(reports: &[ImportReport]) {
    let mut table = new_table();
    table.set_header(vec!["File", "Rows", "Imported", "Skipped"]);
    for r in reports {
        table.add_row(vec![
            Cell::new(&r.file),
            Cell::new(r.total_rows).set_alignment(CellAlignment::Right),
            Cell::new(r.imported).set_alignment(CellAlignment::Right),
            Cell::new(r.skipped_duplicates).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}
