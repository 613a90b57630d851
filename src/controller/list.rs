use std::path::Path;
use anyhow::anyhow;
use comfy_table::Cell;
use log::{info, warn};
use crate::browse::{apply_query, display_columns, export_csv, export_json, format_value, ListQuery};
use crate::common::{RecordFamily, IMPORTED_AT_FIELD, SOURCE_FILE_FIELD};
use crate::db::{Database, DocumentId, DocumentStore};
use crate::util::new_table;
use crate::value::Value;

/// Print the documents of a family matching the query
pub(crate) fn execute_list(db: &Database, family: RecordFamily, query: &ListQuery) -> anyhow::Result<()> {
    let docs = db.get_all_documents(family.collection())?;
    let total = docs.len();
    let docs = apply_query(docs, query);
    if docs.is_empty() {
        info!("No {} records found", family);
        return Ok(());
    }

    let columns = display_columns(family, &docs);
    let mut table = new_table();
    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().cloned());
    table.set_header(header);

    for doc in docs.iter() {
        let mut cells = vec![Cell::new(doc.id)];
        for c in columns.iter() {
            cells.push(Cell::new(format_value(family, c, doc.fields.get(c).unwrap_or(&Value::Null))));
        }
        table.add_row(cells);
    }

    println!("{table}");
    info!("Showing {} of {} {} records", docs.len(), total, family);
    Ok(())
}

/// Print every field of one document, one per line
pub(crate) fn execute_show(db: &Database, family: RecordFamily, id: DocumentId) -> anyhow::Result<()> {
    let doc = db.get_document(family.collection(), id)?
        .ok_or_else(|| anyhow!("No {} record with id {}", family, id))?;

    let mut columns = display_columns(family, std::slice::from_ref(&doc));
    columns.push(SOURCE_FILE_FIELD.to_string());
    columns.push(IMPORTED_AT_FIELD.to_string());

    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("id"), Cell::new(doc.id)]);
    for c in columns.iter() {
        table.add_row(vec![
            Cell::new(c),
            Cell::new(format_value(family, c, doc.fields.get(c).unwrap_or(&Value::Null))),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Delete documents by id, stopping at the first id that does not exist
pub(crate) fn execute_delete(db: &mut Database, family: RecordFamily, ids: &[DocumentId]) -> anyhow::Result<()> {
    for id in ids {
        db.delete_document(family.collection(), *id)?;
        info!("Deleted {} record {}", family, id);
    }
    Ok(())
}

/// Delete every document of a family once `confirm` agrees
pub(crate) fn execute_delete_all<F>(db: &mut Database, family: RecordFamily, confirm: F) -> anyhow::Result<()>
    where F: Fn(&str) -> bool {
    let count = db.get_all_documents(family.collection())?.len();
    if count == 0 {
        info!("No {} records to delete", family);
        return Ok(());
    }

    if !confirm(&format!("Delete all {count} {family} records?")) {
        warn!("Nothing deleted");
        return Ok(());
    }

    let deleted = db.delete_all_documents(family.collection())?;
    info!("{} {} records deleted", deleted, family);
    Ok(())
}

/// Export a family to CSV, or to JSON when the file name ends with `.json`
pub(crate) fn execute_export(db: &Database, family: RecordFamily, file_path: &str) -> anyhow::Result<()> {
    let docs = db.get_all_documents(family.collection())?;
    if docs.is_empty() {
        warn!("No {} records to export", family);
        return Ok(());
    }

    let path = Path::new(file_path);
    let is_json = path.extension().map(|e| e.eq_ignore_ascii_case("json")).unwrap_or(false);
    let written = if is_json {
        export_json(&docs, path)?
    } else {
        export_csv(family, &docs, path)?
    };
    info!("{} {} records exported to {}", written, family, file_path);
    Ok(())
}
