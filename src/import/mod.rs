use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context};
use chrono::Local;
use log::{error, info, warn};
use walkdir::{DirEntry, WalkDir};
use crate::common::{RecordFamily, IMPORTED_AT_FIELD, SOURCE_FILE_FIELD};
use crate::config::Config;
use crate::db::{Database, DocumentStore};
use crate::db::batch::{add_documents_in_batch, folha_batch_size, DEFAULT_BATCH_SIZE};
use crate::dedup::{duplicate_summary, find_duplicates, DuplicatePolicy};
use crate::sheet_reader::{is_valid_sheet_file, read_sheet};
use crate::sheet_reader::column::{process_rows, ColumnProfile};
use crate::value::{Row, Value};

/// Rows shown by a dry run
const PREVIEW_ROWS: usize = 5;

/// Duplicates listed when an import is blocked
const MAX_DUPLICATES_SHOWN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ImportOptions {
    pub(crate) dry_run: bool,
    /// Overrides the family default when set
    pub(crate) policy: Option<DuplicatePolicy>,
    pub(crate) sheet_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImportReport {
    pub(crate) file: String,
    pub(crate) total_rows: usize,
    pub(crate) imported: usize,
    pub(crate) skipped_duplicates: usize,
}

/// What a dry run would import
#[derive(Debug, Clone)]
pub(crate) struct ImportPreview {
    pub(crate) file: String,
    pub(crate) total_rows: usize,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Row>,
    pub(crate) duplicates: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum ImportOutcome {
    Imported(ImportReport),
    Preview(ImportPreview),
}

/// Import a file, or every spreadsheet below a directory.
///
/// A failing file inside a directory is logged and the next one is tried.
pub(crate) fn import_path(db: &mut Database, family: RecordFamily, path: &Path, options: &ImportOptions,
                          config: &Config) -> anyhow::Result<Vec<ImportOutcome>> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }

    if !path.is_dir() {
        return Ok(vec![import_file(db, family, path, options, config)?]);
    }

    let files = scan_files(path)?;
    if files.is_empty() {
        info!("No spreadsheet files found in {}", path.display());
    }

    let mut outcomes = vec![];
    for f in files.iter() {
        match import_file(db, family, f, options, config) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!("Failed to import {}: {:#}", f.display(), e),
        }
    }
    Ok(outcomes)
}

/// Run one spreadsheet through read, typing, dedup, stamping and the batched writer
pub(crate) fn import_file(db: &mut Database, family: RecordFamily, path: &Path, options: &ImportOptions,
                          config: &Config) -> anyhow::Result<ImportOutcome> {
    if !is_valid_sheet_file(path) {
        bail!("Invalid file type: {}. Use .xlsx, .xls or .csv files", path.display());
    }

    let file_name = path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid file name: {}", path.display()))?
        .to_string();

    let sheet = read_sheet(path, options.sheet_index)
        .with_context(|| format!("Error reading the spreadsheet {}", path.display()))?;
    if sheet.rows.is_empty() {
        bail!("The file {} contains no data", file_name);
    }

    let profile = ColumnProfile::for_family(family, config.overrides(family));
    let mut rows = process_rows(&sheet.rows, &profile);
    let total_rows = rows.len();
    let collection = family.collection();

    let existing = db.get_all_documents(collection)?;
    let duplicates = find_duplicates(family, &existing, &rows);

    if options.dry_run {
        info!("Dry run. Previewing {} {} records from {}", total_rows, family, file_name);
        return Ok(ImportOutcome::Preview(ImportPreview {
            file: file_name,
            total_rows,
            columns: profile.visible_columns(&sheet.columns),
            rows: rows.into_iter().take(PREVIEW_ROWS).collect(),
            duplicates: duplicates.len(),
        }));
    }

    let digest = format!("{:x}", md5::compute(fs::read(path)?));
    if db.file_imported(collection, &digest) {
        warn!("{} was imported before, only new records will be kept", file_name);
    }

    let policy = options.policy.unwrap_or_else(|| DuplicatePolicy::default_for(family));
    let skipped_duplicates = if duplicates.is_empty() {
        0
    } else {
        match policy {
            DuplicatePolicy::Block => bail!(duplicate_summary(&duplicates, MAX_DUPLICATES_SHOWN)),
            DuplicatePolicy::Skip => {
                // Remove from the back so earlier indices stay valid
                for d in duplicates.iter().rev() {
                    rows.remove(d.index);
                }
                warn!("Skipping {} record(s) already in the database", duplicates.len());
                duplicates.len()
            }
        }
    };

    let imported_at = Value::Date(Local::now().naive_local());
    for row in rows.iter_mut() {
        row.insert(IMPORTED_AT_FIELD, imported_at.clone());
        row.insert(SOURCE_FILE_FIELD, Value::from(file_name.as_str()));
    }

    let batch_size = config.batch_size.unwrap_or_else(|| match family {
        RecordFamily::Folha => folha_batch_size(rows.len()),
        RecordFamily::Nota => DEFAULT_BATCH_SIZE,
    });

    info!("Importing {} {} records from {}", rows.len(), family, file_name);
    let imported = add_documents_in_batch(db, collection, rows, batch_size, |written, total| {
        info!("Importing... {} of {} records ({}%)", written, total, written * 100 / total.max(1));
    })?;

    db.record_imported_file(collection, digest)?;
    info!("{} records imported successfully from {}", imported, file_name);

    Ok(ImportOutcome::Imported(ImportReport { file: file_name, total_rows, imported, skipped_duplicates }))
}

/// Scan a dir recursively and list all spreadsheet files, skipping hidden ones
pub(crate) fn scan_files(root_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    info!("Scanning files in {}", root_path.display());

    let mut files = vec![];
    let walker = WalkDir::new(root_path).sort_by_file_name().into_iter();
    for entry in walker.filter_entry(|e| e.depth() == 0 || !is_hidden(e)) {
        let dir_entry = entry?;
        // Ignore symlinks
        if dir_entry.path_is_symlink() {
            continue;
        }

        let path = dir_entry.path();
        if path.is_file() && is_valid_sheet_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
