use log::debug;
use crate::db::{DocumentStore, StoreError};
use crate::value::Row;

/// Batch size used when nothing else is configured
pub(crate) const DEFAULT_BATCH_SIZE: usize = 500;

/// Payroll imports report progress once per percent, within store limits.
pub(crate) fn folha_batch_size(total: usize) -> usize {
    (total / 100).clamp(1, DEFAULT_BATCH_SIZE)
}

/// Write `documents` in consecutive chunks of `batch_size`, calling `on_progress(written, total)`
/// after each chunk. A failing chunk stops the write; earlier chunks stay stored.
pub(crate) fn add_documents_in_batch<S, F>(
    store: &mut S,
    collection: &str,
    documents: Vec<Row>,
    batch_size: usize,
    mut on_progress: F,
) -> Result<usize, StoreError>
    where S: DocumentStore + ?Sized, F: FnMut(usize, usize) {
    let total = documents.len();
    let batch_size = batch_size.max(1);
    let mut written = 0;

    let mut remaining = documents.into_iter().peekable();
    while remaining.peek().is_some() {
        let chunk: Vec<Row> = remaining.by_ref().take(batch_size).collect();
        let chunk_len = chunk.len();
        store.add_documents(collection, chunk)?;
        written += chunk_len;
        debug!("Wrote {} documents to {}", chunk_len, collection);
        on_progress(written, total);
    }

    Ok(written)
}
