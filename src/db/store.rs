use thiserror::Error;
use crate::db::{Document, DocumentId};
use crate::value::Row;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to encode or decode database: {0}")]
    Codec(#[from] bincode::Error),
    #[error("Document {id} not found in {collection}")]
    NotFound { collection: String, id: DocumentId },
    #[error("{0}")]
    Other(String),
}

/// A store of named collections of schemaless documents.
///
/// Collections spring into existence on first write and read as empty before that.
pub(crate) trait DocumentStore {
    /// Add one document, returning its new id
    fn add_document(&mut self, collection: &str, fields: Row) -> Result<DocumentId, StoreError>;

    /// Add several documents in one write
    fn add_documents(&mut self, collection: &str, documents: Vec<Row>) -> Result<Vec<DocumentId>, StoreError>;

    fn get_all_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    fn get_document(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into an existing document
    fn update_document(&mut self, collection: &str, id: DocumentId, fields: Row) -> Result<(), StoreError>;

    fn delete_document(&mut self, collection: &str, id: DocumentId) -> Result<(), StoreError>;

    /// Remove every document of a collection, returning how many were removed
    fn delete_all_documents(&mut self, collection: &str) -> Result<usize, StoreError>;
}
