pub(crate) mod store;
pub(crate) mod batch;

use std::fs;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::value::Row;
pub(crate) use store::{DocumentStore, StoreError};

/// folhadb binary version
const FOLHADB_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bytes reserved at the start of the database file for metadata
const HEADER_SIZE: usize = 1024;

/// Number of documents removed per write when emptying a collection
pub(crate) const DELETE_BATCH_SIZE: usize = 500;

pub(crate) type DocumentId = u32;

/// A stored row together with its id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Document {
    pub(crate) id: DocumentId,
    pub(crate) fields: Row,
}

impl Document {
    pub(crate) fn new(id: DocumentId, fields: Row) -> Document {
        Document { id, fields }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Collection {
    id_seed: DocumentId,
    documents: BTreeMap<DocumentId, Document>,
}

impl Collection {
    fn insert(&mut self, fields: Row) -> DocumentId {
        self.id_seed += 1;
        let id = self.id_seed;
        self.documents.insert(id, Document::new(id, fields));
        id
    }
}

/// Metadata of database file. Contains the version of folhadb that was used to write the database to disk.
/// Will be used by future version of folhadb to upgrade database file written by older version of binary.
#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct Metadata {
    version: String,
}

/// Local file-backed document store
#[derive(Serialize, Deserialize, Debug, Default)]
pub(crate) struct Database {
    collections: BTreeMap<String, Collection>,

    /// Key is collection name, value is md5 digests of files already imported into it.
    imported_files: BTreeMap<String, BTreeSet<String>>,

    #[serde(skip_serializing, skip_deserializing)]
    file_path: Option<String>,
}

impl Database {
    /// Database that lives at `file_path`. `None` keeps everything in memory.
    pub(crate) fn new(file_path: Option<String>) -> Database {
        Database {
            collections: BTreeMap::new(),
            imported_files: BTreeMap::new(),
            file_path,
        }
    }

    pub(crate) fn load(path_str: &str) -> Result<Database, StoreError> {
        let path = Path::new(path_str);
        if path.exists() {
            let mut file = fs::File::open(path)?;
            let metadata_len = file.read_u16::<LittleEndian>()?;
            let mut buffer = vec![0; metadata_len as usize];
            file.read_exact(&mut buffer)?;
            let metadata: Metadata = bincode::deserialize(&buffer)?;
            info!("Database version {}", metadata.version);

            file.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
            let mut buffer: Vec<u8> = vec![];
            file.read_to_end(&mut buffer)?;

            let mut database: Database = bincode::deserialize(&buffer)?;
            database.file_path = Some(path_str.to_string());
            Ok(database)
        } else {
            info!("Creating new database {}", path_str);
            Ok(Database::new(Some(path_str.to_string())))
        }
    }

    /// Save db content to disk
    pub(crate) fn save(&self) -> Result<(), StoreError> {
        let file_path = match &self.file_path {
            Some(p) => p,
            None => return Ok(()),
        };

        // Create metadata using current binary version
        let metadata = Metadata { version: FOLHADB_VERSION.to_string() };
        let metadata_encoded: Vec<u8> = bincode::serialize(&metadata)?;
        let metadata_length = metadata_encoded.len();
        if metadata_length > HEADER_SIZE - 2 {
            return Err(StoreError::Other(format!("Metadata too large: {metadata_length} bytes")));
        }

        let encoded: Vec<u8> = bincode::serialize(&self)?;

        // Use first 1024 bytes to store metadata
        let mut file = fs::File::create(file_path)?;
        // Using first 2 bytes to write metadata length
        file.write_u16::<LittleEndian>(metadata_length as u16)?;
        file.write_all(&metadata_encoded)?;
        // Write 0s for remaining bytes to fill up the header.
        file.write_all(&vec![0; HEADER_SIZE - 2 - metadata_length])?;

        file.write_all(&encoded)?;
        file.flush()?;
        debug!("Saved database to {}", file_path);
        Ok(())
    }

    /// Whether a file with this md5 digest was already imported into the collection
    pub(crate) fn file_imported(&self, collection: &str, digest: &str) -> bool {
        self.imported_files.get(collection).map(|s| s.contains(digest)).unwrap_or(false)
    }

    pub(crate) fn record_imported_file(&mut self, collection: &str, digest: String) -> Result<(), StoreError> {
        self.imported_files.entry(collection.to_string()).or_default().insert(digest);
        self.save()
    }

    /// Names of collections holding at least one document
    pub(crate) fn collection_names(&self) -> Vec<&str> {
        self.collections.iter()
            .filter(|(_, c)| !c.documents.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl DocumentStore for Database {
    fn add_document(&mut self, collection: &str, fields: Row) -> Result<DocumentId, StoreError> {
        let id = self.collections.entry(collection.to_string()).or_default().insert(fields);
        self.save()?;
        Ok(id)
    }

    fn add_documents(&mut self, collection: &str, documents: Vec<Row>) -> Result<Vec<DocumentId>, StoreError> {
        let target = self.collections.entry(collection.to_string()).or_default();
        let ids = documents.into_iter().map(|fields| target.insert(fields)).collect();
        self.save()?;
        Ok(ids)
    }

    fn get_all_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(match self.collections.get(collection) {
            Some(c) => c.documents.values().cloned().collect(),
            None => vec![],
        })
    }

    fn get_document(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.collections.get(collection).and_then(|c| c.documents.get(&id)).cloned())
    }

    fn update_document(&mut self, collection: &str, id: DocumentId, fields: Row) -> Result<(), StoreError> {
        let document = self.collections.get_mut(collection)
            .and_then(|c| c.documents.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound { collection: collection.to_string(), id })?;
        for (column, value) in fields.iter() {
            document.fields.insert(column, value.clone());
        }
        self.save()
    }

    fn delete_document(&mut self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        let removed = self.collections.get_mut(collection).and_then(|c| c.documents.remove(&id));
        if removed.is_none() {
            return Err(StoreError::NotFound { collection: collection.to_string(), id });
        }
        self.save()
    }

    fn delete_all_documents(&mut self, collection: &str) -> Result<usize, StoreError> {
        let ids: Vec<DocumentId> = match self.collections.get(collection) {
            Some(c) => c.documents.keys().cloned().collect(),
            None => return Ok(0),
        };

        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_BATCH_SIZE) {
            if let Some(c) = self.collections.get_mut(collection) {
                for id in chunk {
                    c.documents.remove(id);
                }
            }
            self.save()?;
            deleted += chunk.len();
        }

        info!("Deleted {} documents from {}", deleted, collection);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::value::Value;
    use super::*;

    fn row(name: &str) -> Row {
        vec![("NOME".to_string(), Value::from(name))].into_iter().collect()
    }

    #[test]
    fn test_crud_in_memory() {
        let mut db = Database::new(None);
        assert!(db.get_all_documents("x").unwrap().is_empty());

        let id = db.add_document("x", row("a")).unwrap();
        let ids = db.add_documents("x", vec![row("b"), row("c")]).unwrap();
        assert_eq!(id, 1);
        assert_eq!(ids, vec![2, 3]);

        let mut update = Row::new();
        update.insert("STATUS", Value::from("Inativo"));
        db.update_document("x", 2, update).unwrap();
        let doc = db.get_document("x", 2).unwrap().unwrap();
        assert_eq!(doc.fields.get("NOME"), Some(&Value::from("b")));
        assert_eq!(doc.fields.get("STATUS"), Some(&Value::from("Inativo")));

        db.delete_document("x", 1).unwrap();
        assert!(matches!(db.delete_document("x", 1), Err(StoreError::NotFound { .. })));
        assert!(matches!(db.update_document("y", 1, Row::new()), Err(StoreError::NotFound { .. })));

        // ids are never reused
        assert_eq!(db.add_document("x", row("d")).unwrap(), 4);
        assert_eq!(db.delete_all_documents("x").unwrap(), 3);
        assert!(db.get_all_documents("x").unwrap().is_empty());
        assert_eq!(db.delete_all_documents("missing").unwrap(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.folhadb");
        let path = path.to_str().unwrap();

        let mut db = Database::load(path).unwrap();
        db.add_documents("folha-pagamento", vec![row("ANA"), row("BRUNO")]).unwrap();
        db.record_imported_file("folha-pagamento", "abc123".to_string()).unwrap();

        let loaded = Database::load(path).unwrap();
        let docs = loaded.get_all_documents("folha-pagamento").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].fields.get("NOME"), Some(&Value::from("BRUNO")));
        assert!(loaded.file_imported("folha-pagamento", "abc123"));
        assert!(!loaded.file_imported("notas-levantamento", "abc123"));
        assert_eq!(loaded.collection_names(), vec!["folha-pagamento"]);
    }
}
