use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use crate::common::NAME_COLLECTION;
use crate::db::{Document, DocumentId, DocumentStore, StoreError};
use crate::value::{Row, Value};

const PERSON_FIELD: &str = "nomePessoaFisica";
const COMPANY_FIELD: &str = "nomeRazaoSocial";
const STATUS_FIELD: &str = "status";

#[derive(Error, Debug)]
pub(crate) enum RegistryError {
    #[error("Both the person name and the company name are required")]
    MissingName,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Status {
    #[default]
    Ativo,
    Inativo,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Ativo => write!(f, "Ativo"),
            Status::Inativo => write!(f, "Inativo"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ativo" => Ok(Status::Ativo),
            "inativo" => Ok(Status::Inativo),
            other => Err(format!("Unknown status '{other}', use ATIVO or INATIVO")),
        }
    }
}

/// Maps a natural person's name to the company name it trades under
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NameEntry {
    pub(crate) id: Option<DocumentId>,
    pub(crate) person: String,
    pub(crate) company: String,
    pub(crate) status: Status,
}

impl NameEntry {
    pub(crate) fn new(person: &str, company: &str, status: Status) -> NameEntry {
        NameEntry { id: None, person: person.trim().to_string(), company: company.trim().to_string(), status }
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(PERSON_FIELD, Value::from(self.person.as_str()));
        row.insert(COMPANY_FIELD, Value::from(self.company.as_str()));
        row.insert(STATUS_FIELD, Value::from(self.status.to_string().as_str()));
        row
    }

    fn from_document(doc: &Document) -> NameEntry {
        let text = |field: &str| doc.fields.get(field).map(|v| v.to_string()).unwrap_or_default();
        NameEntry {
            id: Some(doc.id),
            person: text(PERSON_FIELD),
            company: text(COMPANY_FIELD),
            status: text(STATUS_FIELD).parse().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.person.is_empty() || self.company.is_empty() {
            return Err(RegistryError::MissingName);
        }
        Ok(())
    }

    fn matches(&self, term: &str) -> bool {
        self.person.to_lowercase().contains(term)
            || self.company.to_lowercase().contains(term)
            || self.status.to_string().to_lowercase().contains(term)
    }
}

pub(crate) fn add_entry<S: DocumentStore + ?Sized>(store: &mut S, entry: &NameEntry) -> Result<DocumentId, RegistryError> {
    entry.validate()?;
    Ok(store.add_document(NAME_COLLECTION, entry.to_row())?)
}

pub(crate) fn update_entry<S: DocumentStore + ?Sized>(store: &mut S, id: DocumentId, entry: &NameEntry) -> Result<(), RegistryError> {
    entry.validate()?;
    Ok(store.update_document(NAME_COLLECTION, id, entry.to_row())?)
}

pub(crate) fn delete_entry<S: DocumentStore + ?Sized>(store: &mut S, id: DocumentId) -> Result<(), RegistryError> {
    Ok(store.delete_document(NAME_COLLECTION, id)?)
}

/// Entries whose names or status contain `term`, ignoring case. An empty term lists everything.
pub(crate) fn list_entries<S: DocumentStore + ?Sized>(store: &S, term: &str) -> Result<Vec<NameEntry>, RegistryError> {
    let term = term.trim().to_lowercase();
    Ok(store.get_all_documents(NAME_COLLECTION)?
        .iter()
        .map(NameEntry::from_document)
        .filter(|e| term.is_empty() || e.matches(&term))
        .collect())
}
