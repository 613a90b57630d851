use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Error raised when a statement cannot be understood
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub(crate) struct Error {
    message: String,
}

impl Error {
    pub(crate) fn new<S: Into<String>>(message: S) -> Error {
        Error { message: message.into() }
    }
}

/// Collection holding imported invoice lines
pub(crate) const NOTA_COLLECTION: &str = "notas-levantamento";

/// Collection holding imported payroll lines
pub(crate) const FOLHA_COLLECTION: &str = "folha-pagamento";

/// Collection holding the person name to company name registry
pub(crate) const NAME_COLLECTION: &str = "nome-razao";

/// Fields added to every imported document
pub(crate) const IMPORTED_AT_FIELD: &str = "importadoEm";
pub(crate) const SOURCE_FILE_FIELD: &str = "arquivoOrigem";

/// The two kinds of spreadsheet this tool understands. They only differ in the
/// collection they live in, in how columns are typed and in their natural key.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RecordFamily {
    /// Invoice ("nota") lines
    Nota,
    /// Payroll ("folha") lines
    Folha,
}

impl RecordFamily {
    pub(crate) fn collection(&self) -> &'static str {
        match self {
            RecordFamily::Nota => NOTA_COLLECTION,
            RecordFamily::Folha => FOLHA_COLLECTION,
        }
    }

    pub(crate) fn from_keyword(keyword: &str) -> Option<RecordFamily> {
        match keyword.to_ascii_lowercase().as_str() {
            "nota" | "notas" => Some(RecordFamily::Nota),
            "folha" | "folhas" | "payroll" => Some(RecordFamily::Folha),
            _ => None,
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordFamily::Nota => write!(f, "nota"),
            RecordFamily::Folha => write!(f, "folha"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_keyword() {
        assert_eq!(RecordFamily::from_keyword("NOTA"), Some(RecordFamily::Nota));
        assert_eq!(RecordFamily::from_keyword("folha"), Some(RecordFamily::Folha));
        assert_eq!(RecordFamily::from_keyword("amex"), None);
        assert_eq!(RecordFamily::Folha.collection(), "folha-pagamento");
    }
}
