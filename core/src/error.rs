use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid prep tasks: {0}")]
    Pipeline(String),

    #[error("config must be defined before adding a document")]
    NotConfigured,

    #[error("learnings are already consolidated")]
    AlreadyConsolidated,

    #[error("search is not possible unless learnings are consolidated")]
    NotConsolidated,

    #[error("document collection is too small for consolidation: {found} docs, need at least 3")]
    TooFewDocuments { found: usize },

    #[error("duplicate document encountered: {0}")]
    DuplicateDocument(String),

    #[error("missing field in the document: {0}")]
    MissingField(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("import failed: {0}")]
    Import(String),
}

impl Error {
    /// True for call-order violations of the configure → ingest → consolidate → query cycle.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Error::NotConfigured
                | Error::AlreadyConsolidated
                | Error::NotConsolidated
                | Error::TooFewDocuments { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Import(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_variants_are_classified() {
        assert!(Error::NotConsolidated.is_lifecycle());
        assert!(Error::TooFewDocuments { found: 2 }.is_lifecycle());
        assert!(!Error::MissingField("title".into()).is_lifecycle());
        assert!(!Error::Import("bad".into()).is_lifecycle());
    }

    #[test]
    fn json_errors_become_import_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err().into();
        assert!(matches!(err, Error::Import(_)));
    }
}
