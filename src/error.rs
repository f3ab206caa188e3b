use thiserror::Error;

/// Errors raised by catalog handling and calculator lookups.
///
/// Numeric input never produces an error: the calculator substitutes
/// defaults instead. Only caller mistakes (an unknown product code) and
/// broken catalog configuration surface here.
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Unknown loan product: {0}")]
    UnknownProduct(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Could not read catalog file {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization(e.to_string())
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
