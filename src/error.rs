use lexis_core::{ConfigurationError, QueryError, StoreError};
use lexis_session::PagingError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Paging(#[from] PagingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no dictionary is open")]
    NoActiveDictionary,

    #[error("engine state lock poisoned")]
    Poisoned,
}

impl From<ConfigurationError> for EngineError {
    fn from(e: ConfigurationError) -> Self {
        EngineError::Query(e.into())
    }
}

impl EngineError {
    /// The configuration error behind this failure, if any.
    pub fn configuration(&self) -> Option<&ConfigurationError> {
        match self {
            EngineError::Query(QueryError::Configuration(e))
            | EngineError::Paging(PagingError::Query(QueryError::Configuration(e))) => Some(e),
            _ => None,
        }
    }
}
