use crate::model::{CategoryId, DictionaryId, ViewId};

/// Storage failure: constraint violation, I/O or a row that cannot be read back.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.unwrap_or_else(|| err.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

/// A view/sort configuration that names something the dictionary doesn't have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown dictionary: {0}")]
    UnknownDictionary(DictionaryId),

    #[error("unknown view {view} in dictionary {dictionary}")]
    UnknownView {
        dictionary: DictionaryId,
        view: ViewId,
    },

    #[error("unknown category {category} in dictionary {dictionary}")]
    UnknownCategory {
        dictionary: DictionaryId,
        category: CategoryId,
    },

    #[error("category {0} is not sortable")]
    NotSortable(CategoryId),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        QueryError::Store(e.into())
    }
}
