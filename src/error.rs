use thiserror::Error;

use crate::problem::Difficulty;

/// Failures of a single draw. The pool is static, so retrying never helps.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// The resolved pool contains no problems at all.
    #[error("empty problems pool")]
    EmptyPool,

    /// A stratum cannot satisfy the requested count even with recently seen
    /// problems let back in.
    #[error("not enough {difficulty} problems: requested {requested}, pool has {available}")]
    InsufficientPool {
        difficulty: Difficulty,
        requested: usize,
        available: usize,
    },
}

/// Failures while resolving a pool document.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to read pool {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pool json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bundled pool {0} not found")]
    MissingBundled(String),
}

/// Failures of the persisted key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("state database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a contest action
#[derive(Error, Debug)]
pub enum ContestError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_pool_message_names_the_stratum() {
        let err = SelectionError::InsufficientPool {
            difficulty: Difficulty::Hard,
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "not enough hard problems: requested 3, pool has 1"
        );
    }
}
