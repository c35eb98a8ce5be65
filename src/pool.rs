use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PoolError;
use crate::problem::Pool;

static POOL_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/pools");

pub const DEFAULT_POOL: &str = "google_pool";

/// Where problem pools come from
pub trait PoolProvider {
    fn load(&self) -> Result<Pool, PoolError>;
}

/// A pool compiled into the binary from `src/pools`
#[derive(Debug, Clone)]
pub struct BundledPool {
    name: String,
}

impl BundledPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for BundledPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL)
    }
}

impl PoolProvider for BundledPool {
    fn load(&self) -> Result<Pool, PoolError> {
        let file_name = format!("{}.json", self.name);
        let contents = POOL_DIR
            .get_file(&file_name)
            .and_then(|file| file.contents_utf8())
            .ok_or_else(|| PoolError::MissingBundled(file_name.clone()))?;
        Pool::from_json(contents)
    }
}

/// A pool document on disk
#[derive(Debug, Clone)]
pub struct FilePool {
    path: PathBuf,
}

impl FilePool {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PoolProvider for FilePool {
    fn load(&self) -> Result<Pool, PoolError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| PoolError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let pool = Pool::from_json(&contents)?;
        tracing::debug!(path = %self.path.display(), problems = pool.len(), "loaded pool");
        Ok(pool)
    }
}

/// File pool when a path is given, the bundled default otherwise
pub fn provider_for(path: Option<&Path>) -> Box<dyn PoolProvider> {
    match path {
        Some(path) => Box::new(FilePool::new(path)),
        None => Box::new(BundledPool::default()),
    }
}
