// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod problem;
pub mod recency;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod storage;
pub mod timer;
pub mod ui;
pub mod util;

pub use error::{ContestError, PoolError, SelectionError, StorageError};
pub use problem::{Difficulty, Mix, Pool, Problem};
pub use sampler::select_problems;
