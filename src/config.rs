use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::problem::{Mix, Pool};
use crate::timer::DEFAULT_DURATION_MINUTES;

/// User configuration. Unset fields defer to the pool's own contest
/// defaults, then to the built-in ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pool_path: Option<PathBuf>,
    pub duration_minutes: Option<u64>,
    pub mix: Option<Mix>,
}

impl Config {
    pub fn resolve_mix(&self, pool: &Pool) -> Mix {
        self.mix.or(pool.defaults.mix).unwrap_or_default()
    }

    pub fn resolve_duration(&self, pool: &Pool) -> u64 {
        self.duration_minutes
            .or(pool.defaults.duration_minutes)
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("mockcontest_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "ignoring invalid config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ContestDefaults;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            pool_path: Some(PathBuf::from("/tmp/pool.json")),
            duration_minutes: Some(45),
            mix: Some(Mix::new(0, 3, 2)),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_config_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"duration_minutes": 30}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.duration_minutes, Some(30));
        assert_eq!(cfg.mix, None);
    }

    #[test]
    fn config_overrides_pool_defaults() {
        let pool = Pool {
            defaults: ContestDefaults {
                duration_minutes: Some(90),
                mix: Some(Mix::new(2, 2, 2)),
            },
            ..Default::default()
        };

        let empty = Config::default();
        assert_eq!(empty.resolve_duration(&pool), 90);
        assert_eq!(empty.resolve_mix(&pool), Mix::new(2, 2, 2));

        let cfg = Config {
            duration_minutes: Some(20),
            mix: Some(Mix::new(1, 1, 1)),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_duration(&pool), 20);
        assert_eq!(cfg.resolve_mix(&pool), Mix::new(1, 1, 1));

        assert_eq!(empty.resolve_duration(&Pool::default()), DEFAULT_DURATION_MINUTES);
        assert_eq!(empty.resolve_mix(&Pool::default()), Mix::default());
    }
}
