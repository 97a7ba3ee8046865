// sync configuration: defaults, TOON file, environment overrides
use std::path::{Path, PathBuf};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::records::WellExclusions;
use crate::error::ConfigError;

pub const ENV_BATCH_SIZE: &str = "WELLMATCH_BATCH_SIZE";
pub const ENV_MAX_CONCURRENT_BATCHES: &str = "WELLMATCH_MAX_CONCURRENT_BATCHES";
pub const ENV_REGISTRY_BATCH_SIZE: &str = "WELLMATCH_REGISTRY_BATCH_SIZE";
pub const ENV_ACTIVITY_WINDOW_MONTHS: &str = "WELLMATCH_ACTIVITY_WINDOW_MONTHS";
pub const ENV_SNAPSHOT_PATH: &str = "WELLMATCH_SNAPSHOT_PATH";

/// Where property/well/link records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Snapshot(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Links per read/write request. Bounded by the store's per-request item limit.
    pub batch_size: usize,
    /// How many batch requests may be in flight at once.
    pub max_concurrent_batches: usize,
    /// Distinct locations per registry query in Discover-and-Track.
    pub registry_batch_size: usize,
    /// Skip wells with no activity in the last N months. `None` keeps every well.
    pub activity_window_months: Option<u32>,
    pub exclusions: WellExclusions,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_batches: 4,
            registry_batch_size: 50,
            activity_window_months: None,
            exclusions: WellExclusions::default(),
            snapshot_path: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("`{raw}` is not a valid number"),
    })
}

impl SyncConfig {
    /// Read a TOON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SyncConfig = toon_format::decode_default(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `WELLMATCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from any key lookup; blank values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = non_empty(lookup(ENV_BATCH_SIZE)) {
            self.batch_size = parse_env(ENV_BATCH_SIZE, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_MAX_CONCURRENT_BATCHES)) {
            self.max_concurrent_batches = parse_env(ENV_MAX_CONCURRENT_BATCHES, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_REGISTRY_BATCH_SIZE)) {
            self.registry_batch_size = parse_env(ENV_REGISTRY_BATCH_SIZE, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_ACTIVITY_WINDOW_MONTHS)) {
            self.activity_window_months = Some(parse_env(ENV_ACTIVITY_WINDOW_MONTHS, &raw)?);
        }
        if let Some(raw) = non_empty(lookup(ENV_SNAPSHOT_PATH)) {
            self.snapshot_path = Some(PathBuf::from(raw));
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("batch_size", self.batch_size),
            ("max_concurrent_batches", self.max_concurrent_batches),
            ("registry_batch_size", self.registry_batch_size),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid { field, reason: "must be at least 1".to_string() });
            }
        }
        Ok(())
    }

    pub fn backend(&self) -> StoreBackend {
        match &self.snapshot_path {
            Some(path) => StoreBackend::Snapshot(path.clone()),
            None => StoreBackend::Memory,
        }
    }

    /// Earliest activity date a well needs to be considered, relative to `as_of`.
    pub fn activity_cutoff(&self, as_of: NaiveDate) -> Option<NaiveDate> {
        let months = self.activity_window_months?;
        as_of.checked_sub_months(Months::new(months))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = SyncConfig::default();
        config.validate().unwrap();
        assert_eq!(config.backend(), StoreBackend::Memory);
        assert!(config.activity_cutoff(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()).is_none());
    }

    #[test]
    fn env_overrides_apply_and_blank_is_ignored() {
        let mut config = SyncConfig::default();
        config
            .apply_env_with(lookup(&[
                (ENV_BATCH_SIZE, "10"),
                (ENV_MAX_CONCURRENT_BATCHES, " 2 "),
                (ENV_REGISTRY_BATCH_SIZE, "   "),
                (ENV_ACTIVITY_WINDOW_MONTHS, "12"),
                (ENV_SNAPSHOT_PATH, "/tmp/snap.toon"),
            ]))
            .unwrap();

        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_concurrent_batches, 2);
        assert_eq!(config.registry_batch_size, 50);
        assert_eq!(config.activity_window_months, Some(12));
        assert_eq!(config.backend(), StoreBackend::Snapshot(PathBuf::from("/tmp/snap.toon")));
    }

    #[test]
    fn env_rejects_garbage_and_zero() {
        let mut config = SyncConfig::default();
        let err = config.apply_env_with(lookup(&[(ENV_BATCH_SIZE, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: ENV_BATCH_SIZE, .. }));

        let mut config = SyncConfig::default();
        let err = config.apply_env_with(lookup(&[(ENV_MAX_CONCURRENT_BATCHES, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_concurrent_batches", .. }));
    }

    #[test]
    fn activity_cutoff_subtracts_calendar_months() {
        let config = SyncConfig { activity_window_months: Some(1), ..SyncConfig::default() };
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        //clamped to the end of February
        assert_eq!(config.activity_cutoff(as_of), NaiveDate::from_ymd_opt(2025, 2, 28));
    }

    #[test]
    fn load_reads_toon_file() {
        let config = SyncConfig { batch_size: 25, activity_window_months: Some(6), ..SyncConfig::default() };
        let text = toon_format::encode_default(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellmatch.toon");
        std::fs::write(&path, text).unwrap();

        let loaded = SyncConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SyncConfig::load(Path::new("/definitely/not/here.toon")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
