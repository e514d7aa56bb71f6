//! Runtime Configuration
//!
//! Size limits, storage location and the reserved request-parameter names.
//! Every knob has a default; `KvsConfig::from_env` overlays `EASYKVS_*`
//! environment variables on top of those defaults.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_VALUE_LENGTH: usize = 64_000;
pub const DEFAULT_MAX_DATA_SIZE: u64 = 10_000_000;
pub const DEFAULT_LIFE_TIME: Duration = Duration::from_secs(86_400 * 7);

/// Parameter names that select the operation instead of carrying payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeys {
    pub mode: String,
    pub person_id: String,
    pub callback: String,
}

impl ReservedKeys {
    pub fn contains(&self, name: &str) -> bool {
        name == self.mode || name == self.person_id || name == self.callback
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self {
            mode: "__mode__".to_string(),
            person_id: "__person_id__".to_string(),
            callback: "__jsonp__".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KvsConfig {
    /// Root of the sharded record tree.
    pub data_dir: PathBuf,
    /// Extension of record files, without the dot.
    pub file_extension: String,
    /// Upper bound (bytes) for a single incoming value.
    pub max_value_length: usize,
    /// Upper bound (bytes) for the sum of all values of one record.
    pub max_data_size: u64,
    pub reserved: ReservedKeys,
    /// Idle lifetime of a record. Nothing enforces it yet.
    pub life_time: Duration,
    /// Write a deny-all `.htaccess` into the data directory on startup.
    pub enable_access_marker: bool,
}

impl Default for KvsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_extension: "txt".to_string(),
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            max_data_size: DEFAULT_MAX_DATA_SIZE,
            reserved: ReservedKeys::default(),
            life_time: DEFAULT_LIFE_TIME,
            enable_access_marker: true,
        }
    }
}

impl KvsConfig {
    /// Defaults overlaid with whichever `EASYKVS_*` variables are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("EASYKVS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("EASYKVS_MAX_VALUE_LENGTH") {
            config.max_value_length = parse_var("EASYKVS_MAX_VALUE_LENGTH", &raw)?;
        }
        if let Some(raw) = lookup("EASYKVS_MAX_DATA_SIZE") {
            config.max_data_size = parse_var("EASYKVS_MAX_DATA_SIZE", &raw)?;
        }
        if let Some(key) = lookup("EASYKVS_MODE_KEY") {
            config.reserved.mode = key;
        }
        if let Some(key) = lookup("EASYKVS_PERSON_ID_KEY") {
            config.reserved.person_id = key;
        }
        if let Some(key) = lookup("EASYKVS_CALLBACK_KEY") {
            config.reserved.callback = key;
        }
        if let Some(raw) = lookup("EASYKVS_LIFE_TIME_SECS") {
            config.life_time = Duration::from_secs(parse_var("EASYKVS_LIFE_TIME_SECS", &raw)?);
        }
        if let Some(raw) = lookup("EASYKVS_ACCESS_MARKER") {
            config.enable_access_marker = parse_var("EASYKVS_ACCESS_MARKER", &raw)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value for {}: {:?}", name, raw))
}
