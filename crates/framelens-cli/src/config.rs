use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the device store file.
pub const STORE_ENV: &str = "FRAMELENS_STORE";
/// Store file used when neither the flag nor the environment names one.
pub const DEFAULT_STORE_FILE: &str = "devices.json";

/// Runtime settings resolved from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
}

impl Settings {
    /// `--store` wins, then `FRAMELENS_STORE`, then `./devices.json`.
    pub fn resolve(store_flag: Option<PathBuf>) -> Self {
        Self::resolve_with(store_flag, std::env::var_os(STORE_ENV))
    }

    fn resolve_with(store_flag: Option<PathBuf>, store_env: Option<OsString>) -> Self {
        let store_path = store_flag
            .or_else(|| store_env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
        Self { store_path }
    }
}
