//! Whole-collection persistence of device definitions.
//!
//! The store is a single UTF-8 JSON file holding an array of devices. Loads
//! read the whole file; saves replace it atomically (temp file in the same
//! directory, then rename), so a failed save leaves the previous file intact.

mod atomic;
pub mod error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) use atomic::write_atomic;
pub use error::StoreError;

use crate::DeviceDefinition;

/// JSON file holding every [`DeviceDefinition`].
///
/// # Examples
/// ```no_run
/// use framelens_core::{DeviceDefinition, DeviceStore};
///
/// let store = DeviceStore::new("devices.json");
/// let mut devices = store.load()?;
/// devices.push(DeviceDefinition::new("Meter"));
/// store.save(&devices)?;
/// # Ok::<(), framelens_core::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeviceStore {
    path: PathBuf,
}

impl DeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing file is an empty collection.
    pub fn load(&self) -> Result<Vec<DeviceDefinition>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let devices: Vec<DeviceDefinition> =
            serde_json::from_str(&json).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), devices = devices.len(), "device store loaded");
        Ok(devices)
    }

    /// Like [`load`](Self::load), but degrades to an empty collection.
    pub fn load_or_default(&self) -> Vec<DeviceDefinition> {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "device store unreadable; starting with no devices");
            Vec::new()
        })
    }

    /// Atomically replaces the file with `devices`.
    pub fn save(&self, devices: &[DeviceDefinition]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(devices).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, json.as_bytes()).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), devices = devices.len(), "device store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::DeviceStore;
    use crate::store::error::StoreError;
    use crate::{DeviceDefinition, PayloadFormat};

    #[test]
    fn missing_file_loads_empty() {
        let temp = TempDir::new().expect("tempdir");
        let store = DeviceStore::new(temp.path().join("devices.json"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn malformed_file_is_an_error_but_degrades() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("devices.json");
        fs::write(&path, "{ not json").expect("write");
        let store = DeviceStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("devices.json");
        fs::write(&path, "[]").expect("write");
        let store = DeviceStore::new(temp.path().join("missing").join("devices.json"));
        let err = store.save(&[DeviceDefinition::new("a")]).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "[]");
    }

    #[test]
    fn loads_legacy_integer_tags() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("devices.json");
        fs::write(
            &path,
            r#"[{"Name": "Old", "PayloadFormat": 1, "Endian": 1,
                 "Fields": [{"Name": "a", "Meaning": "a", "Offset": 0, "Length": 2, "Type": 2, "Endian": 1}],
                 "Reports": []}]"#,
        )
        .expect("write");
        let devices = DeviceStore::new(&path).load().expect("load");
        assert_eq!(devices[0].payload_format, PayloadFormat::Binary);
        assert_eq!(devices[0].fields[0].field_type, crate::FieldType::UInt16);
    }
}
