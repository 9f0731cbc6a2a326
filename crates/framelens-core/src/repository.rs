use thiserror::Error;

use crate::{DeviceDefinition, ParsedReport};

/// Errors returned by [`DeviceRepository`] edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("a device named '{0}' already exists")]
    DuplicateName(String),
    #[error("device '{0}' not found")]
    NotFound(String),
    #[error("device name must not be empty")]
    EmptyName,
}

/// In-memory device collection with case-insensitive unique names.
///
/// Persistence is the caller's business: load with
/// [`DeviceStore::load`](crate::DeviceStore::load), wrap with
/// [`from_devices`](Self::from_devices), save [`devices`](Self::devices).
///
/// # Examples
/// ```
/// use framelens_core::{DeviceDefinition, DeviceRepository, RepositoryError};
///
/// let mut repo = DeviceRepository::default();
/// repo.add(DeviceDefinition::new("Meter"))?;
/// assert!(repo.find("METER").is_some());
/// assert_eq!(
///     repo.add(DeviceDefinition::new("meter")),
///     Err(RepositoryError::DuplicateName("meter".to_string()))
/// );
/// # Ok::<(), RepositoryError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRepository {
    devices: Vec<DeviceDefinition>,
}

impl DeviceRepository {
    pub fn from_devices(devices: Vec<DeviceDefinition>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[DeviceDefinition] {
        &self.devices
    }

    pub fn into_devices(self) -> Vec<DeviceDefinition> {
        self.devices
    }

    pub fn find(&self, name: &str) -> Option<&DeviceDefinition> {
        self.position(name).map(|index| &self.devices[index])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut DeviceDefinition> {
        self.position(name).map(|index| &mut self.devices[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut DeviceDefinition, RepositoryError> {
        self.find_mut(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    pub fn add(&mut self, mut device: DeviceDefinition) -> Result<(), RepositoryError> {
        device.name = device.name.trim().to_string();
        if device.name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }
        if self.position(&device.name).is_some() {
            return Err(RepositoryError::DuplicateName(device.name));
        }
        self.devices.push(device);
        Ok(())
    }

    /// Renames `current` to `new_name` (trimmed). Renaming to the same name
    /// modulo case is allowed; colliding with another device is not.
    pub fn rename(&mut self, current: &str, new_name: &str) -> Result<(), RepositoryError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }
        let index = self
            .position(current)
            .ok_or_else(|| RepositoryError::NotFound(current.to_string()))?;
        if let Some(other) = self.position(new_name) {
            if other != index {
                return Err(RepositoryError::DuplicateName(new_name.to_string()));
            }
        }
        self.devices[index].name = new_name.to_string();
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<DeviceDefinition, RepositoryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        Ok(self.devices.remove(index))
    }

    /// Moves an edited device to the front of the list.
    pub fn promote(&mut self, name: &str) -> Result<(), RepositoryError> {
        let device = self.remove(name)?;
        self.devices.insert(0, device);
        Ok(())
    }

    /// First free `"{base} N"` name, counting from 1.
    pub fn unique_name(&self, base: &str) -> String {
        (1..)
            .map(|index| format!("{base} {index}"))
            .find(|name| self.position(name).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Appends a decode result to the device's history.
    pub fn record_report(&mut self, name: &str, report: ParsedReport) -> Result<(), RepositoryError> {
        self.get_mut(name)?.reports.push(report);
        Ok(())
    }

    /// Drops the device's whole history, returning how many reports were removed.
    pub fn clear_reports(&mut self, name: &str) -> Result<usize, RepositoryError> {
        let device = self.get_mut(name)?;
        let count = device.reports.len();
        device.reports.clear();
        Ok(count)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.devices
            .iter()
            .position(|device| same_name(&device.name, name))
    }
}

/// Case-insensitive comparison that also folds non-ASCII letters.
fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{DeviceRepository, RepositoryError};
    use crate::{DeviceDefinition, ParsedReport};

    fn repo(names: &[&str]) -> DeviceRepository {
        DeviceRepository::from_devices(names.iter().map(|n| DeviceDefinition::new(*n)).collect())
    }

    fn report(device: &str) -> ParsedReport {
        ParsedReport {
            timestamp: datetime!(2024-01-01 00:00 UTC),
            raw_data_hex: String::new(),
            parsed_fields: Vec::new(),
            device_name: device.to_string(),
        }
    }

    #[test]
    fn rename_enforces_unique_names() {
        let mut repo = repo(&["Alpha", "Beta"]);
        assert_eq!(
            repo.rename("alpha", " BETA "),
            Err(RepositoryError::DuplicateName("BETA".to_string()))
        );
        repo.rename("alpha", "ALPHA").expect("case-only rename");
        assert_eq!(repo.devices()[0].name, "ALPHA");
        assert_eq!(repo.rename("alpha", "  "), Err(RepositoryError::EmptyName));
        assert_eq!(
            repo.rename("gamma", "Delta"),
            Err(RepositoryError::NotFound("gamma".to_string()))
        );
    }

    #[test]
    fn names_fold_non_ascii_case() {
        let mut repo = repo(&["Ölmesser"]);
        assert!(repo.find("ÖLMESSER").is_some());
        assert_eq!(
            repo.add(DeviceDefinition::new("ölmesser")),
            Err(RepositoryError::DuplicateName("ölmesser".to_string()))
        );
    }

    #[test]
    fn unique_name_skips_taken_names() {
        let repo = repo(&["Device 1", "device 2"]);
        assert_eq!(repo.unique_name("Device"), "Device 3");
    }

    #[test]
    fn promote_moves_device_to_front() {
        let mut repo = repo(&["a", "b", "c"]);
        repo.promote("c").expect("promote");
        let names: Vec<_> = repo.devices().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn history_appends_and_clears() {
        let mut repo = repo(&["Gauge"]);
        repo.record_report("gauge", report("Gauge")).expect("record");
        repo.record_report("Gauge", report("Gauge")).expect("record");
        assert_eq!(repo.find("Gauge").map(|d| d.reports.len()), Some(2));
        assert_eq!(repo.clear_reports("Gauge"), Ok(2));
        assert!(repo.find("Gauge").is_some_and(|d| d.reports.is_empty()));
        assert!(repo.record_report("missing", report("x")).is_err());
    }

    #[test]
    fn remove_returns_the_device() {
        let mut repo = repo(&["a", "b"]);
        assert_eq!(repo.remove("A").map(|d| d.name), Ok("a".to_string()));
        assert_eq!(repo.devices().len(), 1);
    }
}
