//! Report export as JSON, plain text, or CSV.
//!
//! The format is chosen from the destination extension (`.json`, `.txt`,
//! `.csv`, case-insensitive). Files are written atomically.

mod csv;
pub mod error;
mod json;
mod text;

use std::path::Path;

use time::macros::format_description;

pub use error::ExportError;

use crate::ParsedReport;
use crate::store::write_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
    Csv,
}

impl ExportFormat {
    /// Format implied by the path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ExportFormat::Json),
            "txt" => Some(ExportFormat::Text),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Renders `reports` in `format`, in the order given.
pub fn render_reports(reports: &[ParsedReport], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => json::render(reports),
        ExportFormat::Text => text::render(reports),
        ExportFormat::Csv => csv::render(reports),
    }
}

/// Writes `reports` to `path`, picking the format from its extension.
/// Returns the format used.
pub fn export_reports(reports: &[ParsedReport], path: &Path) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path).ok_or_else(|| ExportError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let rendered = render_reports(reports, format)?;
    write_atomic(path, rendered.as_bytes()).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), reports = reports.len(), ?format, "reports exported");
    Ok(format)
}

fn export_timestamp(report: &ParsedReport) -> Result<String, ExportError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    Ok(report.timestamp.format(format)?)
}


#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{ExportError, ExportFormat, export_reports, fixtures};

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.JSON")), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_path(Path::new("a.txt")), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::from_path(Path::new("dir/a.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("a.xml")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn export_writes_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("out.csv");
        let format = export_reports(&[fixtures::report()], &path).expect("export");
        assert_eq!(format, ExportFormat::Csv);
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.starts_with("Timestamp,Device,"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("out.xml");
        let err = export_reports(&[fixtures::report()], &path).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }
}
