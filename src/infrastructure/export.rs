// Export plumbing shared by the CSV and SVG writers
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export: the chart has no data")]
    NoData,

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `chart-data-{epoch_millis}.{extension}`
pub fn default_file_name(at: DateTime<Utc>, extension: &str) -> String {
    format!("chart-data-{}.{}", at.timestamp_millis(), extension)
}

pub fn write_export(dir: &Path, file_name: &str, body: &str) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, body)?;
    tracing::info!("Exported {} bytes to {}", body.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_file_name() {
        let at = Utc.timestamp_millis_opt(1_717_200_000_123).unwrap();
        assert_eq!(default_file_name(at, "csv"), "chart-data-1717200000123.csv");
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write_export(&target, "chart.csv", "Timestamp\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Timestamp\n");
    }
}
