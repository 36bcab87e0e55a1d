//! CSV export of health logs.

use crate::domain::HealthLog;
use crate::domain::ids::to_iso;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    user_id: &'a str,
    log_type: &'static str,
    value: f64,
    unit: &'a str,
    notes: Option<&'a str>,
    logged_at: String,
    created_at: String,
}

impl<'a> From<&'a HealthLog> for CsvRow<'a> {
    fn from(log: &'a HealthLog) -> Self {
        CsvRow {
            id: log.id(),
            user_id: log.user_id(),
            log_type: log.log_type().as_str(),
            value: log.value(),
            unit: log.unit(),
            notes: log.notes(),
            logged_at: to_iso(&log.logged_at()),
            created_at: to_iso(&log.created_at()),
        }
    }
}

/// Append `logs` to the CSV at `csv_path`, writing headers if the file is new
///
/// Returns the number of rows written. The file is fsynced before returning.
pub fn export_logs_csv(logs: &[HealthLog], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let write_headers = !csv_path.exists()
        || std::fs::metadata(csv_path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_headers)
        .from_writer(&file);

    for log in logs {
        writer.serialize(CsvRow::from(log))?;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?;

    tracing::info!("Exported {} logs to {:?}", logs.len(), csv_path);
    Ok(logs.len())
}
