use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ExportError;

pub fn export_file_name(date: NaiveDate) -> String {
    format!("luct-reports-{}.xlsx", date.format("%Y-%m-%d"))
}

/// Downloads the backend-built spreadsheet of all reports into `dir`.
pub async fn download_reports(
    api: &ApiClient,
    dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, ExportError> {
    let bytes = api.export_reports(timeout).await?;
    if bytes.is_empty() {
        return Err(ExportError::Empty);
    }
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(export_file_name(Utc::now().date_naive()));
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "report export saved");
    Ok(path)
}
