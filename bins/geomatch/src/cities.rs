//! Loading the reference city table from a file or URL.

use anyhow::{Context, Result};
use geomatch_cli::output::{format_count, Status};
use geomatch_cli::progress;
use geomatch_geo::{CityTable, LoadReport};
use geomatch_telemetry::Timer;
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads a CSV city table; `source` is a local path or an http(s) URL.
pub fn load_city_table(source: &str) -> Result<CityTable> {
    let timer = Timer::start("load_cities");

    let (table, report) = if is_url(source) {
        let body = download(source)?;
        CityTable::from_csv_reader(body.as_slice())
            .with_context(|| format!("Failed to read city table from {}", source))?
    } else {
        CityTable::from_path(source)
            .with_context(|| format!("Failed to read city table {}", source))?
    };

    report_skipped(&report);
    timer.stop();
    Ok(table)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn download(url: &str) -> Result<Vec<u8>> {
    let pb = progress::spinner(&format!("Downloading {}", url));

    let result = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .and_then(|client| client.get(url).send())
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes());

    match result {
        Ok(bytes) => {
            progress::finish_success(&pb, &format!("Downloaded {} bytes", bytes.len()));
            tracing::debug!(url, bytes = bytes.len(), "City table downloaded");
            Ok(bytes.to_vec())
        }
        Err(e) => {
            progress::finish_error(&pb, "Download failed");
            Err(e).with_context(|| format!("Failed to download city table from {}", url))
        }
    }
}

fn report_skipped(report: &LoadReport) {
    if report.skipped > 0 {
        Status::warning(&format!(
            "Skipped {} in city table",
            format_count(report.skipped, "malformed row", "malformed rows")
        ));
    }
}
