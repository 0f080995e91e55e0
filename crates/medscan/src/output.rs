use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;

use medscan_types::ScanReport;

/// One scanned input and its report, as serialized to the caller.
#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub input: PathBuf,
    #[serde(flatten)]
    pub report: ScanReport,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes the reports to the target file, or stdout when none is set. A
/// single scan serializes as one object, a batch as an array.
pub async fn write_reports(
    entries: &[ReportEntry],
    target: Option<&Path>,
    pretty: bool,
) -> Result<(), OutputError> {
    let encoded = encode(entries, pretty)?;
    match target {
        Some(path) => fs::write(path, encoded).await?,
        None => println!("{encoded}"),
    }
    Ok(())
}

fn encode(entries: &[ReportEntry], pretty: bool) -> Result<String, serde_json::Error> {
    match entries {
        [single] => {
            if pretty {
                serde_json::to_string_pretty(single)
            } else {
                serde_json::to_string(single)
            }
        }
        many => {
            if pretty {
                serde_json::to_string_pretty(many)
            } else {
                serde_json::to_string(many)
            }
        }
    }
}
