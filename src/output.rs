use std::fs::File;
use std::io;
use std::path::Path;

use csv::{Error as CsvError, ReaderBuilder, Trim, Writer};
use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::FlowRecord;

#[derive(Debug)]
pub enum ReadError {
    Io(io::Error),
    Csv(CsvError),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(err) => write!(f, "i/o error: {err}"),
            ReadError::Csv(err) => write!(f, "csv error: {err}"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        ReadError::Io(err)
    }
}

impl From<CsvError> for ReadError {
    fn from(err: CsvError) -> Self {
        ReadError::Csv(err)
    }
}

/// Writes the enriched dataset as flat tabular rows, one per flow record.
pub fn save_processed(dataset: &Dataset, path: &Path) -> Result<(), ReadError> {
    let mut writer = Writer::from_path(path)?;
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Saved processed data to {}", path.display());
    Ok(())
}

/// Loads a processed CSV back into a dataset. Rows that fail to deserialize
/// fail the load; a processed file is expected to be well-formed.
pub fn load_processed(path: &Path) -> Result<Dataset, ReadError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut records: Vec<FlowRecord> = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }

    Ok(Dataset::new(records))
}

/// Serializes an analysis result structure as a pretty-printed JSON report.
pub fn write_json_report<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!("Saved report to {}", path.display());
    Ok(())
}
