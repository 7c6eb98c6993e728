use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::dataset::Dataset;
use crate::record::{FlowRecord, RawFlow};

/// Failure to produce any dataset from an input file. Per-line problems are
/// not errors; they are logged and skipped.
#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    /// The file was readable but not a single line parsed as a flow.
    NoValidFlows(PathBuf),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Io(err) => write!(f, "i/o error: {err}"),
            ParseError::NoValidFlows(path) => {
                write!(f, "no valid flows found in {}", path.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(err) => Some(err),
            ParseError::NoValidFlows(_) => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

/// Wildcard token marking an unknown numeric value in the dataset.
const WILDCARD: &str = "*";
/// Minimum positional fields for a usable line; the label (field 15) is
/// optional and defaults to "Unknown".
const MIN_FIELDS: usize = 14;

/// Parses a binetflow file into an enriched [`Dataset`].
///
/// Blank lines and `#` comment lines are skipped silently. A malformed line
/// is logged with its line number and dropped; parsing continues. An
/// unreadable file, or a file yielding zero usable lines, is a failure with
/// no partial dataset.
pub fn parse_binetflow_file(path: &Path) -> Result<Dataset, ParseError> {
    info!("Parsing NetFlow file: {}", path.display());

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut raw_flows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Some(raw) => raw_flows.push(raw),
            None => warn!("Error parsing line {}: {line}", index + 1),
        }
    }

    if raw_flows.is_empty() {
        return Err(ParseError::NoValidFlows(path.to_path_buf()));
    }

    let records: Vec<FlowRecord> = raw_flows.into_iter().map(FlowRecord::enrich).collect();
    info!("Parsed {} NetFlow records", records.len());

    Ok(Dataset::new(records))
}

/// Splits and coerces one data line. Comma-separated and whitespace-separated
/// layouts both occur in the wild; a comma anywhere selects strict comma
/// splitting with trimmed fields.
pub(crate) fn parse_line(line: &str) -> Option<RawFlow> {
    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };

    if fields.len() < MIN_FIELDS {
        return None;
    }

    Some(RawFlow {
        start_time: fields[0].to_string(),
        duration: parse_float_field(fields[1])?,
        protocol: fields[2].to_string(),
        src_addr: fields[3].to_string(),
        sport: fields[4].to_string(),
        direction: fields[5].to_string(),
        dst_addr: fields[6].to_string(),
        dport: fields[7].to_string(),
        state: fields[8].to_string(),
        s_tos: fields[9].to_string(),
        d_tos: fields[10].to_string(),
        tot_pkts: parse_int_field(fields[11])?,
        tot_bytes: parse_int_field(fields[12])?,
        src_bytes: parse_int_field(fields[13])?,
        label: fields
            .get(MIN_FIELDS)
            .map_or_else(|| "Unknown".to_string(), |label| label.to_string()),
    })
}

fn parse_float_field(field: &str) -> Option<f64> {
    if field == WILDCARD {
        return Some(0.0);
    }
    field.parse().ok()
}

fn parse_int_field(field: &str) -> Option<i64> {
    if field == WILDCARD {
        return Some(0);
    }
    field.parse().ok()
}

/// Parses every `.binetflow` file in a directory. Individual file failures
/// are logged and skipped so a batch run continues across scenarios.
pub fn parse_all_scenarios(data_dir: &Path) -> io::Result<Vec<(String, Dataset)>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "binetflow"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!("No .binetflow files found in {}", data_dir.display());
        return Ok(Vec::new());
    }

    let mut parsed = Vec::new();
    for path in paths {
        let scenario = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_binetflow_file(&path) {
            Ok(dataset) => parsed.push((scenario, dataset)),
            Err(err) => {
                warn!("Failed to parse {}: {err}", path.display());
                debug!("Skipping scenario {scenario}");
            }
        }
    }

    info!("Successfully parsed {} scenario files", parsed.len());
    Ok(parsed)
}
