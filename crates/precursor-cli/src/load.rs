//! Loading historical records from CSV files.

use std::{fs::File, io, path::Path};

use anyhow::{Context, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use precursor_core::{HistoricalRecord, TimeKey};

/// How the time column orders an entity's records.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeKind {
    /// Date-time strings (ISO-8601 or `%Y-%m-%d %H:%M:%S`).
    #[default]
    Timestamp,
    /// Numeric running time, such as cumulative operating hours.
    Runtime,
    /// Position of the row in the file; no time column is read.
    RowOrder,
}

/// Column layout of a records file.
#[derive(Debug, Clone, clap::Args)]
pub struct CsvLayout {
    /// Column holding the entity (machine) id
    #[arg(long, default_value = "Machine_ID")]
    pub id_column: String,
    /// Column holding the time key
    #[arg(long, default_value = "Timestamp")]
    pub time_column: String,
    /// Column holding the failure flag (1/true/yes)
    #[arg(long, default_value = "Failure_Status")]
    pub failure_column: String,
    /// Interpretation of the time column
    #[arg(long, value_enum, default_value_t = TimeKind::Timestamp)]
    pub time_kind: TimeKind,
    /// Sensor columns to read (default: every other column)
    #[arg(long, value_delimiter = ',')]
    pub sensor_columns: Option<Vec<String>>,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            id_column: "Machine_ID".to_owned(),
            time_column: "Timestamp".to_owned(),
            failure_column: "Failure_Status".to_owned(),
            time_kind: TimeKind::default(),
            sensor_columns: None,
        }
    }
}

pub fn load_records(path: &Path, layout: &CsvLayout) -> anyhow::Result<Vec<HistoricalRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open records file: {}", path.display()))?;
    read_records(io::BufReader::new(file), layout)
        .with_context(|| format!("Failed to load records file: {}", path.display()))
}

/// Reads records from CSV data, sorted by entity and then time.
pub fn read_records<R>(reader: R, layout: &CsvLayout) -> anyhow::Result<Vec<HistoricalRecord>>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader
        .headers()
        .context("Failed to read CSV header")?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Missing required column: {name}"))
    };

    let id_index = column(&layout.id_column)?;
    let failure_index = column(&layout.failure_column)?;
    let time_index = match layout.time_kind {
        TimeKind::RowOrder => None,
        TimeKind::Timestamp | TimeKind::Runtime => Some(column(&layout.time_column)?),
    };
    let sensors: Vec<(usize, String)> = match &layout.sensor_columns {
        Some(names) => names
            .iter()
            .map(|name| Ok((column(name)?, name.clone())))
            .collect::<anyhow::Result<_>>()?,
        None => headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_index && *i != failure_index && Some(*i) != time_index)
            .filter(|(_, name)| {
                layout.time_kind != TimeKind::RowOrder || *name != layout.time_column
            })
            .map(|(i, name)| (i, name.to_owned()))
            .collect(),
    };
    tracing::debug!(sensors = sensors.len(), "resolved CSV columns");

    let mut records = vec![];
    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let fields = result.with_context(|| format!("Failed to read CSV row at line {line}"))?;
        let field = |index: usize| fields.get(index).unwrap_or("");

        let time_key = match (layout.time_kind, time_index) {
            (TimeKind::Timestamp, Some(index)) => {
                let value = field(index);
                let Some(timestamp) = parse_timestamp(value) else {
                    bail!("Could not parse timestamp {value:?} at line {line}");
                };
                TimeKey::Timestamp(timestamp)
            }
            (TimeKind::Runtime, Some(index)) => {
                let value = field(index);
                let runtime = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .with_context(|| format!("Could not parse runtime {value:?} at line {line}"))?;
                TimeKey::Runtime(runtime)
            }
            _ => TimeKey::Ordinal(row as u64),
        };

        let failure = parse_flag(field(failure_index));
        let mut record = HistoricalRecord::new(field(id_index), time_key, failure);
        for (index, name) in &sensors {
            // unparsable readings stay unknown
            if let Ok(value) = field(*index).parse::<f64>() {
                record.sensors.insert(name.clone(), value);
            }
        }
        records.push(record);
    }

    records.sort_by(|a, b| {
        a.entity_id
            .cmp(&b.entity_id)
            .then_with(|| a.time_key.total_cmp(&b.time_key))
    });
    tracing::info!(records = records.len(), "loaded records");
    Ok(records)
}

fn parse_flag(value: &str) -> bool {
    ["1", "true", "yes"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
