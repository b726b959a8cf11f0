use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, EmissionResult};
use crate::units::UnitKind;

/// Reference table compiled into the binary.
pub const BUNDLED_CSV: &str = include_str!("../data/emission_factors.csv");

/// One emission factor for an (activity, pollutant) pair.
///
/// Serializes back to the `Activity,Pollutant,EF,Unit,Source` row shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionFactorRecord {
    /// Activity name, e.g. "Frying (meat)".
    #[serde(rename = "Activity")]
    pub activity: String,
    /// Pollutant name, e.g. "PM2.5".
    #[serde(rename = "Pollutant")]
    pub pollutant: String,
    /// EF magnitude, always > 0.
    #[serde(rename = "EF")]
    pub ef: f64,
    /// Unit text as published, e.g. "g/kg-fuel".
    #[serde(rename = "Unit")]
    pub unit: String,
    /// Family derived from `unit` at load time.
    #[serde(skip)]
    pub unit_kind: UnitKind,
    /// Citation for the factor.
    #[serde(rename = "Source")]
    pub source: String,
}

/// Row shape of the reference CSV: `Activity,Pollutant,EF,Unit,Source`.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Activity")]
    activity: String,
    #[serde(rename = "Pollutant")]
    pollutant: String,
    #[serde(rename = "EF")]
    ef: String,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Source", default)]
    source: String,
}

impl RawRow {
    fn into_record(self, line: usize) -> EmissionResult<EmissionFactorRecord> {
        if self.activity.is_empty() {
            return Err(data_error(line, "empty Activity"));
        }
        if self.pollutant.is_empty() {
            return Err(data_error(line, "empty Pollutant"));
        }
        let ef: f64 = self
            .ef
            .parse()
            .map_err(|_| data_error(line, &format!("EF '{}' is not a number", self.ef)))?;
        if !ef.is_finite() || ef <= 0.0 {
            return Err(data_error(line, &format!("EF must be positive, got {}", ef)));
        }
        let unit_kind = UnitKind::classify(&self.unit);
        Ok(EmissionFactorRecord {
            activity: self.activity,
            pollutant: self.pollutant,
            ef,
            unit: self.unit,
            unit_kind,
            source: self.source,
        })
    }
}

fn data_error(line: usize, reason: &str) -> EmissionError {
    EmissionError::Data {
        line,
        reason: reason.to_string(),
    }
}

/// Read-only emission-factor table, loaded once and shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: Vec<EmissionFactorRecord>,
}

impl ReferenceTable {
    /// Build from parsed records, warning about duplicate pairs.
    pub fn new(records: Vec<EmissionFactorRecord>) -> Self {
        let table = ReferenceTable { records };
        for (activity, pollutant) in table.duplicate_pairs() {
            log::warn!(
                "duplicate emission factor for '{}' / '{}'; first row wins",
                activity,
                pollutant
            );
        }
        table
    }

    /// Parse CSV with a header row. Quoted fields may contain commas.
    pub fn from_reader<R: Read>(reader: R) -> EmissionResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        for (idx, row) in rdr.deserialize::<RawRow>().enumerate() {
            // header is line 1
            let line = idx + 2;
            records.push(row?.into_record(line)?);
        }
        log::debug!("loaded {} emission factor records", records.len());
        Ok(ReferenceTable::new(records))
    }

    /// Parse the CSV file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> EmissionResult<Self> {
        let file = File::open(path.as_ref())?;
        log::debug!("reading reference data from {}", path.as_ref().display());
        Self::from_reader(file)
    }

    /// Process-wide table parsed from [`BUNDLED_CSV`] on first use.
    pub fn bundled() -> EmissionResult<&'static ReferenceTable> {
        static BUNDLED: OnceLock<Result<ReferenceTable, String>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| Self::from_reader(BUNDLED_CSV.as_bytes()).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| EmissionError::Bundled(e.clone()))
    }

    /// All records in table order.
    pub fn records(&self) -> &[EmissionFactorRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique activities in first-appearance order.
    pub fn activities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.activity.as_str()) {
                out.push(&r.activity);
            }
        }
        out
    }

    /// Unique pollutants recorded for one activity, in table order.
    pub fn pollutants_for(&self, activity: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in self.records.iter().filter(|r| r.activity == activity) {
            if !out.contains(&r.pollutant.as_str()) {
                out.push(&r.pollutant);
            }
        }
        out
    }

    /// First record in table order matching the pair exactly.
    pub fn lookup(&self, activity: &str, pollutant: &str) -> EmissionResult<&EmissionFactorRecord> {
        self.records
            .iter()
            .find(|r| r.activity == activity && r.pollutant == pollutant)
            .ok_or_else(|| EmissionError::NotFound {
                activity: activity.to_string(),
                pollutant: pollutant.to_string(),
            })
    }

    /// (activity, pollutant) pairs that occur more than once.
    pub fn duplicate_pairs(&self) -> Vec<(&str, &str)> {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        let mut order: Vec<(&str, &str)> = Vec::new();
        for r in &self.records {
            let key = (r.activity.as_str(), r.pollutant.as_str());
            let n = counts.entry(key).or_insert(0);
            *n += 1;
            if *n == 2 {
                order.push(key);
            }
        }
        order
    }

    /// Rows whose activity+pollutant+source text contains `query`,
    /// case-insensitive. An empty query returns the whole table.
    pub fn search(&self, query: &str) -> Vec<&EmissionFactorRecord> {
        if query.is_empty() {
            return self.records.iter().collect();
        }
        let q = query.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                let haystack = format!("{}{}{}", r.activity, r.pollutant, r.source).to_lowercase();
                haystack.contains(&q)
            })
            .collect()
    }
}

/// Write records as `Activity,Pollutant,EF,Unit,Source` CSV with a header,
/// quoting fields as needed.
pub fn write_records_csv<W: Write>(
    records: &[&EmissionFactorRecord],
    writer: W,
) -> EmissionResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["Activity", "Pollutant", "EF", "Unit", "Source"])?;
    }
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}
