use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::dataset::DatasetError;
use crate::record::{FloatRecord, Variable};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("csv"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format {other:?} (expected csv or json)")),
        }
    }
}

const FIXED_COLUMNS: [&str; 8] = [
    "id",
    "platform_id",
    "cycle_number",
    "profile_date",
    "qc_flag",
    "lat",
    "lon",
    "depth_m",
];

/// Columns written for `variables`, in stable `Variable` order.
pub fn export_columns(variables: impl IntoIterator<Item = Variable>) -> Vec<Variable> {
    let mut cols: Vec<Variable> = variables.into_iter().collect();
    cols.sort();
    cols.dedup();
    cols
}

/// Write records as CSV with only the selected variable columns.
///
/// Variables a record does not carry are written as empty cells.
pub fn write_csv<W: std::io::Write>(
    writer: W,
    records: &[FloatRecord],
    variables: &[Variable],
) -> Result<(), DatasetError> {
    let columns = export_columns(variables.iter().copied());
    let mut out = csv::Writer::from_writer(writer);

    let header = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(columns.iter().map(|v| v.column()));
    out.write_record(header)
        .map_err(|e| DatasetError::Export(e.to_string()))?;

    for r in records {
        let mut row = vec![
            r.id.to_string(),
            r.platform_id.clone(),
            r.cycle_number.to_string(),
            r.profile_date.to_string(),
            r.qc_flag.code().to_string(),
            r.position.lat.to_string(),
            r.position.lon.to_string(),
            r.depth_m.to_string(),
        ];
        for v in &columns {
            row.push(r.value(*v).map(|x| x.to_string()).unwrap_or_default());
        }
        out.write_record(&row)
            .map_err(|e| DatasetError::Export(e.to_string()))?;
    }

    out.flush().map_err(|e| DatasetError::Export(e.to_string()))
}

/// Records as a JSON array of objects with only the selected variables.
pub fn to_json(records: &[FloatRecord], variables: &[Variable]) -> Value {
    let columns = export_columns(variables.iter().copied());
    let rows = records
        .iter()
        .map(|r| {
            let mut obj = Map::new();
            obj.insert("id".into(), json!(r.id));
            obj.insert("platform_id".into(), json!(r.platform_id));
            obj.insert("cycle_number".into(), json!(r.cycle_number));
            obj.insert("profile_date".into(), json!(r.profile_date));
            obj.insert("qc_flag".into(), json!(r.qc_flag));
            obj.insert("lat".into(), json!(r.position.lat));
            obj.insert("lon".into(), json!(r.position.lon));
            obj.insert("depth_m".into(), json!(r.depth_m));
            for v in &columns {
                obj.insert(v.column().into(), json!(r.value(*v)));
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}
