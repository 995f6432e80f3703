use std::fmt;

use chrono::NaiveDate;
use foundation::LatLon;
use serde::{Deserialize, Serialize};

/// Plausible surface temperature range (°C).
pub const TEMPERATURE_RANGE_C: (f64, f64) = (5.0, 35.0);
/// Plausible practical salinity range (PSU).
pub const SALINITY_RANGE_PSU: (f64, f64) = (33.0, 38.0);

/// Stable record identifier, e.g. `argo_17`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatId(pub String);

impl FloatId {
    pub fn new(id: impl Into<String>) -> Self {
        FloatId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FloatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quality-control classification. Only the two ARGO codes used by the
/// dashboard are valid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QcFlag {
    Good,
    Bad,
}

impl QcFlag {
    pub fn code(self) -> u8 {
        match self {
            QcFlag::Good => 1,
            QcFlag::Bad => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QcFlag::Good => "Good",
            QcFlag::Bad => "Poor",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidQcFlag(pub u8);

impl fmt::Display for InvalidQcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid qc flag {} (expected 1 or 4)", self.0)
    }
}

impl std::error::Error for InvalidQcFlag {}

impl TryFrom<u8> for QcFlag {
    type Error = InvalidQcFlag;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(QcFlag::Good),
            4 => Ok(QcFlag::Bad),
            other => Err(InvalidQcFlag(other)),
        }
    }
}

impl From<QcFlag> for u8 {
    fn from(flag: QcFlag) -> u8 {
        flag.code()
    }
}

/// Measured variables a user can toggle for export.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    Salinity,
    Pressure,
    Oxygen,
    Chlorophyll,
    Backscatter,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Temperature,
        Variable::Salinity,
        Variable::Pressure,
        Variable::Oxygen,
        Variable::Chlorophyll,
        Variable::Backscatter,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Salinity => "salinity",
            Variable::Pressure => "pressure",
            Variable::Oxygen => "oxygen",
            Variable::Chlorophyll => "chlorophyll",
            Variable::Backscatter => "backscatter",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variable::Temperature => "Temperature",
            Variable::Salinity => "Salinity",
            Variable::Pressure => "Pressure",
            Variable::Oxygen => "Dissolved Oxygen",
            Variable::Chlorophyll => "Chlorophyll-a",
            Variable::Backscatter => "Backscatter",
        }
    }

    pub fn parse(s: &str) -> Option<Variable> {
        Variable::ALL.into_iter().find(|v| v.column() == s)
    }
}

/// One simulated profile measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatRecord {
    pub id: FloatId,
    /// 7-digit WMO platform number.
    pub platform_id: String,
    pub cycle_number: u32,
    pub profile_date: NaiveDate,
    pub qc_flag: QcFlag,
    pub temperature: f64,
    pub salinity: f64,
    /// Maximum depth reached on this cycle.
    pub depth_m: u32,
    pub position: LatLon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordIssue {
    InvalidPlatformId(String),
    ZeroCycle,
    TemperatureOutOfRange(f64),
    SalinityOutOfRange(f64),
    DepthOutOfRange { depth_m: u32, ceiling_m: u32 },
    InvalidPosition(LatLon),
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIssue::InvalidPlatformId(id) => write!(f, "platform id {id:?} is not 7 digits"),
            RecordIssue::ZeroCycle => write!(f, "cycle number must be positive"),
            RecordIssue::TemperatureOutOfRange(t) => write!(f, "temperature {t} °C out of range"),
            RecordIssue::SalinityOutOfRange(s) => write!(f, "salinity {s} PSU out of range"),
            RecordIssue::DepthOutOfRange { depth_m, ceiling_m } => {
                write!(f, "depth {depth_m} m outside (0, {ceiling_m}]")
            }
            RecordIssue::InvalidPosition(p) => write!(f, "position {}, {} invalid", p.lat, p.lon),
        }
    }
}

impl FloatRecord {
    /// Value for an export column. Variables the simulated floats do not carry
    /// yield `None`. Pressure is approximated by depth (1 dbar ≈ 1 m).
    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Temperature => Some(self.temperature),
            Variable::Salinity => Some(self.salinity),
            Variable::Pressure => Some(f64::from(self.depth_m)),
            Variable::Oxygen | Variable::Chlorophyll | Variable::Backscatter => None,
        }
    }

    /// Plausibility checks. These are reported, never enforced: out-of-range
    /// records still load and are simply filtered by the depth range.
    pub fn validate(&self, depth_ceiling_m: u32) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        if self.platform_id.len() != 7 || !self.platform_id.bytes().all(|b| b.is_ascii_digit()) {
            issues.push(RecordIssue::InvalidPlatformId(self.platform_id.clone()));
        }
        if self.cycle_number == 0 {
            issues.push(RecordIssue::ZeroCycle);
        }
        let (t_lo, t_hi) = TEMPERATURE_RANGE_C;
        if !(t_lo..=t_hi).contains(&self.temperature) {
            issues.push(RecordIssue::TemperatureOutOfRange(self.temperature));
        }
        let (s_lo, s_hi) = SALINITY_RANGE_PSU;
        if !(s_lo..=s_hi).contains(&self.salinity) {
            issues.push(RecordIssue::SalinityOutOfRange(self.salinity));
        }
        if self.depth_m == 0 || self.depth_m > depth_ceiling_m {
            issues.push(RecordIssue::DepthOutOfRange {
                depth_m: self.depth_m,
                ceiling_m: depth_ceiling_m,
            });
        }
        if !self.position.is_valid() {
            issues.push(RecordIssue::InvalidPosition(self.position));
        }
        issues
    }

    /// Popup summary shown when a marker is opened.
    pub fn summary(&self) -> String {
        format!(
            "ARGO Float {}\nCycle: {}\nDate: {}\n\
             Temperature: {:.1}°C\nSalinity: {:.2} PSU\nDepth: {}m\nQC: {}",
            self.platform_id,
            self.cycle_number,
            self.profile_date,
            self.temperature,
            self.salinity,
            self.depth_m,
            self.qc_flag.label(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{FloatId, FloatRecord, QcFlag, RecordIssue, Variable};
    use chrono::NaiveDate;
    use foundation::LatLon;

    pub(crate) fn record(id: &str, qc: QcFlag, depth_m: u32) -> FloatRecord {
        FloatRecord {
            id: FloatId::new(id),
            platform_id: "2900001".to_string(),
            cycle_number: 12,
            profile_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            qc_flag: qc,
            temperature: 27.4,
            salinity: 35.12,
            depth_m,
            position: LatLon::new(15.0, 65.0),
        }
    }

    #[test]
    fn qc_flag_accepts_only_known_codes() {
        assert_eq!(QcFlag::try_from(1), Ok(QcFlag::Good));
        assert_eq!(QcFlag::try_from(4), Ok(QcFlag::Bad));
        assert!(QcFlag::try_from(2).is_err());
        assert_eq!(u8::from(QcFlag::Bad), 4);
    }

    #[test]
    fn qc_flag_serializes_as_code() {
        let json = serde_json::to_string(&QcFlag::Good).unwrap();
        assert_eq!(json, "1");
        assert!(serde_json::from_str::<QcFlag>("3").is_err());
    }

    #[test]
    fn validate_reports_depth_over_ceiling() {
        let r = record("argo_0", QcFlag::Good, 2100);
        assert_eq!(
            r.validate(2000),
            vec![RecordIssue::DepthOutOfRange {
                depth_m: 2100,
                ceiling_m: 2000
            }]
        );
        assert!(record("argo_1", QcFlag::Good, 1500).validate(2000).is_empty());
    }

    #[test]
    fn unmeasured_variables_have_no_value() {
        let r = record("argo_0", QcFlag::Good, 800);
        assert_eq!(r.value(Variable::Pressure), Some(800.0));
        assert_eq!(r.value(Variable::Oxygen), None);
        assert_eq!(Variable::parse("salinity"), Some(Variable::Salinity));
        assert_eq!(Variable::parse("pH"), None);
    }

    #[test]
    fn summary_mentions_platform_and_quality() {
        let text = record("argo_0", QcFlag::Bad, 800).summary();
        assert!(text.starts_with("ARGO Float 2900001"));
        assert!(text.contains("QC: Poor"));
    }
}
