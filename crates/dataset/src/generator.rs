use std::future::Future;

use chrono::{Duration, NaiveDate};
use foundation::LatLon;
use foundation::math::round_to;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetError, FloatDataset};
use crate::record::{FloatId, FloatRecord, QcFlag};

/// Produces the session dataset.
///
/// The mock generator resolves immediately; a remote implementation would
/// fetch and decode with the same contract.
pub trait FloatSource {
    fn load(&self) -> impl Future<Output = Result<FloatDataset, DatasetError>>;
}

/// Configuration for synthesizing float records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: u64,
    /// Platform ids are `platform_offset + index`.
    pub platform_offset: u32,
    /// Profile dates fall within the year preceding this date.
    pub reference_date: NaiveDate,
    /// Fraction of records flagged bad.
    pub bad_fraction: f64,
    pub lat_range: (f64, f64),
    pub lon_range: (f64, f64),
    /// Half-open `[min, max)` depth draw; the upper end deliberately exceeds
    /// the filter ceiling.
    pub depth_range_m: (u32, u32),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 200,
            seed: 42,
            platform_offset: 2_900_000,
            reference_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            bad_fraction: 0.1,
            lat_range: (5.0, 35.0),
            lon_range: (50.0, 80.0),
            depth_range_m: (100, 2100),
        }
    }
}

/// Deterministic synthetic source: the same config always yields the same records.
#[derive(Debug, Clone, Default)]
pub struct MockFloatSource {
    pub config: GeneratorConfig,
}

impl MockFloatSource {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl FloatSource for MockFloatSource {
    fn load(&self) -> impl Future<Output = Result<FloatDataset, DatasetError>> {
        std::future::ready(generate(&self.config))
    }
}

fn uniform(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

pub fn generate(config: &GeneratorConfig) -> Result<FloatDataset, DatasetError> {
    let platform_end = u64::from(config.platform_offset) + config.count as u64;
    if platform_end > 10_000_000 {
        return Err(DatasetError::Source(format!(
            "platform ids overflow 7 digits: offset {} + {} records",
            config.platform_offset, config.count
        )));
    }

    let (depth_lo, depth_hi) = config.depth_range_m;
    let depth_max = depth_hi.saturating_sub(1).max(depth_lo);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.count);

    for index in 0..config.count {
        let days_back = rng.gen_range(0..365);
        let qc_flag = if rng.r#gen::<f64>() < config.bad_fraction {
            QcFlag::Bad
        } else {
            QcFlag::Good
        };
        let temperature = round_to(rng.gen_range(5.0..35.0), 1);
        let salinity = round_to(rng.gen_range(33.0..38.0), 2);
        let depth_m = rng.gen_range(depth_lo..=depth_max);
        let lat = uniform(&mut rng, config.lat_range);
        let lon = uniform(&mut rng, config.lon_range);
        let profile_date = config
            .reference_date
            .checked_sub_signed(Duration::days(days_back))
            .ok_or_else(|| {
                DatasetError::Source(format!(
                    "profile date {days_back} days before {} is out of range",
                    config.reference_date
                ))
            })?;

        records.push(FloatRecord {
            id: FloatId(format!("argo_{index}")),
            platform_id: format!("{:07}", u64::from(config.platform_offset) + index as u64),
            cycle_number: rng.gen_range(1..=100),
            profile_date,
            qc_flag,
            temperature,
            salinity,
            depth_m,
            position: LatLon::new(lat, lon),
        });
    }

    FloatDataset::from_records(records)
}
