use std::collections::BTreeMap;

use foundation::{GeoBox, LatLon};
use serde::{Deserialize, Serialize};

/// Region id that stands for "the user's own AOI" rather than a fixed place.
pub const CUSTOM_REGION_ID: &str = "custom";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    pub id: String,
    pub label: String,
    pub center: LatLon,
    pub zoom: f64,
    /// Study-area outline, when the region has one.
    #[serde(default)]
    pub bounds: Option<GeoBox>,
    /// Popup line shown on the outline.
    #[serde(default)]
    pub description: Option<String>,
}

impl RegionDefinition {
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_REGION_ID
    }

    fn outlined(self, bounds: GeoBox, description: &str) -> Self {
        Self {
            bounds: Some(bounds),
            description: Some(description.to_string()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound(String),
    Corrupt(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(id) => write!(f, "region {id:?} not found"),
            CatalogError::Corrupt(msg) => write!(f, "region catalog corrupt: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Static region-id → camera-target table.
///
/// Ordering contract:
/// - `list` yields regions sorted by id.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    regions: BTreeMap<String, RegionDefinition>,
}

fn region(id: &str, label: &str, center: LatLon, zoom: f64) -> RegionDefinition {
    RegionDefinition {
        id: id.to_string(),
        label: label.to_string(),
        center,
        zoom,
        bounds: None,
        description: None,
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionCatalog {
    /// The dashboard's fixed regions.
    pub fn builtin() -> Self {
        Self::from_regions([
            region("global", "Global Ocean", LatLon::new(0.0, 0.0), 2.0),
            region("arabian-sea", "Arabian Sea", LatLon::new(17.5, 65.0), 5.0)
                .outlined(GeoBox::new(5.0, 50.0, 30.0, 80.0), "Primary study region"),
            region("bay-of-bengal", "Bay of Bengal", LatLon::new(15.0, 88.0), 5.0),
            region("indian-ocean", "Indian Ocean", LatLon::new(0.0, 75.0), 3.0),
            region(CUSTOM_REGION_ID, "Custom AOI", LatLon::new(20.0, 65.0), 4.0),
        ])
    }

    pub fn from_regions(regions: impl IntoIterator<Item = RegionDefinition>) -> Self {
        Self {
            regions: regions.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Built-in regions overlaid with a JSON array of definitions.
    ///
    /// Entries with an existing id replace the built-in one.
    pub fn with_overrides_json(json: &str) -> Result<Self, CatalogError> {
        let extra: Vec<RegionDefinition> =
            serde_json::from_str(json).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        let mut catalog = Self::builtin();
        for r in extra {
            if !r.center.is_valid() {
                return Err(CatalogError::Corrupt(format!(
                    "region {:?} has an invalid center",
                    r.id
                )));
            }
            catalog.regions.insert(r.id.clone(), r);
        }
        Ok(catalog)
    }

    pub fn resolve(&self, id: &str) -> Result<&RegionDefinition, CatalogError> {
        self.regions
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &RegionDefinition> + '_ {
        self.regions.values()
    }

    /// Regions that carry a study-area outline, by id.
    pub fn outlined(&self) -> impl Iterator<Item = (&RegionDefinition, GeoBox)> + '_ {
        self.regions.values().filter_map(|r| r.bounds.map(|b| (r, b)))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
