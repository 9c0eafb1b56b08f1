//! Reference Range Table
//!
//! Warning and critical bounds per (brand, model, channel). The table is
//! built once at startup and shared read-only afterwards.

use crate::RangeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use telemetry::{normalize_key, Channel};
use tracing::info;

/// Warning and critical bounds for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
}

impl ReferenceRange {
    /// Create a range, enforcing `critical_min <= warning_min <= warning_max <= critical_max`
    pub fn new(
        warning_min: f64,
        warning_max: f64,
        critical_min: f64,
        critical_max: f64,
    ) -> Result<Self, RangeError> {
        let range = Self {
            warning_min,
            warning_max,
            critical_min,
            critical_max,
        };
        range.validate("range")?;
        Ok(range)
    }

    /// Check the ordering invariant (also rejects NaN bounds)
    pub fn validate(&self, feature: &str) -> Result<(), RangeError> {
        let ordered = self.critical_min <= self.warning_min
            && self.warning_min <= self.warning_max
            && self.warning_max <= self.critical_max;
        if ordered {
            Ok(())
        } else {
            Err(RangeError::InvalidRange {
                feature: feature.to_string(),
            })
        }
    }

    /// Center of the normal band
    pub fn midpoint(&self) -> f64 {
        (self.warning_min + self.warning_max) / 2.0
    }
}

/// Layout of the configuration resource: brand → model → feature → range
type RawTable = HashMap<String, HashMap<String, HashMap<String, ReferenceRange>>>;

/// Immutable reference range lookup
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    /// (brand, model) → channel → range, keys normalized
    entries: HashMap<(String, String), HashMap<Channel, ReferenceRange>>,
}

impl ReferenceTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the table from a JSON, TOML or YAML file (format from extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RangeError> {
        let path = path.as_ref();
        let raw: RawTable = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        let table = Self::from_raw(raw)?;
        info!(
            "Loaded {} reference ranges for {} vehicle models from {}",
            table.len(),
            table.entries.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load the table from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, RangeError> {
        let raw: RawTable = config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()?
            .try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTable) -> Result<Self, RangeError> {
        let mut table = Self::empty();
        for (brand, models) in raw {
            for (model, features) in models {
                for (feature, range) in features {
                    let channel = feature
                        .parse::<Channel>()
                        .map_err(|_| RangeError::UnknownFeature(feature.clone()))?;
                    range.validate(&format!("{}/{}/{}", brand, model, feature))?;
                    table.insert(&brand, &model, channel, range);
                }
            }
        }
        Ok(table)
    }

    /// Builder-style insert used while constructing a table
    pub fn with_range(
        mut self,
        brand: &str,
        model: &str,
        channel: Channel,
        range: ReferenceRange,
    ) -> Self {
        self.insert(brand, model, channel, range);
        self
    }

    fn insert(&mut self, brand: &str, model: &str, channel: Channel, range: ReferenceRange) {
        self.entries
            .entry((normalize_key(brand), normalize_key(model)))
            .or_default()
            .insert(channel, range);
    }

    /// Look up the range for one channel of a vehicle model
    pub fn lookup(
        &self,
        brand: &str,
        model: &str,
        channel: Channel,
    ) -> Result<&ReferenceRange, RangeError> {
        self.entries
            .get(&(normalize_key(brand), normalize_key(model)))
            .and_then(|features| features.get(&channel))
            .ok_or_else(|| RangeError::ReferenceMissing {
                brand: brand.to_string(),
                model: model.to_string(),
                feature: channel.as_str().to_string(),
            })
    }

    /// Total number of ranges across all vehicle models
    pub fn len(&self) -> usize {
        self.entries.values().map(|f| f.len()).sum()
    }

    /// True when no ranges are loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "Honda": {
            "Click 125i": {
                "coolant_temp": {"warning_min": 60, "warning_max": 90, "critical_min": 40, "critical_max": 100},
                "elm_voltage": {"warning_min": 12.0, "warning_max": 14.8, "critical_min": 11.5, "critical_max": 15.2}
            }
        }
    }"#;

    #[test]
    fn test_range_ordering_enforced() {
        assert!(ReferenceRange::new(60.0, 90.0, 40.0, 100.0).is_ok());
        assert!(ReferenceRange::new(60.0, 90.0, 70.0, 100.0).is_err());
        assert!(ReferenceRange::new(95.0, 90.0, 40.0, 100.0).is_err());
        assert!(ReferenceRange::new(60.0, f64::NAN, 40.0, 100.0).is_err());
    }

    #[test]
    fn test_lookup_normalizes_keys() {
        let table = ReferenceTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);

        let range = table.lookup(" HONDA ", "click 125I", Channel::CoolantTemp).unwrap();
        assert_eq!(range.warning_max, 90.0);
        assert_eq!(range.critical_max, 100.0);
    }

    #[test]
    fn test_missing_reference() {
        let table = ReferenceTable::from_json_str(SAMPLE).unwrap();
        let err = table.lookup("honda", "click_125i", Channel::Rpm).unwrap_err();
        assert!(matches!(err, RangeError::ReferenceMissing { .. }));
        assert!(table.lookup("acme", "x1", Channel::ElmVoltage).is_err());
    }

    #[test]
    fn test_invalid_range_fails_fast() {
        let bad = r#"{"honda": {"click": {"rpm": {"warning_min": 1600, "warning_max": 1200, "critical_min": 900, "critical_max": 2000}}}}"#;
        assert!(matches!(
            ReferenceTable::from_json_str(bad),
            Err(RangeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_unknown_feature_fails_fast() {
        let bad = r#"{"honda": {"click": {"maf": {"warning_min": 1, "warning_max": 2, "critical_min": 0, "critical_max": 3}}}}"#;
        assert!(matches!(
            ReferenceTable::from_json_str(bad),
            Err(RangeError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[yamaha.mio]\nrpm = {{ warning_min = 1300.0, warning_max = 1900.0, critical_min = 1000.0, critical_max = 2300.0 }}"
        )
        .unwrap();

        let table = ReferenceTable::from_file(file.path()).unwrap();
        let range = table.lookup("Yamaha", "Mio", Channel::Rpm).unwrap();
        assert_eq!(range.critical_min, 1000.0);
    }
}
