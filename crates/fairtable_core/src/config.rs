//! Run configuration.
//!
//! # Responsibility
//! - Load optional JSON configuration for geometry, layout and logging.
//! - Convert it into the typed inputs of the engine and the layout.
//!
//! # Invariants
//! - Missing sections fall back to the venue defaults.
//! - Unknown keys are rejected so typos do not pass silently.

use crate::layout::geometry::{GeometryError, RowGeometry};
use crate::layout::numbering::{LayoutOptions, DEFAULT_LARGE_GAP, DEFAULT_SMALL_GAP};
use crate::model::slot::{RowNumber, Slot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured log level.
pub const LOG_LEVEL_ENV: &str = "FAIRTABLE_LOG_LEVEL";

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Geometry(GeometryError),
    DuplicateRowInOrder(RowNumber),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Geometry(err) => write!(f, "invalid geometry config: {err}"),
            Self::DuplicateRowInOrder(row) => {
                write!(f, "layout.row_order lists row {row} more than once")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Geometry(err) => Some(err),
            Self::DuplicateRowInOrder(_) => None,
        }
    }
}

impl From<GeometryError> for ConfigError {
    fn from(value: GeometryError) -> Self {
        Self::Geometry(value)
    }
}

/// Where row slot counts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometrySource {
    /// `geometry.rows` plus `geometry.fallback_slots`.
    #[default]
    Table,
    /// The `rowNumSlots` column of the slots file.
    Slots,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    pub source: GeometrySource,
    pub rows: BTreeMap<RowNumber, u32>,
    /// `None` turns unknown rows into an error.
    pub fallback_slots: Option<u32>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        let venue = RowGeometry::venue_default();
        Self {
            source: GeometrySource::Table,
            rows: venue.rows().collect(),
            fallback_slots: venue.fallback(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub row_order: Option<Vec<RowNumber>>,
    pub row_gaps: BTreeMap<RowNumber, u32>,
    pub small_gap: u32,
    pub large_gap: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_order: None,
            row_gaps: BTreeMap::new(),
            small_gap: DEFAULT_SMALL_GAP,
            large_gap: DEFAULT_LARGE_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Must be absolute when set.
    pub dir: Option<PathBuf>,
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FairConfig {
    pub geometry: GeometryConfig,
    pub layout: LayoutConfig,
    pub logging: LoggingConfig,
}

impl FairConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        RowGeometry::new(self.geometry.rows.clone(), self.geometry.fallback_slots)?;
        if let Some(order) = &self.layout.row_order {
            let mut seen = BTreeSet::new();
            if let Some(&row) = order.iter().find(|row| !seen.insert(**row)) {
                return Err(ConfigError::DuplicateRowInOrder(row));
            }
        }
        Ok(())
    }

    /// Resolves the geometry for a run over `slots`.
    pub fn row_geometry(&self, slots: &[Slot]) -> Result<RowGeometry, ConfigError> {
        let geometry = match self.geometry.source {
            GeometrySource::Table => {
                RowGeometry::new(self.geometry.rows.clone(), self.geometry.fallback_slots)?
            }
            GeometrySource::Slots => RowGeometry::from_slots(slots, self.geometry.fallback_slots)?,
        };
        Ok(geometry)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            row_order: self.layout.row_order.clone(),
            row_gaps: self.layout.row_gaps.clone(),
            small_gap: self.layout.small_gap,
            large_gap: self.layout.large_gap,
        }
    }

    /// Level from the environment, then config, then the build default.
    pub fn effective_log_level(&self) -> String {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.logging.level.clone())
            .unwrap_or_else(|| crate::logging::default_log_level().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FairConfig, GeometrySource};

    #[test]
    fn empty_document_uses_venue_defaults() {
        let config = FairConfig::from_json("{}").unwrap();
        assert_eq!(config, FairConfig::default());
        let geometry = config.row_geometry(&[]).unwrap();
        assert_eq!(geometry.slot_count(4).unwrap(), 14);
        assert_eq!(geometry.slot_count(8).unwrap(), 12);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FairConfig::from_json(r#"{"geometry": {"rowz": {}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duplicate_row_order_is_rejected() {
        let err = FairConfig::from_json(r#"{"layout": {"row_order": [1, 2, 1]}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRowInOrder(1)));
    }

    #[test]
    fn geometry_section_parses_rows_and_source() {
        let config = FairConfig::from_json(
            r#"{"geometry": {"source": "slots", "rows": {"1": 8}, "fallback_slots": null}}"#,
        )
        .unwrap();
        assert_eq!(config.geometry.source, GeometrySource::Slots);
        assert_eq!(config.geometry.rows.get(&1), Some(&8));
        assert_eq!(config.geometry.fallback_slots, None);
    }
}
