//! Factor configuration and normalization
//!
//! A [`FactorConfig`] is the stored per-factor row as the configuration
//! screen writes it: a mode flag plus whichever payload columns are filled.
//! [`FactorSpec`] is the validated form the generators consume, where the
//! mode and its payload are one tagged variant.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DesignType;
use crate::experiment::{FieldDefinition, FieldId, FieldKind};
use crate::{Error, Result};

/// Level count used when a Range factor has none configured
pub const DEFAULT_LEVEL_COUNT: u32 = 2;

/// Stored factor mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigMode {
    /// Held at `fixed_value`
    Fixed,
    /// Varied between `range_min` and `range_max`
    Range,
    /// Varied over the values in `list_json`
    List,
}

/// Stored per-factor configuration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorConfig {
    /// Input field this row configures
    pub field_id: FieldId,
    /// Whether the factor takes part in the design
    #[serde(default)]
    pub active: bool,
    /// Mode flag
    pub mode: ConfigMode,
    /// Fixed value
    #[serde(default)]
    pub fixed_value: Option<f64>,
    /// Range lower bound
    #[serde(default)]
    pub range_min: Option<f64>,
    /// Range upper bound
    #[serde(default)]
    pub range_max: Option<f64>,
    /// JSON array of list values
    #[serde(default)]
    pub list_json: Option<String>,
    /// Levels for factorial designs
    #[serde(default)]
    pub level_count: Option<u32>,
}

impl FactorConfig {
    /// Active Fixed factor.
    #[must_use]
    pub const fn fixed(field_id: FieldId, value: f64) -> Self {
        Self {
            field_id,
            active: true,
            mode: ConfigMode::Fixed,
            fixed_value: Some(value),
            range_min: None,
            range_max: None,
            list_json: None,
            level_count: None,
        }
    }

    /// Active Range factor.
    #[must_use]
    pub const fn range(field_id: FieldId, min: f64, max: f64) -> Self {
        Self {
            field_id,
            active: true,
            mode: ConfigMode::Range,
            fixed_value: None,
            range_min: Some(min),
            range_max: Some(max),
            list_json: None,
            level_count: None,
        }
    }

    /// Active List factor.
    #[must_use]
    pub fn list(field_id: FieldId, values: &[f64]) -> Self {
        Self {
            field_id,
            active: true,
            mode: ConfigMode::List,
            fixed_value: None,
            range_min: None,
            range_max: None,
            list_json: serde_json::to_string(values).ok(),
            level_count: None,
        }
    }

    /// Set the level count.
    #[must_use]
    pub const fn with_levels(mut self, level_count: u32) -> Self {
        self.level_count = Some(level_count);
        self
    }

    /// Mark the factor active or inactive.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Parsed list values; malformed JSON reads as no list.
    #[must_use]
    pub fn list_values(&self) -> Option<Vec<f64>> {
        let json = self.list_json.as_deref()?;
        match serde_json::from_str::<Vec<serde_json::Value>>(json) {
            Ok(items) => Some(items.iter().filter_map(serde_json::Value::as_f64).collect()),
            Err(e) => {
                warn!(
                    target: "molding_doe::factor",
                    field_id = %self.field_id,
                    error = %e,
                    "Ignoring malformed list values"
                );
                None
            }
        }
    }

    /// Value used for this factor when a design run does not set it.
    ///
    /// Fixed gives its value, Range its midpoint, List its first value.
    #[must_use]
    pub fn fallback_value(&self) -> Option<f64> {
        match self.mode {
            ConfigMode::Fixed => self.fixed_value,
            ConfigMode::Range => match (self.range_min, self.range_max) {
                (Some(min), Some(max)) => Some((min + max) / 2.0),
                _ => None,
            },
            ConfigMode::List => self.list_values()?.first().copied(),
        }
    }
}

/// Validated factor mode with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorMode {
    /// Constant value
    Fixed {
        /// The value
        value: f64,
    },
    /// Continuous interval, `min <= max`
    Range {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Non-empty ordered list of distinct values
    List {
        /// The values
        values: Vec<f64>,
    },
}

/// Validated factor specification consumed by the design generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSpec {
    /// Input field
    pub field_id: FieldId,
    /// Field code
    pub code: String,
    /// Field label
    pub label: String,
    /// Mode and payload
    #[serde(flatten)]
    pub mode: FactorMode,
    /// Levels used by factorial designs
    pub level_count: u32,
}

impl FactorSpec {
    /// Normalize a stored configuration for `design`.
    ///
    /// Box-Behnken forces every Range factor to three levels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFactorConfig` when a Fixed value is missing, range
    /// bounds are missing or inverted, a List has no usable values, or a
    /// factorial Range factor has fewer than two levels.
    pub fn from_config(
        config: &FactorConfig,
        field: &FieldDefinition,
        design: DesignType,
    ) -> Result<Self> {
        let invalid = |reason: String| Error::invalid_factor(field.code.clone(), reason);

        let (mode, level_count) = match config.mode {
            ConfigMode::Fixed => {
                let value = config
                    .fixed_value
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid("fixed value is missing".into()))?;
                (FactorMode::Fixed { value }, 1)
            }
            ConfigMode::Range => {
                let (min, max) = match (config.range_min, config.range_max) {
                    (Some(min), Some(max)) if min.is_finite() && max.is_finite() => (min, max),
                    _ => return Err(invalid("range bounds are missing".into())),
                };
                if min > max {
                    return Err(invalid(format!("range_min {min} > range_max {max}")));
                }
                let levels = match design {
                    DesignType::BoxBehnken => 3,
                    DesignType::Factorial => {
                        let levels = config.level_count.unwrap_or(DEFAULT_LEVEL_COUNT);
                        if levels < 2 {
                            return Err(invalid(format!(
                                "level count {levels} is below 2"
                            )));
                        }
                        levels
                    }
                    _ => config.level_count.unwrap_or(DEFAULT_LEVEL_COUNT).max(2),
                };
                (FactorMode::Range { min, max }, levels)
            }
            ConfigMode::List => {
                let mut values: Vec<f64> = Vec::new();
                for v in config.list_values().unwrap_or_default() {
                    if v.is_finite() && !values.contains(&v) {
                        values.push(v);
                    }
                }
                if values.is_empty() {
                    return Err(invalid("list has no usable values".into()));
                }
                let levels = u32::try_from(values.len()).unwrap_or(u32::MAX);
                (FactorMode::List { values }, levels)
            }
        };

        Ok(Self {
            field_id: field.id,
            code: field.code.clone(),
            label: field.label.clone(),
            mode,
            level_count,
        })
    }

    /// Whether the factor is a Range factor.
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self.mode, FactorMode::Range { .. })
    }

    /// Whether the factor varies across a design (Range or List).
    #[must_use]
    pub const fn is_varied(&self) -> bool {
        !matches!(self.mode, FactorMode::Fixed { .. })
    }

    /// Low extreme: range minimum, first listed value, or the fixed value.
    #[must_use]
    pub fn low(&self) -> f64 {
        match &self.mode {
            FactorMode::Fixed { value } => *value,
            FactorMode::Range { min, .. } => *min,
            FactorMode::List { values } => values[0],
        }
    }

    /// High extreme: range maximum, last listed value, or the fixed value.
    #[must_use]
    pub fn high(&self) -> f64 {
        match &self.mode {
            FactorMode::Fixed { value } => *value,
            FactorMode::Range { max, .. } => *max,
            FactorMode::List { values } => values[values.len() - 1],
        }
    }

    /// Center: range midpoint, middle listed value, or the fixed value.
    #[must_use]
    pub fn center(&self) -> f64 {
        match &self.mode {
            FactorMode::Fixed { value } => *value,
            FactorMode::Range { min, max } => (min + max) / 2.0,
            FactorMode::List { values } => values[(values.len() - 1) / 2],
        }
    }

    /// Distinct low/high extremes.
    #[must_use]
    pub fn extremes(&self) -> Vec<f64> {
        let (low, high) = (self.low(), self.high());
        if low == high {
            vec![low]
        } else {
            vec![low, high]
        }
    }

    /// Number of discrete levels for factorial designs.
    ///
    /// A degenerate range has one level.
    #[must_use]
    pub fn level_len(&self) -> usize {
        match &self.mode {
            FactorMode::Fixed { .. } => 1,
            FactorMode::List { values } => values.len(),
            FactorMode::Range { min, max } if min == max => 1,
            FactorMode::Range { .. } => self.level_count.max(2) as usize,
        }
    }

    /// The `index`-th discrete level, counted from the low end.
    ///
    /// Range levels are evenly spaced and computed on demand, so a large
    /// `level_count` costs nothing until a row is decoded. Indices past the
    /// last level clamp to it.
    #[must_use]
    pub fn level(&self, index: usize) -> f64 {
        match &self.mode {
            FactorMode::Fixed { value } => *value,
            FactorMode::List { values } => values[index.min(values.len() - 1)],
            FactorMode::Range { min, max } => {
                let steps = self.level_len().saturating_sub(1);
                if steps == 0 || index >= steps {
                    return if steps == 0 { *min } else { *max };
                }
                min + (max - min) * index as f64 / steps as f64
            }
        }
    }

    /// Every discrete level, low to high.
    #[must_use]
    pub fn levels(&self) -> Vec<f64> {
        (0..self.level_len()).map(|i| self.level(i)).collect()
    }

    /// Whether `value` is a legal setting for this factor.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        match &self.mode {
            FactorMode::Fixed { value: fixed } => value == *fixed,
            FactorMode::Range { min, max } => (*min..=*max).contains(&value),
            FactorMode::List { values } => values.contains(&value),
        }
    }
}

/// Normalize the active factor configurations of an experiment.
///
/// Factors come back in input-field declaration order. Configs that are
/// inactive, or whose field is not an input field of the experiment, are skipped.
///
/// # Errors
///
/// Returns the first `InvalidFactorConfig` encountered.
pub fn normalize_factors(
    fields: &[FieldDefinition],
    configs: &[FactorConfig],
    design: DesignType,
) -> Result<Vec<FactorSpec>> {
    fields
        .iter()
        .filter(|field| field.kind == FieldKind::Input)
        .filter_map(|field| {
            configs
                .iter()
                .find(|config| config.field_id == field.id && config.active)
                .map(|config| FactorSpec::from_config(config, field, design))
        })
        .collect()
}
