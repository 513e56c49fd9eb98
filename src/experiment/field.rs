//! Field definitions - the inputs, outputs and analysis fields of an experiment

use serde::{Deserialize, Serialize};

use super::FieldId;

/// Role of a field within an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Controllable process setting (factor)
    Input,
    /// Measured outcome recorded per run
    Output,
    /// Secondary evaluation recorded per run in its own table
    Analysis,
}

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Real-valued measurement
    #[default]
    Number,
    /// Free text
    Text,
    /// List of tags (e.g. defect names)
    Tag,
    /// Yes/no flag stored as 0/1
    Boolean,
}

/// Definition of one experiment field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field ID
    pub id: FieldId,
    /// Short code (e.g. `barrel_zone3`)
    pub code: String,
    /// Display label
    pub label: String,
    /// Unit of measure
    #[serde(default)]
    pub unit: Option<String>,
    /// Input, output or analysis
    pub kind: FieldKind,
    /// Value type
    #[serde(default)]
    pub field_type: FieldType,
}

impl FieldDefinition {
    /// Numeric field definition without a unit.
    #[must_use]
    pub fn new(id: FieldId, code: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            code: code.into(),
            label: label.into(),
            unit: None,
            kind,
            field_type: FieldType::Number,
        }
    }

    /// Set the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the value type.
    #[must_use]
    pub const fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }
}
