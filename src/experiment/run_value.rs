//! Run Value - one recorded cell of a run

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{FieldId, RunId};

/// The value of one field for one run.
///
/// Tags are kept in their persisted JSON form; [`RunValue::tags`] reads them
/// leniently so half-entered historical data never breaks analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunValue {
    /// Owning run
    pub run_id: RunId,
    /// Field this value belongs to
    pub field_id: FieldId,
    /// Numeric value
    pub real: Option<f64>,
    /// Text value
    pub text: Option<String>,
    /// JSON array of tags
    pub tags_json: Option<String>,
}

impl RunValue {
    /// Empty value, as created for outputs at materialization.
    #[must_use]
    pub const fn empty(run_id: RunId, field_id: FieldId) -> Self {
        Self {
            run_id,
            field_id,
            real: None,
            text: None,
            tags_json: None,
        }
    }

    /// Numeric value.
    #[must_use]
    pub const fn real(run_id: RunId, field_id: FieldId, value: Option<f64>) -> Self {
        Self {
            run_id,
            field_id,
            real: value,
            text: None,
            tags_json: None,
        }
    }

    /// Tag list value.
    #[must_use]
    pub fn tagged<S: AsRef<str>>(run_id: RunId, field_id: FieldId, tags: &[S]) -> Self {
        let tags: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
        Self {
            run_id,
            field_id,
            real: None,
            text: None,
            tags_json: serde_json::to_string(&tags).ok(),
        }
    }

    /// Parsed tag list; malformed or non-array JSON reads as no tags.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let Some(json) = self.tags_json.as_deref() else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(json) {
            Ok(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Err(e) => {
                warn!(
                    target: "molding_doe::experiment",
                    run_id = %self.run_id,
                    field_id = %self.field_id,
                    error = %e,
                    "Ignoring malformed tag list"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        let value = RunValue::tagged(RunId(1), FieldId(9), &["flash", "sink"]);
        assert_eq!(value.tags(), vec!["flash".to_string(), "sink".to_string()]);
    }

    #[test]
    fn test_malformed_tags_read_as_empty() {
        let mut value = RunValue::empty(RunId(1), FieldId(9));
        value.tags_json = Some("[\"flash\"".into());
        assert!(value.tags().is_empty());

        value.tags_json = Some("{\"a\":1}".into());
        assert!(value.tags().is_empty());
    }

    #[test]
    fn test_empty_value_has_nothing() {
        let value = RunValue::empty(RunId(1), FieldId(2));
        assert!(value.real.is_none());
        assert!(value.tags().is_empty());
    }
}
