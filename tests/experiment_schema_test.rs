//! Experiment Schema Tests
//!
//! Records, fields, runs and values as the store and the report layer
//! exchange them.

use chrono::{TimeZone, Utc};
use molding_doe::config::{DesignType, ExperimentConfig};
use molding_doe::experiment::{
    ExperimentId, ExperimentRecord, FieldDefinition, FieldId, FieldKind, FieldType, RecipeId,
    RunId, RunRecord, RunSet, RunValue, StoredRun,
};
use molding_doe::replicate::ReplicateKey;

// =============================================================================
// ExperimentRecord Tests
// =============================================================================

#[test]
fn test_experiment_record_creation() {
    let record = ExperimentRecord::new(
        ExperimentId(1),
        "Gate freeze study",
        ExperimentConfig::new(DesignType::Factorial, 9),
    );

    assert_eq!(record.experiment_id(), ExperimentId(1));
    assert_eq!(record.name(), "Gate freeze study");
    assert!(record.created_at().timestamp() > 0);
    assert!(record.recipes().is_empty());
    assert!(record.notes().is_none());
}

#[test]
fn test_experiment_record_builder_dedups_recipes() {
    let record = ExperimentRecord::builder(
        ExperimentId(2),
        "Blocked study",
        ExperimentConfig::new(DesignType::Screening, 1).with_recipe_block(true),
    )
    .recipes([RecipeId(4), RecipeId(5), RecipeId(4)])
    .notes("PA66 GF30")
    .build();

    assert_eq!(record.recipes(), &[RecipeId(4), RecipeId(5)]);
    assert_eq!(record.notes(), Some("PA66 GF30"));
    assert!(record.config().recipe_as_block);
}

#[test]
fn test_experiment_record_serialization() {
    let record = ExperimentRecord::builder(
        ExperimentId(3),
        "Serialization Test",
        ExperimentConfig::new(DesignType::BoxBehnken, 42),
    )
    .created_at(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap())
    .build();

    let json = serde_json::to_string(&record).expect("serialization failed");
    assert!(json.contains("\"design_type\":\"BBD\""));
    let deserialized: ExperimentRecord =
        serde_json::from_str(&json).expect("deserialization failed");
    assert_eq!(record, deserialized);
}

// =============================================================================
// FieldDefinition Tests
// =============================================================================

#[test]
fn test_field_definition_json() {
    let field = FieldDefinition::new(FieldId(8), "defects", "Defects", FieldKind::Analysis)
        .with_type(FieldType::Tag);
    let json = serde_json::to_value(&field).unwrap();
    assert_eq!(json["kind"], "ANALYSIS");
    assert_eq!(json["field_type"], "tag");

    let minimal: FieldDefinition =
        serde_json::from_str(r#"{"id":1,"code":"temp","label":"Temp","kind":"INPUT"}"#).unwrap();
    assert_eq!(minimal.field_type, FieldType::Number);
    assert!(minimal.unit.is_none());
}

// =============================================================================
// RunRecord / RunValue / RunSet Tests
// =============================================================================

#[test]
fn test_run_record_defaults() {
    let run = RunRecord::builder(RunId(11), ExperimentId(1), 3, "E1-R003").build();
    assert_eq!(run.order(), 3);
    assert_eq!(run.code(), "E1-R003");
    assert!(run.recipe_id().is_none());
    assert!(!run.done());
    assert!(!run.excluded_from_analysis());
}

#[test]
fn test_run_record_serialization() {
    let key = ReplicateKey::compute([(FieldId(1), 220.0)], Some(RecipeId(2)));
    let run = RunRecord::builder(RunId(12), ExperimentId(1), 4, "E1-R004")
        .recipe_id(Some(RecipeId(2)))
        .replicate(key.clone(), 2)
        .build();

    let json = serde_json::to_string(&run).unwrap();
    let back: RunRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, run);
    assert_eq!(back.replicate_key(), &key);
    assert_eq!(back.replicate_index(), 2);
}

#[test]
fn test_run_value_tags() {
    let value = RunValue::tagged(RunId(1), FieldId(8), &["flash", "sink"]);
    assert_eq!(value.tags(), vec!["flash".to_string(), "sink".to_string()]);

    let mut broken = RunValue::empty(RunId(1), FieldId(8));
    broken.tags_json = Some("[\"flash\"".into());
    assert!(broken.tags().is_empty());
}

#[test]
fn test_run_set_navigation() {
    let runs: Vec<StoredRun> = (1..=3)
        .map(|order| StoredRun {
            record: RunRecord::builder(
                RunId(u64::from(order) + 100),
                ExperimentId(1),
                order,
                format!("E1-R{order:03}"),
            )
            .build(),
            values: Vec::new(),
            analysis_values: Vec::new(),
        })
        .rev()
        .collect();
    let set = RunSet::new(runs);

    assert_eq!(set.runs()[0].record.order(), 1);
    let first = set.adjacent(1);
    assert_eq!(first.prev, None);
    assert_eq!(first.next, Some(RunId(102)));
    let last = set.adjacent(3);
    assert_eq!(last.prev, Some(RunId(102)));
    assert_eq!(last.next, None);
}
