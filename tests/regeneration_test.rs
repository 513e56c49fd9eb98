//! Regeneration Tests
//!
//! Full pipeline: stored factor configs → design → materialized runs → store.

use molding_doe::config::{DesignType, ExperimentConfig};
use molding_doe::design::{CodedLevel, DesignDetails};
use molding_doe::experiment::{
    ExperimentId, ExperimentRecord, FieldDefinition, FieldId, FieldKind, RecipeId, RunId,
    RunValue,
};
use molding_doe::factor::FactorConfig;
use molding_doe::materialize::regenerate_runs;
use molding_doe::store::{MemoryRunStore, RunStore};
use molding_doe::Error;

const EXP: ExperimentId = ExperimentId(1);
const TEMP: FieldId = FieldId(1);
const PRESS: FieldId = FieldId(2);
const SPEED: FieldId = FieldId(3);
const WEIGHT: FieldId = FieldId(10);

fn fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new(TEMP, "temp", "Barrel temp", FieldKind::Input).with_unit("°C"),
        FieldDefinition::new(PRESS, "press", "Hold pressure", FieldKind::Input).with_unit("bar"),
        FieldDefinition::new(SPEED, "speed", "Injection speed", FieldKind::Input).with_unit("mm/s"),
        FieldDefinition::new(WEIGHT, "weight", "Part weight", FieldKind::Output).with_unit("g"),
    ]
}

fn store_with(config: ExperimentConfig, recipes: &[RecipeId], factors: Vec<FactorConfig>) -> MemoryRunStore {
    let store = MemoryRunStore::new();
    let record = ExperimentRecord::builder(EXP, "Process window", config)
        .recipes(recipes.iter().copied())
        .build();
    store.insert_experiment(record, fields(), factors);
    store
}

fn bbd_factors() -> Vec<FactorConfig> {
    vec![
        FactorConfig::range(TEMP, 200.0, 240.0),
        FactorConfig::range(PRESS, 400.0, 600.0),
    ]
}

// =============================================================================
// Box-Behnken scenario
// =============================================================================

#[test]
fn test_box_behnken_scenario() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(2),
        &[],
        bbd_factors(),
    );

    let summary = regenerate_runs(&store, EXP).unwrap();
    assert_eq!(summary.design_type, DesignType::BoxBehnken);
    assert_eq!(summary.design_runs, 6);
    assert_eq!(summary.total_runs, 6);
    assert!(summary.recipes.is_empty());

    let runs = store.run_set(EXP).unwrap();
    let rows: Vec<(f64, f64)> = runs
        .runs()
        .iter()
        .map(|r| {
            (
                r.value(TEMP).unwrap().real.unwrap(),
                r.value(PRESS).unwrap().real.unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            (200.0, 400.0),
            (200.0, 600.0),
            (240.0, 400.0),
            (240.0, 600.0),
            (220.0, 500.0),
            (220.0, 500.0)
        ]
    );

    let codes: Vec<&str> = runs.runs().iter().map(|r| r.record.code()).collect();
    assert_eq!(codes, vec!["E1-R001", "E1-R002", "E1-R003", "E1-R004", "E1-R005", "E1-R006"]);

    // Unconfigured input and the output start empty
    for run in runs.runs() {
        assert_eq!(run.values.len(), 4);
        assert_eq!(run.value(SPEED).unwrap().real, None);
        assert_eq!(run.value(WEIGHT).unwrap().real, None);
    }

    // Both center rows describe the same condition
    assert_eq!(runs.runs()[4].record.replicate_key(), runs.runs()[5].record.replicate_key());
    assert_ne!(runs.runs()[0].record.replicate_key(), runs.runs()[1].record.replicate_key());

    let metadata = store.design_metadata(EXP).unwrap().unwrap();
    assert_eq!(metadata.seed, 42);
    assert_eq!(metadata.factors.len(), 2);
    let DesignDetails::BoxBehnken { coded_levels, center_points } = metadata.design else {
        panic!("expected Box-Behnken metadata");
    };
    assert_eq!(center_points, 2);
    use CodedLevel::{Center, High, Low};
    let expected = [
        (Low, Low),
        (Low, High),
        (High, Low),
        (High, High),
        (Center, Center),
        (Center, Center),
    ];
    for (row, (t, p)) in coded_levels.iter().zip(expected) {
        assert_eq!(row, &vec![(TEMP, t), (PRESS, p)]);
    }
}

// =============================================================================
// Expansion: recipes and replicates
// =============================================================================

#[test]
fn test_recipe_blocking_and_replicates() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42)
            .with_center_points(1)
            .with_replicates(2)
            .with_recipe_block(true),
        &[RecipeId(7), RecipeId(8)],
        bbd_factors(),
    );

    let summary = regenerate_runs(&store, EXP).unwrap();
    assert_eq!(summary.design_runs, 5);
    assert_eq!(summary.total_runs, 5 * 2 * 2);
    assert_eq!(summary.recipes, vec![RecipeId(7), RecipeId(8)]);

    let runs = store.run_set(EXP).unwrap();
    let first_half = &runs.runs()[..10];
    let second_half = &runs.runs()[10..];
    assert!(first_half.iter().all(|r| r.record.recipe_id() == Some(RecipeId(7))));
    assert!(second_half.iter().all(|r| r.record.recipe_id() == Some(RecipeId(8))));

    // Replicates of one condition share a key, indices count 1..=2
    assert_eq!(first_half[0].record.replicate_key(), first_half[1].record.replicate_key());
    assert_eq!(first_half[0].record.replicate_index(), 1);
    assert_eq!(first_half[1].record.replicate_index(), 2);
    // Same condition under another recipe is a different block
    assert_ne!(first_half[0].record.replicate_key(), second_half[0].record.replicate_key());
    assert_eq!(runs.runs()[19].record.code(), "E1-R020");
}

#[test]
fn test_multiple_recipes_without_blocking_ignore_recipes() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(0),
        &[RecipeId(7), RecipeId(8)],
        bbd_factors(),
    );
    let summary = regenerate_runs(&store, EXP).unwrap();
    assert_eq!(summary.total_runs, 4);
    assert!(summary.recipes.is_empty());
    let runs = store.run_set(EXP).unwrap();
    assert!(runs.runs().iter().all(|r| r.record.recipe_id().is_none()));
}

#[test]
fn test_single_recipe_attached() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(0),
        &[RecipeId(7)],
        bbd_factors(),
    );
    regenerate_runs(&store, EXP).unwrap();
    let runs = store.run_set(EXP).unwrap();
    assert!(runs.runs().iter().all(|r| r.record.recipe_id() == Some(RecipeId(7))));
}

#[test]
fn test_inactive_factor_uses_fallback() {
    let mut factors = bbd_factors();
    factors.push(FactorConfig::list(SPEED, &[35.0, 50.0, 65.0]).with_active(false));
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(0),
        &[],
        factors,
    );
    regenerate_runs(&store, EXP).unwrap();
    let runs = store.run_set(EXP).unwrap();
    assert!(runs
        .runs()
        .iter()
        .all(|r| r.value(SPEED).unwrap().real == Some(35.0)));
}

// =============================================================================
// Other designs through the pipeline
// =============================================================================

#[test]
fn test_simulation_is_reproducible() {
    let config = ExperimentConfig::new(DesignType::Simulation, 2024).with_max_runs(25);
    let factors = vec![
        FactorConfig::range(TEMP, 200.0, 240.0),
        FactorConfig::list(PRESS, &[400.0, 500.0, 600.0]),
        FactorConfig::fixed(SPEED, 50.0),
    ];
    let a = store_with(config.clone(), &[], factors.clone());
    let b = store_with(config, &[], factors);
    regenerate_runs(&a, EXP).unwrap();
    regenerate_runs(&b, EXP).unwrap();

    let values = |store: &MemoryRunStore| -> Vec<Vec<Option<f64>>> {
        store
            .run_set(EXP)
            .unwrap()
            .runs()
            .iter()
            .map(|r| r.values.iter().map(|v| v.real).collect())
            .collect()
    };
    let va = values(&a);
    assert_eq!(va.len(), 25);
    assert_eq!(va, values(&b));
    for row in &va {
        let temp = row[0].unwrap();
        assert!((200.0..=240.0).contains(&temp));
        assert!([400.0, 500.0, 600.0].contains(&row[1].unwrap()));
        assert_eq!(row[2], Some(50.0));
    }
}

#[test]
fn test_fractional_factorial_respects_cap() {
    let factors = vec![
        FactorConfig::range(TEMP, 200.0, 240.0).with_levels(5),
        FactorConfig::range(PRESS, 400.0, 600.0).with_levels(5),
        FactorConfig::range(SPEED, 20.0, 80.0).with_levels(4),
    ];
    let store = store_with(
        ExperimentConfig::new(DesignType::Factorial, 3).with_max_runs(30),
        &[],
        factors,
    );
    let summary = regenerate_runs(&store, EXP).unwrap();
    assert_eq!(summary.design_runs, 30);

    let metadata = store.design_metadata(EXP).unwrap().unwrap();
    assert_eq!(
        metadata.design,
        DesignDetails::Factorial {
            max_runs: 30,
            full_size: 100,
            fractional: true
        }
    );
}

#[test]
fn test_screening_corners_and_centers() {
    let store = store_with(
        ExperimentConfig::new(DesignType::Screening, 1).with_center_points(2),
        &[],
        bbd_factors(),
    );
    let summary = regenerate_runs(&store, EXP).unwrap();
    assert_eq!(summary.design_runs, 4 + 2);
    let runs = store.run_set(EXP).unwrap();
    let last = &runs.runs()[5];
    assert_eq!(last.value(TEMP).unwrap().real, Some(220.0));
    assert_eq!(last.value(PRESS).unwrap().real, Some(500.0));
}

// =============================================================================
// Failure paths leave the previous run set intact
// =============================================================================

#[test]
fn test_unknown_experiment() {
    let store = MemoryRunStore::new();
    let err = regenerate_runs(&store, ExperimentId(99)).unwrap_err();
    assert!(matches!(err, Error::ExperimentNotFound(ExperimentId(99))));
}

#[test]
fn test_invalid_factor_keeps_previous_runs() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(2),
        &[],
        bbd_factors(),
    );
    regenerate_runs(&store, EXP).unwrap();
    let before = store.run_set(EXP).unwrap();

    store
        .set_factor_config(EXP, FactorConfig::range(PRESS, 600.0, 400.0))
        .unwrap();
    let err = regenerate_runs(&store, EXP).unwrap_err();
    assert!(matches!(err, Error::InvalidFactorConfig { ref factor, .. } if factor == "press"));
    assert_eq!(store.run_set(EXP).unwrap(), before);
}

#[test]
fn test_box_behnken_needs_two_range_factors() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42),
        &[],
        vec![
            FactorConfig::range(TEMP, 200.0, 240.0),
            FactorConfig::list(PRESS, &[400.0, 600.0]),
        ],
    );
    let err = regenerate_runs(&store, EXP).unwrap_err();
    assert!(matches!(err, Error::InvalidDesign(_)));
    assert!(store.run_set(EXP).unwrap().is_empty());
    assert!(store.design_metadata(EXP).unwrap().is_none());
}

#[test]
fn test_regeneration_replaces_operator_data() {
    let store = store_with(
        ExperimentConfig::new(DesignType::BoxBehnken, 42).with_center_points(2),
        &[],
        bbd_factors(),
    );
    regenerate_runs(&store, EXP).unwrap();
    let first = store.run_set(EXP).unwrap();
    let run_id = first.runs()[0].record.run_id();
    store.set_run_status(EXP, run_id, true, false).unwrap();
    store
        .upsert_run_value(EXP, RunValue::real(run_id, WEIGHT, Some(31.4)))
        .unwrap();

    regenerate_runs(&store, EXP).unwrap();
    let second = store.run_set(EXP).unwrap();
    assert_eq!(second.len(), 6);
    assert!(second.get(run_id).is_none());
    assert!(second.runs().iter().all(|r| !r.record.done()));
    assert!(second
        .runs()
        .iter()
        .all(|r| r.value(WEIGHT).unwrap().real.is_none()));

    let err = store.set_run_status(EXP, run_id, true, false).unwrap_err();
    assert!(matches!(err, Error::RunNotFound(RunId(_))));
}
