//! Integration tests for the column transformers.
//!
//! These tests chain transformers over tables loaded from fixtures, the way
//! callers compose them.

use mallet_tabular::transformers::{
    ColumnAdder, ColumnDropper, ColumnRename, ColumnSelector, ConstantValueFiller, DummyEncoder,
    GroupbyTransformer, NaDropper, NaFiller, Resampler, RollingWindow, Window,
};
use mallet_tabular::utils::{numeric_values, series};
use mallet_tabular::{
    AggregationMethod, Axis, ColumnTypeMap, CorrelationMethod, DropHow, FillMethod, Table,
    TransformPipeline, Transformer, correlation_matrix,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn values(table: &Table, name: &str) -> Vec<Option<f64>> {
    numeric_values(series(table.frame(), name).unwrap()).unwrap()
}

fn hourly_prices() -> Table {
    let price: [i64; 32] = [
        10, 11, 9, 13, 14, 18, 17, 19, 10, 11, 9, 13, 14, 18, 17, 19, 50, 60, 40, 100, 50, 100,
        40, 10, 11, 9, 13, 14, 18, 17, 19, 10,
    ];
    let start = 1_514_764_800_000_i64;
    let millis: Vec<i64> = (0..32).map(|i| start + i * 3_600_000).collect();
    let mut df = df!["price" => price].unwrap();
    df.with_column(
        Series::new("week_starting".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap(),
    )
    .unwrap();
    Table::set_index(df, "week_starting").unwrap()
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_fixture_classification() {
    let df = load_csv("animals.csv");
    let types = ColumnTypeMap::classify(&df);

    assert_eq!(types.numeric(), &["A".to_string(), "B".to_string()]);
    assert_eq!(types.object(), &["C".to_string(), "D".to_string()]);
    assert_eq!(types.boolean(), &["E".to_string()]);
    assert_eq!(
        types.categorical_set(),
        vec!["E".to_string(), "C".to_string(), "D".to_string()]
    );
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_fill_then_add_pipeline() {
    let pipeline = TransformPipeline::new()
        .add(NaFiller::new(None, FillMethod::Mean, None).unwrap())
        .add(ColumnAdder::new(["A", "B"], "Z").unwrap())
        .add(ColumnDropper::new(["D"]).unwrap());

    let out = pipeline.transform(&Table::new(load_csv("animals.csv")));

    let a = values(&out, "A");
    assert!((a[0].unwrap() - 4.4).abs() < 1e-12);
    assert_eq!(out.column_names(), vec!["A", "B", "C", "E", "Z"]);
    assert_eq!(series(out.frame(), "Z").unwrap().null_count(), 0);
}

#[test]
fn test_pipeline_skips_inapplicable_steps() {
    let pipeline = TransformPipeline::new()
        .add(ColumnAdder::new(["A", "C"], "bad").unwrap())
        .add(Resampler::new("2H", AggregationMethod::Mean).unwrap())
        .add(ColumnRename::new([("A", "age")]).unwrap());

    let out = pipeline.transform(&Table::new(load_csv("animals.csv")));

    assert_eq!(out.height(), 6);
    assert_eq!(out.column_names(), vec!["age", "B", "C", "D", "E"]);
}

#[test]
fn test_strict_pipeline_reports_first_failure() {
    let pipeline = TransformPipeline::new()
        .add(ColumnSelector::new(["A", "B"]).unwrap())
        .add(ColumnAdder::new(["A", "C"], "bad").unwrap());

    let err = pipeline.apply(&Table::new(load_csv("animals.csv"))).unwrap_err();
    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.is_precondition());
}

#[test]
fn test_drop_then_encode() {
    let pipeline = TransformPipeline::new()
        .add(NaDropper::new(Axis::Columns, DropHow::Any, None))
        .add(DummyEncoder::new(Some(vec!["D".into()]), "_", false).unwrap());

    let out = pipeline.transform(&Table::new(load_csv("animals.csv")));
    assert_eq!(out.column_names(), vec!["C", "E", "D_female", "D_male"]);
}

#[test]
fn test_constant_fill_then_group() {
    let pipeline = TransformPipeline::new()
        .add(ConstantValueFiller::scalar(0.0, None).unwrap())
        .add(GroupbyTransformer::new(["C"], AggregationMethod::Sum).unwrap());

    let out = pipeline.transform(&Table::new(load_csv("animals.csv")));

    assert_eq!(out.column_names(), vec!["C", "A", "B"]);
    // dog rows: A = 0 + 4 + 8, B = 2 + 0 + 9
    assert_eq!(values(&out, "A")[0], Some(12.0));
    assert_eq!(values(&out, "B")[0], Some(11.0));
}

// ============================================================================
// Time Series
// ============================================================================

#[test]
fn test_roll_then_resample() {
    let pipeline = TransformPipeline::new()
        .add(
            RollingWindow::new(Window::parse("4H").unwrap(), None, AggregationMethod::Max, None)
                .unwrap(),
        )
        .add(Resampler::new("24H", AggregationMethod::Sum).unwrap());

    let out = pipeline.apply(&hourly_prices()).unwrap();

    assert_eq!(out.height(), 2);
    let total: f64 = values(&out, "price").into_iter().flatten().sum();
    assert_eq!(total, 1164.0);
}

// ============================================================================
// Correlation
// ============================================================================

#[test]
fn test_correlation_over_fixture() {
    let df = load_csv("animals.csv");
    let corr = correlation_matrix(
        &df,
        &["A".to_string(), "B".to_string()],
        CorrelationMethod::Spearman,
    )
    .unwrap();

    assert_eq!(corr.len(), 2);
    let r = corr.between("A", "B").unwrap();
    assert!((-1.0..=1.0).contains(&r));

    assert!(correlation_matrix(&df, &["A".to_string(), "D".to_string()], CorrelationMethod::Pearson).is_err());
}
