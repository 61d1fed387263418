//! Renders every chart into a temporary directory and checks the PNG output.

use std::fs;
use std::path::Path;

use appraise_plot::{
    ACTUAL_VS_PREDICTED_FILE, CORRELATION_FILE, ChartRenderer, ChartStyle, DISTRIBUTION_FILE,
    FEATURE_IMPORTANCE_FILE, PlotError, RESIDUALS_FILE,
};
use appraise_stats::{CorrelationMatrix, Histogram};
use tempfile::TempDir;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn assert_png(path: &Path, width: u32, height: u32) {
    let bytes = fs::read(path).unwrap();
    assert_eq!(&bytes[..8], &PNG_MAGIC, "{} is not a PNG", path.display());
    // IHDR width and height, big-endian.
    assert_eq!(u32::from_be_bytes(bytes[16..20].try_into().unwrap()), width);
    assert_eq!(u32::from_be_bytes(bytes[20..24].try_into().unwrap()), height);
}

fn small_renderer(dir: &TempDir) -> ChartRenderer {
    ChartRenderer::new(dir.path(), ChartStyle::new(640, 480).unwrap()).unwrap()
}

fn sample_pairs() -> (Vec<f64>, Vec<f64>) {
    let actual: Vec<f64> = (0..60).map(|i| 10.0 + f64::from(i) * 0.5).collect();
    let predicted: Vec<f64> = actual
        .iter()
        .enumerate()
        .map(|(i, a)| a + if i % 2 == 0 { 1.5 } else { -1.0 })
        .collect();
    (actual, predicted)
}

#[test]
fn exploratory_charts_written() {
    let dir = TempDir::new().unwrap();
    let renderer = small_renderer(&dir);

    let names: Vec<String> = ["Avg_Rooms", "Lower_Status_Pct", "Flat", "Home_Value"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let columns = vec![
        vec![6.5, 5.9, 7.1, 6.0, 6.8],
        vec![4.9, 14.0, 3.1, 12.5, 5.2],
        vec![1.0, 1.0, 1.0, 1.0, 1.0],
        vec![24.0, 18.2, 33.4, 19.9, 28.7],
    ];
    let matrix = CorrelationMatrix::from_columns(&names, &columns).unwrap();
    let path = renderer.correlation_heatmap(&matrix).unwrap();
    assert_eq!(path, dir.path().join(CORRELATION_FILE));
    assert_png(&path, 640, 480);

    let histogram = Histogram::equal_width(&columns[3], 30).unwrap();
    let path = renderer.distribution(&histogram, "Home_Value").unwrap();
    assert_eq!(path, dir.path().join(DISTRIBUTION_FILE));
    assert_png(&path, 640, 480);
}

#[test]
fn evaluation_charts_written() {
    let dir = TempDir::new().unwrap();
    let renderer = small_renderer(&dir);
    let (actual, predicted) = sample_pairs();

    let path = renderer.actual_vs_predicted(&actual, &predicted).unwrap();
    assert_eq!(path, dir.path().join(ACTUAL_VS_PREDICTED_FILE));
    assert_png(&path, 640, 480);

    let path = renderer.residuals(&actual, &predicted).unwrap();
    assert_eq!(path, dir.path().join(RESIDUALS_FILE));
    assert_png(&path, 640, 480);

    let importances = vec![
        ("Avg_Rooms".to_string(), 45.2),
        ("Crime_Rate".to_string(), -0.4),
        ("Lower_Status_Pct".to_string(), 51.7),
    ];
    let path = renderer.feature_importance(&importances).unwrap();
    assert_eq!(path, dir.path().join(FEATURE_IMPORTANCE_FILE));
    assert_png(&path, 640, 480);
}

#[test]
fn constant_predictions_still_render() {
    let dir = TempDir::new().unwrap();
    let renderer = small_renderer(&dir);
    let actual = [1.0, 1.0, 1.0];
    let predicted = [2.0, 2.0, 2.0];
    // No trend line can be fitted; the chart is drawn without it.
    let path = renderer.actual_vs_predicted(&actual, &predicted).unwrap();
    assert_png(&path, 640, 480);
}

#[test]
fn default_style_is_full_size() {
    let dir = TempDir::new().unwrap();
    let renderer = ChartRenderer::new(dir.path(), ChartStyle::default()).unwrap();
    let (actual, predicted) = sample_pairs();
    let path = renderer.residuals(&actual, &predicted).unwrap();
    assert_png(&path, 2400, 1800);
}

#[test]
fn invalid_series_rejected() {
    let dir = TempDir::new().unwrap();
    let renderer = small_renderer(&dir);

    let err = renderer.actual_vs_predicted(&[1.0, 2.0], &[1.0]).unwrap_err();
    assert!(matches!(err, PlotError::LengthMismatch { left: 2, right: 1, .. }));

    let err = renderer.residuals(&[], &[]).unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries { chart } if chart == RESIDUALS_FILE));

    let err = renderer.feature_importance(&[]).unwrap_err();
    assert!(matches!(err, PlotError::EmptySeries { .. }));
    assert!(!dir.path().join(FEATURE_IMPORTANCE_FILE).exists());
}

#[test]
fn unwritable_target_is_a_render_error() {
    let dir = TempDir::new().unwrap();
    let renderer = small_renderer(&dir);
    // A directory squatting on the output file name makes the write fail.
    fs::create_dir(dir.path().join(RESIDUALS_FILE)).unwrap();
    let (actual, predicted) = sample_pairs();
    let err = renderer.residuals(&actual, &predicted).unwrap_err();
    assert!(matches!(err, PlotError::Render { .. }));
}
