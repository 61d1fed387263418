use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use appraise_io::{DatasetReader, HousingDataset, ResultWriter, StratifiedSplit};
use appraise_plot::{ChartRenderer, ChartStyle, PlotError};
use appraise_rf::{
    MaxFeatures, OobMode, PermutationImportance, RandomForestConfig, RegressionMetrics,
    SplitMethod,
};
use appraise_stats::{CorrelationMatrix, Histogram, Summary};

/// Number of equal-width bins in the target histogram.
const HISTOGRAM_BINS: usize = 30;

#[derive(Parser)]
#[command(name = "appraise")]
#[command(about = "Exploratory analysis and random-forest regression of census-tract home values")]
#[command(version)]
struct Cli {
    /// Housing CSV to analyse instead of the built-in dataset
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory for charts and the evaluation report
    #[arg(long, default_value = "images")]
    output_dir: PathBuf,

    /// RNG seed for the split, the forest, and permutation importance
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Fraction of rows used for training
    #[arg(long, default_value_t = 0.8)]
    train_fraction: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 500)]
    n_trees: usize,

    /// Features sampled as split candidates at each node
    #[arg(long, default_value_t = 4)]
    mtry: usize,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Split-finding strategy: "exact" or "extra-trees"
    #[arg(long, default_value = "exact")]
    split_method: String,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

fn parse_split_method(s: &str) -> Result<SplitMethod> {
    match s {
        "exact" => Ok(SplitMethod::Exact),
        "extra-trees" => Ok(SplitMethod::ExtraTrees),
        other => anyhow::bail!("unknown split method: {other} (expected exact or extra-trees)"),
    }
}

fn load_dataset(data: Option<&Path>) -> Result<HousingDataset> {
    let dataset = match data {
        Some(path) => DatasetReader::new(path)
            .read()
            .with_context(|| format!("failed to read housing CSV {}", path.display()))?,
        None => HousingDataset::embedded().context("built-in dataset is malformed")?,
    };
    info!(
        n_samples = dataset.n_samples(),
        n_features = dataset.n_features(),
        "dataset ready"
    );
    Ok(dataset)
}

/// Log a chart failure without aborting the run.
fn report_chart(chart: &str, result: Result<PathBuf, PlotError>) {
    match result {
        Ok(path) => debug!(chart, path = %path.display(), "chart ready"),
        Err(e) => {
            let err = anyhow::Error::new(e);
            warn!(chart, "chart not written: {err:#}");
        }
    }
}

/// Correlation matrix and target distribution, logged and charted.
fn explore(dataset: &HousingDataset, renderer: Option<&ChartRenderer>) -> Result<()> {
    let matrix = CorrelationMatrix::from_columns(&dataset.column_names(), &dataset.columns())
        .context("failed to compute correlation matrix")?;
    for (name, r) in matrix.ranked_against(dataset.target_name()).iter().take(3) {
        info!(feature = name, r = *r, "strong target correlation");
    }

    let summary = Summary::from_values(dataset.targets()).context("target column is empty")?;
    info!(
        target = dataset.target_name(),
        min = summary.min,
        median = summary.median,
        mean = summary.mean,
        max = summary.max,
        "target distribution"
    );
    let histogram = Histogram::equal_width(dataset.targets(), HISTOGRAM_BINS)
        .context("failed to bin target column")?;

    if let Some(renderer) = renderer {
        report_chart("correlation heatmap", renderer.correlation_heatmap(&matrix));
        report_chart(
            "target distribution",
            renderer.distribution(&histogram, dataset.target_name()),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let split_method = parse_split_method(&cli.split_method)?;

    // 1. Load
    let dataset = load_dataset(cli.data.as_deref())?;

    // 2. Explore
    let renderer = ChartRenderer::new(&cli.output_dir, ChartStyle::default())
        .inspect_err(|e| warn!("charts disabled: {e}"))
        .ok();
    explore(&dataset, renderer.as_ref())?;

    // 3. Split and train
    let split = StratifiedSplit::new(cli.train_fraction)
        .context("invalid train fraction")?
        .with_seed(cli.seed)
        .split(dataset.targets())
        .context("failed to split dataset")?;
    let train = dataset.subset(split.train());
    let test = dataset.subset(split.test());

    let train_result = RandomForestConfig::new(cli.n_trees)?
        .with_max_features(MaxFeatures::Fixed(cli.mtry))
        .with_max_depth(cli.max_depth)
        .with_split_method(split_method)
        .with_oob_mode(OobMode::Enabled)
        .with_seed(cli.seed)
        .fit(train.features(), train.targets(), train.feature_names())
        .context("random forest training failed")?;
    let oob = train_result.oob_score().map(|s| (s.mse, s.r_squared));
    info!(
        n_train = train.n_samples(),
        oob_r_squared = ?oob.map(|(_, r2)| r2),
        "model trained"
    );

    // 4. Evaluate
    let predicted = train_result
        .forest()
        .predict_batch(test.features())
        .context("prediction on the test split failed")?;
    let metrics = RegressionMetrics::from_predictions(test.targets(), &predicted)
        .context("failed to compute test metrics")?;
    let importances: Vec<PermutationImportance> = train_result
        .permutation_importances(train.features(), train.targets(), cli.seed)
        .context("permutation importance failed")?;
    if let Some(top) = importances.first() {
        info!(feature = %top.name, inc_mse = top.importance, "most important feature");
    }

    // 5. Report
    if let Some(renderer) = &renderer {
        report_chart(
            "actual vs predicted",
            renderer.actual_vs_predicted(test.targets(), &predicted),
        );
        report_chart("residuals", renderer.residuals(test.targets(), &predicted));
        let bars: Vec<(String, f64)> = importances
            .iter()
            .map(|p| (p.name.clone(), p.importance))
            .collect();
        report_chart("feature importance", renderer.feature_importance(&bars));
    }

    println!("📉 RMSE: {:.2}", metrics.rmse);
    println!("📏 MAE: {:.2}", metrics.mae);
    println!("📈 R²: {:.3}", metrics.r_squared);

    let names: Vec<String> = importances.iter().map(|p| p.name.clone()).collect();
    let rows: Vec<(f64, f64, f64, usize)> = importances
        .iter()
        .map(|p| (p.importance, p.std, p.scaled, p.rank))
        .collect();
    let writer = ResultWriter::new(&cli.output_dir)?;
    writer
        .write_evaluation(
            cli.seed,
            split.train().len(),
            split.test().len(),
            cli.n_trees,
            train_result.metadata().max_features_resolved,
            (metrics.rmse, metrics.mae, metrics.r_squared),
            oob,
            &names,
            &rows,
        )
        .context("failed to write evaluation report")?;

    Ok(())
}
