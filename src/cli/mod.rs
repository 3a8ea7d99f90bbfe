//! Command-line interface
//!
//! Batch jobs (train, explain, fairness), schema inspection and the server.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::ArtifactPaths;
use crate::data::Dataset;
use crate::explainability::{global_explain, ExplainConfig};
use crate::fairness::{FairnessAuditor, FairnessConfig};
use crate::model::ModelBundle;
use crate::schema::SchemaDeclaration;
use crate::server::{run_server, ServerConfig};
use crate::training::{TrainEngine, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Disease classifier: training, inference server, explanations and fairness audit")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Artifact path overrides shared by the batch jobs
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Training dataset CSV [env: DATA_PATH]
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Model bundle [env: MODEL_PATH]
    #[arg(short, long)]
    pub model: Option<PathBuf>,
}

impl PathArgs {
    fn resolve(&self) -> ArtifactPaths {
        let mut paths = ArtifactPaths::default();
        if let Some(data) = &self.data {
            paths = paths.with_data(data);
        }
        if let Some(model) = &self.model {
            paths = paths.with_model(model);
        }
        paths
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the model and write the bundle and training report
    Train {
        #[command(flatten)]
        paths: PathArgs,

        /// Training report JSON [env: TRAINING_REPORT_PATH]
        #[arg(long)]
        report: Option<PathBuf>,

        /// Number of trees
        #[arg(long, default_value = "600")]
        trees: usize,

        /// Maximum tree depth (0 for unlimited)
        #[arg(long, default_value = "18")]
        max_depth: usize,

        /// Held-out fraction
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Seed for the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Rank features over the dataset and write the global explanation
    Explain {
        #[command(flatten)]
        paths: PathArgs,

        /// Output JSON [env: GLOBAL_EXPLAIN_PATH]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Features kept in the ranking
        #[arg(long, default_value = "20")]
        top_k: usize,

        /// Rows sampled for Shapley attribution
        #[arg(long, default_value = "200")]
        sample_size: usize,

        /// Use the forest's importances instead of Shapley sampling
        #[arg(long)]
        no_shap: bool,
    },

    /// Report held-out metrics per demographic slice
    Fairness {
        #[command(flatten)]
        paths: PathArgs,

        /// Output CSV [env: FAIRNESS_REPORT_PATH]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Held-out fraction (defaults to the one stored in the model)
        #[arg(long)]
        test_size: Option<f64>,

        /// Split seed (defaults to the one stored in the model)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the feature schema derived from a dataset header
    Schema {
        /// Dataset CSV [env: DATA_PATH]
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Model bundle [env: MODEL_PATH]
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Server port [env: API_PORT]
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host [env: API_HOST]
        #[arg(long)]
        host: Option<String>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    paths: &PathArgs,
    report: Option<PathBuf>,
    trees: usize,
    max_depth: usize,
    test_size: f64,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    let mut artifacts = paths.resolve();
    if let Some(report) = report {
        artifacts.training_report = report;
    }
    kv("Data", &artifacts.data.display().to_string());

    let config = TrainingConfig::default()
        .with_n_estimators(trees)
        .with_max_depth((max_depth > 0).then_some(max_depth))
        .with_test_size(test_size)
        .with_random_state(seed);

    step_run(&format!("Training {} trees", trees.to_string().cyan()));
    let start = Instant::now();
    let report = TrainEngine::new(config).run(&artifacts)?;
    step_done(&format!("{:.2?}", start.elapsed()));

    println!();
    kv("Accuracy", &format!("{:.4}", report.accuracy));
    kv("Precision (w)", &format!("{:.4}", report.precision_weighted));
    kv("Recall (w)", &format!("{:.4}", report.recall_weighted));
    kv("F1 (w)", &format!("{:.4}", report.f1_weighted));
    println!();
    println!("  {} {}", ok("✓"), format!("model → {}", artifacts.model.display()));
    println!("  {} {}", ok("✓"), format!("report → {}", artifacts.training_report.display()));
    println!();
    Ok(())
}

pub fn cmd_explain(
    paths: &PathArgs,
    output: Option<PathBuf>,
    top_k: usize,
    sample_size: usize,
    no_shap: bool,
) -> anyhow::Result<()> {
    section("Explain");

    let mut artifacts = paths.resolve();
    if let Some(output) = output {
        artifacts.global_explanation = output;
    }

    let (bundle, dataset) = load_inputs(&artifacts)?;

    let mut config = ExplainConfig::default()
        .with_shap_enabled(!no_shap)
        .with_sample_size(sample_size);
    config.global_top_k = top_k;

    step_run("Computing attributions");
    let start = Instant::now();
    let explanation = global_explain(&bundle, &dataset, &config)?;
    step_done(&format!("{:.2?}", start.elapsed()));
    explanation.save(&artifacts.global_explanation)?;

    println!();
    kv("Method", &format!("{:?}", explanation.method));
    for ranked in &explanation.top_features {
        println!("  {:<36} {:.5}", ranked.feature, ranked.importance);
    }
    println!();
    println!("  {} {}", ok("✓"), format!("explanation → {}", artifacts.global_explanation.display()));
    println!();
    Ok(())
}

pub fn cmd_fairness(
    paths: &PathArgs,
    output: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    section("Fairness");

    let mut artifacts = paths.resolve();
    if let Some(output) = output {
        artifacts.fairness_report = output;
    }

    let (bundle, dataset) = load_inputs(&artifacts)?;

    let mut config = FairnessConfig::default();
    if let Some(test_size) = test_size {
        config = config.with_test_size(test_size);
    }
    if let Some(seed) = seed {
        config = config.with_random_state(seed);
    }
    kv(
        "Split",
        &format!(
            "test_size={} seed={}",
            config.test_size.unwrap_or(bundle.split.test_size),
            config.random_state.unwrap_or(bundle.split.random_state)
        ),
    );

    step_run("Auditing held-out slices");
    let start = Instant::now();
    let report = FairnessAuditor::new(config).run(&bundle, &dataset)?;
    step_done(&format!("{:.2?}", start.elapsed()));
    report.save_csv(&artifacts.fairness_report)?;

    println!();
    println!(
        "  {:<16} {:>9} {:>9} {:>9} {:>9}",
        muted("Group"),
        muted("Acc"),
        muted("Prec"),
        muted("Recall"),
        muted("F1")
    );
    println!("  {}", dim(&"─".repeat(56)));
    for row in &report.rows {
        println!(
            "  {:<16} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            row.group, row.accuracy, row.precision_weighted, row.recall_weighted, row.f1_weighted
        );
    }
    println!();
    println!("  {} {}", ok("✓"), format!("report → {}", artifacts.fairness_report.display()));
    println!();
    Ok(())
}

pub fn cmd_schema(data: Option<PathBuf>) -> anyhow::Result<()> {
    section("Schema");

    let path = data.unwrap_or_else(|| ArtifactPaths::default().data);
    let dataset = Dataset::load(&path, &SchemaDeclaration::default())?;
    let schema = dataset.schema();

    kv("Target", &schema.target);
    kv("Numeric", &schema.numeric.join(", "));
    kv("Categorical", &schema.categorical.join(", "));
    kv("Symptoms", &schema.symptoms.join(", "));
    kv("Features", &schema.n_features().to_string());
    println!();
    Ok(())
}

pub async fn cmd_serve(model: Option<PathBuf>, port: Option<u16>, host: Option<String>) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(model) = model {
        config = config.with_model_path(model);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }

    section("Serve");
    kv("Model", &config.model_path.display().to_string());
    kv("Address", &format!("http://{}:{}", config.host, config.port));
    println!();

    run_server(config).await
}

fn load_inputs(artifacts: &ArtifactPaths) -> anyhow::Result<(ModelBundle, Dataset)> {
    step_run("Loading model");
    let bundle = ModelBundle::load(&artifacts.model)?;
    step_done(&artifacts.model.display().to_string());

    step_run("Loading data");
    let dataset = Dataset::load(&artifacts.data, &SchemaDeclaration::default())?;
    step_done(&format!("{} rows", dataset.len()));
    Ok((bundle, dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from(["triage", "train", "--data", "d.csv", "--trees", "50", "--max-depth", "0"]).unwrap();
        match cli.command {
            Commands::Train { paths, trees, max_depth, seed, .. } => {
                assert_eq!(paths.data, Some(PathBuf::from("d.csv")));
                assert_eq!(trees, 50);
                assert_eq!(max_depth, 0);
                assert_eq!(seed, 42);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_parse_fairness_split_optional() {
        let cli = Cli::try_parse_from(["triage", "fairness"]).unwrap();
        assert!(matches!(cli.command, Commands::Fairness { test_size: None, seed: None, .. }));

        let cli = Cli::try_parse_from(["triage", "fairness", "--seed", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Fairness { test_size: None, seed: Some(7), .. }));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["triage", "serve", "--port", "5001"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(5001), host: None, .. }));
    }

    #[test]
    fn test_path_overrides() {
        let args = PathArgs {
            data: Some(PathBuf::from("x.csv")),
            model: Some(PathBuf::from("m.bin")),
        };
        let paths = args.resolve();
        assert_eq!(paths.data, PathBuf::from("x.csv"));
        assert_eq!(paths.model, PathBuf::from("m.bin"));
    }
}
