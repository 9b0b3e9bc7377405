//! Strategy Parameter Optimizer Binary
//!
//! A CLI tool for running optimization trials against the strategy's tuning
//! parameters and inspecting the parameter space.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use paramtune::application::optimization::{OptimizeReporter, ParameterOptimizer, RunReport};
use paramtune::config::{self, Config};
use paramtune::domain::errors::ControllerError;
use paramtune::domain::optimization::{
    BoundsRegistry, CompositeScoreEvaluator, ParameterSet, ScoreEvaluator, ScoreWeights,
    SequenceRandom, StrategyKind,
};
use paramtune::infrastructure::observability::{MetricsListener, OptimizerMetrics};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Strategy Parameter Optimizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run optimization trials with one strategy
    Run {
        /// Strategy (randomwalk, genetic, gradientguided)
        #[arg(short, long, default_value = "GradientGuided")]
        strategy: String,

        /// Number of trials to run
        #[arg(short, long, default_value = "10")]
        trials: usize,

        /// RNG seed (overrides OPTIMIZER_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// TOML file with the starting parameter set
        #[arg(long)]
        params: Option<String>,

        /// TOML file with score weights
        #[arg(long)]
        weights: Option<String>,

        /// Output JSON file for the run report
        #[arg(short, long, default_value = "optimization_report.json")]
        output: String,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },
    /// Show a parameter set, its bounds and its noise-free score
    Show {
        /// TOML file with the parameter set (defaults when omitted)
        #[arg(long)]
        params: Option<String>,

        /// TOML file with score weights
        #[arg(long)]
        weights: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let reporter = OptimizeReporter::default();
    let bounds = BoundsRegistry::standard();

    match cli.command {
        Commands::Run {
            strategy,
            trials,
            seed,
            params,
            weights,
            output,
            metrics,
        } => {
            let kind = StrategyKind::from_str(&strategy)?;
            let seed = seed.or(config.optimizer.seed);
            reporter.print_header(kind.name(), trials, seed, &output);

            let weights = load_weights(weights.as_deref())?;
            let evaluator = CompositeScoreEvaluator::new(weights, config.optimizer.score_noise)?;
            let start = load_parameters(params.as_deref(), &bounds)?;

            let mut builder = ParameterOptimizer::builder()
                .settings(config.optimizer.settings())
                .bounds(bounds.clone())
                .evaluator(Arc::new(evaluator))
                .parameters(start);
            if let Some(seed) = seed {
                builder = builder.seed(seed);
            }
            let optimizer = builder.build()?;

            let metrics = if metrics || config.observability.enabled {
                let registry = OptimizerMetrics::new()?;
                registry.target_score.set(optimizer.target_score());
                registry.current_score.set(optimizer.current_score());
                optimizer.subscribe(Arc::new(MetricsListener::new(registry.clone())));
                Some(registry)
            } else {
                None
            };

            optimizer.backup();

            println!("🚀 Starting optimization...\n");
            for trial in 1..=trials {
                match optimizer.run_strategy(kind) {
                    Ok(result) => info!("Trial {}/{}: {}", trial, trials, result),
                    Err(ControllerError::OptimizationFailure(e)) => {
                        warn!("Trial {}/{} failed: {}", trial, trials, e);
                    }
                    Err(e) => return Err(e.into()),
                }

                if optimizer.target_reached() {
                    info!(
                        "Target score {:.2} reached after {} trial(s)",
                        optimizer.target_score(),
                        trial
                    );
                    break;
                }
            }

            let history = optimizer.history();
            reporter.print_results_table(&history);
            if let Some(best) = optimizer.best_result() {
                reporter.print_best_config(&best);
            }

            let report = RunReport {
                generated_at: Utc::now(),
                strategy: kind.name().to_string(),
                trials_requested: trials,
                seed,
                final_score: optimizer.current_score(),
                target_score: optimizer.target_score(),
                target_reached: optimizer.target_reached(),
                buyback_allocation: optimizer.buyback_allocation(),
                parameters: optimizer.parameters(),
                best: optimizer.best_result(),
                history,
            };
            reporter.export_json(&report, &output)?;

            if let Some(metrics) = metrics {
                println!("\n📈 Metrics:\n{}", metrics.render());
            }
            println!("✅ Optimization complete!\n");
        }
        Commands::Show { params, weights } => {
            let weights = load_weights(weights.as_deref())?;
            let evaluator = CompositeScoreEvaluator::new(weights, 0.0)?;
            let params = load_parameters(params.as_deref(), &bounds)?;

            reporter.print_parameters(&params, &bounds);

            // Noise is disabled, so the random source is never drawn from
            let score = evaluator.score(&params, &mut SequenceRandom::midpoint())?;
            let breakdown = evaluator.breakdown(&params);
            println!("\n🎯 Score: {:.2}/100", score);
            println!("  {:#?}", breakdown);
        }
    }

    Ok(())
}

fn load_weights(path: Option<&str>) -> Result<ScoreWeights> {
    match path {
        Some(path) => {
            info!("Loading score weights from: {}", path);
            config::load_score_weights(Path::new(path))
        }
        None => Ok(ScoreWeights::default()),
    }
}

fn load_parameters(path: Option<&str>, bounds: &BoundsRegistry) -> Result<ParameterSet> {
    match path {
        Some(path) => {
            info!("Loading parameters from: {}", path);
            config::load_parameter_set(Path::new(path), bounds)
        }
        None => Ok(ParameterSet::default()),
    }
}
