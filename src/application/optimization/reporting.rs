//! Reporting utilities for optimization runs.
//!
//! Provides formatted console output and JSON export capabilities.

use crate::domain::optimization::{
    BoundsRegistry, OptimizationResult, Parameter, ParameterSet, TrialStatus,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Summary of a CLI run, written as JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub strategy: String,
    pub trials_requested: usize,
    pub seed: Option<u64>,
    pub final_score: f64,
    pub target_score: f64,
    pub target_reached: bool,
    pub buyback_allocation: f64,
    pub parameters: ParameterSet,
    pub best: Option<OptimizationResult>,
    /// Newest first
    pub history: Vec<OptimizationResult>,
}

/// Reporter for optimization results output.
pub struct OptimizeReporter {
    output_dir: String,
}

impl OptimizeReporter {
    /// Creates a new reporter with the given output directory.
    pub fn new(output_dir: &str) -> Self {
        Self {
            output_dir: output_dir.to_string(),
        }
    }

    /// Prints every field grouped by area, with its bounds.
    pub fn print_parameters(&self, params: &ParameterSet, bounds: &BoundsRegistry) {
        println!("\n📊 Parameters:");
        println!(
            "  {:<24} | {:>10} | {:>10} | {:>10} | {:<10}",
            "Field", "Value", "Min", "Max", "Group"
        );
        println!("  {}", "-".repeat(74));
        for parameter in Parameter::ALL {
            let bound = bounds.bounds_of(parameter);
            println!(
                "  {:<24} | {:>10.4} | {:>10.4} | {:>10.4} | {:<10}",
                parameter.name(),
                params.get(parameter),
                bound.min,
                bound.max,
                format!("{:?}", parameter.group())
            );
        }
        println!("  {:<24} | {:>10.4}", "buyback_allocation", params.buyback_allocation());
    }

    /// Prints a formatted table of trials, newest first.
    pub fn print_results_table(&self, history: &[OptimizationResult]) {
        let completed = history
            .iter()
            .filter(|r| r.status == TrialStatus::Completed)
            .count();

        println!("\n{}", "=".repeat(80));
        println!(
            "✅ OPTIMIZATION COMPLETE - {} trials ({} completed, {} failed)",
            history.len(),
            completed,
            history.len() - completed
        );
        println!("{}", "=".repeat(80));

        println!(
            "{:<4} | {:<15} | {:<10} | {:>9} | {:>9} | {:>8} | {:<12}",
            "#", "Strategy", "Status", "Before", "After", "Change%", "Finished"
        );
        println!("{}", "-".repeat(80));

        for (i, result) in history.iter().enumerate() {
            let finished = result
                .finished_at
                .map(|t| t.format("%H:%M:%S%.3f").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<4} | {:<15} | {:<10} | {:>9.2} | {:>9.2} | {:>+8.2} | {:<12}",
                i + 1,
                result.strategy,
                result.status.to_string(),
                result.previous_score,
                result.score,
                result.improvement_pct,
                finished
            );
            if let Some(error) = &result.error {
                println!("     ↳ {}", error);
            }
        }

        println!("{}\n", "=".repeat(80));
    }

    /// Prints detailed information about the best trial.
    pub fn print_best_config(&self, best: &OptimizationResult) {
        println!("🏆 BEST CONFIGURATION ({}):", best.strategy);
        println!("  Score:            {:.2}/100", best.score);
        println!("  Improvement:      {:+.2}%", best.improvement_pct);
        println!("  Commission:       {:.2}%", best.parameters.commission_rate * 100.0);
        println!("  Stop Loss:        {:.2}%", best.parameters.stop_loss * 100.0);
        println!("  Take Profit:      {:.2}%", best.parameters.take_profit * 100.0);
        println!(
            "  Allocation:       treasury {:.1}% / burn {:.1}% / buyback {:.1}%",
            best.parameters.treasury_allocation * 100.0,
            best.parameters.burn_allocation * 100.0,
            best.parameters.buyback_allocation() * 100.0
        );
        println!(
            "  Signal Weights:   sentiment {:.2} / technical {:.2}",
            best.parameters.sentiment_weight, best.parameters.technical_weight
        );
        println!("{}\n", "=".repeat(80));
    }

    /// Exports the run report to a JSON file and returns the path written.
    pub fn export_json(&self, report: &RunReport, filename: &str) -> Result<String> {
        let output_path = if filename.contains('/') || filename.contains('\\') {
            filename.to_string()
        } else {
            format!("{}/{}", self.output_dir, filename)
        };

        // Ensure directory exists
        if let Some(parent) = Path::new(&output_path).parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }

        let json_output =
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

        std::fs::write(&output_path, json_output)
            .context(format!("Failed to write report to {}", output_path))?;

        println!("💾 Report saved to: {}", output_path);
        Ok(output_path)
    }

    /// Prints the header banner for the optimization run.
    pub fn print_header(&self, strategy: &str, trials: usize, seed: Option<u64>, output: &str) {
        println!("{}", "=".repeat(80));
        println!("🔍 STRATEGY PARAMETER OPTIMIZER");
        println!("{}", "=".repeat(80));
        println!("Strategy:     {}", strategy);
        println!("Trials:       {}", trials);
        match seed {
            Some(seed) => println!("Seed:         {}", seed),
            None => println!("Seed:         (entropy)"),
        }
        println!("Output:       {}", output);
        println!("{}", "=".repeat(80));
    }
}

impl Default for OptimizeReporter {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RunReport {
        let trial = OptimizationResult::running("Genetic", ParameterSet::default(), 80.0)
            .complete(ParameterSet::default(), 88.0);
        RunReport {
            generated_at: Utc::now(),
            strategy: "Genetic".to_string(),
            trials_requested: 1,
            seed: Some(42),
            final_score: 88.0,
            target_score: 95.0,
            target_reached: false,
            buyback_allocation: 0.1,
            parameters: ParameterSet::default(),
            best: Some(trial.clone()),
            history: vec![trial],
        }
    }

    #[test]
    fn test_export_json_writes_report() {
        let dir = std::env::temp_dir().join(format!("paramtune-report-{}", uuid::Uuid::new_v4()));
        let reporter = OptimizeReporter::new(dir.to_str().unwrap());

        let path = reporter.export_json(&sample_report(), "run.json").unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(written["strategy"], "Genetic");
        assert_eq!(written["seed"], 42);
        assert_eq!(written["history"][0]["status"], "completed");
        assert_eq!(written["parameters"]["commission_rate"], 0.015);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_export_json_accepts_explicit_path() {
        let dir = std::env::temp_dir().join(format!("paramtune-path-{}", uuid::Uuid::new_v4()));
        let target = dir.join("nested").join("out.json");
        let reporter = OptimizeReporter::default();

        let path = reporter
            .export_json(&sample_report(), target.to_str().unwrap())
            .unwrap();
        assert!(Path::new(&path).exists());

        std::fs::remove_dir_all(dir).ok();
    }
}
