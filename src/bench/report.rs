use std::time::Duration;

use crate::strategy::StrategyKind;

/// One timed invocation of one strategy.
#[derive(Clone, Copy, Debug)]
pub struct TimingSample {
    pub strategy: usize,
    pub kind: StrategyKind,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StrategyOutcome {
    Average(Duration),
    Unavailable { reason: String },
}

#[derive(Clone, Debug)]
pub struct StrategyReport {
    pub kind: StrategyKind,
    pub outcome: StrategyOutcome,
}

#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    pub length: usize,
    pub trials: usize,
    pub results: Vec<StrategyReport>,
}

impl BenchmarkReport {
    pub fn get(&self, kind: StrategyKind) -> Option<&StrategyOutcome> {
        self.results
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| &r.outcome)
    }

    /// Average duration in seconds, `None` if the strategy was unavailable or not run.
    pub fn average_seconds(&self, kind: StrategyKind) -> Option<f64> {
        match self.get(kind)? {
            StrategyOutcome::Average(d) => Some(d.as_secs_f64()),
            StrategyOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self, kind: StrategyKind) -> bool {
        matches!(self.get(kind), Some(StrategyOutcome::Average(_)))
    }
}

pub fn print_report(report: &BenchmarkReport) {
    println!(
        "\nAddition benchmark: {} elements, {} trials",
        report.length, report.trials
    );
    println!("{:-<60}", "");

    for result in &report.results {
        match &result.outcome {
            StrategyOutcome::Average(d) => println!(
                "Average {:<18} time: {:.9} seconds",
                result.kind.name(),
                d.as_secs_f64()
            ),
            StrategyOutcome::Unavailable { reason } => println!(
                "Average {:<18} time: unavailable ({})",
                result.kind.name(),
                reason
            ),
        }
    }
}
