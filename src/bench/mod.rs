pub mod config;
pub mod harness;
pub mod report;

pub use config::{BenchmarkConfig, DEFAULT_LENGTH, DEFAULT_TRIALS};
pub use harness::{BenchmarkHarness, HarnessState};
pub use report::{BenchmarkReport, StrategyOutcome, StrategyReport, TimingSample, print_report};
