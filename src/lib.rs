//! tensoradd - Device-aware float32 tensors and a benchmark of elementwise addition strategies
//!
//! Tensors live on the host or on an optional accelerator. Addition is done by one of three
//! interchangeable strategies, which the benchmark harness times against each other.

mod bench;

mod gpu;

mod strategy;

mod tensor;

mod utils;

pub use bench::{
    BenchmarkConfig, BenchmarkHarness, BenchmarkReport, DEFAULT_LENGTH, DEFAULT_TRIALS,
    HarnessState, StrategyOutcome, StrategyReport, TimingSample, print_report,
};
pub use gpu::{Accelerator, AcceleratorMemory, SimulatedAccelerator, VulkanAccelerator};
pub use strategy::{
    AdditionStrategy, InterpretedLoop, NATIVE_LIBRARY_ENV, NativeKernel, Strategies, StrategyKind,
    VectorizedBulk,
};
pub use tensor::{AcceleratorSelection, Device, Devices, NumericBuffer, Tensor, TensorDesc};
pub use utils::{
    error::TensorError,
    logging::init_logging,
    math::{first_mismatch, ulp_distance},
};
