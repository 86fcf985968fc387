use thiserror::Error;

use crate::tensor::Device;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("Allocation of {length} elements on {device} failed: {reason}")]
    Allocation {
        device: Device,
        length: usize,
        reason: String,
    },

    #[error("Transfer from {from} to {to} failed: {reason}")]
    Transfer {
        from: Device,
        to: Device,
        reason: String,
    },

    #[error("Invalid shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<i64>, reason: String },

    #[error("Operation '{operation}' is not supported on {device}")]
    UnsupportedDeviceOperation {
        operation: &'static str,
        device: Device,
    },

    #[error("Length mismatch: left operand has {left} elements, right operand has {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Device mismatch: left operand is on {left}, right operand is on {right}")]
    DeviceMismatch { left: Device, right: Device },

    #[error("Native binding unavailable: {0}")]
    BindingUnavailable(String),

    #[error("Native kernel returned status {status}")]
    NativeKernel { status: i32 },

    #[error("Buffer has already been released")]
    BufferReleased,

    #[error("Index {index} out of range for tensor of {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Result mismatch at index {index}: expected {expected}, got {actual}")]
    ResultMismatch {
        index: usize,
        expected: f32,
        actual: f32,
    },

    #[error("Vulkan error: {0}")]
    Vulkan(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Benchmark configured with zero trials, no average can be computed")]
    NoTrials,

    #[error("Benchmark harness has already run; construct a new one to run again")]
    HarnessFinished,
}

// Convert vk::Result (Vulkan return codes) into TensorError
impl From<vulkanalia::vk::Result> for TensorError {
    fn from(r: vulkanalia::vk::Result) -> Self {
        TensorError::Vulkan(format!("vk::Result: {:?}", r))
    }
}

impl From<vulkanalia::vk::ErrorCode> for TensorError {
    fn from(c: vulkanalia::vk::ErrorCode) -> Self {
        TensorError::Vulkan(format!("vk::ErrorCode: {:?}", c))
    }
}
