pub mod accelerator;
pub mod gpu_memory;
pub mod memory_tracker;
pub mod simulated;
pub mod vk_gpu;

pub use accelerator::{Accelerator, AcceleratorMemory};
pub use simulated::SimulatedAccelerator;
pub use vk_gpu::VulkanAccelerator;
