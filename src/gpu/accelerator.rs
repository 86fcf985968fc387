use crate::utils::error::TensorError;

/// Backend for the `Device::Accelerator` memory space.
///
/// Allocations are returned as owned handles; dropping a handle returns its
/// memory to the backend.
pub trait Accelerator: Send + Sync {
    fn name(&self) -> &str;

    fn allocate(&self, length: usize) -> Result<Box<dyn AcceleratorMemory>, TensorError>;

    // Bytes currently held by live allocations
    fn memory_in_use(&self) -> u64;

    fn memory_limit(&self) -> u64;
}

/// One device-side float32 allocation.
pub trait AcceleratorMemory: Send + Sync {
    fn len(&self) -> usize;

    fn size_in_bytes(&self) -> u64 {
        (self.len() * std::mem::size_of::<f32>()) as u64
    }

    fn copy_into(&mut self, data: &[f32]) -> Result<(), TensorError>;

    fn read_memory(&self) -> Result<Vec<f32>, TensorError>;
}
