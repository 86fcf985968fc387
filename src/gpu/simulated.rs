use std::sync::Arc;

use tracing::debug;

use crate::utils::error::TensorError;

use super::{
    accelerator::{Accelerator, AcceleratorMemory},
    memory_tracker::MemoryTracker,
};

/// In-process accelerator with its own memory budget.
///
/// Device memory is a separate heap allocation, so transfers really copy and
/// running out of budget behaves like a device out-of-memory condition.
pub struct SimulatedAccelerator {
    tracker: Arc<MemoryTracker>,
}

impl SimulatedAccelerator {
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            tracker: Arc::new(MemoryTracker::new(limit_bytes)),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(u64::MAX)
    }
}

impl Accelerator for SimulatedAccelerator {
    fn name(&self) -> &str {
        "simulated"
    }

    fn allocate(&self, length: usize) -> Result<Box<dyn AcceleratorMemory>, TensorError> {
        let size = (length * std::mem::size_of::<f32>()) as u64;
        self.tracker
            .allocate(size)
            .map_err(|reason| TensorError::Allocation {
                device: crate::tensor::Device::Accelerator,
                length,
                reason,
            })?;

        debug!(
            length,
            bytes = size,
            available = self.tracker.get_available(),
            "simulated accelerator allocation"
        );

        Ok(Box::new(SimulatedMemory {
            data: vec![0.0; length].into_boxed_slice(),
            size,
            tracker: Arc::clone(&self.tracker),
        }))
    }

    fn memory_in_use(&self) -> u64 {
        self.tracker.get_current()
    }

    fn memory_limit(&self) -> u64 {
        self.tracker.get_maximum()
    }
}

struct SimulatedMemory {
    data: Box<[f32]>,
    size: u64,
    tracker: Arc<MemoryTracker>,
}

impl AcceleratorMemory for SimulatedMemory {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn copy_into(&mut self, data: &[f32]) -> Result<(), TensorError> {
        if data.len() != self.data.len() {
            return Err(TensorError::LengthMismatch {
                left: self.data.len(),
                right: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    fn read_memory(&self) -> Result<Vec<f32>, TensorError> {
        Ok(self.data.to_vec())
    }
}

impl Drop for SimulatedMemory {
    fn drop(&mut self) {
        self.tracker.deallocate(self.size);
    }
}
