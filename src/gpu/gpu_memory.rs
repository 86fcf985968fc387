use std::sync::Arc;

use vulkanalia::{vk, vk::DeviceV1_0};

use crate::utils::error::TensorError;

use super::{accelerator::AcceleratorMemory, vk_gpu::VkContext};

pub struct GPUMemory {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
    len: usize,
    context: Arc<VkContext>,
}

impl GPUMemory {
    pub fn new(
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        size: vk::DeviceSize,
        len: usize,
        context: Arc<VkContext>,
    ) -> Self {
        Self {
            buffer,
            memory,
            size,
            len,
            context,
        }
    }
}

impl AcceleratorMemory for GPUMemory {
    fn len(&self) -> usize {
        self.len
    }

    /// Copy host floats into GPU memory.
    fn copy_into(&mut self, data: &[f32]) -> Result<(), TensorError> {
        if data.len() != self.len {
            return Err(TensorError::LengthMismatch {
                left: self.len,
                right: data.len(),
            });
        }

        unsafe {
            let data_ptr = self.context.device.map_memory(
                self.memory,
                0,
                self.size,
                vk::MemoryMapFlags::empty(),
            )? as *mut f32;

            std::ptr::copy_nonoverlapping(data.as_ptr(), data_ptr, data.len());

            self.context.device.unmap_memory(self.memory);
        }

        Ok(())
    }

    /// Read GPU memory back into a host vector.
    fn read_memory(&self) -> Result<Vec<f32>, TensorError> {
        let mut output_data = vec![0f32; self.len];

        unsafe {
            let data_ptr = self.context.device.map_memory(
                self.memory,
                0,
                self.size,
                vk::MemoryMapFlags::empty(),
            )? as *const f32;

            std::ptr::copy_nonoverlapping(data_ptr, output_data.as_mut_ptr(), output_data.len());

            self.context.device.unmap_memory(self.memory);
        }

        Ok(output_data)
    }
}

impl Drop for GPUMemory {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_buffer(self.buffer, None);
            self.context.device.free_memory(self.memory, None);
        }
        self.context.tracker.deallocate(self.size);
    }
}
