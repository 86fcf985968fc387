use std::{ffi::CString, ptr, sync::Arc};

use tracing::{debug, info};
use vulkanalia::{
    Device, Entry, Instance,
    loader::{LIBRARY, LibloadingLoader},
    vk::{self, DeviceV1_0, InstanceV1_0},
};

use crate::{tensor::Device as TensorDevice, utils::error::TensorError};

use super::{
    accelerator::{Accelerator, AcceleratorMemory},
    gpu_memory::GPUMemory,
    memory_tracker::MemoryTracker,
};

// Owns the Vulkan instance and logical device.
// Every GPUMemory holds an Arc to this, so the device is only destroyed after its last allocation.
pub struct VkContext {
    _entry: Entry,
    instance: Instance,
    pub device: Device,
    physical_device: vk::PhysicalDevice,
    pub tracker: MemoryTracker,
}

impl VkContext {
    pub fn find_memory_type(
        &self,
        type_filter: u32,
        properties: vk::MemoryPropertyFlags,
    ) -> Option<u32> {
        unsafe {
            let mem_properties = self
                .instance
                .get_physical_device_memory_properties(self.physical_device);

            (0..mem_properties.memory_type_count).find(|&i| {
                (type_filter & (1 << i)) != 0
                    && mem_properties.memory_types[i as usize]
                        .property_flags
                        .contains(properties)
            })
        }
    }
}

// Vulkan handles are plain identifiers; access to each memory object is externally
// synchronised by its owning GPUMemory.
unsafe impl Send for VkContext {}
unsafe impl Sync for VkContext {}

impl Drop for VkContext {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

/// Accelerator backed by a Vulkan physical device.
///
/// Storage is host-visible, host-coherent device memory, so transfers are a
/// map/copy/unmap with no staging buffer or command submission.
pub struct VulkanAccelerator {
    context: Arc<VkContext>,
    name: String,
}

impl VulkanAccelerator {
    pub fn new(device_index: usize) -> Result<Self, TensorError> {
        unsafe {
            let loader = LibloadingLoader::new(LIBRARY)
                .map_err(|e| TensorError::Vulkan(format!("Failed to load Vulkan library: {}", e)))?;
            let entry = Entry::new(loader)
                .map_err(|e| TensorError::Vulkan(format!("Failed to create entry point: {}", e)))?;

            let instance = Self::create_instance(&entry)?;

            // Instance must not leak if anything below fails
            match Self::create_device(&instance, device_index) {
                Ok((device, physical_device, name, total_memory)) => {
                    info!(gpu = %name, total_memory, "Vulkan accelerator initialised");
                    Ok(Self {
                        context: Arc::new(VkContext {
                            _entry: entry,
                            instance,
                            device,
                            physical_device,
                            // 60% of the device local heap, leaves room for other processes
                            tracker: MemoryTracker::new((total_memory as f64 * 0.6) as u64),
                        }),
                        name,
                    })
                }
                Err(e) => {
                    instance.destroy_instance(None);
                    Err(e)
                }
            }
        }
    }

    unsafe fn create_instance(entry: &Entry) -> Result<Instance, TensorError> {
        let aname = CString::new("tensoradd").map_err(|e| TensorError::Vulkan(e.to_string()))?;

        let appinfo = vk::ApplicationInfo {
            s_type: vk::StructureType::APPLICATION_INFO,
            next: ptr::null(),
            application_name: aname.as_ptr(),
            application_version: vk::make_version(1, 0, 0),
            engine_name: aname.as_ptr(),
            engine_version: vk::make_version(1, 0, 0),
            api_version: vk::make_version(1, 0, 0),
        };

        let create_info = vk::InstanceCreateInfo {
            s_type: vk::StructureType::INSTANCE_CREATE_INFO,
            next: ptr::null(),
            flags: vk::InstanceCreateFlags::empty(),
            application_info: &appinfo,
            enabled_layer_count: 0,
            enabled_layer_names: ptr::null(),
            enabled_extension_count: 0,
            enabled_extension_names: ptr::null(),
        };

        Ok(unsafe { entry.create_instance(&create_info, None) }?)
    }

    unsafe fn create_device(
        instance: &Instance,
        device_index: usize,
    ) -> Result<(Device, vk::PhysicalDevice, String, u64), TensorError> {
        unsafe {
            let physical_devices = instance.enumerate_physical_devices()?;
            let physical_device = *physical_devices.get(device_index).ok_or_else(|| {
                TensorError::Vulkan(format!(
                    "GPU index {} out of range, {} devices found",
                    device_index,
                    physical_devices.len()
                ))
            })?;

            let properties = instance.get_physical_device_properties(physical_device);
            let name = String::from_utf8_lossy(
                &properties
                    .device_name
                    .iter()
                    .take_while(|&&c| c != 0)
                    .map(|&c| c as u8)
                    .collect::<Vec<u8>>(),
            )
            .to_string();

            // Nothing is dispatched, but a logical device needs at least one queue
            let queue_family_index = instance
                .get_physical_device_queue_family_properties(physical_device)
                .iter()
                .enumerate()
                .find(|(_, properties)| properties.queue_flags.contains(vk::QueueFlags::COMPUTE))
                .map(|(index, _)| index as u32)
                .ok_or_else(|| TensorError::Vulkan("No compute queue family found".to_string()))?;

            let queue_priorities = [1.0f32];

            let queue_info = vk::DeviceQueueCreateInfo {
                s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
                next: ptr::null(),
                flags: vk::DeviceQueueCreateFlags::empty(),
                queue_family_index,
                queue_count: 1,
                queue_priorities: queue_priorities.as_ptr(),
            };

            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo {
                s_type: vk::StructureType::DEVICE_CREATE_INFO,
                next: ptr::null(),
                flags: vk::DeviceCreateFlags::empty(),
                queue_create_info_count: 1,
                queue_create_infos: &queue_info,
                enabled_layer_count: 0,
                enabled_layer_names: ptr::null(),
                enabled_extension_count: 0,
                enabled_extension_names: ptr::null(),
                enabled_features: &device_features,
            };

            let device = instance.create_device(physical_device, &device_create_info, None)?;

            let memory_properties = instance.get_physical_device_memory_properties(physical_device);
            let device_local_heap_index = (0..memory_properties.memory_type_count)
                .find(|&i| {
                    memory_properties.memory_types[i as usize]
                        .property_flags
                        .contains(vk::MemoryPropertyFlags::DEVICE_LOCAL)
                })
                .map(|i| memory_properties.memory_types[i as usize].heap_index)
                .unwrap_or(0);
            let total_memory = memory_properties.memory_heaps[device_local_heap_index as usize].size;

            Ok((device, physical_device, name, total_memory))
        }
    }
}

impl Accelerator for VulkanAccelerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn allocate(&self, length: usize) -> Result<Box<dyn AcceleratorMemory>, TensorError> {
        let size_in_bytes = (length * std::mem::size_of::<f32>()) as vk::DeviceSize;
        let alloc_err = |reason: String| TensorError::Allocation {
            device: TensorDevice::Accelerator,
            length,
            reason,
        };

        self.context.tracker.allocate(size_in_bytes).map_err(alloc_err)?;

        let device = &self.context.device;

        let result = unsafe {
            let buffer_info = vk::BufferCreateInfo {
                s_type: vk::StructureType::BUFFER_CREATE_INFO,
                next: ptr::null(),
                flags: vk::BufferCreateFlags::empty(),
                size: size_in_bytes,
                usage: vk::BufferUsageFlags::STORAGE_BUFFER,
                sharing_mode: vk::SharingMode::EXCLUSIVE,
                queue_family_index_count: 0,
                queue_family_indices: ptr::null(),
            };

            match device.create_buffer(&buffer_info, None) {
                Err(e) => Err(alloc_err(format!("create_buffer: {:?}", e))),
                Ok(buffer) => {
                    let mem_requirements = device.get_buffer_memory_requirements(buffer);

                    let allocated = self
                        .context
                        .find_memory_type(
                            mem_requirements.memory_type_bits,
                            vk::MemoryPropertyFlags::HOST_VISIBLE
                                | vk::MemoryPropertyFlags::HOST_COHERENT,
                        )
                        .ok_or_else(|| alloc_err("No host visible memory type".to_string()))
                        .and_then(|memory_type| {
                            let alloc_info = vk::MemoryAllocateInfo {
                                s_type: vk::StructureType::MEMORY_ALLOCATE_INFO,
                                next: ptr::null(),
                                allocation_size: mem_requirements.size,
                                memory_type_index: memory_type,
                            };
                            device
                                .allocate_memory(&alloc_info, None)
                                .map_err(|e| alloc_err(format!("allocate_memory: {:?}", e)))
                        })
                        .and_then(|memory| match device.bind_buffer_memory(buffer, memory, 0) {
                            Ok(()) => Ok(memory),
                            Err(e) => {
                                device.free_memory(memory, None);
                                Err(alloc_err(format!("bind_buffer_memory: {:?}", e)))
                            }
                        });

                    match allocated {
                        Ok(memory) => Ok((buffer, memory)),
                        Err(e) => {
                            device.destroy_buffer(buffer, None);
                            Err(e)
                        }
                    }
                }
            }
        };

        match result {
            Ok((buffer, memory)) => {
                debug!(length, bytes = size_in_bytes, gpu = %self.name, "GPU allocation");
                Ok(Box::new(GPUMemory::new(
                    buffer,
                    memory,
                    size_in_bytes,
                    length,
                    Arc::clone(&self.context),
                )))
            }
            Err(e) => {
                self.context.tracker.deallocate(size_in_bytes);
                Err(e)
            }
        }
    }

    fn memory_in_use(&self) -> u64 {
        self.context.tracker.get_current()
    }

    fn memory_limit(&self) -> u64 {
        self.context.tracker.get_maximum()
    }
}
