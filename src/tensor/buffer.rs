use std::fmt;

use tracing::{debug, trace};

use crate::{gpu::AcceleratorMemory, utils::error::TensorError};

use super::device::{Device, Devices};

enum Storage {
    Host(Box<[f32]>),
    Accelerator(Box<dyn AcceleratorMemory>),
    Released,
}

/// Fixed-length float32 storage resident on exactly one device.
///
/// The buffer exclusively owns its storage. Accelerator memory is returned to
/// its backend by `release`, which `Drop` also calls, so it is freed exactly
/// once on every path.
pub struct NumericBuffer {
    len: usize,
    device: Device,
    storage: Storage,
}

impl NumericBuffer {
    /// Allocate `length` slots on `device`. Host slots start zeroed.
    pub fn allocate(length: usize, device: Device, devices: &Devices) -> Result<Self, TensorError> {
        if length == 0 {
            return Err(TensorError::Allocation {
                device,
                length,
                reason: "zero-length buffers are not allowed".to_string(),
            });
        }

        let storage = match device {
            Device::Host => {
                check_host_memory(length)?;
                Storage::Host(vec![0.0; length].into_boxed_slice())
            }
            Device::Accelerator => {
                let acc = devices
                    .accelerator()
                    .ok_or_else(|| TensorError::Allocation {
                        device,
                        length,
                        reason: "no accelerator available".to_string(),
                    })?;
                Storage::Accelerator(acc.allocate(length)?)
            }
        };

        debug!(length, %device, "Allocated buffer");

        Ok(Self {
            len: length,
            device,
            storage,
        })
    }

    /// Wrap existing host values.
    pub fn from_vec(values: Vec<f32>) -> Result<Self, TensorError> {
        if values.is_empty() {
            return Err(TensorError::Allocation {
                device: Device::Host,
                length: 0,
                reason: "zero-length buffers are not allowed".to_string(),
            });
        }

        Ok(Self {
            len: values.len(),
            device: Device::Host,
            storage: Storage::Host(values.into_boxed_slice()),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn is_released(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    /// Borrow the values of a host-resident buffer.
    pub fn as_host_slice(&self) -> Result<&[f32], TensorError> {
        match &self.storage {
            Storage::Host(data) => Ok(&data[..]),
            Storage::Accelerator(_) => Err(TensorError::UnsupportedDeviceOperation {
                operation: "host_access",
                device: self.device,
            }),
            Storage::Released => Err(TensorError::BufferReleased),
        }
    }

    pub fn as_host_slice_mut(&mut self) -> Result<&mut [f32], TensorError> {
        match &mut self.storage {
            Storage::Host(data) => Ok(&mut data[..]),
            Storage::Accelerator(_) => Err(TensorError::UnsupportedDeviceOperation {
                operation: "host_access",
                device: self.device,
            }),
            Storage::Released => Err(TensorError::BufferReleased),
        }
    }

    /// Copy the contents to a host vector, reading back from the accelerator if needed.
    pub fn to_vec(&self) -> Result<Vec<f32>, TensorError> {
        match &self.storage {
            Storage::Host(data) => Ok(data.to_vec()),
            Storage::Accelerator(memory) => memory.read_memory(),
            Storage::Released => Err(TensorError::BufferReleased),
        }
    }

    /// Copy this buffer to `to`, returning a new buffer. The source is untouched,
    /// and a same-device transfer still produces a distinct copy.
    pub fn transfer(&self, to: Device, devices: &Devices) -> Result<Self, TensorError> {
        let from = self.device;
        let contents = self.to_vec()?;
        let transfer_err = |reason: String| TensorError::Transfer { from, to, reason };

        let storage = match to {
            Device::Host => {
                check_host_memory(self.len).map_err(|e| transfer_err(e.to_string()))?;
                Storage::Host(contents.into_boxed_slice())
            }
            Device::Accelerator => {
                let acc = devices
                    .accelerator()
                    .ok_or_else(|| transfer_err("no accelerator available".to_string()))?;

                // Dropped (and so released) if the copy fails
                let mut memory = acc
                    .allocate(self.len)
                    .map_err(|e| transfer_err(e.to_string()))?;
                memory
                    .copy_into(&contents)
                    .map_err(|e| transfer_err(e.to_string()))?;

                Storage::Accelerator(memory)
            }
        };

        debug!(length = self.len, %from, %to, "Transferred buffer");

        Ok(Self {
            len: self.len,
            device: to,
            storage,
        })
    }

    /// Free the underlying storage. Calling it again is a no-op.
    pub fn release(&mut self) {
        if let Storage::Accelerator(memory) = &self.storage {
            trace!(bytes = memory.size_in_bytes(), "Releasing accelerator buffer");
        }
        self.storage = Storage::Released;
    }
}

impl Drop for NumericBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for NumericBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericBuffer")
            .field("len", &self.len)
            .field("device", &self.device)
            .field("released", &self.is_released())
            .finish()
    }
}

// Reject host allocations the OS says it cannot satisfy.
// If the OS cannot be queried the allocation is attempted anyway.
fn check_host_memory(length: usize) -> Result<(), TensorError> {
    let requested = (length as u64).saturating_mul(std::mem::size_of::<f32>() as u64);

    if let Ok(info) = sys_info::mem_info() {
        let available = info.avail.saturating_mul(1024);
        if available > 0 && requested > available {
            return Err(TensorError::Allocation {
                device: Device::Host,
                length,
                reason: format!(
                    "requested {} bytes but only {} bytes of host memory are available",
                    requested, available
                ),
            });
        }
    }

    Ok(())
}
