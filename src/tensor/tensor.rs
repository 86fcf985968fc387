use rand::Rng;

use crate::{
    strategy::AdditionStrategy,
    tensor::{
        buffer::NumericBuffer,
        desc::TensorDesc,
        device::{Device, Devices},
    },
    utils::{error::TensorError, math::uniform_fill},
};

#[derive(Debug)]
pub struct Tensor {
    desc: TensorDesc,
    buffer: NumericBuffer,
}

impl Tensor {
    /// Create a host tensor with allocated, zeroed storage.
    pub fn create(shape: &[i64]) -> Result<Self, TensorError> {
        let desc = TensorDesc::new(shape.to_vec())?;
        let buffer = NumericBuffer::allocate(desc.num_elements(), Device::Host, &Devices::host_only())?;
        Ok(Self { desc, buffer })
    }

    /// Create a host tensor holding `values`.
    pub fn from_vec(shape: &[i64], values: Vec<f32>) -> Result<Self, TensorError> {
        let desc = TensorDesc::new(shape.to_vec())?;
        if values.len() != desc.num_elements() {
            return Err(TensorError::InvalidShape {
                shape: shape.to_vec(),
                reason: format!(
                    "shape holds {} elements but {} values were given",
                    desc.num_elements(),
                    values.len()
                ),
            });
        }

        Ok(Self {
            desc,
            buffer: NumericBuffer::from_vec(values)?,
        })
    }

    pub fn shape(&self) -> &[i64] {
        self.desc.dims()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn device(&self) -> Device {
        self.buffer.device()
    }

    pub fn is_on_accelerator(&self) -> bool {
        matches!(self.device(), Device::Accelerator)
    }

    pub fn buffer(&self) -> &NumericBuffer {
        &self.buffer
    }

    /// Fill with independent samples from U[0, 1) using the thread rng.
    pub fn random_fill(&mut self) -> Result<(), TensorError> {
        self.random_fill_with(&mut rand::rng())
    }

    pub fn random_fill_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), TensorError> {
        let values = self.host_values_mut("random_fill")?;
        uniform_fill(values, rng);
        Ok(())
    }

    pub fn zero(&mut self) -> Result<(), TensorError> {
        self.host_values_mut("zero")?.fill(0.0);
        Ok(())
    }

    /// Read a single element. Accelerator data must be moved to the host first.
    pub fn get(&self, index: usize) -> Result<f32, TensorError> {
        if self.is_on_accelerator() {
            return Err(TensorError::UnsupportedDeviceOperation {
                operation: "get",
                device: self.device(),
            });
        }

        let values = self.buffer.as_host_slice()?;
        values
            .get(index)
            .copied()
            .ok_or(TensorError::IndexOutOfRange {
                index,
                len: values.len(),
            })
    }

    /// Copy this tensor to `device`. The original stays valid and unchanged.
    pub fn to(&self, device: Device, devices: &Devices) -> Result<Tensor, TensorError> {
        Ok(Tensor {
            desc: self.desc.clone(),
            buffer: self.buffer.transfer(device, devices)?,
        })
    }

    /// Values as a host vector, read back from the accelerator if necessary.
    pub fn to_host_sequence(&self) -> Result<Vec<f32>, TensorError> {
        self.buffer.to_vec()
    }

    /// Elementwise sum computed by `strategy`, returned as a new host tensor.
    pub fn add(&self, other: &Tensor, strategy: &dyn AdditionStrategy) -> Result<Tensor, TensorError> {
        let buffer = strategy.add(&self.buffer, &other.buffer)?;
        Ok(Tensor {
            desc: self.desc.clone(),
            buffer,
        })
    }

    fn host_values_mut(&mut self, operation: &'static str) -> Result<&mut [f32], TensorError> {
        if self.is_on_accelerator() {
            return Err(TensorError::UnsupportedDeviceOperation {
                operation,
                device: self.device(),
            });
        }
        self.buffer.as_host_slice_mut()
    }
}
