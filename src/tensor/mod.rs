mod buffer;
mod desc;
mod device;
mod tensor;

pub use buffer::NumericBuffer;
pub use desc::TensorDesc;
pub use device::{AcceleratorSelection, Device, Devices};
pub use tensor::Tensor;
