mod interpreted;
mod native;
mod vectorized;

pub use interpreted::InterpretedLoop;
pub use native::{NATIVE_LIBRARY_ENV, NativeKernel};
pub use vectorized::VectorizedBulk;

use std::{fmt, path::Path};

use crate::{
    tensor::{Device, NumericBuffer},
    utils::error::TensorError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    InterpretedLoop,
    VectorizedBulk,
    NativeKernel,
}

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::InterpretedLoop => "interpreted_loop",
            StrategyKind::VectorizedBulk => "vectorized_bulk",
            StrategyKind::NativeKernel => "native_kernel",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One way of computing `c[i] = a[i] + b[i]` over float32 buffers.
///
/// Implementations never mutate their inputs and always return a fresh host
/// buffer of the same length.
pub trait AdditionStrategy: fmt::Debug {
    fn kind(&self) -> StrategyKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn add(&self, a: &NumericBuffer, b: &NumericBuffer) -> Result<NumericBuffer, TensorError>;
}

// Shared operand validation, returns host views of both inputs
pub(crate) fn check_operands<'a>(
    a: &'a NumericBuffer,
    b: &'a NumericBuffer,
) -> Result<(&'a [f32], &'a [f32]), TensorError> {
    if a.device() != b.device() {
        return Err(TensorError::DeviceMismatch {
            left: a.device(),
            right: b.device(),
        });
    }

    if a.len() != b.len() {
        return Err(TensorError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    // No accelerator addition kernel exists; operands have to be on the host
    if a.device() == Device::Accelerator {
        return Err(TensorError::UnsupportedDeviceOperation {
            operation: "add",
            device: Device::Accelerator,
        });
    }

    Ok((a.as_host_slice()?, b.as_host_slice()?))
}

/// Factory for addition strategies
pub struct Strategies;

impl Strategies {
    pub fn interpreted_loop() -> Box<dyn AdditionStrategy> {
        Box::new(InterpretedLoop)
    }

    pub fn vectorized_bulk() -> Box<dyn AdditionStrategy> {
        Box::new(VectorizedBulk)
    }

    pub fn native_kernel(library: impl AsRef<Path>) -> Box<dyn AdditionStrategy> {
        Box::new(NativeKernel::load(library))
    }

    pub fn bundled_native_kernel() -> Box<dyn AdditionStrategy> {
        Box::new(NativeKernel::bundled())
    }

    /// All three strategies, with the native kernel loaded from `native_library`
    /// or the bundled build when `None`.
    pub fn all(native_library: Option<&Path>) -> Vec<Box<dyn AdditionStrategy>> {
        let native = match native_library {
            Some(path) => Self::native_kernel(path),
            None => Self::bundled_native_kernel(),
        };

        vec![Self::interpreted_loop(), Self::vectorized_bulk(), native]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{gpu::SimulatedAccelerator, tensor::Devices};

    #[test]
    fn operand_checks() {
        let devices = Devices::with_accelerator(Arc::new(SimulatedAccelerator::unlimited()));
        let host = NumericBuffer::from_vec(vec![1.0, 2.0]).unwrap();
        let short = NumericBuffer::from_vec(vec![1.0]).unwrap();
        let acc = host.transfer(Device::Accelerator, &devices).unwrap();
        let acc2 = host.transfer(Device::Accelerator, &devices).unwrap();

        assert!(matches!(
            check_operands(&host, &short),
            Err(TensorError::LengthMismatch { left: 2, right: 1 })
        ));
        assert!(matches!(
            check_operands(&host, &acc),
            Err(TensorError::DeviceMismatch {
                left: Device::Host,
                right: Device::Accelerator,
            })
        ));
        assert!(matches!(
            check_operands(&acc, &acc2),
            Err(TensorError::UnsupportedDeviceOperation { operation: "add", .. })
        ));
        assert!(check_operands(&host, &host).is_ok());
    }

    #[test]
    fn released_operand_is_reported() {
        let a = NumericBuffer::from_vec(vec![1.0]).unwrap();
        let mut b = NumericBuffer::from_vec(vec![1.0]).unwrap();
        b.release();
        assert!(matches!(
            check_operands(&a, &b),
            Err(TensorError::BufferReleased)
        ));
    }

    #[test]
    fn factory_builds_all_three() {
        let all = Strategies::all(None);
        let kinds: Vec<StrategyKind> = all.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::InterpretedLoop,
                StrategyKind::VectorizedBulk,
                StrategyKind::NativeKernel
            ]
        );
        assert_eq!(all[1].name(), "vectorized_bulk");
    }
}
