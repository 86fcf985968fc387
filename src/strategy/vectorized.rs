use ndarray::ArrayView1;

use crate::{tensor::NumericBuffer, utils::error::TensorError};

use super::{AdditionStrategy, StrategyKind, check_operands};

/// Whole-array addition delegated to ndarray.
///
/// Lengths are checked before the call, so ndarray's broadcasting never kicks in.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorizedBulk;

impl AdditionStrategy for VectorizedBulk {
    fn kind(&self) -> StrategyKind {
        StrategyKind::VectorizedBulk
    }

    fn add(&self, a: &NumericBuffer, b: &NumericBuffer) -> Result<NumericBuffer, TensorError> {
        let (a, b) = check_operands(a, b)?;

        let a = ArrayView1::from(a);
        let b = ArrayView1::from(b);
        let sum = &a + &b;

        let (values, _offset) = sum.into_raw_vec_and_offset();
        NumericBuffer::from_vec(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::InterpretedLoop;

    #[test]
    fn matches_interpreted_loop() {
        let a: Vec<f32> = (0..1024).map(|i| i as f32 * 0.37).collect();
        let b: Vec<f32> = (0..1024).map(|i| 1.0 / (i as f32 + 1.0)).collect();
        let a = NumericBuffer::from_vec(a).unwrap();
        let b = NumericBuffer::from_vec(b).unwrap();

        let expected = InterpretedLoop.add(&a, &b).unwrap();
        let actual = VectorizedBulk.add(&a, &b).unwrap();
        assert_eq!(expected.as_host_slice().unwrap(), actual.as_host_slice().unwrap());
    }

    #[test]
    fn single_element_is_not_broadcast() {
        let a = NumericBuffer::from_vec(vec![1.0]).unwrap();
        let b = NumericBuffer::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            VectorizedBulk.add(&a, &b),
            Err(TensorError::LengthMismatch { left: 1, right: 3 })
        ));
    }
}
