use std::hint::black_box;

use crate::{tensor::NumericBuffer, utils::error::TensorError};

use super::{AdditionStrategy, StrategyKind, check_operands};

/// One element at a time, in order.
///
/// Each load goes through `black_box` so the compiler cannot vectorise or
/// batch the loop. This is the correctness baseline and the latency ceiling.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterpretedLoop;

impl AdditionStrategy for InterpretedLoop {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InterpretedLoop
    }

    fn add(&self, a: &NumericBuffer, b: &NumericBuffer) -> Result<NumericBuffer, TensorError> {
        let (a, b) = check_operands(a, b)?;

        let mut out = Vec::with_capacity(a.len());
        for i in 0..a.len() {
            out.push(black_box(a[i]) + black_box(b[i]));
        }

        NumericBuffer::from_vec(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_exactly() {
        let a = NumericBuffer::from_vec(vec![1.0, -2.5, 0.1, f32::MAX]).unwrap();
        let b = NumericBuffer::from_vec(vec![2.0, 2.5, 0.2, f32::MAX]).unwrap();
        let c = InterpretedLoop.add(&a, &b).unwrap();

        assert_eq!(
            c.as_host_slice().unwrap(),
            &[3.0, 0.0, 0.1f32 + 0.2f32, f32::INFINITY]
        );
    }

    #[test]
    fn propagates_nan() {
        let a = NumericBuffer::from_vec(vec![f32::NAN]).unwrap();
        let b = NumericBuffer::from_vec(vec![1.0]).unwrap();
        let c = InterpretedLoop.add(&a, &b).unwrap();
        assert!(c.as_host_slice().unwrap()[0].is_nan());
    }
}
