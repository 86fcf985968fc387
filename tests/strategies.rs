use std::sync::Arc;

use proptest::prelude::*;
use tensoradd::{
    AdditionStrategy, Device, Devices, NativeKernel, NumericBuffer, SimulatedAccelerator,
    Strategies, StrategyKind, Tensor, TensorError, first_mismatch,
};

const MISSING_LIBRARY: &str = "/nonexistent/libtensor_add_missing.so";

fn buffers(a: Vec<f32>, b: Vec<f32>) -> (NumericBuffer, NumericBuffer) {
    (
        NumericBuffer::from_vec(a).unwrap(),
        NumericBuffer::from_vec(b).unwrap(),
    )
}

fn finite_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..256).prop_flat_map(|n| {
        (
            prop::collection::vec(-1.0e6f32..1.0e6, n),
            prop::collection::vec(-1.0e6f32..1.0e6, n),
        )
    })
}

proptest! {
    #[test]
    fn interpreted_loop_is_exact((a, b) in finite_pair()) {
        let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        let (a, b) = buffers(a, b);

        let c = Strategies::interpreted_loop().add(&a, &b).unwrap();
        prop_assert_eq!(c.device(), Device::Host);
        prop_assert_eq!(c.to_vec().unwrap(), expected);
    }

    #[test]
    fn vectorized_bulk_agrees_with_interpreted_loop((a, b) in finite_pair()) {
        let (a, b) = buffers(a, b);

        let reference = Strategies::interpreted_loop().add(&a, &b).unwrap().to_vec().unwrap();
        let bulk = Strategies::vectorized_bulk().add(&a, &b).unwrap().to_vec().unwrap();
        prop_assert_eq!(first_mismatch(&reference, &bulk, 1), None);
    }

    #[test]
    fn inputs_are_never_modified((a, b) in finite_pair()) {
        let (a_copy, b_copy) = (a.clone(), b.clone());
        let (a, b) = buffers(a, b);

        for strategy in Strategies::all(None) {
            let _ = strategy.add(&a, &b);
            prop_assert_eq!(a.as_host_slice().unwrap(), &a_copy[..]);
            prop_assert_eq!(b.as_host_slice().unwrap(), &b_copy[..]);
        }
    }
}

#[test]
fn native_kernel_agrees_when_built() {
    let kernel = NativeKernel::bundled();
    if !kernel.is_available() {
        return;
    }

    let mut a = Tensor::create(&[10_000]).unwrap();
    let mut b = Tensor::create(&[10_000]).unwrap();
    a.random_fill().unwrap();
    b.random_fill().unwrap();

    let reference = a
        .add(&b, Strategies::interpreted_loop().as_ref())
        .unwrap()
        .to_host_sequence()
        .unwrap();
    let native = a.add(&b, &kernel).unwrap().to_host_sequence().unwrap();

    assert_eq!(first_mismatch(&reference, &native, 1), None);
}

#[test]
fn length_mismatch_for_every_strategy() {
    let (a, b) = buffers(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]);

    let mut strategies = Strategies::all(None);
    strategies.push(Strategies::native_kernel(MISSING_LIBRARY));

    for strategy in strategies {
        assert!(
            matches!(
                strategy.add(&a, &b),
                Err(TensorError::LengthMismatch { left: 3, right: 2 })
            ),
            "{} did not report a length mismatch",
            strategy.name()
        );
    }
}

#[test]
fn single_element_is_not_broadcast() {
    let (a, b) = buffers(vec![1.0], vec![1.0, 2.0, 3.0]);
    for strategy in Strategies::all(None) {
        assert!(matches!(
            strategy.add(&a, &b),
            Err(TensorError::LengthMismatch { .. })
        ));
    }
}

#[test]
fn device_mismatch_is_reported_before_length() {
    let devices = Devices::with_accelerator(Arc::new(SimulatedAccelerator::unlimited()));
    let host = NumericBuffer::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
    let on_acc = NumericBuffer::from_vec(vec![1.0, 2.0])
        .unwrap()
        .transfer(Device::Accelerator, &devices)
        .unwrap();

    for strategy in Strategies::all(None) {
        assert!(matches!(
            strategy.add(&host, &on_acc),
            Err(TensorError::DeviceMismatch {
                left: Device::Host,
                right: Device::Accelerator,
            })
        ));
    }
}

#[test]
fn missing_binding_is_unavailable_not_fatal() {
    let kernel = Strategies::native_kernel(MISSING_LIBRARY);
    assert_eq!(kernel.kind(), StrategyKind::NativeKernel);

    let (a, b) = buffers(vec![1.0, 2.0], vec![3.0, 4.0]);
    assert!(matches!(
        kernel.add(&a, &b),
        Err(TensorError::BindingUnavailable(_))
    ));
}
