use std::sync::Arc;

use tensoradd::{
    Accelerator, Device, Devices, NumericBuffer, SimulatedAccelerator, Tensor, TensorError,
};

fn simulated(limit: u64) -> (Arc<SimulatedAccelerator>, Devices) {
    let acc = Arc::new(SimulatedAccelerator::new(limit));
    let devices = Devices::with_accelerator(acc.clone());
    (acc, devices)
}

#[test]
fn round_trip_through_accelerator_is_exact() {
    let (_acc, devices) = simulated(1 << 20);

    let mut t = Tensor::create(&[5]).unwrap();
    t.random_fill().unwrap();
    let original = t.to_host_sequence().unwrap();

    let on_acc = t.to(Device::Accelerator, &devices).unwrap();
    assert_eq!(on_acc.device(), Device::Accelerator);
    assert_eq!(on_acc.shape(), &[5]);

    let back = on_acc.to(Device::Host, &devices).unwrap();
    assert_eq!(back.device(), Device::Host);

    // Bitwise equality, not approximate
    let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&back.to_host_sequence().unwrap()), bits(&original));
    assert_eq!(t.to_host_sequence().unwrap(), original);
}

#[test]
fn invalid_shapes_fail_at_creation() {
    assert!(matches!(
        Tensor::create(&[]),
        Err(TensorError::InvalidShape { .. })
    ));
    assert!(matches!(
        Tensor::create(&[0]),
        Err(TensorError::InvalidShape { .. })
    ));
    assert!(matches!(
        Tensor::create(&[-3]),
        Err(TensorError::InvalidShape { .. })
    ));
}

#[test]
fn accelerator_memory_released_on_drop() {
    let (acc, devices) = simulated(1 << 20);
    let t = Tensor::from_vec(&[4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    {
        let on_acc = t.to(Device::Accelerator, &devices).unwrap();
        assert_eq!(acc.memory_in_use(), 16);
        drop(on_acc);
    }

    assert_eq!(acc.memory_in_use(), 0);
}

#[test]
fn failed_transfer_leaks_nothing_and_keeps_source() {
    let (acc, devices) = simulated(8);
    let t = Tensor::from_vec(&[4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    let err = t.to(Device::Accelerator, &devices).unwrap_err();
    assert!(matches!(
        err,
        TensorError::Transfer {
            from: Device::Host,
            to: Device::Accelerator,
            ..
        }
    ));
    assert_eq!(acc.memory_in_use(), 0);
    assert_eq!(t.to_host_sequence().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn transfer_without_accelerator_fails() {
    let t = Tensor::from_vec(&[2], vec![1.0, 2.0]).unwrap();
    assert!(matches!(
        t.to(Device::Accelerator, &Devices::host_only()),
        Err(TensorError::Transfer { .. })
    ));
}

#[test]
fn explicit_release_then_drop_frees_once() {
    let (acc, devices) = simulated(1 << 10);
    let mut buf = NumericBuffer::allocate(16, Device::Accelerator, &devices).unwrap();
    assert_eq!(acc.memory_in_use(), 64);

    buf.release();
    buf.release();
    drop(buf);

    assert_eq!(acc.memory_in_use(), 0);
}
