use tensoradd::{
    BenchmarkConfig, BenchmarkHarness, Device, Devices, Tensor, init_logging, print_report,
};

/* Runner notes
    Transfer demo first, then the addition benchmark over the same config.
    Everything is driven by TENSORADD_* environment variables, see BenchmarkConfig::from_env.

    The accelerator only stores data. Addition always happens on the host,
    so the benchmark workload never leaves host memory.
*/

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = BenchmarkConfig::from_env()?;
    let devices = Devices::from_selection(config.accelerator);

    transfer_demo(&devices)?;

    let mut harness = BenchmarkHarness::with_default_strategies(config);
    let report = harness.run()?;
    print_report(&report);

    Ok(())
}

fn transfer_demo(devices: &Devices) -> Result<(), Box<dyn std::error::Error>> {
    let mut tensor = Tensor::create(&[3])?;
    tensor.random_fill()?;
    println!("Host tensor:        {:?}", tensor.to_host_sequence()?);

    if !devices.is_available(Device::Accelerator) {
        println!("No accelerator, skipping transfer round trip");
        return Ok(());
    }

    let on_accelerator = tensor.to(Device::Accelerator, devices)?;
    println!(
        "Accelerator tensor: {:?} (on {})",
        on_accelerator.to_host_sequence()?,
        on_accelerator.device()
    );

    let back = on_accelerator.to(Device::Host, devices)?;
    println!("Back on host:       {:?}", back.to_host_sequence()?);

    Ok(())
}
