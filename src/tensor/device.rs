use std::{fmt, str::FromStr, sync::Arc};

use tracing::{info, warn};

use crate::{
    gpu::{Accelerator, SimulatedAccelerator, VulkanAccelerator},
    utils::error::TensorError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    Host,
    Accelerator,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Host => write!(f, "host"),
            Device::Accelerator => write!(f, "accelerator"),
        }
    }
}

impl FromStr for Device {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" | "cpu" => Ok(Device::Host),
            "accelerator" | "gpu" => Ok(Device::Accelerator),
            other => Err(TensorError::InvalidConfig(format!(
                "Unknown device '{}', expected host or accelerator",
                other
            ))),
        }
    }
}

/// Which backend, if any, serves `Device::Accelerator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceleratorSelection {
    Vulkan,
    Simulated,
    None,
}

impl FromStr for AcceleratorSelection {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vulkan" => Ok(AcceleratorSelection::Vulkan),
            "simulated" => Ok(AcceleratorSelection::Simulated),
            "none" => Ok(AcceleratorSelection::None),
            other => Err(TensorError::InvalidConfig(format!(
                "Unknown accelerator '{}', expected vulkan, simulated or none",
                other
            ))),
        }
    }
}

/// The set of devices tensors can be placed on.
///
/// Host is always present. The accelerator is optional; allocating on it when
/// it is missing is an allocation error, not a panic.
#[derive(Clone, Default)]
pub struct Devices {
    accelerator: Option<Arc<dyn Accelerator>>,
}

impl Devices {
    pub fn host_only() -> Self {
        Self { accelerator: None }
    }

    pub fn with_accelerator(accelerator: Arc<dyn Accelerator>) -> Self {
        Self {
            accelerator: Some(accelerator),
        }
    }

    /// Use the first Vulkan device if one can be initialised, otherwise host only.
    pub fn detect() -> Self {
        match VulkanAccelerator::new(0) {
            Ok(gpu) => Self::with_accelerator(Arc::new(gpu)),
            Err(e) => {
                warn!(error = %e, "No Vulkan accelerator available, continuing host only");
                Self::host_only()
            }
        }
    }

    pub fn from_selection(selection: AcceleratorSelection) -> Self {
        let devices = match selection {
            AcceleratorSelection::Vulkan => Self::detect(),
            AcceleratorSelection::Simulated => {
                Self::with_accelerator(Arc::new(SimulatedAccelerator::unlimited()))
            }
            AcceleratorSelection::None => Self::host_only(),
        };

        if let Some(acc) = devices.accelerator() {
            info!(backend = acc.name(), "Accelerator selected");
        }

        devices
    }

    pub fn accelerator(&self) -> Option<&Arc<dyn Accelerator>> {
        self.accelerator.as_ref()
    }

    pub fn is_available(&self, device: Device) -> bool {
        match device {
            Device::Host => true,
            Device::Accelerator => self.accelerator.is_some(),
        }
    }
}

impl fmt::Debug for Devices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Devices")
            .field("accelerator", &self.accelerator.as_ref().map(|a| a.name()))
            .finish()
    }
}
