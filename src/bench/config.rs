use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use crate::{tensor::AcceleratorSelection, utils::error::TensorError};

pub const DEFAULT_LENGTH: usize = 1_000_000;
pub const DEFAULT_TRIALS: usize = 100;

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    // Elements per workload tensor
    pub length: usize,
    pub trials: usize,
    // Workload rng seed, random if unset
    pub seed: Option<u64>,
    // Check each strategy's first result against a reference sum
    pub verify: bool,
    // Native kernel library, the bundled build if unset
    pub native_library: Option<PathBuf>,
    pub accelerator: AcceleratorSelection,
}

impl BenchmarkConfig {
    pub fn build(mut self) -> Result<Self, TensorError> {
        if self.length == 0 {
            return Err(TensorError::InvalidConfig(
                "Workload length must be at least 1".to_string(),
            ));
        }

        if i64::try_from(self.length).is_err() {
            return Err(TensorError::InvalidConfig(format!(
                "Workload length {} does not fit a tensor dimension",
                self.length
            )));
        }

        if self.seed.is_none() {
            self.seed = Some(rand::random());
        }

        Ok(self)
    }

    /// Defaults overridden by `TENSORADD_*` environment variables.
    pub fn from_env() -> Result<Self, TensorError> {
        let mut config = Self::default();

        if let Some(length) = env_parse("TENSORADD_LENGTH")? {
            config.length = length;
        }
        if let Some(trials) = env_parse("TENSORADD_TRIALS")? {
            config.trials = trials;
        }
        if let Some(seed) = env_parse("TENSORADD_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(verify) = env_var("TENSORADD_VERIFY") {
            config.verify = parse_flag("TENSORADD_VERIFY", &verify)?;
        }
        if let Some(path) = env_var("TENSORADD_NATIVE_LIB") {
            config.native_library = Some(PathBuf::from(path));
        }
        if let Some(accelerator) = env_parse("TENSORADD_ACCELERATOR")? {
            config.accelerator = accelerator;
        }

        config.build()
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            trials: DEFAULT_TRIALS,
            seed: None,
            verify: true,
            native_library: None,
            accelerator: AcceleratorSelection::Vulkan,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, TensorError>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| TensorError::InvalidConfig(format!("{}='{}': {}", key, raw, e)))
        })
        .transpose()
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, TensorError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TensorError::InvalidConfig(format!(
            "{}='{}': expected a boolean",
            key, raw
        ))),
    }
}
