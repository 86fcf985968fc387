use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, warn};

use crate::{tensor::NumericBuffer, utils::error::TensorError};

use super::{AdditionStrategy, StrategyKind, check_operands};

/// Runtime override for the native library path.
pub const NATIVE_LIBRARY_ENV: &str = "TENSORADD_NATIVE_LIB";

// Status codes returned by add_tensors in native/tensor_add.c
const STATUS_OK: i32 = 0;
const STATUS_LENGTH_MISMATCH: i32 = -1;

type AddTensorsFn = unsafe extern "C" fn(
    a: *const f32,
    a_len: usize,
    b: *const f32,
    b_len: usize,
    out: *mut f32,
    out_len: usize,
) -> i32;

#[derive(Debug)]
struct NativeBinding {
    add_tensors: AddTensorsFn,
    // Keeps add_tensors valid
    _library: Library,
}

/// Addition in a separately compiled C routine, loaded at runtime.
///
/// Loading never fails outright: a missing library or symbol is remembered and
/// every `add` reports `BindingUnavailable` so callers can skip the strategy.
#[derive(Debug)]
pub struct NativeKernel {
    path: Option<PathBuf>,
    binding: Result<NativeBinding, String>,
}

impl NativeKernel {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let binding = Self::open(&path);

        match &binding {
            Ok(_) => debug!(path = %path.display(), "Loaded native addition kernel"),
            Err(e) => warn!(path = %path.display(), error = %e, "Native addition kernel unavailable"),
        }

        Self {
            path: Some(path),
            binding,
        }
    }

    /// Like `load` but fails immediately when the binding is unavailable.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, TensorError> {
        let kernel = Self::load(path);
        match &kernel.binding {
            Ok(_) => Ok(kernel),
            Err(e) => Err(TensorError::BindingUnavailable(e.clone())),
        }
    }

    /// The library built from native/tensor_add.c by the build script,
    /// unless `TENSORADD_NATIVE_LIB` points somewhere else at runtime.
    pub fn bundled() -> Self {
        match Self::bundled_path() {
            Some(path) => Self::load(path),
            None => Self {
                path: None,
                binding: Err(
                    "native kernel was not built; no C compiler was found at build time"
                        .to_string(),
                ),
            },
        }
    }

    pub fn bundled_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(NATIVE_LIBRARY_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        option_env!("TENSORADD_NATIVE_LIB").map(PathBuf::from)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.binding.is_ok()
    }

    fn open(path: &Path) -> Result<NativeBinding, String> {
        unsafe {
            let library = Library::new(path)
                .map_err(|e| format!("failed to load {}: {}", path.display(), e))?;

            let add_tensors = {
                let symbol: Symbol<AddTensorsFn> = library
                    .get(b"add_tensors\0")
                    .map_err(|e| format!("symbol add_tensors missing from {}: {}", path.display(), e))?;
                *symbol
            };

            Ok(NativeBinding {
                add_tensors,
                _library: library,
            })
        }
    }
}

impl AdditionStrategy for NativeKernel {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NativeKernel
    }

    fn add(&self, a: &NumericBuffer, b: &NumericBuffer) -> Result<NumericBuffer, TensorError> {
        let (a, b) = check_operands(a, b)?;

        let binding = self
            .binding
            .as_ref()
            .map_err(|e| TensorError::BindingUnavailable(e.clone()))?;

        let mut out = vec![0f32; a.len()];
        let status = unsafe {
            (binding.add_tensors)(
                a.as_ptr(),
                a.len(),
                b.as_ptr(),
                b.len(),
                out.as_mut_ptr(),
                out.len(),
            )
        };

        match status {
            STATUS_OK => NumericBuffer::from_vec(out),
            STATUS_LENGTH_MISMATCH => Err(TensorError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            }),
            status => Err(TensorError::NativeKernel { status }),
        }
    }
}
