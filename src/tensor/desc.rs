use crate::utils::error::TensorError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    dims: Vec<i64>,
}

impl TensorDesc {
    // Only rank-1 shapes with a positive extent are valid
    pub fn new(dims: Vec<i64>) -> Result<Self, TensorError> {
        let invalid = |reason: &str| TensorError::InvalidShape {
            shape: dims.clone(),
            reason: reason.to_string(),
        };

        if dims.is_empty() {
            return Err(invalid("tensor dimensions cannot be empty"));
        }

        if dims.iter().any(|&d| d <= 0) {
            return Err(invalid("every dimension must be positive"));
        }

        if dims.len() > 1 {
            return Err(invalid("only rank-1 tensors are supported"));
        }

        Ok(Self { dims })
    }

    pub fn num_elements(&self) -> usize {
        self.dims.iter().map(|d| *d as usize).product()
    }

    // Size in bytes of the float32 payload
    pub fn size_in_bytes(&self) -> usize {
        self.num_elements() * std::mem::size_of::<f32>()
    }

    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }
}
