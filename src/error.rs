use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatmulError {
    #[error("invalid size {size} for {algorithm}: {requirement}")]
    InvalidSize {
        size: usize,
        algorithm: &'static str,
        requirement: &'static str,
    },
    #[error("shape mismatch: expected {expected}x{expected}, got {got}x{got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("data length mismatch: {size}x{size} matrix needs {expected} elements, got {got}")]
    DataLength {
        size: usize,
        expected: usize,
        got: usize,
    },
    #[error("failed to allocate {size}x{size} matrix")]
    Allocation { size: usize },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, MatmulError>;
