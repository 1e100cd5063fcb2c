//! Error classification shared by the core's error types.

/// Coarse error classes, for status codes and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable or missing file.
    Io,
    /// Criteria or input the caller must fix.
    Validation,
    /// The remote service failed.
    Backend,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io_error",
            Self::Validation => "validation_error",
            Self::Backend => "backend_error",
            Self::Internal => "internal_error",
        }
    }
}
