//! The access-layer error taxonomy.
//!
//! Every engine failure is translated exactly once, at this layer's
//! boundary, into one of these kinds. Raw status codes survive only inside
//! [`ErrorDetail`] for diagnostics; callers match on the kind.

/// Status code and diagnostic text carried by most error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// The engine status code that produced this error (never zero).
    pub status: i32,
    /// Human-readable diagnostics: operation context plus the engine's
    /// canonical status text, empty when neither is available.
    pub text: String,
}

impl core::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.text.is_empty() {
            write!(f, "status {}", self.status)
        } else {
            write!(f, "status {}: {}", self.status, self.text)
        }
    }
}

/// All errors the access layer reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitsError {
    /// File missing, unreadable, or not a valid FITS file.
    OpenFailed(ErrorDetail),
    /// Operation attempted after `close`.
    HandleClosed(ErrorDetail),
    /// Seek target outside `[1, hdu_count]`.
    InvalidHduIndex(ErrorDetail),
    /// Header ordinal outside the existing range, or named key absent.
    KeyNotFound(ErrorDetail),
    /// Image-only operation invoked on a table HDU.
    NotAnImageHdu(ErrorDetail),
    /// Axis count exceeds the supported maximum.
    UnsupportedDimensionality(ErrorDetail),
    /// Pixel decode failure: I/O, conversion, bounds, or window shape.
    ReadFailed(ErrorDetail),
    /// Any other engine status, with whatever text the engine supplies.
    Format(ErrorDetail),
}

impl FitsError {
    /// The detail carried by every kind.
    pub fn detail(&self) -> &ErrorDetail {
        match self {
            FitsError::OpenFailed(d)
            | FitsError::HandleClosed(d)
            | FitsError::InvalidHduIndex(d)
            | FitsError::KeyNotFound(d)
            | FitsError::NotAnImageHdu(d)
            | FitsError::UnsupportedDimensionality(d)
            | FitsError::ReadFailed(d)
            | FitsError::Format(d) => d,
        }
    }

    /// The engine status code behind this error.
    pub fn status(&self) -> i32 {
        self.detail().status
    }
}

impl core::fmt::Display for FitsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FitsError::OpenFailed(d) => write!(f, "open failed ({d})"),
            FitsError::HandleClosed(d) => write!(f, "file handle is closed ({d})"),
            FitsError::InvalidHduIndex(d) => write!(f, "invalid HDU index ({d})"),
            FitsError::KeyNotFound(d) => write!(f, "header key not found ({d})"),
            FitsError::NotAnImageHdu(d) => write!(f, "not an image HDU ({d})"),
            FitsError::UnsupportedDimensionality(d) => {
                write!(f, "unsupported dimensionality ({d})")
            }
            FitsError::ReadFailed(d) => write!(f, "pixel read failed ({d})"),
            FitsError::Format(d) => write!(f, "FITS format error ({d})"),
        }
    }
}

impl std::error::Error for FitsError {}

/// Convenience result type for the access layer.
pub type Result<T> = std::result::Result<T, FitsError>;
