//! Cursor-based FITS image access.
//!
//! [`FitsFile`] owns an open file and an explicit current-HDU cursor:
//! open, seek to an HDU, enumerate its header, query image geometry, and
//! decode pixel runs into a typed buffer. Failures arrive as the
//! [`FitsError`] taxonomy with the engine's status code and text attached.

pub mod errors;
pub mod file;
pub mod headers;
pub mod images;
pub mod status;

pub use errors::{ErrorDetail, FitsError, Result};
pub use file::{FitsFile, HduDescriptor, HduKind, OpenMode};
pub use headers::{HeaderKey, KeySpace};
pub use images::{
    Bitpix, ImageParameters, PixelBuffer, PixelValue, PixelWindow, MAX_AXES,
};
pub use status::translate;
