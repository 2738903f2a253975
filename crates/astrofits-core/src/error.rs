//! Engine errors and the integer status-code model.
//!
//! Historically FITS toolkits report failure through an integer status
//! code, with zero meaning success. This engine keeps structured error
//! values internally but every variant maps onto one of those codes via
//! [`Error::status`], and [`status_text`] renders the canonical message
//! for any code. Layers above translate codes back into their own error
//! taxonomy without reparsing message strings.

/// Status code: could not open the named file.
pub const FILE_NOT_OPENED: i32 = 104;
/// Status code: tried to move past the end of the file.
pub const END_OF_FILE: i32 = 107;
/// Status code: error reading from the FITS file.
pub const READ_ERROR: i32 = 108;
/// Status code: array dimensions exceed the internal limit.
pub const ARRAY_TOO_BIG: i32 = 111;
/// Status code: invalid file handle.
pub const BAD_FILEPTR: i32 = 114;
/// Status code: keyword not found in the header.
pub const KEY_NO_EXIST: i32 = 202;
/// Status code: keyword record number is out of bounds.
pub const KEY_OUT_BOUNDS: i32 = 203;
/// Status code: keyword value field is blank.
pub const VALUE_UNDEFINED: i32 = 204;
/// Status code: illegal character in keyword name or card.
pub const BAD_KEYCHAR: i32 = 207;
/// Status code: could not find the END keyword.
pub const NO_END: i32 = 210;
/// Status code: illegal BITPIX keyword value.
pub const BAD_BITPIX: i32 = 211;
/// Status code: illegal NAXIS keyword value.
pub const BAD_NAXIS: i32 = 212;
/// Status code: primary array does not start with SIMPLE.
pub const NO_SIMPLE: i32 = 221;
/// Status code: the current HDU is not an image.
pub const NOT_IMAGE: i32 = 233;
/// Status code: unrecognizable extension type.
pub const UNKNOWN_EXT: i32 = 251;
/// Status code: unrecognizable FITS record.
pub const UNKNOWN_REC: i32 = 252;
/// Status code: HDU number out of range.
pub const BAD_HDU_NUM: i32 = 301;
/// Status code: illegal starting element number.
pub const BAD_ELEM_NUM: i32 = 308;
/// Status code: illegal number of dimensions.
pub const BAD_DIMEN: i32 = 320;
/// Status code: first pixel number greater than the last pixel.
pub const BAD_PIX_NUM: i32 = 321;
/// Status code: unsupported datatype requested.
pub const BAD_DATATYPE: i32 = 410;
/// Status code: overflow during datatype conversion.
pub const NUM_OVERFLOW: i32 = 412;

/// Canonical one-line message for a status code.
///
/// Returns the empty string for codes this engine never produces, so
/// callers can always attach the result to a diagnostic without checking.
pub fn status_text(status: i32) -> &'static str {
    match status {
        FILE_NOT_OPENED => "could not open the named file",
        END_OF_FILE => "tried to move past end of file",
        READ_ERROR => "error reading from FITS file",
        ARRAY_TOO_BIG => "array dimensions exceed internal limit",
        BAD_FILEPTR => "invalid file handle",
        KEY_NO_EXIST => "keyword not found in header",
        KEY_OUT_BOUNDS => "keyword record number is out of bounds",
        VALUE_UNDEFINED => "keyword value field is blank",
        BAD_KEYCHAR => "illegal character in keyword name or card",
        NO_END => "couldn't find END keyword",
        BAD_BITPIX => "illegal BITPIX keyword value",
        BAD_NAXIS => "illegal NAXIS keyword value",
        NO_SIMPLE => "primary array doesn't start with SIMPLE",
        NOT_IMAGE => "the current HDU is not an IMAGE extension",
        UNKNOWN_EXT => "unrecognizable FITS extension type",
        UNKNOWN_REC => "unrecognizable FITS record",
        BAD_HDU_NUM => "HDU number is out of range",
        BAD_ELEM_NUM => "illegal starting element number",
        BAD_DIMEN => "illegal number of dimensions in array",
        BAD_PIX_NUM => "first pixel number greater than last pixel",
        BAD_DATATYPE => "unsupported datatype was requested",
        NUM_OVERFLOW => "overflow during datatype conversion",
        _ => "",
    }
}

/// All errors the format engine can produce.
#[derive(Debug)]
pub enum Error {
    /// Malformed FITS structure; the payload names the offending piece.
    InvalidHeader(&'static str),
    /// Premature end of data while scanning.
    UnexpectedEof,
    /// The stream does not begin with a SIMPLE primary header.
    NotFits,
    /// Malformed keyword name in a header card.
    InvalidKeyword,
    /// A header value field could not be interpreted.
    InvalidValue,
    /// A required keyword was not found in the header.
    MissingKeyword(&'static str),
    /// Unrecognized BITPIX value.
    InvalidBitpix(i64),
    /// Unknown or unsupported extension type.
    UnsupportedExtension(&'static str),
    /// An image operation was attempted on a non-image HDU.
    NotImage,
    /// An HDU index beyond the scanned range.
    BadHduIndex,
    /// A pixel run falls outside the image data.
    BadPixelRange,
    /// Header-declared sizes overflow addressable memory.
    SizeOverflow,
    /// An I/O error from the standard library.
    Io(std::io::Error),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// The integer status code for this error, never zero.
    pub fn status(&self) -> i32 {
        match self {
            Error::InvalidHeader(_) => UNKNOWN_REC,
            Error::UnexpectedEof => END_OF_FILE,
            Error::NotFits => NO_SIMPLE,
            Error::InvalidKeyword => BAD_KEYCHAR,
            Error::InvalidValue => VALUE_UNDEFINED,
            Error::MissingKeyword(_) => KEY_NO_EXIST,
            Error::InvalidBitpix(_) => BAD_BITPIX,
            Error::UnsupportedExtension(_) => UNKNOWN_EXT,
            Error::NotImage => NOT_IMAGE,
            Error::BadHduIndex => BAD_HDU_NUM,
            Error::BadPixelRange => BAD_PIX_NUM,
            Error::SizeOverflow => ARRAY_TOO_BIG,
            Error::Io(_) => READ_ERROR,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidHeader(what) => write!(f, "invalid FITS header: {what}"),
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::NotFits => write!(f, "not a FITS file"),
            Error::InvalidKeyword => write!(f, "invalid keyword name"),
            Error::InvalidValue => write!(f, "invalid header value"),
            Error::MissingKeyword(kw) => write!(f, "missing required keyword: {kw}"),
            Error::InvalidBitpix(v) => write!(f, "invalid BITPIX value: {v}"),
            Error::UnsupportedExtension(x) => write!(f, "unsupported extension: {x}"),
            Error::NotImage => write!(f, "HDU does not contain an image"),
            Error::BadHduIndex => write!(f, "HDU index out of range"),
            Error::BadPixelRange => write!(f, "pixel range outside image data"),
            Error::SizeOverflow => write!(f, "declared data size overflows"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_nonzero_status() {
        let errors = [
            Error::InvalidHeader("x"),
            Error::UnexpectedEof,
            Error::NotFits,
            Error::InvalidKeyword,
            Error::InvalidValue,
            Error::MissingKeyword("NAXIS"),
            Error::InvalidBitpix(7),
            Error::UnsupportedExtension("FOREIGN"),
            Error::NotImage,
            Error::BadHduIndex,
            Error::BadPixelRange,
            Error::SizeOverflow,
            Error::Io(std::io::Error::other("oops")),
        ];
        for e in errors {
            assert_ne!(e.status(), 0, "{e}");
        }
    }

    #[test]
    fn status_text_known_codes() {
        assert_eq!(status_text(NOT_IMAGE), "the current HDU is not an IMAGE extension");
        assert_eq!(status_text(BAD_HDU_NUM), "HDU number is out of range");
        assert_eq!(
            status_text(KEY_OUT_BOUNDS),
            "keyword record number is out of bounds"
        );
    }

    #[test]
    fn status_text_unknown_code_is_empty() {
        assert_eq!(status_text(9999), "");
        assert_eq!(status_text(-5), "");
    }

    #[test]
    fn status_matches_code_table() {
        assert_eq!(Error::NotImage.status(), 233);
        assert_eq!(Error::BadPixelRange.status(), 321);
        assert_eq!(Error::UnexpectedEof.status(), 107);
        assert_eq!(Error::Io(std::io::Error::other("x")).status(), 108);
    }

    #[test]
    fn display_carries_payload() {
        assert_eq!(
            Error::MissingKeyword("BITPIX").to_string(),
            "missing required keyword: BITPIX"
        );
        assert_eq!(Error::InvalidBitpix(-99).to_string(), "invalid BITPIX value: -99");
    }

    #[test]
    fn io_error_source() {
        use std::error::Error as StdError;
        let e = Error::Io(std::io::Error::other("inner"));
        assert!(e.source().is_some());
        assert!(Error::NotFits.source().is_none());
    }
}
