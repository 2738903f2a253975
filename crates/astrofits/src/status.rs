//! Translation of engine status codes into the access-layer taxonomy.

use astrofits_core::error as codes;

use crate::errors::{ErrorDetail, FitsError};

/// Build the detail for a status code, prefixing `op` context when given.
pub(crate) fn detail(status: i32, op: &str) -> ErrorDetail {
    let engine_text = codes::status_text(status);
    let text = match (op.is_empty(), engine_text.is_empty()) {
        (true, _) => engine_text.to_string(),
        (false, true) => op.to_string(),
        (false, false) => format!("{op}: {engine_text}"),
    };
    ErrorDetail { status, text }
}

/// Translate a non-zero engine status code into a [`FitsError`].
///
/// Pure and total: unknown codes become the generic `Format` kind carrying
/// whatever text the engine supplies (possibly empty). Zero is a success
/// code and indicates a caller bug; it is mapped to `Format` rather than
/// panicking.
pub fn translate(status: i32) -> FitsError {
    translate_op(status, "")
}

/// [`translate`] with operation context folded into the diagnostic text.
pub(crate) fn translate_op(status: i32, op: &str) -> FitsError {
    let d = detail(status, op);
    match status {
        codes::FILE_NOT_OPENED | codes::READ_ERROR if op.starts_with("open") => {
            FitsError::OpenFailed(d)
        }
        codes::FILE_NOT_OPENED => FitsError::OpenFailed(d),
        codes::BAD_FILEPTR => FitsError::HandleClosed(d),
        codes::BAD_HDU_NUM => FitsError::InvalidHduIndex(d),
        codes::KEY_NO_EXIST | codes::KEY_OUT_BOUNDS => FitsError::KeyNotFound(d),
        codes::NOT_IMAGE => FitsError::NotAnImageHdu(d),
        codes::BAD_DIMEN => FitsError::UnsupportedDimensionality(d),
        codes::END_OF_FILE
        | codes::READ_ERROR
        | codes::ARRAY_TOO_BIG
        | codes::BAD_ELEM_NUM
        | codes::BAD_PIX_NUM
        | codes::BAD_DATATYPE
        | codes::NUM_OVERFLOW => FitsError::ReadFailed(d),
        _ => FitsError::Format(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_kinds() {
        assert!(matches!(translate(104), FitsError::OpenFailed(_)));
        assert!(matches!(translate(114), FitsError::HandleClosed(_)));
        assert!(matches!(translate(301), FitsError::InvalidHduIndex(_)));
        assert!(matches!(translate(202), FitsError::KeyNotFound(_)));
        assert!(matches!(translate(203), FitsError::KeyNotFound(_)));
        assert!(matches!(translate(233), FitsError::NotAnImageHdu(_)));
        assert!(matches!(
            translate(320),
            FitsError::UnsupportedDimensionality(_)
        ));
        assert!(matches!(translate(321), FitsError::ReadFailed(_)));
        assert!(matches!(translate(412), FitsError::ReadFailed(_)));
    }

    #[test]
    fn unknown_codes_become_format() {
        for status in [-1, 0, 999, 5000, i32::MAX] {
            let e = translate(status);
            assert!(matches!(e, FitsError::Format(_)), "{status} -> {e}");
            assert_eq!(e.status(), status);
        }
    }

    #[test]
    fn translation_attaches_engine_text() {
        let e = translate(233);
        assert_eq!(e.detail().text, "the current HDU is not an IMAGE extension");
    }

    #[test]
    fn unknown_code_text_is_empty() {
        assert!(translate(9999).detail().text.is_empty());
    }

    #[test]
    fn context_is_prefixed() {
        let e = translate_op(203, "read key 12");
        assert_eq!(
            e.detail().text,
            "read key 12: keyword record number is out of bounds"
        );
    }

    #[test]
    fn context_alone_when_engine_text_missing() {
        let e = translate_op(9999, "read key 12");
        assert_eq!(e.detail().text, "read key 12");
    }

    #[test]
    fn read_error_during_open_is_open_failed() {
        assert!(matches!(
            translate_op(108, "open /tmp/x.fits"),
            FitsError::OpenFailed(_)
        ));
        assert!(matches!(translate_op(108, "read pixels"), FitsError::ReadFailed(_)));
    }
}
