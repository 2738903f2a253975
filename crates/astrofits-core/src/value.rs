//! Header value parsing and formatting.

use core::str;

/// A FITS header value parsed from the 70-byte value field of a card.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Logical value (`T` or `F`).
    Logical(bool),
    /// Integer value.
    Integer(i64),
    /// Floating-point value (FITS `D` exponents accepted).
    Float(f64),
    /// Character string (content between single quotes, trailing pad
    /// spaces stripped).
    String(String),
    /// Value syntax this engine does not interpret (e.g. complex pairs),
    /// preserved verbatim so enumeration never loses header content.
    Text(String),
}

impl Value {
    /// Render the value the way it would appear in a card image, without
    /// surrounding whitespace. Strings keep their quotes.
    pub fn display_text(&self) -> String {
        match self {
            Value::Logical(true) => "T".to_string(),
            Value::Logical(false) => "F".to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(x) => format_float(*x),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Text(raw) => raw.clone(),
        }
    }
}

/// Format a float the FITS-conventional way: always with a decimal point
/// or exponent so it cannot be mistaken for an integer.
pub fn format_float(x: f64) -> String {
    if x == x.trunc() && x.abs() < 1e15 {
        format!("{x:.1}")
    } else {
        let s = format!("{x}");
        if s.contains('.') || s.contains('e') || s.contains('E') {
            s
        } else {
            format!("{s}.0")
        }
    }
}

/// Split a non-string value field at the ` /` comment separator.
///
/// The standard uses ` / ` but files written by IDL and friends omit the
/// trailing space; both cfitsio and fitsrs accept ` /`, so we do too.
fn split_comment(field: &[u8]) -> (&[u8], Option<&str>) {
    let len = field.len();
    let mut i = 0;
    while i + 1 < len {
        if field[i] == b' ' && field[i + 1] == b'/' {
            let mut comment_start = i + 2;
            if comment_start < len && field[comment_start] == b' ' {
                comment_start += 1;
            }
            let comment = str::from_utf8(&field[comment_start..])
                .ok()
                .map(|s| s.trim_end());
            return (&field[..i], comment.filter(|s| !s.is_empty()));
        }
        i += 1;
    }
    (field, None)
}

/// Parse a quoted string value. Doubled quotes escape a literal quote; an
/// unterminated string is accepted as-is (real files contain them).
fn parse_string(field: &[u8]) -> Option<(Value, Option<&str>)> {
    if field.first() != Some(&b'\'') {
        return None;
    }

    let mut content = String::new();
    let mut i = 1;
    let len = field.len();
    loop {
        if i >= len {
            break;
        }
        if field[i] == b'\'' {
            if i + 1 < len && field[i + 1] == b'\'' {
                content.push('\'');
                i += 2;
            } else {
                i += 1;
                break;
            }
        } else {
            content.push(field[i] as char);
            i += 1;
        }
    }

    let (_, comment) = split_comment(&field[i..]);
    Some((Value::String(content.trim_end().to_string()), comment))
}

/// Parse a float string, accepting FITS `D` exponent notation.
fn parse_float_text(s: &str) -> Option<f64> {
    let normalized = s.replace(['D', 'd'], "E");
    normalized.parse::<f64>().ok()
}

/// Parse the 70-byte value portion of a card (bytes 10..80).
///
/// Returns the parsed [`Value`] and an optional comment, or `None` when
/// the field holds no value at all. Unrecognized but non-empty syntax
/// becomes [`Value::Text`].
pub fn parse_value(field: &[u8]) -> Option<(Value, Option<&str>)> {
    if field.is_empty() {
        return None;
    }

    if field[0] == b'\'' {
        return parse_string(field);
    }

    let (val_part, comment) = split_comment(field);
    let val_text = str::from_utf8(val_part).ok()?.trim();
    if val_text.is_empty() {
        return None;
    }

    if val_text == "T" {
        return Some((Value::Logical(true), comment));
    }
    if val_text == "F" {
        return Some((Value::Logical(false), comment));
    }

    // Integers carry no decimal point or exponent marker.
    if !val_text.contains(['.', 'E', 'e', 'D', 'd']) {
        if let Ok(n) = val_text.parse::<i64>() {
            return Some((Value::Integer(n), comment));
        }
    }

    if let Some(x) = parse_float_text(val_text) {
        return Some((Value::Float(x), comment));
    }

    Some((Value::Text(val_text.to_string()), comment))
}

/// Serialize a [`Value`] into a 70-byte field for bytes 10..80 of a card.
///
/// Numeric and logical values are right-justified in the first 20 bytes
/// (card columns 11-30); strings start at byte 0 with a quote.
pub fn format_value(value: &Value) -> [u8; 70] {
    let mut buf = [b' '; 70];
    match value {
        Value::Logical(b) => {
            buf[19] = if *b { b'T' } else { b'F' };
        }
        Value::Integer(n) => {
            right_justify(n.to_string().as_bytes(), &mut buf[..20]);
        }
        Value::Float(x) => {
            right_justify(format_float(*x).as_bytes(), &mut buf[..20]);
        }
        Value::String(s) => {
            write_quoted(s, &mut buf);
        }
        Value::Text(raw) => {
            let bytes = raw.as_bytes();
            let len = bytes.len().min(70);
            buf[..len].copy_from_slice(&bytes[..len]);
        }
    }
    buf
}

fn right_justify(src: &[u8], dest: &mut [u8]) {
    let len = src.len().min(dest.len());
    let start = dest.len() - len;
    dest[start..].copy_from_slice(&src[..len]);
}

/// Write a quoted string value: opening quote at byte 0, content padded to
/// the FITS minimum of 8 characters, quotes doubled inside.
fn write_quoted(s: &str, buf: &mut [u8; 70]) {
    let mut pos = 0;
    buf[pos] = b'\'';
    pos += 1;
    let mut content_len = 0;
    for &b in s.as_bytes() {
        if pos + 2 >= buf.len() {
            break;
        }
        if b == b'\'' {
            buf[pos] = b'\'';
            buf[pos + 1] = b'\'';
            pos += 2;
        } else {
            buf[pos] = b;
            pos += 1;
        }
        content_len += 1;
    }
    while content_len < 8 && pos + 1 < buf.len() {
        buf[pos] = b' ';
        pos += 1;
        content_len += 1;
    }
    if pos < buf.len() {
        buf[pos] = b'\'';
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(s: &str) -> Vec<u8> {
        let mut buf = vec![b' '; 70];
        let bytes = s.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        buf
    }

    #[test]
    fn parse_logical_true() {
        let buf = field("                   T");
        let (v, c) = parse_value(&buf).unwrap();
        assert_eq!(v, Value::Logical(true));
        assert!(c.is_none());
    }

    #[test]
    fn parse_logical_false_with_comment() {
        let buf = field("                   F / flag off");
        let (v, c) = parse_value(&buf).unwrap();
        assert_eq!(v, Value::Logical(false));
        assert_eq!(c, Some("flag off"));
    }

    #[test]
    fn parse_integer() {
        let (v, _) = parse_value(&field("                  16")).unwrap();
        assert_eq!(v, Value::Integer(16));
        let (v, _) = parse_value(&field("                 -32")).unwrap();
        assert_eq!(v, Value::Integer(-32));
    }

    #[test]
    fn parse_float_plain_and_d_exponent() {
        let (v, _) = parse_value(&field("             32768.0")).unwrap();
        assert_eq!(v, Value::Float(32768.0));
        let (v, _) = parse_value(&field("           1.5D3")).unwrap();
        assert_eq!(v, Value::Float(1500.0));
    }

    #[test]
    fn parse_string_trims_padding() {
        let buf = field("'Hubble  '           / telescope");
        let (v, c) = parse_value(&buf).unwrap();
        assert_eq!(v, Value::String("Hubble".to_string()));
        assert_eq!(c, Some("telescope"));
    }

    #[test]
    fn parse_string_doubled_quote() {
        let (v, _) = parse_value(&field("'O''Neill'")).unwrap();
        assert_eq!(v, Value::String("O'Neill".to_string()));
    }

    #[test]
    fn parse_comment_without_trailing_space() {
        // IDL style: "value /comment"
        let buf = field("                 -32 /No. of bits");
        let (v, c) = parse_value(&buf).unwrap();
        assert_eq!(v, Value::Integer(-32));
        assert_eq!(c, Some("No. of bits"));
    }

    #[test]
    fn parse_unrecognized_becomes_text() {
        let (v, _) = parse_value(&field("(1, 2)")).unwrap();
        assert_eq!(v, Value::Text("(1, 2)".to_string()));
    }

    #[test]
    fn parse_empty_field_is_none() {
        assert!(parse_value(&field("")).is_none());
        assert!(parse_value(&[]).is_none());
    }

    #[test]
    fn display_text_forms() {
        assert_eq!(Value::Logical(true).display_text(), "T");
        assert_eq!(Value::Integer(-7).display_text(), "-7");
        assert_eq!(Value::Float(2.0).display_text(), "2.0");
        assert_eq!(Value::String("NGC 1234".into()).display_text(), "'NGC 1234'");
        assert_eq!(Value::Text("(1, 2)".into()).display_text(), "(1, 2)");
    }

    #[test]
    fn format_value_round_trips() {
        for v in [
            Value::Logical(false),
            Value::Integer(42),
            Value::Float(-1.25),
            Value::String("SCI".into()),
        ] {
            let formatted = format_value(&v);
            let (parsed, _) = parse_value(&formatted).unwrap();
            assert_eq!(parsed, v);
        }
    }

    #[test]
    fn format_logical_in_column_thirty() {
        let buf = format_value(&Value::Logical(true));
        assert_eq!(buf[19], b'T');
    }

    #[test]
    fn format_string_pads_to_eight() {
        let buf = format_value(&Value::String("SCI".into()));
        // 'SCI     ' — content padded to 8 chars inside the quotes.
        assert_eq!(&buf[..10], b"'SCI     '");
    }

    #[test]
    fn format_float_never_looks_integral() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.5), "0.5");
        assert!(format_float(1e120).contains('e') || format_float(1e120).contains('.'));
    }
}
