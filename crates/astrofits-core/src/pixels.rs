//! Pixel-run decoding for image HDUs.
//!
//! The engine's public read primitive is deliberately linear: it decodes a
//! contiguous run of pixels, converting big-endian on-disk bytes into a
//! native-typed buffer matching the HDU's BITPIX. Windowed or strided
//! access is composed from runs by the layer above.

use bytemuck::pod_collect_to_vec;

use crate::error::{Error, Result};
use crate::hdu::{FitsVolume, Hdu};
use crate::header::Card;
use crate::value::Value;

/// Decoded pixels, typed by the HDU's BITPIX.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelData {
    /// Number of decoded elements.
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::I16(v) => v.len(),
            PixelData::I32(v) => v.len(),
            PixelData::I64(v) => v.len(),
            PixelData::F32(v) => v.len(),
            PixelData::F64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bytes per pixel for a BITPIX value, or `InvalidBitpix`.
pub fn bytes_per_pixel(bitpix: i64) -> Result<usize> {
    match bitpix {
        8 | 16 | 32 | 64 | -32 | -64 => Ok((bitpix.unsigned_abs() / 8) as usize),
        other => Err(Error::InvalidBitpix(other)),
    }
}

/// Decode a contiguous big-endian byte slice into native-typed pixels.
fn decode_run(raw: &[u8], bitpix: i64) -> Result<PixelData> {
    match bitpix {
        8 => Ok(PixelData::U8(raw.to_vec())),
        16 => {
            // Collect into an aligned Vec first, then swap in place.
            let mut pixels: Vec<i16> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = i16::from_be(*v);
            }
            Ok(PixelData::I16(pixels))
        }
        32 => {
            let mut pixels: Vec<i32> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = i32::from_be(*v);
            }
            Ok(PixelData::I32(pixels))
        }
        64 => {
            let mut pixels: Vec<i64> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = i64::from_be(*v);
            }
            Ok(PixelData::I64(pixels))
        }
        -32 => {
            let mut pixels: Vec<f32> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = f32::from_bits(u32::from_be(v.to_bits()));
            }
            Ok(PixelData::F32(pixels))
        }
        -64 => {
            let mut pixels: Vec<f64> = pod_collect_to_vec(raw);
            for v in &mut pixels {
                *v = f64::from_bits(u64::from_be(v.to_bits()));
            }
            Ok(PixelData::F64(pixels))
        }
        other => Err(Error::InvalidBitpix(other)),
    }
}

/// Decode the run `[start, start + count)` of 0-based linear pixel indices
/// from the given image HDU.
///
/// Fails with `NotImage` for table HDUs and `BadPixelRange` when the run
/// does not fit inside the image.
pub fn read_pixel_run(
    fits_bytes: &[u8],
    hdu: &Hdu,
    start: usize,
    count: usize,
) -> Result<PixelData> {
    let (bitpix, naxes) = hdu.info.image_shape()?;
    let bpp = bytes_per_pixel(bitpix)?;

    let total_pixels: usize = if naxes.is_empty() {
        0
    } else {
        naxes
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(Error::SizeOverflow)?
    };

    let end = start.checked_add(count).ok_or(Error::BadPixelRange)?;
    if end > total_pixels {
        return Err(Error::BadPixelRange);
    }
    if count == 0 {
        return decode_run(&[], bitpix);
    }

    let byte_start = hdu.data_start + start * bpp;
    let byte_end = byte_start + count * bpp;
    if byte_end > fits_bytes.len() {
        return Err(Error::UnexpectedEof);
    }

    decode_run(&fits_bytes[byte_start..byte_end], bitpix)
}

impl FitsVolume {
    /// Decode a linear pixel run from the HDU at 0-based `hdu_index`.
    pub fn read_pixel_run(&self, hdu_index: usize, start: usize, count: usize) -> Result<PixelData> {
        let hdu = self.hdu(hdu_index).ok_or(Error::BadHduIndex)?;
        read_pixel_run(self.bytes(), hdu, start, count)
    }
}

/// BSCALE and BZERO calibration factors, defaulting to `(1.0, 0.0)`.
pub fn scale_of(cards: &[Card]) -> (f64, f64) {
    (
        float_of(cards, "BSCALE").unwrap_or(1.0),
        float_of(cards, "BZERO").unwrap_or(0.0),
    )
}

/// The BLANK keyword value marking undefined integer pixels, if declared.
pub fn blank_of(cards: &[Card]) -> Option<i64> {
    cards.iter().find_map(|c| {
        if c.keyword_str() == "BLANK" {
            match &c.value {
                Some(Value::Integer(n)) => Some(*n),
                _ => None,
            }
        } else {
            None
        }
    })
}

/// Find a float-valued keyword, promoting integers to f64.
pub fn float_of(cards: &[Card], kw: &str) -> Option<f64> {
    cards.iter().find_map(|c| {
        if c.keyword_str() == kw {
            match &c.value {
                Some(Value::Float(x)) => Some(*x),
                Some(Value::Integer(n)) => Some(*n as f64),
                _ => None,
            }
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::{write_f32_be, write_f64_be, write_i16_be, write_i32_be, write_i64_be};
    use crate::hdu::scan_hdus;
    use crate::header::{keyword, serialize_header};

    fn card(kw: &str, value: Value) -> Card {
        Card {
            keyword: keyword(kw),
            value: Some(value),
            comment: None,
        }
    }

    fn image_stream(bitpix: i64, dims: &[usize], data: &[u8]) -> Vec<u8> {
        let mut cards = vec![
            card("SIMPLE", Value::Logical(true)),
            card("BITPIX", Value::Integer(bitpix)),
            card("NAXIS", Value::Integer(dims.len() as i64)),
        ];
        for (i, &d) in dims.iter().enumerate() {
            cards.push(card(&format!("NAXIS{}", i + 1), Value::Integer(d as i64)));
        }
        let mut out = serialize_header(&cards);
        let data_end = out.len() + data.len();
        out.extend_from_slice(data);
        out.resize(crate::block::padded_byte_len(data_end), 0u8);
        out
    }

    fn single_hdu(stream: &[u8]) -> Hdu {
        scan_hdus(stream).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn read_full_u8_run() {
        let stream = image_stream(8, &[4], &[0, 1, 127, 255]);
        let hdu = single_hdu(&stream);
        let data = read_pixel_run(&stream, &hdu, 0, 4).unwrap();
        assert_eq!(data, PixelData::U8(vec![0, 1, 127, 255]));
    }

    #[test]
    fn read_i16_run_swaps_endianness() {
        let values = [0i16, 1, -1, i16::MAX];
        let mut raw = vec![0u8; 8];
        for (i, &v) in values.iter().enumerate() {
            write_i16_be(&mut raw[i * 2..], v);
        }
        let stream = image_stream(16, &[4], &raw);
        let hdu = single_hdu(&stream);
        let data = read_pixel_run(&stream, &hdu, 0, 4).unwrap();
        assert_eq!(data, PixelData::I16(values.to_vec()));
    }

    #[test]
    fn read_i32_and_i64_runs() {
        let mut raw = vec![0u8; 8];
        write_i32_be(&mut raw[0..], -42);
        write_i32_be(&mut raw[4..], i32::MAX);
        let stream = image_stream(32, &[2], &raw);
        let hdu = single_hdu(&stream);
        assert_eq!(
            read_pixel_run(&stream, &hdu, 0, 2).unwrap(),
            PixelData::I32(vec![-42, i32::MAX])
        );

        let mut raw = vec![0u8; 16];
        write_i64_be(&mut raw[0..], i64::MIN);
        write_i64_be(&mut raw[8..], i64::MAX);
        let stream = image_stream(64, &[2], &raw);
        let hdu = single_hdu(&stream);
        assert_eq!(
            read_pixel_run(&stream, &hdu, 0, 2).unwrap(),
            PixelData::I64(vec![i64::MIN, i64::MAX])
        );
    }

    #[test]
    fn read_float_runs() {
        let mut raw = vec![0u8; 8];
        write_f32_be(&mut raw[0..], 1.5);
        write_f32_be(&mut raw[4..], -42.25);
        let stream = image_stream(-32, &[2], &raw);
        let hdu = single_hdu(&stream);
        assert_eq!(
            read_pixel_run(&stream, &hdu, 0, 2).unwrap(),
            PixelData::F32(vec![1.5, -42.25])
        );

        let mut raw = vec![0u8; 8];
        write_f64_be(&mut raw, core::f64::consts::PI);
        let stream = image_stream(-64, &[1], &raw);
        let hdu = single_hdu(&stream);
        assert_eq!(
            read_pixel_run(&stream, &hdu, 0, 1).unwrap(),
            PixelData::F64(vec![core::f64::consts::PI])
        );
    }

    #[test]
    fn read_partial_run_mid_image() {
        let pixels: Vec<u8> = (0..16).collect();
        let stream = image_stream(8, &[4, 4], &pixels);
        let hdu = single_hdu(&stream);
        let data = read_pixel_run(&stream, &hdu, 4, 4).unwrap();
        assert_eq!(data, PixelData::U8(vec![4, 5, 6, 7]));
    }

    #[test]
    fn run_past_end_fails() {
        let stream = image_stream(8, &[4], &[1, 2, 3, 4]);
        let hdu = single_hdu(&stream);
        assert!(matches!(
            read_pixel_run(&stream, &hdu, 2, 3),
            Err(Error::BadPixelRange)
        ));
        assert!(matches!(
            read_pixel_run(&stream, &hdu, usize::MAX, 2),
            Err(Error::BadPixelRange)
        ));
    }

    #[test]
    fn zero_count_yields_empty() {
        let stream = image_stream(16, &[4], &[0u8; 8]);
        let hdu = single_hdu(&stream);
        let data = read_pixel_run(&stream, &hdu, 0, 0).unwrap();
        assert!(data.is_empty());
        assert_eq!(data, PixelData::I16(Vec::new()));
    }

    #[test]
    fn bytes_per_pixel_table() {
        assert_eq!(bytes_per_pixel(8).unwrap(), 1);
        assert_eq!(bytes_per_pixel(16).unwrap(), 2);
        assert_eq!(bytes_per_pixel(-64).unwrap(), 8);
        assert!(matches!(bytes_per_pixel(7), Err(Error::InvalidBitpix(7))));
    }

    #[test]
    fn scale_and_blank_extraction() {
        let cards = vec![
            card("BSCALE", Value::Float(2.0)),
            card("BZERO", Value::Integer(32768)),
            card("BLANK", Value::Integer(-999)),
        ];
        assert_eq!(scale_of(&cards), (2.0, 32768.0));
        assert_eq!(blank_of(&cards), Some(-999));
        assert_eq!(scale_of(&[]), (1.0, 0.0));
        assert_eq!(blank_of(&[]), None);
    }

    #[test]
    fn volume_read_pixel_run() {
        let stream = image_stream(8, &[3], &[7, 8, 9]);
        let vol = FitsVolume::from_bytes(stream).unwrap();
        assert_eq!(
            vol.read_pixel_run(0, 1, 2).unwrap(),
            PixelData::U8(vec![8, 9])
        );
        assert!(vol.read_pixel_run(5, 0, 1).is_err());
    }
}
