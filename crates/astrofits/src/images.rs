//! Image parameters and the pixel read path.

use astrofits_core::error as codes;
use astrofits_core::pixels::{self, PixelData};

use crate::errors::Result;
use crate::file::FitsFile;
use crate::status::translate_op;

/// Highest image dimensionality this layer reads.
///
/// Files declaring more axes are rejected with `UnsupportedDimensionality`
/// rather than silently truncated; see DESIGN.md.
pub const MAX_AXES: usize = 3;

/// Per-pixel numeric representation, including the BZERO encoding quirks
/// the format uses for types it cannot store directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    /// BITPIX 8.
    UnsignedByte,
    /// BITPIX 8 with BZERO = -128.
    SignedByte,
    /// BITPIX 16.
    Short,
    /// BITPIX 16 with BZERO = 32768.
    UnsignedShort,
    /// BITPIX 32.
    Long,
    /// BITPIX 32 with BZERO = 2147483648.
    UnsignedLong,
    /// BITPIX 64.
    LongLong,
    /// BITPIX -32.
    Float,
    /// BITPIX -64.
    Double,
}

impl Bitpix {
    /// Determine the effective representation from the stored BITPIX and
    /// the BSCALE/BZERO calibration keywords.
    pub fn from_stored(bitpix: i64, bscale: f64, bzero: f64) -> Result<Self> {
        if bscale == 1.0 {
            match (bitpix, bzero) {
                (8, -128.0) => return Ok(Bitpix::SignedByte),
                (16, 32768.0) => return Ok(Bitpix::UnsignedShort),
                (32, 2147483648.0) => return Ok(Bitpix::UnsignedLong),
                _ => {}
            }
        }
        match bitpix {
            8 => Ok(Bitpix::UnsignedByte),
            16 => Ok(Bitpix::Short),
            32 => Ok(Bitpix::Long),
            64 => Ok(Bitpix::LongLong),
            -32 => Ok(Bitpix::Float),
            -64 => Ok(Bitpix::Double),
            other => Err(translate_op(
                codes::BAD_BITPIX,
                &format!("BITPIX {other}"),
            )),
        }
    }

    /// The BITPIX value as stored on disk.
    pub fn stored(self) -> i64 {
        match self {
            Bitpix::UnsignedByte | Bitpix::SignedByte => 8,
            Bitpix::Short | Bitpix::UnsignedShort => 16,
            Bitpix::Long | Bitpix::UnsignedLong => 32,
            Bitpix::LongLong => 64,
            Bitpix::Float => -32,
            Bitpix::Double => -64,
        }
    }
}

/// Geometry of the image under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParameters {
    /// Effective per-pixel representation.
    pub bitpix: Bitpix,
    /// Per-axis lengths; empty for a headerless-data primary (NAXIS = 0).
    pub axes: Vec<u64>,
}

impl ImageParameters {
    /// Number of axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

/// The window of pixels to read.
///
/// `None` fields take the format defaults: start of image, full per-axis
/// lengths, no null detection. Populated slices shorter than the axis
/// count are padded with coordinate 1 / count 1, mirroring the format's
/// convention that a "don't care" axis has size 1.
#[derive(Debug, Clone)]
pub struct PixelWindow<T> {
    /// 1-based starting coordinate per axis.
    pub first_pixel: Option<Vec<u64>>,
    /// Elements to read per axis.
    pub element_counts: Option<Vec<u64>>,
    /// Sentinel marking undefined pixels, compared after conversion.
    pub null_value: Option<T>,
}

impl<T> PixelWindow<T> {
    /// The whole image, no null detection.
    pub fn full() -> Self {
        PixelWindow {
            first_pixel: None,
            element_counts: None,
            null_value: None,
        }
    }
}

impl<T> Default for PixelWindow<T> {
    fn default() -> Self {
        Self::full()
    }
}

/// Decoded pixels in the representation the caller asked for.
///
/// Owned by the caller; this layer keeps no reference after returning.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<T> {
    /// Row-major values, first axis varying fastest.
    pub values: Vec<T>,
    /// Whether any value matched the requested null sentinel.
    pub any_null: bool,
}

/// Element types pixels can be decoded into.
///
/// The conversion is the decoder's job: the requested type governs the
/// buffer regardless of the file's native bit depth.
pub trait PixelValue: Copy + PartialEq {
    /// Convert a native-typed run into this representation.
    fn from_data(data: &PixelData) -> Vec<Self>;

    /// Whether `self` matches the null sentinel.
    fn matches_null(self, null: Self) -> bool {
        self == null
    }
}

macro_rules! impl_integer_pixels {
    ($t:ty) => {
        impl PixelValue for $t {
            fn from_data(data: &PixelData) -> Vec<Self> {
                match data {
                    PixelData::U8(v) => v.iter().map(|&x| x as $t).collect(),
                    PixelData::I16(v) => v.iter().map(|&x| x as $t).collect(),
                    PixelData::I32(v) => v.iter().map(|&x| x as $t).collect(),
                    PixelData::I64(v) => v.iter().map(|&x| x as $t).collect(),
                    PixelData::F32(v) => v.iter().map(|&x| libm::roundf(x) as $t).collect(),
                    PixelData::F64(v) => v.iter().map(|&x| libm::round(x) as $t).collect(),
                }
            }
        }
    };
}

impl_integer_pixels!(u8);
impl_integer_pixels!(i16);
impl_integer_pixels!(i32);
impl_integer_pixels!(i64);

impl PixelValue for f32 {
    fn from_data(data: &PixelData) -> Vec<Self> {
        match data {
            PixelData::U8(v) => v.iter().map(|&x| x as f32).collect(),
            PixelData::I16(v) => v.iter().map(|&x| x as f32).collect(),
            PixelData::I32(v) => v.iter().map(|&x| x as f32).collect(),
            PixelData::I64(v) => v.iter().map(|&x| x as f32).collect(),
            PixelData::F32(v) => v.clone(),
            PixelData::F64(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }

    fn matches_null(self, null: Self) -> bool {
        if null.is_nan() {
            self.is_nan()
        } else {
            self == null
        }
    }
}

impl PixelValue for f64 {
    fn from_data(data: &PixelData) -> Vec<Self> {
        match data {
            PixelData::U8(v) => v.iter().map(|&x| x as f64).collect(),
            PixelData::I16(v) => v.iter().map(|&x| x as f64).collect(),
            PixelData::I32(v) => v.iter().map(|&x| x as f64).collect(),
            PixelData::I64(v) => v.iter().map(|&x| x as f64).collect(),
            PixelData::F32(v) => v.iter().map(|&x| x as f64).collect(),
            PixelData::F64(v) => v.clone(),
        }
    }

    fn matches_null(self, null: Self) -> bool {
        if null.is_nan() {
            self.is_nan()
        } else {
            self == null
        }
    }
}

/// Flatten a window into a `(start, count)` linear run over the image.
///
/// All arithmetic is done in u64 and narrowed once at the end; overflow
/// fails instead of wrapping. Windows that do not describe one contiguous
/// run are rejected: prefix axes must be read fully from coordinate 1, at
/// most one axis may be partial, and later axes must have count 1.
fn resolve_window(
    naxes: &[usize],
    first: Option<&[u64]>,
    counts: Option<&[u64]>,
) -> Result<(usize, usize)> {
    let n = naxes.len();
    if n == 0 {
        return Ok((0, 0));
    }

    let too_many = first.is_some_and(|f| f.len() > n) || counts.is_some_and(|c| c.len() > n);
    if too_many {
        return Err(translate_op(
            codes::BAD_ELEM_NUM,
            &format!("window has more axes than the image ({n})"),
        ));
    }

    let mut firsts = Vec::with_capacity(n);
    let mut wanted = Vec::with_capacity(n);
    for i in 0..n {
        let f = first.and_then(|v| v.get(i).copied()).unwrap_or(1);
        let c = match counts {
            Some(v) => v.get(i).copied().unwrap_or(1),
            None => naxes[i] as u64,
        };
        if f < 1 {
            return Err(translate_op(
                codes::BAD_ELEM_NUM,
                &format!("axis {} starts at {f}, coordinates are 1-based", i + 1),
            ));
        }
        let end = (f - 1).checked_add(c).ok_or_else(overflow)?;
        if end > naxes[i] as u64 {
            return Err(translate_op(
                codes::BAD_PIX_NUM,
                &format!("axis {} window [{f}, {end}] exceeds length {}", i + 1, naxes[i]),
            ));
        }
        firsts.push(f);
        wanted.push(c);
    }

    let mut partial_seen = false;
    for i in 0..n {
        let full_axis = firsts[i] == 1 && wanted[i] == naxes[i] as u64;
        if partial_seen {
            if wanted[i] != 1 {
                return Err(translate_op(
                    codes::BAD_PIX_NUM,
                    "window is not a contiguous pixel run",
                ));
            }
        } else if !full_axis {
            partial_seen = true;
        }
    }

    let mut start: u64 = 0;
    let mut stride: u64 = 1;
    let mut total: u64 = 1;
    for i in 0..n {
        let offset = (firsts[i] - 1).checked_mul(stride).ok_or_else(overflow)?;
        start = start.checked_add(offset).ok_or_else(overflow)?;
        stride = stride.checked_mul(naxes[i] as u64).ok_or_else(overflow)?;
        total = total.checked_mul(wanted[i]).ok_or_else(overflow)?;
    }

    let start = usize::try_from(start).map_err(|_| overflow())?;
    let total = usize::try_from(total).map_err(|_| overflow())?;
    Ok((start, total))
}

fn overflow() -> crate::errors::FitsError {
    translate_op(codes::NUM_OVERFLOW, "pixel window arithmetic")
}

impl FitsFile {
    /// Read bit depth, axis count, and per-axis lengths for the image HDU
    /// under the cursor.
    ///
    /// Fails with `NotAnImageHdu` on table HDUs and with
    /// `UnsupportedDimensionality` when the file declares more than
    /// [`MAX_AXES`] axes. Never moves the cursor.
    pub fn image_parameters(&self) -> Result<ImageParameters> {
        let hdu = self.cursor_hdu()?;
        let (bitpix, naxes) = hdu
            .info
            .image_shape()
            .map_err(|e| translate_op(e.status(), "image parameters"))?;
        if naxes.len() > MAX_AXES {
            return Err(translate_op(
                codes::BAD_DIMEN,
                &format!("image has {} axes, at most {MAX_AXES} supported", naxes.len()),
            ));
        }

        let (bscale, bzero) = pixels::scale_of(&hdu.cards);
        Ok(ImageParameters {
            bitpix: Bitpix::from_stored(bitpix, bscale, bzero)?,
            axes: naxes.iter().map(|&d| d as u64).collect(),
        })
    }

    /// Decode pixels from the image under the cursor into the requested
    /// element type.
    ///
    /// The buffer holds exactly the product of the window's per-axis
    /// counts, all-or-nothing. `any_null` is `true` when a decoded value
    /// matched the window's null sentinel; without a sentinel it is always
    /// `false`.
    pub fn read_pixels<T: PixelValue>(&self, window: &PixelWindow<T>) -> Result<PixelBuffer<T>> {
        let volume = self.volume()?;
        let hdu = self.cursor_hdu()?;
        let (_, naxes) = hdu
            .info
            .image_shape()
            .map_err(|e| translate_op(e.status(), "read pixels"))?;
        if naxes.len() > MAX_AXES {
            return Err(translate_op(
                codes::BAD_DIMEN,
                &format!("image has {} axes, at most {MAX_AXES} supported", naxes.len()),
            ));
        }

        let (start, count) = resolve_window(
            naxes,
            window.first_pixel.as_deref(),
            window.element_counts.as_deref(),
        )?;

        let data = pixels::read_pixel_run(volume.bytes(), hdu, start, count)
            .map_err(|e| translate_op(e.status(), "read pixels"))?;

        let values = T::from_data(&data);
        let any_null = match window.null_value {
            Some(null) => values.iter().any(|v| v.matches_null(null)),
            None => false,
        };
        Ok(PixelBuffer { values, any_null })
    }

    /// Read the whole image as calibrated physical values.
    ///
    /// Applies `physical = BZERO + BSCALE * raw`; integer pixels equal to
    /// the BLANK keyword value and floating NaNs become NaN with
    /// `any_null` set.
    pub fn read_pixels_physical(&self) -> Result<PixelBuffer<f64>> {
        let volume = self.volume()?;
        let hdu = self.cursor_hdu()?;
        let (_, naxes) = hdu
            .info
            .image_shape()
            .map_err(|e| translate_op(e.status(), "read pixels"))?;
        if naxes.len() > MAX_AXES {
            return Err(translate_op(
                codes::BAD_DIMEN,
                &format!("image has {} axes, at most {MAX_AXES} supported", naxes.len()),
            ));
        }

        let (start, count) = resolve_window(naxes, None, None)?;
        let data = pixels::read_pixel_run(volume.bytes(), hdu, start, count)
            .map_err(|e| translate_op(e.status(), "read pixels"))?;

        let (bscale, bzero) = pixels::scale_of(&hdu.cards);
        let blank = pixels::blank_of(&hdu.cards);
        let mut any_null = false;

        let calibrate = |raw: f64| bzero + bscale * raw;
        let values: Vec<f64> = match &data {
            PixelData::U8(v) => v
                .iter()
                .map(|&p| {
                    if blank == Some(p as i64) {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p as f64)
                    }
                })
                .collect(),
            PixelData::I16(v) => v
                .iter()
                .map(|&p| {
                    if blank == Some(p as i64) {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p as f64)
                    }
                })
                .collect(),
            PixelData::I32(v) => v
                .iter()
                .map(|&p| {
                    if blank == Some(p as i64) {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p as f64)
                    }
                })
                .collect(),
            PixelData::I64(v) => v
                .iter()
                .map(|&p| {
                    if blank == Some(p) {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p as f64)
                    }
                })
                .collect(),
            PixelData::F32(v) => v
                .iter()
                .map(|&p| {
                    if p.is_nan() {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p as f64)
                    }
                })
                .collect(),
            PixelData::F64(v) => v
                .iter()
                .map(|&p| {
                    if p.is_nan() {
                        any_null = true;
                        f64::NAN
                    } else {
                        calibrate(p)
                    }
                })
                .collect(),
        };

        Ok(PixelBuffer { values, any_null })
    }
}
