//! HDU enumeration over a FITS byte stream.

use std::path::Path;

use crate::block::{padded_byte_len, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::header::{header_byte_len, parse_header_blocks, Card};
use crate::value::Value;

/// The kind and shape of data in a single HDU.
#[derive(Debug, Clone, PartialEq)]
pub enum HduInfo {
    /// Primary HDU; `naxes` is empty when NAXIS = 0.
    Primary {
        /// BITPIX value (8, 16, 32, 64, -32, -64).
        bitpix: i64,
        /// Axis lengths (NAXIS1, NAXIS2, ...).
        naxes: Vec<usize>,
    },
    /// Image extension (XTENSION = 'IMAGE').
    Image { bitpix: i64, naxes: Vec<usize> },
    /// ASCII table extension (XTENSION = 'TABLE').
    AsciiTable {
        /// Row width in bytes.
        row_width: usize,
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        fields: usize,
    },
    /// Binary table extension (XTENSION = 'BINTABLE'), including
    /// tile-compressed images, which are structurally binary tables.
    BinaryTable {
        row_width: usize,
        rows: usize,
        /// Variable-length heap size in bytes.
        heap: usize,
        fields: usize,
    },
}

impl HduInfo {
    /// Bit depth and axis lengths, or `NotImage` for table HDUs.
    pub fn image_shape(&self) -> Result<(i64, &[usize])> {
        match self {
            HduInfo::Primary { bitpix, naxes } | HduInfo::Image { bitpix, naxes } => {
                Ok((*bitpix, naxes))
            }
            _ => Err(Error::NotImage),
        }
    }
}

/// One Header Data Unit located within a FITS byte stream.
#[derive(Debug, Clone)]
pub struct Hdu {
    /// Parsed kind and shape.
    pub info: HduInfo,
    /// Byte offset of the header within the stream.
    pub header_start: usize,
    /// Byte offset of the data segment.
    pub data_start: usize,
    /// Unpadded data segment length in bytes.
    pub data_len: usize,
    /// All header cards, END included.
    pub cards: Vec<Card>,
}

impl Hdu {
    /// Header length in bytes (always a whole number of blocks).
    pub fn header_len(&self) -> usize {
        self.data_start - self.header_start
    }

    /// Number of cards before END.
    pub fn card_count(&self) -> usize {
        self.cards.iter().take_while(|c| !c.is_end()).count()
    }

    /// Free card slots remaining in the allocated header blocks.
    pub fn card_space_left(&self) -> usize {
        let capacity = self.header_len() / crate::block::CARD_SIZE;
        capacity.saturating_sub(self.card_count() + 1)
    }
}

fn integer_of(cards: &[Card], kw: &str) -> Option<i64> {
    cards.iter().find_map(|c| {
        if c.keyword_str() == kw {
            match &c.value {
                Some(Value::Integer(n)) => Some(*n),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn string_of(cards: &[Card], kw: &str) -> Option<String> {
    cards.iter().find_map(|c| {
        if c.keyword_str() == kw {
            match &c.value {
                Some(Value::String(s)) => Some(s.trim().to_string()),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn logical_of(cards: &[Card], kw: &str) -> Option<bool> {
    cards.iter().find_map(|c| {
        if c.keyword_str() == kw {
            match &c.value {
                Some(Value::Logical(b)) => Some(*b),
                _ => None,
            }
        } else {
            None
        }
    })
}

fn required_naxes(cards: &[Card]) -> Result<Vec<usize>> {
    let naxis = integer_of(cards, "NAXIS").ok_or(Error::MissingKeyword("NAXIS"))?;
    if !(0..=999).contains(&naxis) {
        return Err(Error::InvalidHeader("NAXIS"));
    }
    let mut naxes = Vec::with_capacity(naxis as usize);
    for i in 1..=naxis {
        let kw = format!("NAXIS{i}");
        let dim = integer_of(cards, &kw).ok_or(Error::MissingKeyword("NAXISn"))?;
        if dim < 0 {
            return Err(Error::InvalidHeader("NAXISn"));
        }
        naxes.push(dim as usize);
    }
    Ok(naxes)
}

fn parse_hdu_info(cards: &[Card], is_primary: bool) -> Result<HduInfo> {
    if is_primary {
        let bitpix = integer_of(cards, "BITPIX").ok_or(Error::MissingKeyword("BITPIX"))?;
        let naxes = required_naxes(cards)?;
        // Random-groups layouts would mis-size every following HDU if read
        // as a plain image; refuse them outright.
        if naxes.first() == Some(&0) && logical_of(cards, "GROUPS") == Some(true) {
            return Err(Error::UnsupportedExtension("GROUPS"));
        }
        return Ok(HduInfo::Primary { bitpix, naxes });
    }

    let xtension = string_of(cards, "XTENSION").ok_or(Error::MissingKeyword("XTENSION"))?;
    match xtension.as_str() {
        "IMAGE" => {
            let bitpix = integer_of(cards, "BITPIX").ok_or(Error::MissingKeyword("BITPIX"))?;
            let naxes = required_naxes(cards)?;
            Ok(HduInfo::Image { bitpix, naxes })
        }
        "TABLE" => Ok(HduInfo::AsciiTable {
            row_width: integer_of(cards, "NAXIS1").ok_or(Error::MissingKeyword("NAXIS1"))? as usize,
            rows: integer_of(cards, "NAXIS2").ok_or(Error::MissingKeyword("NAXIS2"))? as usize,
            fields: integer_of(cards, "TFIELDS").ok_or(Error::MissingKeyword("TFIELDS"))? as usize,
        }),
        "BINTABLE" | "A3DTABLE" => Ok(HduInfo::BinaryTable {
            row_width: integer_of(cards, "NAXIS1").ok_or(Error::MissingKeyword("NAXIS1"))? as usize,
            rows: integer_of(cards, "NAXIS2").ok_or(Error::MissingKeyword("NAXIS2"))? as usize,
            heap: integer_of(cards, "PCOUNT").unwrap_or(0) as usize,
            fields: integer_of(cards, "TFIELDS").ok_or(Error::MissingKeyword("TFIELDS"))? as usize,
        }),
        _ => Err(Error::UnsupportedExtension("unknown XTENSION")),
    }
}

fn data_byte_len(cards: &[Card], is_primary: bool) -> Result<usize> {
    let bitpix = integer_of(cards, "BITPIX").ok_or(Error::MissingKeyword("BITPIX"))?;
    let naxes = required_naxes(cards)?;
    if naxes.is_empty() {
        return Ok(0);
    }

    let bytes_per_value = (bitpix.unsigned_abs() as usize) / 8;
    let total_values: usize = naxes
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(Error::SizeOverflow)?;

    let pcount = if is_primary {
        0
    } else {
        integer_of(cards, "PCOUNT").unwrap_or(0) as usize
    };
    let gcount = if is_primary {
        1
    } else {
        integer_of(cards, "GCOUNT").unwrap_or(1).max(1) as usize
    };

    // Nbytes = gcount * (pcount + product(naxes) * bytes_per_value)
    total_values
        .checked_mul(bytes_per_value)
        .and_then(|b| b.checked_add(pcount))
        .and_then(|b| b.checked_mul(gcount))
        .ok_or(Error::SizeOverflow)
}

/// Scan a complete FITS byte stream into its HDUs.
///
/// The first HDU must be a SIMPLE primary. After at least one HDU has been
/// read, trailing garbage that fails to parse ends the scan instead of
/// failing it; real archives carry such tails.
pub fn scan_hdus(data: &[u8]) -> Result<Vec<Hdu>> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }
    if &data[..8] != b"SIMPLE  " {
        return Err(Error::NotFits);
    }

    let mut hdus: Vec<Hdu> = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let remaining = &data[offset..];
        if remaining.len() < BLOCK_SIZE {
            break;
        }

        let parsed = header_byte_len(remaining).and_then(|header_len| {
            let cards = parse_header_blocks(&remaining[..header_len])?;
            let is_primary = hdus.is_empty();
            let info = parse_hdu_info(&cards, is_primary)?;
            let data_len = data_byte_len(&cards, is_primary)?;
            Ok((header_len, cards, info, data_len))
        });
        let (header_len, cards, info, data_len) = match parsed {
            Ok(p) => p,
            Err(_) if !hdus.is_empty() => break,
            Err(e) => return Err(e),
        };

        let data_start = offset + header_len;
        // All data bytes must be present; missing trailing block padding is
        // tolerated (HiPS tiles and similar omit it).
        if data_len > 0 && data_start + data_len > data.len() {
            return Err(Error::UnexpectedEof);
        }

        hdus.push(Hdu {
            info,
            header_start: offset,
            data_start,
            data_len,
            cards,
        });
        offset = data_start + padded_byte_len(data_len);
    }

    Ok(hdus)
}

/// An open FITS file: the raw bytes plus the scanned HDU index.
///
/// This is the engine's whole-file facade; it is created once per open and
/// never re-reads the underlying file.
#[derive(Debug)]
pub struct FitsVolume {
    bytes: Vec<u8>,
    hdus: Vec<Hdu>,
}

impl FitsVolume {
    /// Read and scan the file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Scan an in-memory FITS byte stream.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let hdus = scan_hdus(&bytes)?;
        Ok(FitsVolume { bytes, hdus })
    }

    /// Total number of HDUs.
    pub fn hdu_count(&self) -> usize {
        self.hdus.len()
    }

    /// The HDU at 0-based `index`.
    pub fn hdu(&self, index: usize) -> Option<&Hdu> {
        self.hdus.get(index)
    }

    /// The raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
