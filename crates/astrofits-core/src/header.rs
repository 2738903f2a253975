//! FITS header card parsing and serialization.

use core::str;

use crate::block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE, HEADER_PAD_BYTE};
use crate::error::{Error, Result};
use crate::value::{format_value, parse_value, Value};

/// A parsed header card (one 80-byte keyword record).
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The 8-byte keyword name, ASCII, left-justified, space-padded.
    pub keyword: [u8; 8],
    /// The parsed value, when the card carries a `= ` value indicator.
    pub value: Option<Value>,
    /// Comment text, or commentary-card content for COMMENT/HISTORY.
    pub comment: Option<String>,
}

impl Card {
    /// The keyword as a trimmed string.
    pub fn keyword_str(&self) -> &str {
        let end = self
            .keyword
            .iter()
            .rposition(|&b| b != b' ')
            .map(|i| i + 1)
            .unwrap_or(0);
        str::from_utf8(&self.keyword[..end]).unwrap_or("")
    }

    /// Whether this is the END card.
    pub fn is_end(&self) -> bool {
        &self.keyword == b"END     "
    }
}

/// Pad a keyword name to its 8-byte card form.
pub fn keyword(name: &str) -> [u8; 8] {
    let mut kw = [b' '; 8];
    let bytes = name.as_bytes();
    let len = bytes.len().min(8);
    kw[..len].copy_from_slice(&bytes[..len]);
    kw
}

/// COMMENT, HISTORY, and blank keywords never carry a value indicator;
/// bytes 8..80 are free-form text.
fn is_commentary(kw: &[u8; 8]) -> bool {
    kw == b"COMMENT " || kw == b"HISTORY " || kw == b"        "
}

/// Parse one 80-byte card image.
pub fn parse_card(card_bytes: &[u8; CARD_SIZE]) -> Result<Card> {
    let mut kw = [b' '; 8];
    kw.copy_from_slice(&card_bytes[..8]);

    for &b in &kw {
        match b {
            b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'-' | b'_' => {}
            _ => return Err(Error::InvalidKeyword),
        }
    }

    if &kw == b"END     " {
        return Ok(Card {
            keyword: kw,
            value: None,
            comment: None,
        });
    }

    if !is_commentary(&kw) && card_bytes[8] == b'=' && card_bytes[9] == b' ' {
        let field = &card_bytes[10..CARD_SIZE];
        match parse_value(field) {
            Some((value, comment)) => {
                return Ok(Card {
                    keyword: kw,
                    value: Some(value),
                    comment: comment.map(String::from),
                })
            }
            None => {
                // Blank value field; any "/ comment" remnant is kept.
                let text = str::from_utf8(field).map_err(|_| Error::InvalidHeader("card"))?;
                let comment = text
                    .split_once(" /")
                    .map(|(_, c)| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(String::from);
                return Ok(Card {
                    keyword: kw,
                    value: None,
                    comment,
                });
            }
        }
    }

    // Commentary card, or a keyword without a value indicator.
    let text = str::from_utf8(&card_bytes[8..CARD_SIZE])
        .map_err(|_| Error::InvalidHeader("card"))?
        .trim_end();
    Ok(Card {
        keyword: kw,
        value: None,
        comment: (!text.is_empty()).then(|| text.to_string()),
    })
}

/// Parse consecutive header blocks until the END card.
///
/// Only complete 2880-byte blocks are scanned; trailing bytes shorter than
/// a block are ignored, which tolerates files that omit final padding.
pub fn parse_header_blocks(data: &[u8]) -> Result<Vec<Card>> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }

    let mut cards = Vec::new();
    for block_idx in 0..data.len() / BLOCK_SIZE {
        for card_idx in 0..CARDS_PER_BLOCK {
            let start = block_idx * BLOCK_SIZE + card_idx * CARD_SIZE;
            let card_bytes: &[u8; CARD_SIZE] = data[start..start + CARD_SIZE]
                .try_into()
                .map_err(|_| Error::InvalidHeader("short card"))?;
            let card = parse_card(card_bytes)?;
            let done = card.is_end();
            cards.push(card);
            if done {
                return Ok(cards);
            }
        }
    }

    Err(Error::UnexpectedEof)
}

/// Byte length of the header (a multiple of the block size), found by
/// locating the END card.
pub fn header_byte_len(data: &[u8]) -> Result<usize> {
    if data.len() < BLOCK_SIZE {
        return Err(Error::UnexpectedEof);
    }

    for block_idx in 0..data.len() / BLOCK_SIZE {
        for card_idx in 0..CARDS_PER_BLOCK {
            let start = block_idx * BLOCK_SIZE + card_idx * CARD_SIZE;
            if &data[start..start + 8] == b"END     " {
                return Ok((block_idx + 1) * BLOCK_SIZE);
            }
        }
    }

    Err(Error::UnexpectedEof)
}

/// Serialize one card into its 80-byte image.
pub fn format_card(card: &Card) -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    buf[..8].copy_from_slice(&card.keyword);

    if let Some(ref value) = card.value {
        buf[8] = b'=';
        buf[9] = b' ';
        let mut field = format_value(value);
        if let Some(ref comment) = card.comment {
            append_comment(&mut field, comment);
        }
        buf[10..80].copy_from_slice(&field);
    } else if card.keyword != [b' '; 8] {
        if let Some(ref comment) = card.comment {
            let bytes = comment.as_bytes();
            let len = bytes.len().min(72);
            buf[8..8 + len].copy_from_slice(&bytes[..len]);
        }
    }

    buf
}

/// Append ` / comment` after the value content in a 70-byte field.
fn append_comment(field: &mut [u8; 70], comment: &str) {
    let content_end = if field[0] == b'\'' {
        // Scan past the closing quote, honoring doubled quotes.
        let mut i = 1;
        loop {
            if i >= 70 {
                break i;
            }
            if field[i] == b'\'' {
                if i + 1 < 70 && field[i + 1] == b'\'' {
                    i += 2;
                } else {
                    break i + 1;
                }
            } else {
                i += 1;
            }
        }
    } else {
        20
    };

    let sep = content_end + 1;
    if sep + 3 >= 70 {
        return;
    }
    field[sep] = b'/';
    field[sep + 1] = b' ';
    let start = sep + 2;
    let bytes = comment.as_bytes();
    let len = bytes.len().min(70 - start);
    field[start..start + len].copy_from_slice(&bytes[..len]);
}

/// Serialize cards into complete header blocks: END is appended and the
/// final block padded with spaces. The result length is a multiple of
/// [`BLOCK_SIZE`].
pub fn serialize_header(cards: &[Card]) -> Vec<u8> {
    let total_cards = cards.len() + 1;
    let total_bytes = total_cards.div_ceil(CARDS_PER_BLOCK) * BLOCK_SIZE;

    let mut buf = vec![HEADER_PAD_BYTE; total_bytes];
    for (i, card) in cards.iter().enumerate() {
        buf[i * CARD_SIZE..(i + 1) * CARD_SIZE].copy_from_slice(&format_card(card));
    }

    let end_offset = cards.len() * CARD_SIZE;
    buf[end_offset..end_offset + 3].copy_from_slice(b"END");
    buf
}
