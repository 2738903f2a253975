//! Header enumeration for the HDU under the cursor.

use astrofits_core::error as codes;

use crate::errors::Result;
use crate::file::FitsFile;
use crate::status::translate_op;

/// How many keywords exist in the current header and how many more would
/// fit in its already-allocated blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    /// Keywords present, END excluded.
    pub existing: usize,
    /// Free card slots before another block would be needed.
    pub remaining: usize,
}

/// One keyword record, in on-disk physical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderKey {
    /// Keyword name, trimmed. At most 8 characters.
    pub name: String,
    /// Value text as it appears in the card (strings keep their quotes);
    /// empty when the card carries no value.
    pub value: String,
    /// Comment text; empty when absent.
    pub comment: String,
    /// 1-based position within the header.
    pub ordinal: usize,
}

impl FitsFile {
    /// Count the keywords of the current HDU and the space left in its
    /// header blocks.
    pub fn header_space(&self) -> Result<KeySpace> {
        let hdu = self.cursor_hdu()?;
        Ok(KeySpace {
            existing: hdu.card_count(),
            remaining: hdu.card_space_left(),
        })
    }

    /// Read the keyword at 1-based `ordinal` from the current HDU.
    ///
    /// Enumeration order is the physical card order. Repeated calls with
    /// the same ordinal return the same record.
    pub fn read_key(&self, ordinal: usize) -> Result<HeaderKey> {
        let hdu = self.cursor_hdu()?;
        let existing = hdu.card_count();
        if ordinal < 1 || ordinal > existing {
            return Err(translate_op(
                codes::KEY_OUT_BOUNDS,
                &format!("read key {ordinal} of {existing}"),
            ));
        }

        let card = &hdu.cards[ordinal - 1];
        Ok(HeaderKey {
            name: card.keyword_str().to_string(),
            value: card
                .value
                .as_ref()
                .map(|v| v.display_text())
                .unwrap_or_default(),
            comment: card.comment.clone().unwrap_or_default(),
            ordinal,
        })
    }

    /// Find a keyword by name in the current HDU, case-insensitively.
    ///
    /// Scans ordinals in physical order and returns the first match, or
    /// `KeyNotFound`. Convenience built atop [`FitsFile::read_key`]'s
    /// ordering contract.
    pub fn read_key_by_name(&self, name: &str) -> Result<HeaderKey> {
        let hdu = self.cursor_hdu()?;
        for (i, card) in hdu.cards.iter().enumerate() {
            if card.is_end() {
                break;
            }
            if card.keyword_str().eq_ignore_ascii_case(name) {
                return self.read_key(i + 1);
            }
        }
        Err(translate_op(
            codes::KEY_NO_EXIST,
            &format!("read key '{name}'"),
        ))
    }
}
