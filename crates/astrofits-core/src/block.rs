/// FITS logical record (block) size in bytes.
pub const BLOCK_SIZE: usize = 2880;

/// FITS header card (keyword record) size in bytes.
pub const CARD_SIZE: usize = 80;

/// Number of cards in a single header block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Padding byte for header blocks (ASCII space).
pub const HEADER_PAD_BYTE: u8 = 0x20;

/// Padding byte for data blocks (zero).
pub const DATA_PAD_BYTE: u8 = 0x00;

/// Returns the number of whole FITS blocks needed to hold `num_bytes` bytes.
///
/// Every segment of a FITS file occupies an integral number of 2880-byte
/// blocks: 0 bytes needs 0 blocks, 1 byte needs 1 block, 2881 bytes needs 2.
pub const fn blocks_needed(num_bytes: usize) -> usize {
    if num_bytes == 0 {
        return 0;
    }
    num_bytes.div_ceil(BLOCK_SIZE)
}

/// Returns `num_bytes` rounded up to a whole number of blocks.
pub const fn padded_byte_len(num_bytes: usize) -> usize {
    blocks_needed(num_bytes) * BLOCK_SIZE
}
