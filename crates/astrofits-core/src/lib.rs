pub mod block;
pub mod endian;
pub mod error;
pub mod hdu;
pub mod header;
pub mod pixels;
pub mod value;

pub use block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE};
pub use error::{status_text, Error, Result};
pub use hdu::{FitsVolume, Hdu, HduInfo};
pub use pixels::PixelData;
