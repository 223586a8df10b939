//! Holds all the tools for decoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Automatic Decoding
//!
//! Just call [`decode_png`] with the full PNG bytes and you get a
//! [`DecodedImage`](crate::DecodedImage) back, or the first thing that was
//! wrong with the data.
//!
//! ## How The Decoding Works
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! There's four "critical" chunk types this decoder acts on:
//! * **Header** - This has all the important information about the image's
//!   dimensions, pixel format, and if the image is interlaced or not. Using
//!   this information we know how much temporary space is required for
//!   decompression, and how much final space is required after unfiltering.
//! * **Palette** - If an image uses indexed color it will have a palette of
//!   what index values map to what `RGB8` values.
//! * **Image Data** - One or more chunks of compressed data. All of the
//!   compressed data forms a single zlib data stream. All of the image data
//!   chunks must appear one after the other.
//! * **End** - The last chunk, lets you know you had the full PNG and your data
//!   wasn't truncated accidentally.
//!
//! Of the "ancillary" chunks only the transparency chunk is kept, everything
//! else is skipped.
//!
//! When storing the PNG, the raw pixel values are first "filtered" (to try and
//! make them more compression-friendly), and then compressed into a zlib data
//! stream. Decoding reverses that: decompress, then unfilter each line top to
//! bottom, then (for interlaced images) scatter each of the seven reduced
//! images into the final pixel positions.
//!
//! ## Strictness
//!
//! Unlike a viewer, which might want to show whatever it can, this decoder is
//! used to check that an image is intact. So every chunk CRC is checked, the
//! zlib Adler-32 is checked, and the chunk ordering rules for the critical
//! chunks are enforced.

use core::fmt::{Debug, Write};

mod crc32;
pub(crate) use crc32::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod trns;
pub use trns::*;

mod adam7;
pub(crate) use adam7::*;

mod unfilter;
pub use unfilter::*;

mod decoder;
pub use decoder::*;


/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}
