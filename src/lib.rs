#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A small PNG decoder meant to be linked into mobile test hosts.
//!
//! The decoding pipeline is:
//!
//! 1) [`PngRawChunkIter`](png::PngRawChunkIter) walks the chunks of an
//!    in-memory PNG, checking the signature, the framing, and every CRC.
//! 2) [`decode_png`] folds the chunks into a header, palette, transparency
//!    info, and one zlib stream, then inflates, unfilters, de-interlaces, and
//!    unpacks the pixels into a [`DecodedImage`].
//! 3) With the `std` feature, [`decode_png_file`] reads a path first, and with
//!    the `ffi` feature the [`ffi`] module exposes all of this over the C
//!    calling convention, reporting plain `i32` status codes.
//!
//! Decoding never shares state between calls, so independent buffers can be
//! decoded on independent threads with no coordination.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

mod limits;
pub use limits::*;

mod image;
pub use image::*;

pub mod png;
pub use png::{decode_png, decode_png_header, decode_png_with_limits};

#[cfg(feature = "std")]
mod file;
#[cfg(feature = "std")]
pub use file::*;

#[cfg(feature = "ffi")]
#[cfg_attr(docs_rs, doc(cfg(feature = "ffi")))]
pub mod ffi;
