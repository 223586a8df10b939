//! The C calling convention boundary.
//!
//! Every function here reports an `i32` status: [`MPNG_OK`] (`1`) on success,
//! or the negative [`PngError::status`] of the failure. A panic never unwinds
//! across the boundary, it's caught and reported as [`MPNG_PANIC`].
//!
//! ## Buffer Ownership
//!
//! [`mpng_decode_from_memory`] and [`mpng_decode_from_file`] fill a
//! caller-provided [`MpngImage`]. On success the `pixels` buffer belongs to the
//! caller, who must pass the image to [`mpng_image_release`] exactly once. On
//! failure the image is zeroed and there's nothing to release.
//!
//! Releasing a zeroed image is a no-op. Releasing a *copy* of an image that was
//! already released, or reading `pixels` after the release, is undefined
//! behavior.

use core::{
  ffi::{c_char, c_void, CStr},
  ptr::{null_mut, slice_from_raw_parts_mut},
};
use std::{boxed::Box, panic::catch_unwind, panic::AssertUnwindSafe, path::Path};

use crate::{decode_png, decode_png_file, read_png_file, DecodedImage, PngError, PngResult};

/// Status of a successful call.
pub const MPNG_OK: i32 = 1;
/// Status when a panic was caught at the boundary.
pub const MPNG_PANIC: i32 = -50;

/// A decoded image handed across the boundary.
#[derive(Debug)]
#[repr(C)]
pub struct MpngImage {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// channels per pixel: 1 (grey), 2 (grey, alpha), 3 (RGB), or 4 (RGBA)
  pub channels: u32,
  /// bits per channel, 8 or 16 (16 bit samples are big-endian)
  pub bit_depth: u32,
  /// bytes per pixel
  pub bytes_per_pixel: u32,
  /// `len` bytes of row-major pixel data, owned by the caller until released
  pub pixels: *mut u8,
  /// length of `pixels` in bytes
  pub len: usize,
}
impl MpngImage {
  const fn zeroed() -> Self {
    Self { width: 0, height: 0, channels: 0, bit_depth: 0, bytes_per_pixel: 0, pixels: null_mut(), len: 0 }
  }
}
impl From<DecodedImage> for MpngImage {
  fn from(image: DecodedImage) -> Self {
    let channels = image.channel_count() as u32;
    let bytes_per_pixel = image.bytes_per_pixel() as u32;
    let pixels: Box<[u8]> = image.pixels.into_boxed_slice();
    let len = pixels.len();
    Self {
      width: image.width,
      height: image.height,
      channels,
      bit_depth: u32::from(image.bit_depth),
      bytes_per_pixel,
      pixels: Box::into_raw(pixels).cast::<u8>(),
      len,
    }
  }
}

/// Runs `f`, converting its result (or a panic) into a status code.
fn guarded<F: FnOnce() -> PngResult<()>>(f: F) -> i32 {
  match catch_unwind(AssertUnwindSafe(f)) {
    Ok(Ok(())) => MPNG_OK,
    Ok(Err(e)) => {
      log::debug!("decode failed: {e}");
      e.status()
    }
    Err(_) => {
      log::error!("caught a panic at the C boundary");
      MPNG_PANIC
    }
  }
}

/// ## Safety
/// `buffer` must be null or point to `len` readable bytes.
unsafe fn input_bytes<'a>(buffer: *const c_void, len: usize) -> PngResult<&'a [u8]> {
  if buffer.is_null() {
    return Err(PngError::InvalidArgument);
  }
  Ok(unsafe { core::slice::from_raw_parts(buffer.cast::<u8>(), len) })
}

/// ## Safety
/// `path` must be null or point to a NUL-terminated string.
unsafe fn input_path<'a>(path: *const c_char) -> PngResult<&'a Path> {
  if path.is_null() {
    return Err(PngError::InvalidArgument);
  }
  let s = unsafe { CStr::from_ptr(path) }.to_str().map_err(|_| PngError::InvalidArgument)?;
  Ok(Path::new(s))
}

/// ## Safety
/// `out` must be null or point to writable memory for one [`MpngImage`].
unsafe fn write_out(out: *mut MpngImage, image: PngResult<DecodedImage>) -> PngResult<()> {
  if out.is_null() {
    // nobody to hand the pixels to, they're dropped here.
    return image.map(drop);
  }
  match image {
    Ok(image) => {
      unsafe { out.write(MpngImage::from(image)) };
      Ok(())
    }
    Err(e) => {
      unsafe { out.write(MpngImage::zeroed()) };
      Err(e)
    }
  }
}

/// Decodes PNG bytes from memory.
///
/// On success `*out` receives the image, which must later be passed to
/// [`mpng_image_release`]. If `out` is null the image is only validated.
///
/// ## Safety
/// * `buffer` must point to `len` readable bytes.
/// * `out` must be null or point to writable memory for one [`MpngImage`].
#[no_mangle]
pub unsafe extern "C" fn mpng_decode_from_memory(
  buffer: *const c_void, len: usize, out: *mut MpngImage,
) -> i32 {
  guarded(|| {
    let image = unsafe { input_bytes(buffer, len) }.and_then(decode_png);
    unsafe { write_out(out, image) }
  })
}

/// Decodes the PNG file at a NUL-terminated UTF-8 path.
///
/// A missing or unreadable file gives an I/O status (`-30` to `-32`), never a
/// format status.
///
/// ## Safety
/// * `path` must point to a NUL-terminated string.
/// * `out` must be null or point to writable memory for one [`MpngImage`].
#[no_mangle]
pub unsafe extern "C" fn mpng_decode_from_file(path: *const c_char, out: *mut MpngImage) -> i32 {
  guarded(|| {
    let image = unsafe { input_path(path) }.and_then(decode_png_file);
    unsafe { write_out(out, image) }
  })
}

/// Frees the pixels of an image filled by a decode call, and zeroes it.
///
/// ## Safety
/// * `image` must be null, or point to an [`MpngImage`] that's zeroed or was
///   filled by [`mpng_decode_from_memory`] or [`mpng_decode_from_file`].
/// * Each filled image must be released exactly once. Releasing a copy of an
///   already released image is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn mpng_image_release(image: *mut MpngImage) {
  let Some(image) = (unsafe { image.as_mut() }) else { return };
  if !image.pixels.is_null() {
    drop(unsafe { Box::from_raw(slice_from_raw_parts_mut(image.pixels, image.len)) });
  }
  *image = MpngImage::zeroed();
}

/// A static, NUL-terminated description of a status code.
///
/// Error statuses use [`PngError::message_c`].
#[no_mangle]
pub extern "C" fn mpng_status_message(status: i32) -> *const c_char {
  let fixed: &'static [u8] = match status {
    MPNG_OK => b"ok\0",
    MPNG_PANIC => b"internal panic\0",
    other => match PngError::from_status(other) {
      Some(e) => return e.message_c().as_ptr(),
      None => b"unknown status\0",
    },
  };
  fixed.as_ptr().cast::<c_char>()
}

/// Decodes PNG bytes to RGBA8 and throws the pixels away, reporting only the
/// status.
///
/// This is the symbol the Android instrumentation test reaches through JNI.
///
/// ## Safety
/// `buffer` must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn test_read_png_from_memory(buffer: *const c_void, len: usize) -> i32 {
  guarded(|| {
    let bytes = unsafe { input_bytes(buffer, len) }?;
    decode_png(bytes)?.to_rgba8().map(drop)
  })
}

/// Reads the PNG file at a NUL-terminated path, decodes it to RGBA8, and
/// throws the pixels away, reporting only the status.
///
/// This is the symbol the iOS test calls.
///
/// ## Safety
/// `path` must point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn test_read_from_png_file_to_memory(path: *const c_char) -> i32 {
  guarded(|| {
    let path = unsafe { input_path(path) }?;
    let bytes = read_png_file(path)?;
    decode_png(&bytes)?.to_rgba8().map(drop)
  })
}
