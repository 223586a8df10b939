use std::{fs::File, io::Read, path::Path, vec::Vec};

use crate::{png::decode_png_with_limits, DecodeLimits, DecodedImage, PngResult};

/// Reads the whole file into memory.
///
/// The file handle is closed before this returns, on success or failure.
pub fn read_png_file<P: AsRef<Path>>(path: P) -> PngResult<Vec<u8>> {
  let path = path.as_ref();
  let mut file = File::open(path).map_err(|e| {
    log::debug!("opening {}: {e}", path.display());
    e
  })?;
  let mut bytes = Vec::new();
  if let Ok(meta) = file.metadata() {
    bytes.try_reserve_exact(meta.len() as usize)?;
  }
  file.read_to_end(&mut bytes)?;
  Ok(bytes)
}

/// Decodes the PNG file at `path` with the default [`DecodeLimits`].
///
/// A missing file is [`IoError::NotFound`](crate::IoError::NotFound) and an
/// unreadable one is
/// [`IoError::PermissionDenied`](crate::IoError::PermissionDenied), both
/// distinct from any problem with the PNG data.
#[inline]
pub fn decode_png_file<P: AsRef<Path>>(path: P) -> PngResult<DecodedImage> {
  decode_png_file_with_limits(path, &DecodeLimits::default())
}

/// Decodes the PNG file at `path`.
pub fn decode_png_file_with_limits<P: AsRef<Path>>(
  path: P, limits: &DecodeLimits,
) -> PngResult<DecodedImage> {
  let bytes = read_png_file(path)?;
  decode_png_with_limits(&bytes, limits)
}
