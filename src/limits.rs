use crate::FormatError;

/// Caps applied to an image's declared size before anything is allocated.
///
/// The defaults limit width and height to 17,000 pixels each and the final
/// pixel buffer to 1 GiB, which keeps a hostile header from driving an
/// integer overflow or an out-of-memory abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeLimits {
  /// Largest accepted width in pixels.
  pub max_width: u32,
  /// Largest accepted height in pixels.
  pub max_height: u32,
  /// Largest accepted size of the decoded pixel buffer, in bytes.
  pub max_bytes: usize,
}
impl Default for DecodeLimits {
  #[inline]
  fn default() -> Self {
    Self { max_width: 17_000, max_height: 17_000, max_bytes: 1 << 30 }
  }
}
impl DecodeLimits {
  /// Checks declared dimensions and the resulting buffer size against the
  /// limits.
  ///
  /// `bytes_per_pixel` is the size of one pixel in the *output* buffer.
  pub fn check(&self, width: u32, height: u32, bytes_per_pixel: usize) -> Result<usize, FormatError> {
    if width > self.max_width || height > self.max_height {
      return Err(FormatError::DimensionsTooLarge);
    }
    let total = (width as usize)
      .checked_mul(height as usize)
      .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
      .ok_or(FormatError::DimensionsTooLarge)?;
    if total > self.max_bytes {
      return Err(FormatError::DimensionsTooLarge);
    }
    Ok(total)
  }
}

#[test]
fn test_limits_check() {
  let limits = DecodeLimits::default();
  assert_eq!(limits.check(1, 1, 1), Ok(1));
  assert_eq!(limits.check(100, 20, 4), Ok(8000));
  assert_eq!(limits.check(17_001, 1, 1), Err(FormatError::DimensionsTooLarge));
  assert_eq!(limits.check(1, u32::MAX, 1), Err(FormatError::DimensionsTooLarge));
  assert_eq!(limits.check(17_000, 17_000, 8), Err(FormatError::DimensionsTooLarge));
  let tiny = DecodeLimits { max_width: 4, max_height: 4, max_bytes: 15 };
  assert_eq!(tiny.check(4, 4, 1), Err(FormatError::DimensionsTooLarge));
  assert_eq!(tiny.check(3, 5, 1), Err(FormatError::DimensionsTooLarge));
  assert_eq!(tiny.check(3, 4, 1), Ok(12));
}
