use core::{
  ffi::CStr,
  fmt::{self, Display},
};

/// Something is wrong with the PNG data stream itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatError {
  /// The first 8 bytes are not the PNG signature.
  BadSignature,
  /// A chunk declares more bytes than remain in the input, or the input ended
  /// before an `IEND` chunk.
  TruncatedChunk,
  /// A chunk's stored CRC doesn't match the CRC of its type and data.
  CrcMismatch,
  /// The first chunk is not `IHDR`.
  MissingHeader,
  /// A known chunk appeared where the chunk ordering rules forbid it.
  UnexpectedChunk,
  /// A critical chunk type this decoder doesn't know.
  UnsupportedCriticalChunk,
  /// The zlib stream formed by the `IDAT` chunks is corrupt.
  InflateError,
  /// The decompressed data isn't exactly as long as the header requires.
  SizeMismatch,
  /// The `IHDR` chunk has the wrong length or an illegal field value.
  BadHeader,
  /// The image is larger than the active [`DecodeLimits`](crate::DecodeLimits).
  DimensionsTooLarge,
  /// An indexed color image without a `PLTE` chunk.
  MissingPalette,
  /// A `PLTE` chunk with an illegal entry count.
  BadPalette,
  /// `IEND` was reached without any `IDAT` chunk.
  MissingImageData,
  /// A scanline uses a filter type other than 0 through 4.
  UnknownFilter,
  /// A second `IHDR` or `PLTE` chunk.
  DuplicateChunk,
}
impl FormatError {
  /// Every variant, in status order.
  pub const ALL: [Self; 15] = [
    Self::BadSignature,
    Self::TruncatedChunk,
    Self::CrcMismatch,
    Self::MissingHeader,
    Self::UnexpectedChunk,
    Self::UnsupportedCriticalChunk,
    Self::InflateError,
    Self::SizeMismatch,
    Self::BadHeader,
    Self::DimensionsTooLarge,
    Self::MissingPalette,
    Self::BadPalette,
    Self::MissingImageData,
    Self::UnknownFilter,
    Self::DuplicateChunk,
  ];

  /// Numeric status of this error when reported over the C boundary.
  #[inline]
  #[must_use]
  pub const fn status(self) -> i32 {
    match self {
      Self::BadSignature => -1,
      Self::TruncatedChunk => -2,
      Self::CrcMismatch => -3,
      Self::MissingHeader => -4,
      Self::UnexpectedChunk => -5,
      Self::UnsupportedCriticalChunk => -6,
      Self::InflateError => -7,
      Self::SizeMismatch => -8,
      Self::BadHeader => -9,
      Self::DimensionsTooLarge => -10,
      Self::MissingPalette => -11,
      Self::BadPalette => -12,
      Self::MissingImageData => -13,
      Self::UnknownFilter => -14,
      Self::DuplicateChunk => -15,
    }
  }

  const fn message_nul(self) -> &'static str {
    match self {
      Self::BadSignature => "missing PNG signature\0",
      Self::TruncatedChunk => "truncated chunk\0",
      Self::CrcMismatch => "chunk CRC mismatch\0",
      Self::MissingHeader => "first chunk is not IHDR\0",
      Self::UnexpectedChunk => "chunk out of order\0",
      Self::UnsupportedCriticalChunk => "unsupported critical chunk\0",
      Self::InflateError => "corrupt zlib data\0",
      Self::SizeMismatch => "decompressed size mismatch\0",
      Self::BadHeader => "bad IHDR chunk\0",
      Self::DimensionsTooLarge => "image dimensions too large\0",
      Self::MissingPalette => "indexed image without PLTE\0",
      Self::BadPalette => "bad PLTE chunk\0",
      Self::MissingImageData => "no IDAT chunk\0",
      Self::UnknownFilter => "unknown scanline filter\0",
      Self::DuplicateChunk => "duplicate chunk\0",
    }
  }

  /// Description of this error as a C string.
  #[inline]
  #[must_use]
  pub fn message_c(self) -> &'static CStr {
    CStr::from_bytes_with_nul(self.message_nul().as_bytes()).unwrap_or_default()
  }
}
impl Display for FormatError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message_nul().trim_end_matches('\0'))
  }
}

/// The file backing a path-based decode couldn't be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IoError {
  /// No file at that path.
  NotFound,
  /// The file exists but we may not read it.
  PermissionDenied,
  /// Any other I/O failure.
  Other,
}
impl IoError {
  /// Every variant, in status order.
  pub const ALL: [Self; 3] = [Self::NotFound, Self::PermissionDenied, Self::Other];

  /// Numeric status of this error when reported over the C boundary.
  #[inline]
  #[must_use]
  pub const fn status(self) -> i32 {
    match self {
      Self::NotFound => -30,
      Self::PermissionDenied => -31,
      Self::Other => -32,
    }
  }

  const fn message_nul(self) -> &'static str {
    match self {
      Self::NotFound => "file not found\0",
      Self::PermissionDenied => "permission denied\0",
      Self::Other => "i/o error\0",
    }
  }

  /// Description of this error as a C string.
  #[inline]
  #[must_use]
  pub fn message_c(self) -> &'static CStr {
    CStr::from_bytes_with_nul(self.message_nul().as_bytes()).unwrap_or_default()
  }
}
impl Display for IoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message_nul().trim_end_matches('\0'))
  }
}
#[cfg(feature = "std")]
impl From<std::io::ErrorKind> for IoError {
  #[inline]
  fn from(kind: std::io::ErrorKind) -> Self {
    match kind {
      std::io::ErrorKind::NotFound => Self::NotFound,
      std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
      _ => Self::Other,
    }
  }
}

/// An error from the `mobile_png` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PngError {
  /// The PNG data is malformed or unsupported.
  Format(FormatError),
  /// The PNG file couldn't be read.
  Io(IoError),
  /// The allocator couldn't give us enough space.
  Alloc,
  /// A null pointer or a non-UTF-8 path was passed over the C boundary.
  InvalidArgument,
}
impl PngError {
  /// Numeric status of this error when reported over the C boundary.
  ///
  /// Success is always `1`, so every error status is negative.
  #[inline]
  #[must_use]
  pub const fn status(self) -> i32 {
    match self {
      Self::Format(e) => e.status(),
      Self::Io(e) => e.status(),
      Self::Alloc => -20,
      Self::InvalidArgument => -40,
    }
  }

  /// The error that reports the given status, if any does.
  #[must_use]
  pub fn from_status(status: i32) -> Option<Self> {
    let format = FormatError::ALL.into_iter().map(Self::Format);
    let io = IoError::ALL.into_iter().map(Self::Io);
    format.chain(io).chain([Self::Alloc, Self::InvalidArgument]).find(|e| e.status() == status)
  }

  /// Description of this error as a C string.
  ///
  /// This is the same text as the [`Display`] of the inner error.
  #[inline]
  #[must_use]
  pub fn message_c(self) -> &'static CStr {
    match self {
      Self::Format(e) => e.message_c(),
      Self::Io(e) => e.message_c(),
      Self::Alloc => CStr::from_bytes_with_nul(ALLOC_MESSAGE.as_bytes()).unwrap_or_default(),
      Self::InvalidArgument => {
        CStr::from_bytes_with_nul(INVALID_ARGUMENT_MESSAGE.as_bytes()).unwrap_or_default()
      }
    }
  }
}

const ALLOC_MESSAGE: &str = "allocation failed\0";
const INVALID_ARGUMENT_MESSAGE: &str = "invalid argument\0";

impl Display for PngError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Format(e) => write!(f, "format error: {e}"),
      Self::Io(e) => write!(f, "io error: {e}"),
      Self::Alloc => f.write_str(ALLOC_MESSAGE.trim_end_matches('\0')),
      Self::InvalidArgument => f.write_str(INVALID_ARGUMENT_MESSAGE.trim_end_matches('\0')),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for PngError {}
impl From<FormatError> for PngError {
  #[inline]
  fn from(e: FormatError) -> Self {
    Self::Format(e)
  }
}
impl From<IoError> for PngError {
  #[inline]
  fn from(e: IoError) -> Self {
    Self::Io(e)
  }
}
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
#[cfg(feature = "std")]
impl From<std::io::Error> for PngError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    Self::Io(IoError::from(e.kind()))
  }
}

/// Alias for `Result<T, PngError>`.
pub type PngResult<T> = Result<T, PngError>;

#[test]
fn test_status_codes_are_distinct_and_negative() {
  use alloc::vec::Vec;
  let mut codes: Vec<i32> = FormatError::ALL.iter().map(|e| PngError::from(*e).status()).collect();
  codes.extend(IoError::ALL.iter().map(|e| PngError::from(*e).status()));
  codes.push(PngError::Alloc.status());
  codes.push(PngError::InvalidArgument.status());
  assert!(codes.iter().all(|c| *c < 0));
  let mut sorted = codes.clone();
  sorted.sort_unstable();
  sorted.dedup();
  assert_eq!(sorted.len(), codes.len());
  // every status maps back to its error
  for code in codes {
    assert_eq!(PngError::from_status(code).map(PngError::status), Some(code));
  }
  assert_eq!(PngError::from_status(1), None);
  assert_eq!(PngError::from_status(0), None);
}

#[test]
fn test_c_messages_match_display() {
  use alloc::string::ToString;
  for e in FormatError::ALL {
    assert_eq!(e.message_c().to_str(), Ok(e.to_string().as_str()));
  }
  for e in IoError::ALL {
    assert_eq!(e.message_c().to_str(), Ok(e.to_string().as_str()));
  }
  assert_eq!(PngError::Alloc.message_c().to_str(), Ok("allocation failed"));
  assert_eq!(PngError::Alloc.to_string(), "allocation failed");
  assert_eq!(PngError::InvalidArgument.message_c().to_str(), Ok("invalid argument"));
  assert!(PngError::Format(FormatError::CrcMismatch).message_c().to_bytes().ends_with(b"CRC mismatch"));
}

#[cfg(feature = "std")]
#[test]
fn test_io_error_kinds() {
  use std::io::ErrorKind;
  assert_eq!(IoError::from(ErrorKind::NotFound).status(), -30);
  assert_eq!(IoError::from(ErrorKind::PermissionDenied).status(), -31);
  assert_eq!(IoError::from(ErrorKind::Other).status(), -32);
  assert_eq!(IoError::from(ErrorKind::UnexpectedEof).status(), -32);
  let e = PngError::from(std::io::Error::from(ErrorKind::PermissionDenied));
  assert_eq!(e, PngError::Io(IoError::PermissionDenied));
  assert_eq!(e.status(), -31);
}
