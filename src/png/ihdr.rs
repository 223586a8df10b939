use super::*;

use crate::FormatError;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }

  /// If the given bit depth is legal with this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
      Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => matches!(bit_depth, 8 | 16),
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = FormatError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(FormatError::BadHeader),
    })
  }
}

/// How the scanlines of the image are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PngInterlace {
  /// Plain top to bottom scanlines.
  None,
  /// Seven reduced images of increasing resolution (Adam7).
  Adam7,
}

/// Image Header, the contents of the `IHDR` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageHeader {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// if the image data is stored interlaced.
  pub interlace: PngInterlace,
}
impl TryFrom<&[u8]> for ImageHeader {
  type Error = FormatError;
  /// Parses and validates the 13 byte payload of an `IHDR` chunk.
  #[inline]
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([w0, w1, w2, w3]);
        let height = u32::from_be_bytes([h0, h1, h2, h3]);
        // PNG caps both dimensions at 2^31-1
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
          return Err(FormatError::BadHeader);
        }
        let color_type = PngColorType::try_from(color_type)?;
        if !color_type.allows_bit_depth(bit_depth) {
          return Err(FormatError::BadHeader);
        }
        if compression_method != 0 || filter_method != 0 {
          return Err(FormatError::BadHeader);
        }
        let interlace = match interlace_method {
          0 => PngInterlace::None,
          1 => PngInterlace::Adam7,
          _ => return Err(FormatError::BadHeader),
        };
        Ok(Self { width, height, bit_depth, color_type, interlace })
      }
      _ => Err(FormatError::BadHeader),
    }
  }
}
impl ImageHeader {
  /// Bits used by a single pixel in the *encoded* data.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    self.color_type.channel_count() * (self.bit_depth as usize)
  }

  /// Filtering is per byte within a pixel when pixels are more than 1 byte
  /// each, and per byte when pixels are 1 byte or less.
  #[inline]
  #[must_use]
  pub const fn filter_chunk_size(&self) -> usize {
    let bytes = self.bits_per_pixel() / 8;
    if bytes == 0 {
      1
    } else {
      bytes
    }
  }

  /// Bytes in one filtered line of an image (or reduced image) `width` pixels
  /// wide, including the leading filter type byte.
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so we round up.
  #[inline]
  #[must_use]
  pub fn bytes_per_filterline(&self, width: u32) -> Option<usize> {
    let bits = self.bits_per_pixel().checked_mul(width as usize)?;
    Some(1 + (bits / 8) + usize::from(bits % 8 != 0))
  }

  /// The exact number of bytes the zlib stream must inflate to.
  ///
  /// Gives `None` if that size doesn't fit in `usize`.
  #[must_use]
  pub fn zlib_decompression_requirement(&self) -> Option<usize> {
    let levels = match self.interlace {
      PngInterlace::None => 0_usize..=0,
      PngInterlace::Adam7 => 1_usize..=7,
    };
    let dimensions = reduced_image_dimensions(self.width, self.height);
    let mut total: usize = 0;
    for (reduced_width, reduced_height) in dimensions[levels].iter().copied() {
      if reduced_width == 0 || reduced_height == 0 {
        continue;
      }
      let image_bytes = self.bytes_per_filterline(reduced_width)?.checked_mul(reduced_height as usize)?;
      total = total.checked_add(image_bytes)?;
    }
    Some(total)
  }

  /// Color type of the decoded pixels. Indexed images decode to RGB.
  #[inline]
  #[must_use]
  pub const fn output_color_type(&self) -> PngColorType {
    match self.color_type {
      PngColorType::Index => PngColorType::RGB,
      other => other,
    }
  }

  /// Bits per channel of the decoded pixels, either 8 or 16.
  #[inline]
  #[must_use]
  pub const fn output_bit_depth(&self) -> u8 {
    if self.bit_depth == 16 {
      16
    } else {
      8
    }
  }

  /// Bytes per pixel of the decoded pixels.
  #[inline]
  #[must_use]
  pub const fn output_bytes_per_pixel(&self) -> usize {
    self.output_color_type().channel_count() * (self.output_bit_depth() as usize / 8)
  }
}

#[test]
fn test_ihdr_parse() {
  let good: [u8; 13] = [0, 0, 0, 3, 0, 0, 0, 2, 8, 6, 0, 0, 0];
  let h = ImageHeader::try_from(&good[..]).unwrap();
  assert_eq!(h.width, 3);
  assert_eq!(h.height, 2);
  assert_eq!(h.color_type, PngColorType::RGBA);
  assert_eq!(h.interlace, PngInterlace::None);
  assert_eq!(h.bits_per_pixel(), 32);
  assert_eq!(h.filter_chunk_size(), 4);
  assert_eq!(h.output_bytes_per_pixel(), 4);
  assert_eq!(h.zlib_decompression_requirement(), Some(2 * (1 + 12)));

  // wrong length
  assert_eq!(ImageHeader::try_from(&good[..12]), Err(FormatError::BadHeader));
  // zero width
  let mut bad = good;
  bad[3] = 0;
  assert_eq!(ImageHeader::try_from(&bad[..]), Err(FormatError::BadHeader));
  // RGB can't be 4 bits
  let mut bad = good;
  bad[8] = 4;
  bad[9] = 2;
  assert_eq!(ImageHeader::try_from(&bad[..]), Err(FormatError::BadHeader));
  // index can't be 16 bits
  let mut bad = good;
  bad[8] = 16;
  bad[9] = 3;
  assert_eq!(ImageHeader::try_from(&bad[..]), Err(FormatError::BadHeader));
  // color type 1 doesn't exist
  let mut bad = good;
  bad[9] = 1;
  assert_eq!(ImageHeader::try_from(&bad[..]), Err(FormatError::BadHeader));
  // unknown compression, filter, and interlace methods
  for i in 10..13 {
    let mut bad = good;
    bad[i] = 2;
    assert_eq!(ImageHeader::try_from(&bad[..]), Err(FormatError::BadHeader));
  }
}

#[test]
fn test_filterline_sizes() {
  let h = ImageHeader {
    width: 10,
    height: 3,
    bit_depth: 1,
    color_type: PngColorType::Y,
    interlace: PngInterlace::None,
  };
  assert_eq!(h.filter_chunk_size(), 1);
  assert_eq!(h.bytes_per_filterline(10), Some(1 + 2));
  assert_eq!(h.bytes_per_filterline(8), Some(1 + 1));
  assert_eq!(h.zlib_decompression_requirement(), Some(9));
  assert_eq!(h.output_bytes_per_pixel(), 1);

  let h = ImageHeader { bit_depth: 16, color_type: PngColorType::RGB, ..h };
  assert_eq!(h.filter_chunk_size(), 6);
  assert_eq!(h.bytes_per_filterline(10), Some(1 + 60));
  assert_eq!(h.output_bytes_per_pixel(), 6);

  let h = ImageHeader { bit_depth: 2, color_type: PngColorType::Index, ..h };
  assert_eq!(h.output_color_type(), PngColorType::RGB);
  assert_eq!(h.output_bytes_per_pixel(), 3);
  assert_eq!(h.bytes_per_filterline(10), Some(1 + 3));

  // 8x8 interlaced gray8: reduced images are 1x1, 1x1, 2x1, 2x2, 4x2, 4x4, 8x4
  let h = ImageHeader {
    width: 8,
    height: 8,
    bit_depth: 8,
    color_type: PngColorType::Y,
    interlace: PngInterlace::Adam7,
  };
  assert_eq!(h.zlib_decompression_requirement(), Some(2 + 2 + 3 + 6 + 10 + 20 + 36));
}
