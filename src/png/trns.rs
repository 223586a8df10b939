use super::*;

/// Transparency
///
/// Spec: [tRNS](https://www.w3.org/TR/png/#11tRNS)
///
/// Which form applies depends on the image's color type, so parsing needs the
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
pub enum tRNS<'b> {
  /// The greyscale value (at the image's bit depth) that is transparent.
  Y {
    /// The transparent value
    y: u16,
  },
  /// The RGB value (at the image's bit depth) that is transparent.
  RGB {
    /// red
    r: u16,
    /// green
    g: u16,
    /// blue
    b: u16,
  },
  /// Alpha values for the first palette entries. There can be less alpha
  /// entries than palette entries, missing entries are fully opaque.
  Index {
    /// One alpha per palette entry
    data: &'b [u8],
  },
}
impl<'b> tRNS<'b> {
  /// Parses the payload of a `tRNS` chunk for the given color type.
  ///
  /// Gives `None` when the color type can't have a `tRNS` chunk (it already
  /// has an alpha channel) or the payload has the wrong length.
  #[inline]
  #[must_use]
  pub fn parse(color_type: PngColorType, data: &'b [u8]) -> Option<Self> {
    match (color_type, data) {
      (PngColorType::Y, [y0, y1]) => Some(tRNS::Y { y: u16::from_be_bytes([*y0, *y1]) }),
      (PngColorType::RGB, [r0, r1, g0, g1, b0, b1]) => Some(tRNS::RGB {
        r: u16::from_be_bytes([*r0, *r1]),
        g: u16::from_be_bytes([*g0, *g1]),
        b: u16::from_be_bytes([*b0, *b1]),
      }),
      (PngColorType::Index, data) if data.len() <= 256 => Some(tRNS::Index { data }),
      _ => None,
    }
  }
}

#[test]
fn test_trns_parse() {
  assert_eq!(tRNS::parse(PngColorType::Y, &[1, 2]), Some(tRNS::Y { y: 0x0102 }));
  assert_eq!(tRNS::parse(PngColorType::Y, &[1, 2, 3]), None);
  assert_eq!(
    tRNS::parse(PngColorType::RGB, &[0, 1, 0, 2, 0, 3]),
    Some(tRNS::RGB { r: 1, g: 2, b: 3 })
  );
  assert_eq!(tRNS::parse(PngColorType::Index, &[9, 8]), Some(tRNS::Index { data: &[9, 8] }));
  assert_eq!(tRNS::parse(PngColorType::RGBA, &[0, 0]), None);
  assert_eq!(tRNS::parse(PngColorType::YA, &[0, 0]), None);
}
