use super::*;

use crate::FormatError;

/// Palette data
///
/// Palette entries are always RGB.
///
/// If you want to have a paletted image with transparency then the transparency
/// info goes in a separate transparency chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PLTE<'b>(&'b [[u8; 3]]);
impl<'b> TryFrom<&'b [u8]> for PLTE<'b> {
  type Error = FormatError;
  /// The payload must be 1 to 256 whole entries.
  #[inline]
  fn try_from(data: &'b [u8]) -> Result<Self, Self::Error> {
    match bytemuck::try_cast_slice::<u8, [u8; 3]>(data) {
      Ok(entries) if !entries.is_empty() && entries.len() <= 256 => Ok(Self(entries)),
      _ => Err(FormatError::BadPalette),
    }
  }
}
impl Debug for PLTE<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    f.debug_tuple("PLTE").field(&&self.0[..self.0.len().min(4)]).field(&self.0.len()).finish()
  }
}
impl<'b> PLTE<'b> {
  /// Gets the entries as a slice.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &'b [[u8; 3]] {
    self.0
  }
}

#[test]
fn test_plte_lengths() {
  assert!(PLTE::try_from(&[0_u8; 0][..]).is_err());
  assert!(PLTE::try_from(&[1_u8, 2][..]).is_err());
  assert!(PLTE::try_from(&[0_u8; 3 * 257][..]).is_err());
  let plte = PLTE::try_from(&[1_u8, 2, 3, 4, 5, 6][..]).unwrap();
  assert_eq!(plte.entries(), &[[1, 2, 3], [4, 5, 6]]);
}
