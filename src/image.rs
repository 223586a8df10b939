#![forbid(unsafe_code)]

//! Provides the heap-allocated output of decoding.

use alloc::vec::Vec;

use crate::{png::PngColorType, PngResult};

/// A single transparent color value, from a `tRNS` chunk.
///
/// The value is at the same scale as the decoded samples: 8 bit depth values
/// for images that decode to 8 bits per channel (including scaled up low bit
/// depth greyscale), and full 16 bit values for 16 bit images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorKey {
  /// Greyscale key
  Y(u16),
  /// RGB key
  RGB([u16; 3]),
}

/// A fully decoded PNG.
///
/// The `pixels` are row-major, top to bottom, with the channels of each pixel
/// interleaved in the order the [`color_type`](Self::color_type) names them.
/// Each 16 bit sample is two big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedImage {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// Channels of the decoded pixels. Never [`PngColorType::Index`], indexed
  /// images are expanded to RGB.
  pub color_type: PngColorType,
  /// Bits per channel of the decoded pixels, 8 or 16.
  pub bit_depth: u8,
  /// `width * height * bytes_per_pixel` bytes of pixel data.
  pub pixels: Vec<u8>,
  /// The transparent color of a greyscale or RGB image, if it has one.
  pub color_key: Option<ColorKey>,
  /// One alpha value per pixel, for an indexed image that had transparency
  /// info for its palette.
  pub palette_alpha: Option<Vec<u8>>,
}
impl DecodedImage {
  /// Number of channels per pixel.
  #[inline]
  #[must_use]
  pub const fn channel_count(&self) -> usize {
    self.color_type.channel_count()
  }

  /// Number of bytes per pixel in [`pixels`](Self::pixels).
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    self.channel_count() * (self.bit_depth as usize / 8)
  }

  /// Converts the pixels to 8 bits per channel RGBA.
  ///
  /// * 16 bit samples keep their high byte.
  /// * Greyscale is copied to each of red, green, and blue.
  /// * Images without an alpha channel are opaque, except for pixels matching
  ///   the [`color_key`](Self::color_key) (compared at full depth), and pixels
  ///   with an entry in [`palette_alpha`](Self::palette_alpha).
  pub fn to_rgba8(&self) -> PngResult<Rgba8Image> {
    let bpp = self.bytes_per_pixel();
    let wide = self.bit_depth == 16;
    let mut out: Vec<[u8; 4]> = Vec::new();
    out.try_reserve_exact(self.pixels.len() / bpp)?;
    // the sample at channel `c`, at full depth and at 8 bits.
    let sample = |data: &[u8], c: usize| -> (u16, u8) {
      if wide {
        (u16::from_be_bytes([data[2 * c], data[2 * c + 1]]), data[2 * c])
      } else {
        (u16::from(data[c]), data[c])
      }
    };
    for (i, data) in self.pixels.chunks_exact(bpp).enumerate() {
      let rgba = match self.color_type {
        PngColorType::Y | PngColorType::Index => {
          let (y_full, y) = sample(data, 0);
          let a = if self.color_key == Some(ColorKey::Y(y_full)) { 0 } else { u8::MAX };
          [y, y, y, a]
        }
        PngColorType::YA => {
          let (_, y) = sample(data, 0);
          let (_, a) = sample(data, 1);
          [y, y, y, a]
        }
        PngColorType::RGB => {
          let (r_full, r) = sample(data, 0);
          let (g_full, g) = sample(data, 1);
          let (b_full, b) = sample(data, 2);
          let a = match (&self.palette_alpha, self.color_key) {
            (Some(alphas), _) => alphas.get(i).copied().unwrap_or(u8::MAX),
            (None, Some(ColorKey::RGB(key))) if key == [r_full, g_full, b_full] => 0,
            _ => u8::MAX,
          };
          [r, g, b, a]
        }
        PngColorType::RGBA => {
          let (_, r) = sample(data, 0);
          let (_, g) = sample(data, 1);
          let (_, b) = sample(data, 2);
          let (_, a) = sample(data, 3);
          [r, g, b, a]
        }
      };
      out.push(rgba);
    }
    Ok(Rgba8Image { width: self.width, height: self.height, pixels: out })
  }
}

/// An image of 8 bits per channel RGBA pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Rgba8Image {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<[u8; 4]>,
}
impl Rgba8Image {
  /// The pixels as one flat byte slice.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    bytemuck::cast_slice(&self.pixels)
  }
}

#[test]
fn test_to_rgba8() {
  use alloc::vec;

  let y16 = DecodedImage {
    width: 2,
    height: 1,
    color_type: PngColorType::Y,
    bit_depth: 16,
    pixels: vec![0x12, 0x34, 0xAB, 0xCD],
    color_key: Some(ColorKey::Y(0xABCD)),
    palette_alpha: None,
  };
  assert_eq!(y16.bytes_per_pixel(), 2);
  let rgba = y16.to_rgba8().unwrap();
  assert_eq!(rgba.pixels, vec![[0x12, 0x12, 0x12, 255], [0xAB, 0xAB, 0xAB, 0]]);
  assert_eq!(rgba.as_bytes(), &[0x12, 0x12, 0x12, 255, 0xAB, 0xAB, 0xAB, 0]);

  let indexed = DecodedImage {
    width: 3,
    height: 1,
    color_type: PngColorType::RGB,
    bit_depth: 8,
    pixels: vec![1, 2, 3, 4, 5, 6, 1, 2, 3],
    color_key: None,
    palette_alpha: Some(vec![7, 255, 7]),
  };
  assert_eq!(
    indexed.to_rgba8().unwrap().pixels,
    vec![[1, 2, 3, 7], [4, 5, 6, 255], [1, 2, 3, 7]]
  );

  let ya = DecodedImage {
    width: 1,
    height: 1,
    color_type: PngColorType::YA,
    bit_depth: 8,
    pixels: vec![9, 99],
    color_key: None,
    palette_alpha: None,
  };
  assert_eq!(ya.to_rgba8().unwrap().pixels, vec![[9, 9, 9, 99]]);
}
