use super::*;

use crate::FormatError;

fn send_out_pixel<F: FnMut(u32, u32, &[u8])>(
  header: &ImageHeader, image_level: usize, reduced_width: u32, reduced_x: u32, reduced_y: u32,
  data: &[u8], op: &mut F,
) {
  match header.bit_depth {
    depth @ (1 | 2 | 4) => {
      // one byte holds several pixels, the leftmost pixel in the high bits.
      let pixels_per_byte = 8 / u32::from(depth);
      let mask = (1_u8 << depth) - 1;
      let full_data: u8 = data[0];
      for plus_x in 0..pixels_per_byte {
        let r_x = reduced_x * pixels_per_byte + plus_x;
        if r_x >= reduced_width {
          // padding bits at the end of the line
          return;
        }
        let down_shift = 8 - u32::from(depth) * (plus_x + 1);
        let (image_x, image_y) = interlaced_pos_to_full_pos(image_level, r_x, reduced_y);
        op(image_x, image_y, &[(full_data >> down_shift) & mask]);
      }
    }
    _ => {
      let (image_x, image_y) = interlaced_pos_to_full_pos(image_level, reduced_x, reduced_y);
      op(image_x, image_y, data);
    }
  }
}

const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests is fixed by the PNG spec, don't reorder them.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses one line's filter in place.
///
/// * `a` is the byte one filter chunk to the left (0 off the left edge)
/// * `b` is the byte directly above (0 on the first line of an image)
/// * `c` is the byte above and to the left
///
/// Each byte depends on already reconstructed bytes, so this has to walk the
/// line left to right.
fn unfilter_line(
  filter: u8, line: &mut [u8], prev: Option<&[u8]>, filter_chunk_size: usize,
) -> Result<(), FormatError> {
  match (filter, prev) {
    (0, _) | (2, None) => (),
    (1, _) => {
      for i in filter_chunk_size..line.len() {
        line[i] = line[i].wrapping_add(line[i - filter_chunk_size]);
      }
    }
    (2, Some(b_line)) => {
      line.iter_mut().zip(b_line.iter().copied()).for_each(|(p, b)| *p = p.wrapping_add(b));
    }
    (3, _) => {
      for i in 0..line.len() {
        let a = if i >= filter_chunk_size { line[i - filter_chunk_size] } else { 0 };
        let b = prev.map_or(0, |b_line| b_line[i]);
        line[i] = line[i].wrapping_add(((u32::from(a) + u32::from(b)) / 2) as u8);
      }
    }
    (4, _) => {
      for i in 0..line.len() {
        let (a, b, c) = match prev {
          Some(b_line) if i >= filter_chunk_size => {
            (line[i - filter_chunk_size], b_line[i], b_line[i - filter_chunk_size])
          }
          Some(b_line) => (0, b_line[i], 0),
          None if i >= filter_chunk_size => (line[i - filter_chunk_size], 0, 0),
          None => (0, 0, 0),
        };
        line[i] = line[i].wrapping_add(paeth_predict(a, b, c));
      }
    }
    _ => return Err(FormatError::UnknownFilter),
  }
  Ok(())
}

/// Given the `header`, `decompressed` buffer, and a per-pixel `op`, unfilters
/// the data and passes each pixel output to the `op` as the unfiltering occurs.
///
/// Each call to the `op` gets `|x, y, data|` as arguments, where `x` and `y`
/// are the position of the pixel data (relative to the top left), and `data` is
/// a slice of bytes representing the unfiltered pixel value at that location.
/// * Bit depths 1, 2, and 4 will have the value in the low bits of a single
///   byte slice, and the callback is called once per pixel.
/// * Bit depth 8 will have one byte per channel.
/// * Bit depth 16 will have two big-endian bytes per channel.
///
/// The data is unfiltered in place, and each filter byte is reset to the "no
/// filter" setting as it goes.
///
/// ## Failure
/// * The `decompressed` buffer must be exactly
///   [`zlib_decompression_requirement`](ImageHeader::zlib_decompression_requirement)
///   bytes, otherwise this gives [`FormatError::SizeMismatch`] before any
///   unfiltering happens.
/// * A filter type other than 0 through 4 gives [`FormatError::UnknownFilter`].
pub fn unfilter_decompressed_data<F>(
  header: &ImageHeader, mut decompressed: &mut [u8], mut op: F,
) -> Result<(), FormatError>
where
  F: FnMut(u32, u32, &[u8]),
{
  if header.zlib_decompression_requirement() != Some(decompressed.len()) {
    return Err(FormatError::SizeMismatch);
  }

  let filter_chunk_size = header.filter_chunk_size();
  // A non-interlaced image is handled as if it were "reduced image 0", which is
  // just the full image. Interlaced images use reduced images 1 through 7.
  let levels = match header.interlace {
    PngInterlace::None => 0_usize..=0,
    PngInterlace::Adam7 => 1_usize..=7,
  };
  let dimensions = reduced_image_dimensions(header.width, header.height);

  for image_level in levels {
    let (reduced_width, reduced_height) = dimensions[image_level];
    if reduced_width == 0 || reduced_height == 0 {
      // while the full image's width and height must not be 0, the width or
      // height of any particular reduced image might still be 0.
      continue;
    }
    let bytes_per_filterline =
      header.bytes_per_filterline(reduced_width).ok_or(FormatError::SizeMismatch)?;
    let bytes_used_this_image = bytes_per_filterline.saturating_mul(reduced_height as usize);
    if decompressed.len() < bytes_used_this_image {
      return Err(FormatError::SizeMismatch);
    }
    let (these_bytes, more_bytes) = core::mem::take(&mut decompressed).split_at_mut(bytes_used_this_image);
    decompressed = more_bytes;

    // The first line of each image has no previous line, filters act as if
    // the previous line was all zeroes.
    let mut prev: Option<&[u8]> = None;
    for (reduced_y, line) in these_bytes.chunks_exact_mut(bytes_per_filterline).enumerate() {
      let (f, pixels) = line.split_at_mut(1);
      unfilter_line(f[0], pixels, prev, filter_chunk_size).map_err(|e| {
        log::debug!("filter type {} on line {reduced_y} of reduced image {image_level}", f[0]);
        e
      })?;
      f[0] = 0;
      for (reduced_x, pixel) in pixels.chunks_exact(filter_chunk_size).enumerate() {
        send_out_pixel(
          header,
          image_level,
          reduced_width,
          reduced_x as u32,
          reduced_y as u32,
          pixel,
          &mut op,
        );
      }
      prev = Some(&*pixels);
    }
  }

  Ok(())
}

#[test]
fn test_paeth_predict() {
  assert_eq!(paeth_predict(0, 0, 0), 0);
  // p = a, so a wins every tie
  assert_eq!(paeth_predict(10, 10, 10), 10);
  // p = 10 + 20 - 15 = 15: pa = 5, pb = 5, pc = 0
  assert_eq!(paeth_predict(10, 20, 15), 15);
  // p = 100 + 0 - 0: pa = 0
  assert_eq!(paeth_predict(100, 0, 0), 100);
  // p = 0 + 100 - 0: pa = 100, pb = 0
  assert_eq!(paeth_predict(0, 100, 0), 100);
  // p = 50 + 60 - 200 = -90: pa = 140, pb = 150, pc = 290
  assert_eq!(paeth_predict(50, 60, 200), 50);
}

#[test]
fn test_unfilter_lines() {
  // Sub with 2 byte pixels
  let mut line = [1, 2, 3, 4, 5, 6];
  unfilter_line(1, &mut line, None, 2).unwrap();
  assert_eq!(line, [1, 2, 4, 6, 9, 12]);
  // Up
  let mut line = [1, 2, 255];
  unfilter_line(2, &mut line, Some(&[10, 20, 2][..]), 1).unwrap();
  assert_eq!(line, [11, 22, 1]);
  // Average without a previous line halves the left byte
  let mut line = [10, 10, 10];
  unfilter_line(3, &mut line, None, 1).unwrap();
  assert_eq!(line, [10, 15, 17]);
  // Average with a previous line
  let mut line = [0, 0];
  unfilter_line(3, &mut line, Some(&[200, 100][..]), 1).unwrap();
  assert_eq!(line, [100, 100]);
  // Paeth on the first line is the same as Sub
  let mut line = [3, 4, 5];
  unfilter_line(4, &mut line, None, 1).unwrap();
  assert_eq!(line, [3, 7, 12]);
  // Paeth with a previous line: b for the first byte, then the full predictor
  let mut line = [1, 1];
  unfilter_line(4, &mut line, Some(&[10, 20][..]), 1).unwrap();
  // second byte: a = 11, b = 20, c = 10, p = 21, pa = 10, pb = 1, pc = 11
  assert_eq!(line, [11, 21]);
  assert_eq!(unfilter_line(5, &mut line, None, 1), Err(FormatError::UnknownFilter));
}
