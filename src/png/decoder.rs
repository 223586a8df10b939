use super::*;

use alloc::vec::Vec;
use bitfrob::u8_replicate_bits;
use miniz_oxide::inflate::{decompress_slice_iter_to_slice, TINFLStatus};

use crate::{ColorKey, DecodeLimits, DecodedImage, FormatError, PngError, PngResult};

/// Where the decoder is within the chunk sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
  Start,
  HaveHeader,
  HavePalette,
  /// Collecting contiguous `IDAT` chunks.
  Decoding,
  /// Some other chunk came after the `IDAT` run.
  AfterImageData,
  Done,
}

/// Everything the chunk walk collects, borrowing from the PNG bytes.
struct ChunkSummary<'b> {
  header: ImageHeader,
  palette: Option<PLTE<'b>>,
  transparency: Option<tRNS<'b>>,
  idat: Vec<&'b [u8]>,
}

fn bad_chunk(offset: usize, type_: PngChunkType, e: FormatError) -> PngError {
  log::debug!("{type_:?} chunk at offset {offset}: {e}");
  PngError::Format(e)
}

/// Walks all the chunks, enforcing the ordering rules for the critical ones.
fn collect_chunks<'b>(bytes: &'b [u8], limits: &DecodeLimits) -> PngResult<ChunkSummary<'b>> {
  let mut it = PngRawChunkIter::new(bytes)?;
  let mut state = DecodeState::Start;
  let mut header: Option<ImageHeader> = None;
  let mut palette: Option<PLTE<'b>> = None;
  let mut transparency: Option<tRNS<'b>> = None;
  let mut idat: Vec<&'b [u8]> = Vec::new();

  while state != DecodeState::Done {
    let offset = it.offset();
    let chunk = match it.next() {
      Some(chunk) => chunk?,
      // ran out of bytes on a chunk boundary, but never saw IEND.
      None => return Err(FormatError::TruncatedChunk.into()),
    };
    let type_ = chunk.chunk_type();

    if state == DecodeState::Start {
      if type_ != PngChunkType::IHDR {
        return Err(bad_chunk(offset, type_, FormatError::MissingHeader));
      }
      let h = ImageHeader::try_from(chunk.data())?;
      limits.check(h.width, h.height, h.output_bytes_per_pixel())?;
      log::debug!("{h:?}");
      header = Some(h);
      state = DecodeState::HaveHeader;
      continue;
    }
    // every state past `Start` has a header.
    let Some(h) = header else { return Err(FormatError::MissingHeader.into()) };

    match type_ {
      PngChunkType::IHDR => return Err(bad_chunk(offset, type_, FormatError::DuplicateChunk)),
      PngChunkType::PLTE => match state {
        DecodeState::HaveHeader if h.color_type == PngColorType::Index => {
          let plte = PLTE::try_from(chunk.data())?;
          if plte.entries().len() > (1_usize << h.bit_depth) {
            return Err(bad_chunk(offset, type_, FormatError::BadPalette));
          }
          palette = Some(plte);
          state = DecodeState::HavePalette;
        }
        DecodeState::HavePalette => return Err(bad_chunk(offset, type_, FormatError::DuplicateChunk)),
        _ => return Err(bad_chunk(offset, type_, FormatError::UnexpectedChunk)),
      },
      PngChunkType::IDAT => match state {
        DecodeState::HaveHeader | DecodeState::HavePalette | DecodeState::Decoding => {
          idat.try_reserve(1)?;
          idat.push(chunk.data());
          state = DecodeState::Decoding;
        }
        _ => return Err(bad_chunk(offset, type_, FormatError::UnexpectedChunk)),
      },
      PngChunkType::IEND => {
        if idat.is_empty() {
          return Err(bad_chunk(offset, type_, FormatError::MissingImageData));
        }
        state = DecodeState::Done;
      }
      PngChunkType::tRNS => {
        // palette alphas only make sense after the palette.
        let in_order = match state {
          DecodeState::HaveHeader => h.color_type != PngColorType::Index,
          DecodeState::HavePalette => true,
          _ => false,
        };
        if in_order && transparency.is_none() {
          transparency = tRNS::parse(h.color_type, chunk.data());
          if transparency.is_none() {
            log::debug!("ignoring a malformed tRNS chunk at offset {offset}");
          }
        } else {
          log::warn!("ignoring a tRNS chunk at offset {offset}, it's out of order");
          if state == DecodeState::Decoding {
            state = DecodeState::AfterImageData;
          }
        }
      }
      other if other.is_critical() => {
        return Err(bad_chunk(offset, type_, FormatError::UnsupportedCriticalChunk))
      }
      other => {
        log::debug!("skipping {other:?} chunk at offset {offset}");
        if state == DecodeState::Decoding {
          state = DecodeState::AfterImageData;
        }
      }
    }
  }

  let header = header.ok_or(FormatError::MissingHeader)?;
  if header.color_type == PngColorType::Index && palette.is_none() {
    return Err(FormatError::MissingPalette.into());
  }
  Ok(ChunkSummary { header, palette, transparency, idat })
}

/// Validates the signature and the `IHDR` chunk, without decoding the image.
pub fn decode_png_header(bytes: &[u8]) -> PngResult<ImageHeader> {
  let mut it = PngRawChunkIter::new(bytes)?;
  let chunk = it.next().ok_or(FormatError::TruncatedChunk)??;
  if chunk.chunk_type() != PngChunkType::IHDR {
    return Err(FormatError::MissingHeader.into());
  }
  Ok(ImageHeader::try_from(chunk.data())?)
}

/// Decodes the full PNG bytes with the default [`DecodeLimits`].
#[inline]
pub fn decode_png(bytes: &[u8]) -> PngResult<DecodedImage> {
  decode_png_with_limits(bytes, &DecodeLimits::default())
}

/// Decodes the full PNG bytes.
///
/// The output pixels are row-major with channels interleaved:
/// * Indexed color becomes RGB, 8 bits per channel.
/// * Bit depths below 8 become one byte per sample. Greyscale samples are
///   scaled up to the 0 to 255 range.
/// * Bit depth 16 stays as two big-endian bytes per channel.
///
/// All the memory used is owned by this call, and on an error all of it is
/// released before returning.
pub fn decode_png_with_limits(bytes: &[u8], limits: &DecodeLimits) -> PngResult<DecodedImage> {
  let ChunkSummary { header, palette, transparency, idat } = collect_chunks(bytes, limits)?;

  let zlib_len = header.zlib_decompression_requirement().ok_or(FormatError::DimensionsTooLarge)?;
  let out_len = limits.check(header.width, header.height, header.output_bytes_per_pixel())?;
  log::debug!("{} IDAT chunks, inflating to {zlib_len} bytes, {out_len} output bytes", idat.len());

  let mut zlib_buffer: Vec<u8> = Vec::new();
  zlib_buffer.try_reserve_exact(zlib_len)?;
  zlib_buffer.resize(zlib_len, 0);
  match decompress_slice_iter_to_slice(&mut zlib_buffer, idat.iter().copied(), true, false) {
    Ok(count) if count == zlib_len => (),
    Ok(count) => {
      log::debug!("zlib stream ended after {count} of {zlib_len} bytes");
      return Err(FormatError::SizeMismatch.into());
    }
    Err(TINFLStatus::HasMoreOutput) => {
      log::debug!("zlib stream holds more than {zlib_len} bytes");
      return Err(FormatError::SizeMismatch.into());
    }
    Err(e) => {
      log::debug!("inflate failed: {e:?}");
      return Err(FormatError::InflateError.into());
    }
  }
  drop(idat);

  let mut pixels: Vec<u8> = Vec::new();
  pixels.try_reserve_exact(out_len)?;
  pixels.resize(out_len, 0);

  let palette_alphas = match transparency {
    Some(tRNS::Index { data }) => Some(data),
    _ => None,
  };
  let mut alpha: Vec<u8> = Vec::new();
  if palette_alphas.is_some() {
    let pixel_count = out_len / header.output_bytes_per_pixel();
    alpha.try_reserve_exact(pixel_count)?;
    alpha.resize(pixel_count, u8::MAX);
  }

  let entries: &[[u8; 3]] = palette.map(|p| p.entries()).unwrap_or(&[]);
  let out_bpp = header.output_bytes_per_pixel();
  let width = header.width as usize;
  let mut bad_indexes = 0_usize;
  let unfilter_op = |x: u32, y: u32, data: &[u8]| {
    let i = (y as usize) * width + (x as usize);
    let Some(out) = pixels.get_mut(i * out_bpp..(i + 1) * out_bpp) else { return };
    match header.color_type {
      PngColorType::Index => {
        let index = usize::from(data[0]);
        match entries.get(index) {
          Some(rgb) => out.copy_from_slice(rgb),
          None => {
            bad_indexes += 1;
            out.fill(0);
          }
        }
        if let Some(alphas) = palette_alphas {
          alpha[i] = alphas.get(index).copied().unwrap_or(u8::MAX);
        }
      }
      PngColorType::Y if header.bit_depth < 8 => {
        out[0] = u8_replicate_bits(u32::from(header.bit_depth), data[0]);
      }
      _ => out.copy_from_slice(data),
    }
  };
  unfilter_decompressed_data(&header, &mut zlib_buffer, unfilter_op)?;
  if bad_indexes > 0 {
    log::warn!("{bad_indexes} pixels index past the end of the palette, they decode as black");
  }

  let color_key = match transparency {
    Some(tRNS::Y { y }) if header.bit_depth < 8 => {
      // compare against the scaled value, same as the pixels.
      let mask = (1_u16 << header.bit_depth) - 1;
      Some(ColorKey::Y(u16::from(u8_replicate_bits(u32::from(header.bit_depth), (y & mask) as u8))))
    }
    Some(tRNS::Y { y }) => Some(ColorKey::Y(y)),
    Some(tRNS::RGB { r, g, b }) => Some(ColorKey::RGB([r, g, b])),
    _ => None,
  };

  Ok(DecodedImage {
    width: header.width,
    height: header.height,
    color_type: header.output_color_type(),
    bit_depth: header.output_bit_depth(),
    pixels,
    color_key,
    palette_alpha: if palette_alphas.is_some() { Some(alpha) } else { None },
  })
}
