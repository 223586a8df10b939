use super::*;

use crate::FormatError;

/// The four byte type tag of a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngChunkType {
  pub(crate) const IHDR: Self = Self(*b"IHDR");
  pub(crate) const PLTE: Self = Self(*b"PLTE");
  pub(crate) const IDAT: Self = Self(*b"IDAT");
  pub(crate) const IEND: Self = Self(*b"IEND");
  pub(crate) const tRNS: Self = Self(*b"tRNS");

  /// If a decoder must understand this chunk to show the image.
  ///
  /// This is bit 5 of the first byte, so an uppercase first letter.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0b0010_0000) == 0
  }
}
impl Debug for PngChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
///
/// Chunks produced by [`PngRawChunkIter`] have already had their CRC checked.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PngRawChunk<'b> {
  type_: PngChunkType,
  data: &'b [u8],
  declared_crc: u32,
}
impl Debug for PngRawChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngRawChunk")
      .field("type_", &self.type_)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> PngRawChunk<'b> {
  /// The chunk's type tag.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> PngChunkType {
    self.type_
  }
  /// The chunk's payload.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  /// The CRC stored after the payload.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// The CRC of the type tag and payload.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    png_crc(self.type_.0.iter().copied().chain(self.data.iter().copied()))
  }
}

/// An iterator that produces successive raw chunks from PNG bytes.
///
/// * The iterator ends after the `IEND` chunk, or when the input runs out
///   exactly at a chunk boundary.
/// * A chunk that claims more bytes than remain gives
///   [`FormatError::TruncatedChunk`], and a chunk whose CRC is wrong gives
///   [`FormatError::CrcMismatch`]. After an error the iterator is finished.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PngRawChunkIter<'b> {
  spare: &'b [u8],
  offset: usize,
  finished: bool,
}
impl<'b> PngRawChunkIter<'b> {
  /// Pass the full PNG bytes, the signature is checked and then skipped.
  #[inline]
  pub fn new(bytes: &'b [u8]) -> Result<Self, FormatError> {
    match bytes {
      [137, 80, 78, 71, 13, 10, 26, 10, rest @ ..] => {
        Ok(Self { spare: rest, offset: PNG_SIGNATURE.len(), finished: false })
      }
      _ => Err(FormatError::BadSignature),
    }
  }

  /// Byte offset (from the start of the PNG) of the next chunk to be read.
  #[inline]
  #[must_use]
  pub const fn offset(&self) -> usize {
    self.offset
  }

  fn fail(&mut self, e: FormatError) -> Option<Result<PngRawChunk<'b>, FormatError>> {
    self.finished = true;
    self.spare = &[];
    Some(Err(e))
  }
}
impl<'b> Iterator for PngRawChunkIter<'b> {
  type Item = Result<PngRawChunk<'b>, FormatError>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.finished || self.spare.is_empty() {
      self.finished = true;
      return None;
    }
    let (len_bytes, type_bytes, rest) = match self.spare {
      [l0, l1, l2, l3, t0, t1, t2, t3, rest @ ..] => ([*l0, *l1, *l2, *l3], [*t0, *t1, *t2, *t3], rest),
      _ => return self.fail(FormatError::TruncatedChunk),
    };
    let chunk_len = u32::from_be_bytes(len_bytes) as usize;
    let type_ = PngChunkType(type_bytes);
    // data plus the trailing CRC
    if rest.len() < chunk_len || rest.len() - chunk_len < 4 {
      log::debug!("{type_:?} chunk at offset {} declares {chunk_len} bytes, only {} remain", self.offset, rest.len());
      return self.fail(FormatError::TruncatedChunk);
    }
    let (data, rest) = rest.split_at(chunk_len);
    let (crc_bytes, rest) = rest.split_at(4);
    let declared_crc = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let chunk = PngRawChunk { type_, data, declared_crc };
    let actual_crc = chunk.actual_crc();
    if actual_crc != declared_crc {
      log::debug!(
        "{type_:?} chunk at offset {}: declared CRC {declared_crc:08X}, actual {actual_crc:08X}",
        self.offset
      );
      return self.fail(FormatError::CrcMismatch);
    }
    log::trace!("{type_:?} chunk at offset {}, {chunk_len} bytes", self.offset);
    self.offset += 12 + chunk_len;
    self.spare = rest;
    if type_ == PngChunkType::IEND {
      self.finished = true;
    }
    Some(Ok(chunk))
  }
}
impl core::iter::FusedIterator for PngRawChunkIter<'_> {}
