use super::{fixture::*, rand_bytes};
use mobile_png::{
  decode_png, decode_png_header, decode_png_with_limits,
  png::{PngColorType, PngInterlace},
  ColorKey, DecodeLimits, FormatError, PngError,
};

fn format_err(bytes: &[u8]) -> FormatError {
  match decode_png(bytes) {
    Err(PngError::Format(e)) => e,
    other => panic!("expected a format error, got {other:?}"),
  }
}

/// Every byte distinct enough that a wrong filter shows up.
fn pattern(len: usize) -> Vec<u8> {
  (0..len).map(|i| ((i * 37) ^ (i >> 3)) as u8).collect()
}

fn rgb8_png(width: u32, height: u32) -> (Vec<u8>, Vec<u8>) {
  let raw = pattern(width as usize * height as usize * 3);
  (simple_png(width, height, 8, RGB, &raw, &[0, 1, 2, 3, 4]), raw)
}

#[test]
fn test_single_grey_pixel() {
  let png = simple_png(1, 1, 8, Y, &[128], &[0]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.width, 1);
  assert_eq!(image.height, 1);
  assert_eq!(image.color_type, PngColorType::Y);
  assert_eq!(image.bit_depth, 8);
  assert_eq!(image.pixels, vec![0x80]);
  assert_eq!(image.color_key, None);
  assert_eq!(image.palette_alpha, None);
}

#[test]
fn test_every_filter_type() {
  for filter in 0..=4 {
    let raw = pattern(7 * 6 * 3);
    let png = simple_png(7, 6, 8, RGB, &raw, &[filter]);
    let image = decode_png(&png).unwrap();
    assert_eq!(image.pixels, raw, "filter {filter}");
  }
  // and all of them mixed together, line by line
  let (png, raw) = rgb8_png(11, 10);
  assert_eq!(decode_png(&png).unwrap().pixels, raw);
}

#[test]
fn test_channel_layouts() {
  let raw = pattern(5 * 3 * 4);
  let image = decode_png(&simple_png(5, 3, 8, RGBA, &raw, &[4, 1])).unwrap();
  assert_eq!(image.color_type, PngColorType::RGBA);
  assert_eq!(image.bytes_per_pixel(), 4);
  assert_eq!(image.pixels, raw);

  let raw = pattern(4 * 4 * 2);
  let image = decode_png(&simple_png(4, 4, 8, YA, &raw, &[3])).unwrap();
  assert_eq!(image.color_type, PngColorType::YA);
  assert_eq!(image.channel_count(), 2);
  assert_eq!(image.pixels, raw);
  let rgba = image.to_rgba8().unwrap();
  assert_eq!(rgba.pixels[1], [raw[2], raw[2], raw[2], raw[3]]);
}

#[test]
fn test_sixteen_bit_stays_big_endian() {
  let raw: Vec<u8> = vec![
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, //
    0xFF, 0xFE, 0x00, 0x00, 0x80, 0x00,
  ];
  let image = decode_png(&simple_png(2, 1, 16, RGB, &raw, &[1])).unwrap();
  assert_eq!(image.bit_depth, 16);
  assert_eq!(image.bytes_per_pixel(), 6);
  assert_eq!(image.pixels, raw);
  let rgba = image.to_rgba8().unwrap();
  assert_eq!(rgba.pixels, vec![[0x01, 0x03, 0x05, 255], [0xFF, 0x00, 0x80, 255]]);
}

#[test]
fn test_one_bit_grey_is_scaled() {
  // 10 pixels per row, so the second byte of each row has 6 padding bits.
  let raw = [0b1011_0010, 0b1100_0000, 0b0000_0000, 0b0100_0000];
  let image = decode_png(&simple_png(10, 2, 1, Y, &raw, &[0, 2])).unwrap();
  assert_eq!(image.bit_depth, 8);
  assert_eq!(
    image.pixels,
    vec![
      255, 0, 255, 255, 0, 0, 255, 0, 255, 255, //
      0, 0, 0, 0, 0, 0, 0, 0, 0, 255,
    ]
  );
}

#[test]
fn test_two_bit_grey_color_key() {
  // values 0, 1, 2, 3 scale to 0, 85, 170, 255
  let raw = [0b0001_1011];
  let png = png(&[
    ihdr(4, 1, 2, Y, false),
    chunk(b"tRNS", &[0, 2]),
    chunk(b"IDAT", &zlib(&filter_image(&raw, 1, 1, &[0]))),
    iend(),
  ]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.pixels, vec![0, 85, 170, 255]);
  assert_eq!(image.color_key, Some(ColorKey::Y(170)));
  let alphas: Vec<u8> = image.to_rgba8().unwrap().pixels.iter().map(|p| p[3]).collect();
  assert_eq!(alphas, vec![255, 255, 0, 255]);
}

#[test]
fn test_sixteen_bit_rgb_color_key() {
  let raw = [0x12, 0x34, 0, 0, 0xFF, 0xFF, 0x12, 0x34, 0, 1, 0xFF, 0xFF];
  let png = png(&[
    ihdr(2, 1, 16, RGB, false),
    chunk(b"tRNS", &[0x12, 0x34, 0, 0, 0xFF, 0xFF]),
    chunk(b"IDAT", &zlib(&filter_image(&raw, 12, 6, &[0]))),
    iend(),
  ]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.color_key, Some(ColorKey::RGB([0x1234, 0, 0xFFFF])));
  // only an exact 16 bit match is transparent
  let rgba = image.to_rgba8().unwrap();
  assert_eq!(rgba.pixels, vec![[0x12, 0, 0xFF, 0], [0x12, 0, 0xFF, 255]]);
}

#[test]
fn test_palette_with_transparency() {
  let palette = [255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
  // rows of 5 two-bit indexes: [0, 1, 2, 3, 0] and [3, 2, 1, 0, 1]
  let raw = [0x1B, 0x00, 0xE4, 0x40];
  let png = png(&[
    ihdr(5, 2, 2, INDEX, false),
    chunk(b"PLTE", &palette),
    chunk(b"tRNS", &[0, 128]),
    chunk(b"IDAT", &zlib(&filter_image(&raw, 2, 1, &[0, 4]))),
    iend(),
  ]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.color_type, PngColorType::RGB);
  assert_eq!(image.bit_depth, 8);
  let expected: Vec<u8> = [0, 1, 2, 3, 0, 3, 2, 1, 0, 1]
    .iter()
    .flat_map(|i| palette[i * 3..i * 3 + 3].iter().copied())
    .collect();
  assert_eq!(image.pixels, expected);
  assert_eq!(image.palette_alpha, Some(vec![0, 128, 255, 255, 0, 255, 255, 128, 0, 128]));
  let rgba = image.to_rgba8().unwrap();
  assert_eq!(rgba.pixels[0], [255, 0, 0, 0]);
  assert_eq!(rgba.pixels[1], [0, 255, 0, 128]);
  assert_eq!(rgba.pixels[3], [9, 9, 9, 255]);
}

#[test]
fn test_palette_alphas_must_follow_the_palette() {
  let plte = chunk(b"PLTE", &[10, 20, 30, 40, 50, 60]);
  let trns = chunk(b"tRNS", &[0, 77]);
  let idat = chunk(b"IDAT", &zlib(&filter_image(&[0, 1], 2, 1, &[0])));

  let p = png(&[ihdr(2, 1, 8, INDEX, false), plte.clone(), trns.clone(), idat.clone(), iend()]);
  assert_eq!(decode_png(&p).unwrap().palette_alpha, Some(vec![0, 77]));

  // tRNS before PLTE is ignored, the palette still applies
  let p = png(&[ihdr(2, 1, 8, INDEX, false), trns.clone(), plte.clone(), idat.clone(), iend()]);
  let image = decode_png(&p).unwrap();
  assert_eq!(image.pixels, vec![10, 20, 30, 40, 50, 60]);
  assert_eq!(image.palette_alpha, None);
}

#[test]
fn test_palette_index_out_of_range_is_black() {
  let png = png(&[
    ihdr(2, 1, 8, INDEX, false),
    chunk(b"PLTE", &[10, 20, 30, 40, 50, 60]),
    chunk(b"IDAT", &zlib(&filter_image(&[1, 7], 2, 1, &[0]))),
    iend(),
  ]);
  assert_eq!(decode_png(&png).unwrap().pixels, vec![40, 50, 60, 0, 0, 0]);
}

#[test]
fn test_adam7_matches_plain() {
  for (w, h) in [(1, 1), (2, 3), (5, 5), (8, 8), (9, 11), (17, 3), (3, 17)] {
    let pixels = pattern(w * h * 3);
    let plain = decode_png(&simple_png(w as u32, h as u32, 8, RGB, &pixels, &[2, 4])).unwrap();
    let interlaced = png(&[
      ihdr(w as u32, h as u32, 8, RGB, true),
      chunk(b"IDAT", &zlib(&adam7_filtered(w, h, 3, &pixels, &[1, 4, 3]))),
      iend(),
    ]);
    let interlaced = decode_png(&interlaced).unwrap();
    assert_eq!(interlaced.pixels, pixels, "{w}x{h}");
    assert_eq!(interlaced, plain, "{w}x{h}");
  }
}

#[test]
fn test_adam7_sixteen_bit_grey() {
  let (w, h) = (6, 7);
  let pixels = pattern(w * h * 2);
  let interlaced = png(&[
    ihdr(w as u32, h as u32, 16, Y, true),
    chunk(b"IDAT", &zlib(&adam7_filtered(w, h, 2, &pixels, &[0, 1, 2, 3, 4]))),
    iend(),
  ]);
  assert_eq!(decode_png(&interlaced).unwrap().pixels, pixels);
}

#[test]
fn test_split_image_data() {
  let raw = pattern(6 * 5 * 3);
  let zlib_stream = zlib(&filter_image(&raw, 18, 3, &[4, 0, 1]));
  for split in [1, 2, 7, zlib_stream.len()] {
    let mut chunks = vec![ihdr(6, 5, 8, RGB, false)];
    for piece in zlib_stream.chunks(split) {
      chunks.push(chunk(b"IDAT", piece));
    }
    chunks.push(iend());
    assert_eq!(decode_png(&png(&chunks)).unwrap().pixels, raw, "split {split}");
  }
  // zero length IDAT chunks are legal too
  let png = png(&[
    ihdr(6, 5, 8, RGB, false),
    chunk(b"IDAT", &[]),
    chunk(b"IDAT", &zlib_stream),
    chunk(b"IDAT", &[]),
    iend(),
  ]);
  assert_eq!(decode_png(&png).unwrap().pixels, raw);
}

#[test]
fn test_ancillary_chunks_are_skipped() {
  let raw = pattern(3 * 2);
  let idat = chunk(b"IDAT", &zlib(&filter_image(&raw, 3, 1, &[0])));
  let png = png(&[
    ihdr(3, 2, 8, Y, false),
    chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
    chunk(b"tEXt", b"Comment\0hello"),
    idat,
    chunk(b"tIME", &[7, 0xE6, 1, 2, 3, 4, 5]),
    // too late to count, it's ignored
    chunk(b"tRNS", &[0, 1]),
    iend(),
  ]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.pixels, raw);
  assert_eq!(image.color_key, None);
}

#[test]
fn test_data_after_iend_is_ignored() {
  let (mut png, raw) = rgb8_png(3, 3);
  png.extend_from_slice(b"trailing garbage");
  png.extend(chunk(b"IHDR", &[0; 13]));
  assert_eq!(decode_png(&png).unwrap().pixels, raw);
}

#[test]
fn test_decode_png_header() {
  let (png, _) = rgb8_png(9, 4);
  let header = decode_png_header(&png).unwrap();
  assert_eq!(header.width, 9);
  assert_eq!(header.height, 4);
  assert_eq!(header.bit_depth, 8);
  assert_eq!(header.color_type, PngColorType::RGB);
  assert_eq!(header.interlace, PngInterlace::None);
  // only the header has to be present
  assert_eq!(decode_png_header(&png[..8 + 25]), Ok(header));
  assert_eq!(decode_png_header(&png[..8]), Err(PngError::Format(FormatError::TruncatedChunk)));
  assert_eq!(decode_png_header(b"GIF89a.."), Err(PngError::Format(FormatError::BadSignature)));
}

#[test]
fn test_bad_signature() {
  let (mut png, _) = rgb8_png(2, 2);
  assert_eq!(format_err(&[]), FormatError::BadSignature);
  assert_eq!(format_err(&png[..7]), FormatError::BadSignature);
  png[0] = 0x88;
  assert_eq!(format_err(&png), FormatError::BadSignature);
}

#[test]
fn test_every_crc_byte_is_checked() {
  let (png, _) = rgb8_png(4, 3);
  // walk the chunk framing to find each CRC
  let mut offset = 8;
  let mut crc_offsets = Vec::new();
  while offset < png.len() {
    let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
    crc_offsets.push(offset + 8 + len);
    offset += 12 + len;
  }
  assert_eq!(crc_offsets.len(), 3);
  for crc_offset in crc_offsets {
    for i in 0..4 {
      let mut bad = png.clone();
      bad[crc_offset + i] ^= 0x10;
      assert_eq!(format_err(&bad), FormatError::CrcMismatch, "byte {}", crc_offset + i);
    }
  }
  // damage inside the data is caught by the CRC too
  let mut bad = png.clone();
  bad[8 + 8 + 2] ^= 1;
  assert_eq!(format_err(&bad), FormatError::CrcMismatch);
}

#[test]
fn test_every_truncation_is_detected() {
  let (png, _) = rgb8_png(4, 3);
  for len in 8..png.len() {
    assert_eq!(format_err(&png[..len]), FormatError::TruncatedChunk, "cut at {len}");
  }
  assert!(decode_png(&png).is_ok());
}

#[test]
fn test_chunk_order_errors() {
  let raw = pattern(4);
  let idat = chunk(b"IDAT", &zlib(&filter_image(&raw, 2, 1, &[0])));

  // IHDR must be first
  let p = png(&[idat.clone(), ihdr(2, 2, 8, Y, false), iend()]);
  assert_eq!(format_err(&p), FormatError::MissingHeader);
  let p = png(&[chunk(b"tEXt", b"a\0b"), ihdr(2, 2, 8, Y, false), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::MissingHeader);

  let p = png(&[ihdr(2, 2, 8, Y, false), ihdr(2, 2, 8, Y, false), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::DuplicateChunk);

  // PLTE on a greyscale image
  let p = png(&[ihdr(2, 2, 8, Y, false), chunk(b"PLTE", &[0, 0, 0]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::UnexpectedChunk);

  // IDAT runs must be contiguous
  let p = png(&[ihdr(2, 2, 8, Y, false), idat.clone(), chunk(b"tEXt", b"a\0b"), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::UnexpectedChunk);
  // a chunk the decoder does read ends the run just the same
  let p = png(&[ihdr(2, 2, 8, Y, false), idat.clone(), chunk(b"tRNS", &[0, 1]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::UnexpectedChunk);
  let zlib_stream = zlib(&filter_image(&raw, 2, 1, &[0]));
  let (a, b) = zlib_stream.split_at(zlib_stream.len() / 2);
  let p = png(&[
    ihdr(2, 2, 8, Y, false),
    chunk(b"IDAT", a),
    chunk(b"tRNS", &[0, 1]),
    chunk(b"IDAT", b),
    iend(),
  ]);
  assert_eq!(format_err(&p), FormatError::UnexpectedChunk);

  let p = png(&[ihdr(2, 2, 8, Y, false), chunk(b"WHAT", &[1, 2, 3]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::UnsupportedCriticalChunk);

  let p = png(&[ihdr(2, 2, 8, Y, false), iend()]);
  assert_eq!(format_err(&p), FormatError::MissingImageData);

  // the end is mandatory
  let p = png(&[ihdr(2, 2, 8, Y, false), idat.clone()]);
  assert_eq!(format_err(&p), FormatError::TruncatedChunk);
}

#[test]
fn test_palette_errors() {
  let idat = chunk(b"IDAT", &zlib(&filter_image(&[0, 0], 2, 1, &[0])));

  let p = png(&[ihdr(2, 1, 8, INDEX, false), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::MissingPalette);

  let plte = chunk(b"PLTE", &[1, 2, 3]);
  let p = png(&[ihdr(2, 1, 8, INDEX, false), plte.clone(), plte.clone(), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::DuplicateChunk);

  // PLTE after the image data
  let p = png(&[ihdr(2, 1, 8, INDEX, false), idat.clone(), plte.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::UnexpectedChunk);

  let p = png(&[ihdr(2, 1, 8, INDEX, false), chunk(b"PLTE", &[1, 2]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::BadPalette);

  let p = png(&[ihdr(2, 1, 8, INDEX, false), chunk(b"PLTE", &[]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::BadPalette);

  // a 1 bit image can't have three palette entries
  let idat1 = chunk(b"IDAT", &zlib(&filter_image(&[0], 1, 1, &[0])));
  let p = png(&[ihdr(2, 1, 1, INDEX, false), chunk(b"PLTE", &[0; 9]), idat1, iend()]);
  assert_eq!(format_err(&p), FormatError::BadPalette);
}

#[test]
fn test_bad_headers() {
  let idat = chunk(b"IDAT", &zlib(&[0, 0]));
  for (w, h, depth, color) in [(0, 1, 8, Y), (1, 0, 8, Y), (1, 1, 3, Y), (1, 1, 4, RGB), (1, 1, 8, 5), (1, 1, 16, INDEX)] {
    let p = png(&[ihdr(w, h, depth, color, false), idat.clone(), iend()]);
    assert_eq!(format_err(&p), FormatError::BadHeader, "{w}x{h} depth {depth} color {color}");
  }
  // a 12 byte IHDR
  let p = png(&[chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0]), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::BadHeader);
}

#[test]
fn test_dimension_limits() {
  let idat = chunk(b"IDAT", &zlib(&[0, 0]));
  let p = png(&[ihdr(17_001, 1, 8, Y, false), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::DimensionsTooLarge);
  let p = png(&[ihdr(i32::MAX as u32, i32::MAX as u32, 16, RGBA, false), idat.clone(), iend()]);
  assert_eq!(format_err(&p), FormatError::DimensionsTooLarge);

  let (png, raw) = rgb8_png(8, 8);
  let tight = DecodeLimits { max_width: 8, max_height: 8, max_bytes: 8 * 8 * 3 };
  assert_eq!(decode_png_with_limits(&png, &tight).unwrap().pixels, raw);
  let tighter = DecodeLimits { max_bytes: 8 * 8 * 3 - 1, ..tight };
  assert_eq!(
    decode_png_with_limits(&png, &tighter),
    Err(PngError::Format(FormatError::DimensionsTooLarge))
  );
  let narrow = DecodeLimits { max_width: 7, ..tight };
  assert_eq!(decode_png_with_limits(&png, &narrow), Err(PngError::Format(FormatError::DimensionsTooLarge)));
}

#[test]
fn test_image_data_errors() {
  let raw = pattern(4 * 3);
  let filtered = filter_image(&raw, 4, 1, &[0]);
  let with_idat = |idat_data: &[u8]| png(&[ihdr(4, 3, 8, Y, false), chunk(b"IDAT", idat_data), iend()]);

  assert!(decode_png(&with_idat(&zlib(&filtered))).is_ok());

  // not a zlib stream at all
  assert_eq!(format_err(&with_idat(&[0, 0, 1, 2, 3, 4])), FormatError::InflateError);

  // the Adler-32 at the end of the stream is checked
  let mut bad_adler = zlib(&filtered);
  let last = bad_adler.len() - 1;
  bad_adler[last] ^= 0xFF;
  assert_eq!(format_err(&with_idat(&bad_adler)), FormatError::InflateError);

  // the stream stops partway
  let full = zlib(&filtered);
  assert_eq!(format_err(&with_idat(&full[..full.len() / 2])), FormatError::InflateError);

  // one scanline too few, and one byte too many
  assert_eq!(format_err(&with_idat(&zlib(&filtered[..10]))), FormatError::SizeMismatch);
  let mut long = filtered.clone();
  long.push(0);
  assert_eq!(format_err(&with_idat(&zlib(&long))), FormatError::SizeMismatch);

  let mut bad_filter = filtered.clone();
  bad_filter[5] = 5;
  assert_eq!(format_err(&with_idat(&zlib(&bad_filter))), FormatError::UnknownFilter);
}

#[test]
fn test_random_corruption_never_panics() {
  let (png, raw) = rgb8_png(13, 9);
  for _ in 0..200 {
    let noise = rand_bytes(4);
    let mut bad = png.clone();
    let at = u16::from_le_bytes([noise[0], noise[1]]) as usize % bad.len();
    bad[at] ^= noise[2] | 1;
    if let Ok(image) = decode_png(&bad) {
      // only the (unchecked) contents of trailing bytes could change
      assert_eq!(image.pixels, raw);
    }
  }
  for _ in 0..50 {
    let mut junk = png[..8].to_vec();
    junk.extend(rand_bytes(300));
    let _ = decode_png(&junk);
  }
}

#[test]
fn test_decoding_is_deterministic_across_threads() {
  let (png, raw) = rgb8_png(31, 17);
  let first = decode_png(&png).unwrap();
  assert_eq!(decode_png(&png).unwrap(), first);
  std::thread::scope(|s| {
    let handles: Vec<_> = (0..4).map(|_| s.spawn(|| decode_png(&png).unwrap())).collect();
    for h in handles {
      assert_eq!(h.join().unwrap().pixels, raw);
    }
  });
}

#[cfg(feature = "std")]
#[test]
fn test_decode_png_file() {
  let (png, raw) = rgb8_png(5, 4);
  use mobile_png::{decode_png_file, IoError};
  let path = std::env::temp_dir().join(format!("mobile_png_test_{}.png", std::process::id()));
  std::fs::write(&path, &png).unwrap();
  let image = decode_png_file(&path);
  std::fs::remove_file(&path).unwrap();
  assert_eq!(image.unwrap().pixels, raw);

  assert_eq!(decode_png_file(&path), Err(PngError::Io(IoError::NotFound)));
  assert_eq!(PngError::Io(IoError::NotFound).status(), -30);
}
