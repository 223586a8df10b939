//! Decodes each PNG path given and prints the result.
//!
//! Pass `-v` first to also list every chunk with its declared and actual CRC.

use mobile_png::{decode_png, png::PngRawChunkIter, read_png_file};

fn main() {
  let mut args: Vec<String> = std::env::args().skip(1).collect();
  let verbose = args.first().map(|a| a == "-v").unwrap_or(false);
  if verbose {
    args.remove(0);
  }
  let mut failures = 0;
  for file_arg in args.iter() {
    let path = std::path::Path::new(file_arg);
    print!("Reading `{}`... ", path.display());
    let bytes = match read_png_file(path) {
      Ok(bytes) => {
        println!("got {} bytes.", bytes.len());
        bytes
      }
      Err(e) => {
        println!("{e} (status {})", e.status());
        failures += 1;
        continue;
      }
    };
    if verbose {
      match PngRawChunkIter::new(&bytes) {
        Ok(it) => {
          for (n, chunk_res) in it.enumerate() {
            match chunk_res {
              Ok(chunk) => println!(
                "{n}: {:?}, {} bytes, CRC {:08X}/{:08X}",
                chunk.chunk_type(),
                chunk.data().len(),
                chunk.declared_crc(),
                chunk.actual_crc()
              ),
              Err(e) => println!("{n}: {e:?}"),
            }
          }
        }
        Err(e) => println!("{e:?}"),
      }
    }
    match decode_png(&bytes) {
      Ok(image) => println!(
        "{}x{} {:?} at {} bits, {} pixel bytes",
        image.width,
        image.height,
        image.color_type,
        image.bit_depth,
        image.pixels.len()
      ),
      Err(e) => {
        println!("{e} (status {})", e.status());
        failures += 1;
      }
    }
  }
  if failures > 0 {
    std::process::exit(1);
  }
}
