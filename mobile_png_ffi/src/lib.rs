//! Links `mobile_png` into the C library artifacts.
//!
//! Android loads the `cdylib` with `System.loadLibrary`, and the iOS Swift
//! package links the `staticlib`. Every exported symbol is declared in
//! `include/mobile_png.h` at the root of the repository.

pub use mobile_png::ffi::*;

#[test]
fn test_symbols_are_reexported() {
  use core::ffi::CStr;
  let ok = unsafe { CStr::from_ptr(mpng_status_message(MPNG_OK)) };
  assert_eq!(ok.to_bytes(), b"ok");
  let status = unsafe { test_read_png_from_memory(b"not a png".as_ptr().cast(), 9) };
  assert_eq!(status, mobile_png::FormatError::BadSignature.status());
}
