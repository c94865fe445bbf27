//! FlateDecode (zlib/deflate) support.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Inflate FlateDecode stream data.
///
/// Tries zlib first (the spec-mandated wrapper), then falls back to raw
/// deflate: some writers emit streams without the zlib header.
pub fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(zlib_err) => {
            out.clear();
            let mut raw = DeflateDecoder::new(data);
            match raw.read_to_end(&mut out) {
                Ok(_) => {
                    log::debug!("FlateDecode: recovered stream via raw deflate");
                    Ok(out)
                },
                Err(_) => Err(Error::Decode(format!("FlateDecode failed: {}", zlib_err))),
            }
        },
    }
}

/// Deflate data with the zlib wrapper, for writing compressed streams.
pub fn flate_encode(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    encoder.write_all(data).expect("in-memory deflate");
    encoder.finish().expect("in-memory deflate")
}
