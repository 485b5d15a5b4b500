//! Stream decompressors.

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};
use xz2::read::XzDecoder;

/// Decodes a gzip stream, including concatenated members.
pub(super) fn gunzip(bytes: &[u8]) -> io::Result<Vec<u8>> {
    read_all(MultiGzDecoder::new(bytes))
}

pub(super) fn unxz(bytes: &[u8]) -> io::Result<Vec<u8>> {
    read_all(XzDecoder::new_multi_decoder(bytes))
}

fn read_all(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}
