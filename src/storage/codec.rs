// src/storage/codec.rs

//! Binary payload formats for URL lists.
//!
//! - Index store: MessagePack, then gzip
//! - Cache tier: MessagePack only

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{AppError, Result};

/// Serialize a URL list without compression.
pub fn encode_list(urls: &[String]) -> Result<Vec<u8>> {
    rmp_serde::to_vec(urls).map_err(AppError::codec)
}

/// Inverse of [`encode_list`].
pub fn decode_list(bytes: &[u8]) -> Result<Vec<String>> {
    rmp_serde::from_slice(bytes).map_err(AppError::codec)
}

/// Serialize and gzip a URL list for the index store.
pub fn compress_urls(urls: &[String]) -> Result<Vec<u8>> {
    let raw = encode_list(urls)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

/// Inverse of [`compress_urls`].
pub fn decompress_urls(bytes: &[u8]) -> Result<Vec<String>> {
    let mut raw = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(AppError::codec)?;
    decode_list(&raw)
}
