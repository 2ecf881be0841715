//! Chunk codecs for dataset storage
//!
//! Every chunk file starts with a small frame (method, shuffle flag, raw length)
//! so it can be decoded without consulting the dataset record.

use crate::error::{GeoError, Result};
use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression as FlateCompression;
use serde::{Deserialize, Serialize};
use std::io::Read;

const FRAME_MAGIC: [u8; 2] = *b"GC";
const FRAME_LEN: usize = 8;

/// Compression methods available for dataset chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CompressionMethod {
    /// Raw bytes
    #[default]
    None = 0,
    /// Deflate/ZIP, as HDF5's gzip filter
    Deflate = 1,
    /// Run-length encoding, useful for sparse header columns
    Rle = 2,
    /// Zstandard
    Zstd = 3,
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionMethod::None),
            1 => Some(CompressionMethod::Deflate),
            2 => Some(CompressionMethod::Rle),
            3 => Some(CompressionMethod::Zstd),
            _ => None,
        }
    }
}

/// Compression level (0-9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    pub fn fast() -> Self {
        Self(1)
    }

    pub fn best() -> Self {
        Self(9)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(6)
    }
}

/// Trait for compression/decompression operations
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>>;

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>>;

    fn method(&self) -> CompressionMethod;
}

#[derive(Debug, Default)]
pub struct NoneCompressor;

impl Compressor for NoneCompressor {
    fn compress(&self, data: &[u8], _level: CompressionLevel) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8], _expected_size: usize) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::None
    }
}

#[derive(Debug, Default)]
pub struct DeflateCompressor;

impl Compressor for DeflateCompressor {
    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(data, FlateCompression::new(level.value() as u32));
        let mut out = Vec::new();
        encoder
            .read_to_end(&mut out)
            .map_err(|e| GeoError::Compression(e.to_string()))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(expected_size);
        DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| GeoError::Decompression(e.to_string()))?;
        Ok(out)
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::Deflate
    }
}

#[derive(Debug, Default)]
pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn compress(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        zstd::encode_all(data, level.value() as i32)
            .map_err(|e| GeoError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8], _expected_size: usize) -> Result<Vec<u8>> {
        zstd::decode_all(data).map_err(|e| GeoError::Decompression(e.to_string()))
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::Zstd
    }
}

/// Byte-run encoder: pairs of (run length, byte)
#[derive(Debug, Default)]
pub struct RleCompressor;

impl Compressor for RleCompressor {
    fn compress(&self, data: &[u8], _level: CompressionLevel) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut iter = data.iter().copied().peekable();
        while let Some(byte) = iter.next() {
            let mut run = 1u8;
            while run < u8::MAX && iter.peek() == Some(&byte) {
                iter.next();
                run += 1;
            }
            out.extend_from_slice(&[run, byte]);
        }
        Ok(out)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(GeoError::Decompression(
                "RLE stream has odd length".to_string(),
            ));
        }
        let mut out = Vec::with_capacity(expected_size);
        for pair in data.chunks_exact(2) {
            out.resize(out.len() + pair[0] as usize, pair[1]);
        }
        Ok(out)
    }

    fn method(&self) -> CompressionMethod {
        CompressionMethod::Rle
    }
}

/// Get a compressor for a given method
pub fn get_compressor(method: CompressionMethod) -> Box<dyn Compressor> {
    match method {
        CompressionMethod::None => Box::new(NoneCompressor),
        CompressionMethod::Deflate => Box::new(DeflateCompressor),
        CompressionMethod::Rle => Box::new(RleCompressor),
        CompressionMethod::Zstd => Box::new(ZstdCompressor),
    }
}

/// Byte-plane transpose: groups byte `k` of every element together, which
/// makes float columns far more compressible.
pub fn shuffle(data: &[u8], elem_size: usize) -> Vec<u8> {
    if elem_size <= 1 || data.len() % elem_size != 0 {
        return data.to_vec();
    }
    let n = data.len() / elem_size;
    let mut out = vec![0u8; data.len()];
    for (i, elem) in data.chunks_exact(elem_size).enumerate() {
        for (k, b) in elem.iter().enumerate() {
            out[k * n + i] = *b;
        }
    }
    out
}

/// Inverse of [`shuffle`]
pub fn unshuffle(data: &[u8], elem_size: usize) -> Vec<u8> {
    if elem_size <= 1 || data.len() % elem_size != 0 {
        return data.to_vec();
    }
    let n = data.len() / elem_size;
    let mut out = vec![0u8; data.len()];
    for (i, elem) in out.chunks_exact_mut(elem_size).enumerate() {
        for (k, b) in elem.iter_mut().enumerate() {
            *b = data[k * n + i];
        }
    }
    out
}

/// Codec settings attached to a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChunkCodec {
    pub method: CompressionMethod,
    pub level: CompressionLevel,
    pub shuffle: bool,
}

impl ChunkCodec {
    pub fn new(method: CompressionMethod) -> Self {
        Self {
            method,
            level: CompressionLevel::default(),
            shuffle: method != CompressionMethod::None,
        }
    }

    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Frame and compress one chunk of raw element bytes
    pub fn encode(&self, raw: &[u8], elem_size: usize) -> Result<Vec<u8>> {
        let len = u32::try_from(raw.len())
            .map_err(|_| GeoError::Compression("chunk larger than 4 GiB".to_string()))?;
        let staged = if self.shuffle {
            shuffle(raw, elem_size)
        } else {
            raw.to_vec()
        };
        let body = get_compressor(self.method).compress(&staged, self.level)?;

        let mut out = Vec::with_capacity(FRAME_LEN + body.len());
        out.extend_from_slice(&FRAME_MAGIC);
        out.push(self.method as u8);
        out.push(self.shuffle as u8);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode a framed chunk; the frame, not `self`, decides the method
    pub fn decode(framed: &[u8], elem_size: usize) -> Result<Vec<u8>> {
        if framed.len() < FRAME_LEN || framed[..2] != FRAME_MAGIC {
            return Err(GeoError::InvalidFormat("chunk frame header missing".to_string()));
        }
        let method = CompressionMethod::from_u8(framed[2]).ok_or_else(|| {
            GeoError::InvalidFormat(format!("unknown chunk compression {}", framed[2]))
        })?;
        let shuffled = framed[3] != 0;
        let len = u32::from_le_bytes([framed[4], framed[5], framed[6], framed[7]]) as usize;

        let staged = get_compressor(method).decompress(&framed[FRAME_LEN..], len)?;
        if staged.len() != len {
            return Err(GeoError::Decompression(format!(
                "chunk decoded to {} bytes, frame says {}",
                staged.len(),
                len
            )));
        }
        Ok(if shuffled {
            unshuffle(&staged, elem_size)
        } else {
            staged
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_floats() -> Vec<u8> {
        (0..512)
            .flat_map(|i| ((i as f32) * 0.25).to_le_bytes())
            .collect()
    }

    #[test]
    fn test_deflate_shrinks_repetitive_data() {
        let data = b"trace header ".repeat(100);
        let compressed = DeflateCompressor
            .compress(&data, CompressionLevel::default())
            .unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(DeflateCompressor.decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_rle_long_runs() {
        let mut data = vec![0u8; 600];
        data.extend(vec![7u8; 3]);
        let compressed = RleCompressor.compress(&data, CompressionLevel::default()).unwrap();
        assert!(compressed.len() < 20);
        assert_eq!(RleCompressor.decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_shuffle_is_invertible() {
        let data = sample_floats();
        let s = shuffle(&data, 4);
        assert_ne!(s, data);
        assert_eq!(unshuffle(&s, 4), data);
    }

    #[test]
    fn test_codec_frames_every_method() {
        let data = sample_floats();
        for method in [
            CompressionMethod::None,
            CompressionMethod::Deflate,
            CompressionMethod::Rle,
            CompressionMethod::Zstd,
        ] {
            let framed = ChunkCodec::new(method).encode(&data, 4).unwrap();
            assert_eq!(framed[2], method as u8);
            assert_eq!(ChunkCodec::decode(&framed, 4).unwrap(), data);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ChunkCodec::decode(b"nope", 4),
            Err(GeoError::InvalidFormat(_))
        ));
    }
}
