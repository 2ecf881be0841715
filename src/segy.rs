//! SEG-Y file reader
//!
//! ```text
//! 0      3200 B   text header, 40 x 80 characters, EBCDIC or ASCII
//! 3200   400 B    binary header
//! 3600   per trace: 240 B trace header, then nSamp 4-byte samples
//! ```
//!
//! Byte order is taken from the data format code at byte 3224, the text
//! encoding from whichever of the EBCDIC and ASCII space bytes dominates.
//! Extended text headers are not read.

use crate::error::{GeoError, Result};
use crate::headers::{BIN_HEADER_NAMES, TEXT_HEADER_LINES, TEXT_HEADER_LINE_LEN, TRACE_HEADER_NAMES};
use bytes::Buf;
use ndarray::{Array1, Array2};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const TEXT_HEADER_BYTES: usize = 3200;
const BIN_HEADER_BYTES: usize = 400;
const TRACE_HEADER_BYTES: usize = 240;
const DATA_START: u64 = (TEXT_HEADER_BYTES + BIN_HEADER_BYTES) as u64;
const FORMAT_CODE_OFFSET: usize = 24;
const SAMP_NUM_INDEX: usize = 7;

/// Binary header fields stored as (first field, field count, byte offset in
/// the binary header, field width)
const BIN_FIELDS: [(usize, usize, usize, usize); 3] = [(0, 3, 0, 4), (3, 24, 12, 2), (27, 3, 300, 2)];

/// Same for the 78 trace header fields
const TRACE_FIELDS: [(usize, usize, usize, usize); 8] = [
    (0, 7, 0, 4),
    (7, 4, 28, 2),
    (11, 8, 36, 4),
    (19, 2, 68, 2),
    (21, 4, 72, 4),
    (25, 46, 88, 2),
    (71, 5, 180, 4),
    (76, 2, 200, 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    fn i16(self, mut b: &[u8]) -> i16 {
        match self {
            Endian::Big => b.get_i16(),
            Endian::Little => b.get_i16_le(),
        }
    }

    fn i32(self, mut b: &[u8]) -> i32 {
        match self {
            Endian::Big => b.get_i32(),
            Endian::Little => b.get_i32_le(),
        }
    }

    fn u32(self, mut b: &[u8]) -> u32 {
        match self {
            Endian::Big => b.get_u32(),
            Endian::Little => b.get_u32_le(),
        }
    }

    fn field(self, b: &[u8], width: usize) -> f64 {
        if width == 4 {
            self.i32(b) as f64
        } else {
            self.i16(b) as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Ebcdic,
}

/// Sample encodings that can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegyFormat {
    /// Code 1
    IbmFloat,
    /// Code 2
    Int32,
    /// Code 5
    IeeeFloat,
}

impl SegyFormat {
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(SegyFormat::IbmFloat),
            2 => Some(SegyFormat::Int32),
            5 => Some(SegyFormat::IeeeFloat),
            _ => None,
        }
    }
}

/// IBM System/360 single precision to IEEE
pub fn ibm_to_ieee(word: u32) -> f32 {
    let sign = if word >> 31 == 1 { -1.0 } else { 1.0 };
    let exponent = ((word >> 24) & 0x7f) as i32 - 64;
    let mantissa = (word & 0x00ff_ffff) as f64 / 16_777_216.0;
    (sign * mantissa * 16f64.powi(exponent)) as f32
}

/// EBCDIC (code page 37) to ASCII; unmapped bytes become spaces
pub fn ebcdic_to_ascii(c: u8) -> u8 {
    match c {
        0x81..=0x89 => b'a' + (c - 0x81),
        0x91..=0x99 => b'j' + (c - 0x91),
        0xa2..=0xa9 => b's' + (c - 0xa2),
        0xc1..=0xc9 => b'A' + (c - 0xc1),
        0xd1..=0xd9 => b'J' + (c - 0xd1),
        0xe2..=0xe9 => b'S' + (c - 0xe2),
        0xf0..=0xf9 => b'0' + (c - 0xf0),
        0x4a => b'[',
        0x4b => b'.',
        0x4c => b'<',
        0x4d => b'(',
        0x4e => b'+',
        0x4f => b'!',
        0x50 => b'&',
        0x5a => b']',
        0x5b => b'$',
        0x5c => b'*',
        0x5d => b')',
        0x5e => b';',
        0x5f => b'^',
        0x60 => b'-',
        0x61 => b'/',
        0x6a => b'|',
        0x6b => b',',
        0x6c => b'%',
        0x6d => b'_',
        0x6e => b'>',
        0x6f => b'?',
        0x79 => b'`',
        0x7a => b':',
        0x7b => b'#',
        0x7c => b'@',
        0x7d => b'\'',
        0x7e => b'=',
        0x7f => b'"',
        _ => b' ',
    }
}

/// Detected layout of a SEG-Y file
#[derive(Debug, Clone)]
pub struct SegyReader {
    path: PathBuf,
    endian: Endian,
    encoding: TextEncoding,
    format: SegyFormat,
    n_samp: usize,
    n_trc: usize,
}

impl SegyReader {
    /// Inspect the file headers; fails with `InvalidFormat` when the file is
    /// too short or its format code cannot be read in either byte order
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        if len < DATA_START + TRACE_HEADER_BYTES as u64 {
            return Err(GeoError::InvalidFormat(format!(
                "{} is too short for SEG-Y ({} bytes)",
                path.display(),
                len
            )));
        }

        let mut head = vec![0u8; DATA_START as usize];
        file.read_exact(&mut head).await?;
        let (text, bin) = head.split_at(TEXT_HEADER_BYTES);

        let code = &bin[FORMAT_CODE_OFFSET..FORMAT_CODE_OFFSET + 2];
        let endian = [Endian::Big, Endian::Little]
            .into_iter()
            .find(|e| (1..=8).contains(&e.i16(code)))
            .ok_or_else(|| {
                GeoError::InvalidFormat(format!("{} has no readable data format code", path.display()))
            })?;
        let format = SegyFormat::from_code(endian.i16(code)).ok_or_else(|| {
            GeoError::InvalidFormat(format!(
                "{}: sample format code {} is not supported",
                path.display(),
                endian.i16(code)
            ))
        })?;

        let ebcdic_spaces = text.iter().filter(|&&c| c == 0x40).count();
        let ascii_spaces = text.iter().filter(|&&c| c == b' ').count();
        let encoding = if ebcdic_spaces > ascii_spaces {
            TextEncoding::Ebcdic
        } else {
            TextEncoding::Ascii
        };

        let n_samp = parse_bin_header(bin, endian)[SAMP_NUM_INDEX].max(0.0) as usize;
        if n_samp == 0 {
            return Err(GeoError::InvalidFormat(format!(
                "{} declares no samples per trace",
                path.display()
            )));
        }
        let n_trc = ((len - DATA_START) / (TRACE_HEADER_BYTES + 4 * n_samp) as u64) as usize;

        tracing::debug!(
            "SEG-Y {}: {} traces x {} samples, {:?} {:?} {:?}",
            path.display(),
            n_trc,
            n_samp,
            format,
            endian,
            encoding
        );
        Ok(Self {
            path,
            endian,
            encoding,
            format,
            n_samp,
            n_trc,
        })
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn format(&self) -> SegyFormat {
        self.format
    }

    pub fn n_samp(&self) -> usize {
        self.n_samp
    }

    pub fn n_trc(&self) -> usize {
        self.n_trc
    }

    fn trace_bytes(&self) -> usize {
        TRACE_HEADER_BYTES + 4 * self.n_samp
    }

    async fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    /// 40 lines, converted to ASCII and stripped of trailing blanks
    pub async fn text_header(&self) -> Result<Vec<String>> {
        let mut raw = self.read_at(0, TEXT_HEADER_BYTES).await?;
        if self.encoding == TextEncoding::Ebcdic {
            raw.iter_mut().for_each(|c| *c = ebcdic_to_ascii(*c));
        }
        Ok(raw
            .chunks(TEXT_HEADER_LINE_LEN)
            .take(TEXT_HEADER_LINES)
            .map(|line| {
                String::from_utf8_lossy(line)
                    .trim_end_matches([' ', '\0'])
                    .to_string()
            })
            .collect())
    }

    /// Values in `BIN_HEADER_NAMES` order
    pub async fn bin_header(&self) -> Result<Array1<f64>> {
        let raw = self.read_at(TEXT_HEADER_BYTES as u64, BIN_HEADER_BYTES).await?;
        Ok(parse_bin_header(&raw, self.endian))
    }

    /// Headers (`n_trc x 78`) and samples (`nSamp x n_trc`) of traces
    /// `from_trc..from_trc + n_trc`
    pub async fn read_traces(&self, from_trc: usize, n_trc: usize) -> Result<(Array2<f64>, Array2<f32>)> {
        if from_trc + n_trc > self.n_trc {
            return Err(GeoError::Range(format!(
                "traces {}..{} of {} in {}",
                from_trc,
                from_trc + n_trc,
                self.n_trc,
                self.path.display()
            )));
        }
        let stride = self.trace_bytes();
        let raw = self
            .read_at(DATA_START + (from_trc * stride) as u64, n_trc * stride)
            .await?;

        let mut headers = Array2::<f64>::zeros((n_trc, TRACE_HEADER_NAMES.len()));
        let mut traces = Array2::<f32>::zeros((self.n_samp, n_trc));
        for (j, trace) in raw.chunks_exact(stride).enumerate() {
            let (hdr, samples) = trace.split_at(TRACE_HEADER_BYTES);
            for &(first, count, offset, width) in &TRACE_FIELDS {
                for k in 0..count {
                    let at = offset + k * width;
                    headers[[j, first + k]] = self.endian.field(&hdr[at..at + width], width);
                }
            }
            for (i, word) in samples.chunks_exact(4).enumerate() {
                traces[[i, j]] = match self.format {
                    SegyFormat::IbmFloat => ibm_to_ieee(self.endian.u32(word)),
                    SegyFormat::Int32 => self.endian.i32(word) as f32,
                    SegyFormat::IeeeFloat => f32::from_bits(self.endian.u32(word)),
                };
            }
        }
        Ok((headers, traces))
    }
}

fn parse_bin_header(bin: &[u8], endian: Endian) -> Array1<f64> {
    let mut values = Array1::<f64>::zeros(BIN_HEADER_NAMES.len());
    for &(first, count, offset, width) in &BIN_FIELDS {
        for k in 0..count {
            let at = offset + k * width;
            values[first + k] = endian.field(&bin[at..at + width], width);
        }
    }
    values
}
