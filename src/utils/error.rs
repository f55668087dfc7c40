use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

use crate::decoders::chunk::ChunkType;

#[derive(Debug)]
pub enum PngTileError {
    IoError(io::Error),
    TruncatedStream {
        offset: u64,
        chunk_type: Option<ChunkType>,
        expected: usize,
        actual: usize,
    },
    Integrity {
        chunk_type: ChunkType,
        offset: u64,
        stored: u32,
        computed: u32,
    },
    MalformedHeader {
        chunk_type: ChunkType,
        offset: u64,
        length: usize,
    },
    InvalidDimensions { width: u32, height: u32 },
    InvalidChunkLength { offset: u64, length: u32 },
    Decompression { offset: u64, message: String },
    UnsupportedFilter { filter_type: u8, row: u64 },
    UnsupportedLayout { bit_depth: u8, color_type: u8 },
    IncompleteScanline { remaining: usize, stride: usize },
    StrideMismatch { expected: usize, actual: usize },
    InvalidState(String),
    InvalidConfig(String),
    Encode(String),
}

impl Error for PngTileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PngTileError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for PngTileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PngTileError::IoError(err) => write!(f, "I/O error: {}", err),
            PngTileError::TruncatedStream {
                offset,
                chunk_type,
                expected,
                actual,
            } => match chunk_type {
                Some(chunk_type) => write!(
                    f,
                    "Stream truncated inside chunk {} at offset {}: expected {} bytes, got {}",
                    chunk_type, offset, expected, actual
                ),
                None => write!(
                    f,
                    "Stream truncated at offset {}: expected {} bytes, got {}",
                    offset, expected, actual
                ),
            },
            PngTileError::Integrity {
                chunk_type,
                offset,
                stored,
                computed,
            } => write!(
                f,
                "CRC mismatch for chunk {} at offset {}: stored 0x{:08x}, computed 0x{:08x}",
                chunk_type, offset, stored, computed
            ),
            PngTileError::MalformedHeader {
                chunk_type,
                offset,
                length,
            } => write!(
                f,
                "Malformed header chunk {} at offset {}: expected IHDR with 13 bytes, got {} bytes",
                chunk_type, offset, length
            ),
            PngTileError::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            PngTileError::InvalidChunkLength { offset, length } => {
                write!(f, "Invalid chunk length {} at offset {}", length, offset)
            }
            PngTileError::Decompression { offset, message } => {
                write!(f, "Corrupt compressed data in chunk at offset {}: {}", offset, message)
            }
            PngTileError::UnsupportedFilter { filter_type, row } => {
                write!(f, "Unsupported filter type {} on row {}", filter_type, row)
            }
            PngTileError::UnsupportedLayout { bit_depth, color_type } => write!(
                f,
                "Unsupported pixel layout: bit depth {}, color type {}",
                bit_depth, color_type
            ),
            PngTileError::IncompleteScanline { remaining, stride } => write!(
                f,
                "{} trailing bytes do not form a whole scanline (stride {})",
                remaining, stride
            ),
            PngTileError::StrideMismatch { expected, actual } => write!(
                f,
                "Scanline stride {} does not match the image layout (expected {})",
                actual, expected
            ),
            PngTileError::InvalidState(msg) => write!(f, "Invalid decoder state: {}", msg),
            PngTileError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            PngTileError::Encode(msg) => write!(f, "Failed to write tile: {}", msg),
        }
    }
}

impl From<io::Error> for PngTileError {
    fn from(error: io::Error) -> Self {
        PngTileError::IoError(error)
    }
}

impl From<image::ImageError> for PngTileError {
    fn from(error: image::ImageError) -> Self {
        PngTileError::Encode(error.to_string())
    }
}

// Result type alias for tiling operations
pub type PngTileResult<T> = Result<T, PngTileError>;
