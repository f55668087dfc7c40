use crate::decoders::chunk::Chunk;
use crate::decoders::chunk::ChunkType;
use crate::utils::error::{PngTileError, PngTileResult};

pub const HEADER_LENGTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

impl ImageHeader {
    /// Parses the 13 byte IHDR payload.
    pub fn parse(data: &[u8]) -> PngTileResult<ImageHeader> {
        if data.len() != HEADER_LENGTH {
            return Err(PngTileError::MalformedHeader {
                chunk_type: ChunkType::IHDR,
                offset: 0,
                length: data.len(),
            });
        }

        let header = ImageHeader {
            width: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            height: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            bit_depth: data[8],
            color_type: data[9],
            compression_method: data[10],
            filter_method: data[11],
            interlace_method: data[12],
        };

        if header.width == 0 || header.height == 0 {
            return Err(PngTileError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }

        Ok(header)
    }

    /// Parses the header from the first chunk of a stream, which must be IHDR.
    pub fn from_chunk(chunk: &Chunk) -> PngTileResult<ImageHeader> {
        if chunk.chunk_type != ChunkType::IHDR || chunk.len() != HEADER_LENGTH {
            return Err(PngTileError::MalformedHeader {
                chunk_type: chunk.chunk_type,
                offset: chunk.offset,
                length: chunk.len(),
            });
        }

        ImageHeader::parse(&chunk.data)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LENGTH] {
        let mut bytes = [0u8; HEADER_LENGTH];
        bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
        bytes[8] = self.bit_depth;
        bytes[9] = self.color_type;
        bytes[10] = self.compression_method;
        bytes[11] = self.filter_method;
        bytes[12] = self.interlace_method;

        bytes
    }

    pub fn is_interlaced(&self) -> bool {
        self.interlace_method != 0
    }
}

/// Sample layout of the tiles handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    L8,
    La8,
    Rgba8,
}

impl ColorMode {
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::L8 => 1,
            ColorMode::La8 => 2,
            ColorMode::Rgba8 => 4,
        }
    }
}

/// What to emit for 8-bit grey+alpha images.
///
/// The stride always counts both samples; this only picks the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LumaAlphaMode {
    /// Keep the grey sample, emit single-channel tiles.
    #[default]
    Luma,
    /// Emit two-channel tiles.
    LumaAlpha,
    /// Refuse the image.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub bytes_per_pixel: u8,
    pub color_mode: ColorMode,
    /// False when the header fell back to the 1-byte interpretation.
    pub recognized: bool,
}

impl PixelLayout {
    /// Maps (bit depth, color type) to the layout used for striding and output.
    ///
    /// Only 8-bit RGBA and 8-bit grey+alpha are understood. Everything else
    /// is read as one byte per pixel, unless `strict` is set.
    pub fn derive(header: &ImageHeader, luma_alpha: LumaAlphaMode, strict: bool) -> PngTileResult<PixelLayout> {
        let layout = match (header.bit_depth, header.color_type) {
            (8, 6) => PixelLayout {
                bytes_per_pixel: 4,
                color_mode: ColorMode::Rgba8,
                recognized: true,
            },
            (8, 4) => {
                let color_mode = match luma_alpha {
                    LumaAlphaMode::Luma => ColorMode::L8,
                    LumaAlphaMode::LumaAlpha => ColorMode::La8,
                    LumaAlphaMode::Reject => {
                        return Err(PngTileError::UnsupportedLayout {
                            bit_depth: header.bit_depth,
                            color_type: header.color_type,
                        });
                    }
                };

                PixelLayout {
                    bytes_per_pixel: 2,
                    color_mode,
                    recognized: true,
                }
            }
            _ => PixelLayout {
                bytes_per_pixel: 1,
                color_mode: ColorMode::L8,
                recognized: false,
            },
        };

        if strict && (!layout.recognized || header.is_interlaced()) {
            return Err(PngTileError::UnsupportedLayout {
                bit_depth: header.bit_depth,
                color_type: header.color_type,
            });
        }

        Ok(layout)
    }

    /// Bytes per filtered scanline, including the filter-type byte.
    pub fn stride(&self, width: u32) -> usize {
        width as usize * self.bytes_per_pixel as usize + 1
    }

    pub fn channels(&self) -> usize {
        self.color_mode.channels()
    }
}
