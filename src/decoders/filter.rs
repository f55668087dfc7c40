use crate::decoders::header::{ColorMode, PixelLayout};
use crate::decoders::scanline::ScanlineBlock;
use crate::utils::error::{PngTileError, PngTileResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub fn from_u8(value: u8) -> Option<FilterType> {
        match value {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }
}

/// Defiltered pixels of one scanline block, row-major, `channels` samples per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedGrid {
    pub first_row: u64,
    pub width: usize,
    pub height: usize,
    pub color_mode: ColorMode,
    pub pixels: Vec<u8>,
}

impl ReconstructedGrid {
    pub fn channels(&self) -> usize {
        self.color_mode.channels()
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let row_len = self.width * self.channels();
        &self.pixels[y * row_len..(y + 1) * row_len]
    }
}

/// Reverses the Sub filter in place: each byte gains the reconstructed byte
/// one pixel to its left, modulo 256.
pub fn decode_sub_filter(row: &mut [u8], bytes_per_pixel: usize) {
    for i in bytes_per_pixel..row.len() {
        row[i] = row[i].wrapping_add(row[i - bytes_per_pixel]);
    }
}

/// Defilters every scanline of `block` and drops the filter-type column.
///
/// Only Sub is supported; any other filter byte fails with the image row it was found on.
pub fn unfilter(block: &ScanlineBlock, width: u32, layout: &PixelLayout) -> PngTileResult<ReconstructedGrid> {
    let expected_stride = layout.stride(width);
    if block.stride != expected_stride {
        return Err(PngTileError::StrideMismatch {
            expected: expected_stride,
            actual: block.stride,
        });
    }

    let width = width as usize;
    let bytes_per_pixel = layout.bytes_per_pixel as usize;
    let row_bytes = width * bytes_per_pixel;
    let channels = layout.channels();

    let mut pixels = Vec::with_capacity(block.height * width * channels);
    let mut decoded = vec![0u8; row_bytes];

    for (y, scanline) in block.rows().enumerate() {
        let filter_byte = scanline[0];

        match FilterType::from_u8(filter_byte) {
            Some(FilterType::Sub) => {}
            _ => {
                return Err(PngTileError::UnsupportedFilter {
                    filter_type: filter_byte,
                    row: block.first_row + y as u64,
                });
            }
        }

        decoded.copy_from_slice(&scanline[1..]);
        decode_sub_filter(&mut decoded, bytes_per_pixel);

        if channels == bytes_per_pixel {
            pixels.extend_from_slice(&decoded);
        } else {
            // Fewer output channels than stored samples: keep the leading ones
            for pixel in decoded.chunks_exact(bytes_per_pixel) {
                pixels.extend_from_slice(&pixel[..channels]);
            }
        }
    }

    Ok(ReconstructedGrid {
        first_row: block.first_row,
        width,
        height: block.height,
        color_mode: layout.color_mode,
        pixels,
    })
}
