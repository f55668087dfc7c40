use crate::decoders::inflate::Backlog;
use crate::utils::error::{PngTileError, PngTileResult};

/// A run of whole filtered scanlines, cut verbatim from the backlog head.
#[derive(Debug, Clone)]
pub struct ScanlineBlock {
    /// Image row of the first scanline in the block.
    pub first_row: u64,
    pub height: usize,
    pub stride: usize,
    pub data: Vec<u8>,
}

impl ScanlineBlock {
    /// Filter-type byte of the first scanline.
    pub fn filter_type(&self) -> Option<u8> {
        self.data.first().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride)
    }
}

/// Cuts the backlog into blocks of `block_height` scanlines.
#[derive(Debug, Clone)]
pub struct ScanlineAssembler {
    stride: usize,
    block_height: usize,
    next_row: u64,
}

impl ScanlineAssembler {
    pub fn new(stride: usize, block_height: usize) -> Self {
        Self {
            stride,
            block_height,
            next_row: 0,
        }
    }

    /// Rows handed out so far.
    pub fn rows_extracted(&self) -> u64 {
        self.next_row
    }

    /// Extracts the next block if the backlog holds enough bytes for it.
    ///
    /// With `is_final` set a short remainder is returned as a smaller block of
    /// `len / stride` rows; bytes left over after the last whole row are an error.
    pub fn try_extract_block(&mut self, backlog: &mut Backlog, is_final: bool) -> PngTileResult<Option<ScanlineBlock>> {
        let full_block = self.block_height.checked_mul(self.stride).ok_or_else(|| {
            PngTileError::InvalidConfig(format!(
                "block of {} rows with stride {} overflows the address space",
                self.block_height, self.stride
            ))
        })?;
        let available = backlog.len();

        let height = if is_final && available > 0 && available < full_block {
            if available % self.stride != 0 {
                return Err(PngTileError::IncompleteScanline {
                    remaining: available % self.stride,
                    stride: self.stride,
                });
            }

            available / self.stride
        } else {
            self.block_height
        };

        let needed = height * self.stride;
        if height == 0 || available < needed {
            return Ok(None);
        }

        let block = ScanlineBlock {
            first_row: self.next_row,
            height,
            stride: self.stride,
            data: backlog.drain_front(needed),
        };

        self.next_row += height as u64;

        Ok(Some(block))
    }
}
