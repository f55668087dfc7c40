use crate::decoders::filter::ReconstructedGrid;
use crate::decoders::header::ColorMode;
use crate::utils::error::PngTileResult;

/// One rectangular piece of the image, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub row_index: u32,
    pub col_index: u32,
    /// Image column of the left edge.
    pub x: u32,
    /// Image row of the top edge.
    pub y: u64,
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    pub pixels: Vec<u8>,
}

impl Tile {
    /// File name consumed by downstream tooling: `img_{row}_{col}_.{ext}`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("img_{}_{}_.{}", self.row_index, self.col_index, extension)
    }
}

/// Receives tiles as they are produced.
pub trait TileSink {
    fn write_tile(&mut self, tile: Tile) -> PngTileResult<()>;
}

impl<F> TileSink for F
where
    F: FnMut(Tile) -> PngTileResult<()>,
{
    fn write_tile(&mut self, tile: Tile) -> PngTileResult<()> {
        self(tile)
    }
}

/// Column-wise slices of one reconstructed block.
///
/// Covers `[0, width)` exactly once; the last tile is narrower when the
/// width is not a multiple of the tile width.
pub struct Tiles<'a> {
    grid: &'a ReconstructedGrid,
    row_index: u32,
    tile_width: usize,
    start: usize,
}

impl<'a> Tiles<'a> {
    pub fn new(grid: &'a ReconstructedGrid, row_index: u32, tile_width: u32) -> Self {
        Self {
            grid,
            row_index,
            tile_width: tile_width as usize,
            start: 0,
        }
    }
}

impl Iterator for Tiles<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.tile_width == 0 || self.start >= self.grid.width {
            return None;
        }

        let start = self.start;
        let end = (start + self.tile_width).min(self.grid.width);
        self.start = end;

        let channels = self.grid.channels();
        let tile_width = end - start;
        let mut pixels = Vec::with_capacity(self.grid.height * tile_width * channels);

        for y in 0..self.grid.height {
            let row = self.grid.row(y);
            pixels.extend_from_slice(&row[start * channels..end * channels]);
        }

        Some(Tile {
            row_index: self.row_index,
            col_index: start.div_ceil(self.tile_width) as u32,
            x: start as u32,
            y: self.grid.first_row,
            width: tile_width as u32,
            height: self.grid.height as u32,
            color_mode: self.grid.color_mode,
            pixels,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.tile_width == 0 {
            return (0, Some(0));
        }

        let remaining = self.grid.width.saturating_sub(self.start).div_ceil(self.tile_width);
        (remaining, Some(remaining))
    }
}

/// Slices `grid` into tiles of `tile_width` columns for row band `row_index`.
pub fn tile(grid: &ReconstructedGrid, row_index: u32, tile_width: u32) -> Tiles<'_> {
    Tiles::new(grid, row_index, tile_width)
}
