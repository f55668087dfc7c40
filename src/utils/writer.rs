use std::fs;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};

use crate::decoders::header::ColorMode;
use crate::tiler::{Tile, TileSink};
use crate::utils::error::{PngTileError, PngTileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
}

impl TileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Bmp => "bmp",
            TileFormat::Tiff => "tiff",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            TileFormat::Png => ImageFormat::Png,
            TileFormat::Bmp => ImageFormat::Bmp,
            TileFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Sink that saves every tile as `img_{row}_{col}_.{ext}` inside one directory.
pub struct TileWriter {
    output_dir: PathBuf,
    format: TileFormat,
    created: bool,
    written: usize,
}

impl TileWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, format: TileFormat) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            format,
            created: false,
            written: 0,
        }
    }

    pub fn tile_path(&self, tile: &Tile) -> PathBuf {
        self.output_dir.join(tile.file_name(self.format.extension()))
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn validate_pixel_count(tile: &Tile) -> PngTileResult<()> {
        let expected_size = tile.width as usize * tile.height as usize * tile.color_mode.channels();
        let actual_size = tile.pixels.len();

        if expected_size != actual_size {
            return Err(PngTileError::Encode(format!(
                "Invalid pixel data size for {}x{} tile with {} channels: expected {} bytes, got {}",
                tile.width,
                tile.height,
                tile.color_mode.channels(),
                expected_size,
                actual_size
            )));
        }

        Ok(())
    }
}

impl TileSink for TileWriter {
    fn write_tile(&mut self, tile: Tile) -> PngTileResult<()> {
        TileWriter::validate_pixel_count(&tile)?;

        if !self.created {
            fs::create_dir_all(&self.output_dir)?;
            self.created = true;
        }

        let color_type = match tile.color_mode {
            ColorMode::L8 => ColorType::L8,
            ColorMode::La8 => ColorType::La8,
            ColorMode::Rgba8 => ColorType::Rgba8,
        };

        let path = self.tile_path(&tile);
        image::save_buffer_with_format(
            &path,
            &tile.pixels,
            tile.width,
            tile.height,
            color_type,
            self.format.image_format(),
        )?;

        self.written += 1;
        log::debug!("Wrote {}", path.display());

        Ok(())
    }
}
