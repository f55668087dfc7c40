use crate::decoders::header::LumaAlphaMode;
use crate::utils::error::{PngTileError, PngTileResult};

pub const DEFAULT_TILE_HEIGHT: u32 = 512;
pub const DEFAULT_TILE_WIDTH: u32 = 512;

#[derive(Debug, Clone, PartialEq)]
pub struct TileConfig {
    /// Rows per scanline block, and so per tile.
    pub tile_height: u32,
    /// Columns per tile.
    pub tile_width: u32,
    pub luma_alpha: LumaAlphaMode,
    /// Fail instead of falling back on unrecognized layouts or interlaced input.
    pub strict_layout: bool,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_height: DEFAULT_TILE_HEIGHT,
            tile_width: DEFAULT_TILE_WIDTH,
            luma_alpha: LumaAlphaMode::default(),
            strict_layout: false,
        }
    }
}

impl TileConfig {
    pub fn new(tile_height: u32, tile_width: u32) -> Self {
        Self {
            tile_height,
            tile_width,
            ..Self::default()
        }
    }

    pub fn with_luma_alpha(mut self, luma_alpha: LumaAlphaMode) -> Self {
        self.luma_alpha = luma_alpha;
        self
    }

    pub fn with_strict_layout(mut self, strict_layout: bool) -> Self {
        self.strict_layout = strict_layout;
        self
    }

    pub fn validate(&self) -> PngTileResult<()> {
        if self.tile_height == 0 || self.tile_width == 0 {
            return Err(PngTileError::InvalidConfig(format!(
                "tile size must be positive, got {}x{}",
                self.tile_height, self.tile_width
            )));
        }

        Ok(())
    }
}
