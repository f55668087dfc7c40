mod config;
pub mod decoders;
pub mod tiler;
mod utils;

pub use config::{TileConfig, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH};
pub use decoders::chunk::{Chunk, ChunkReader, ChunkType, PNG_SIGNATURE};
pub use decoders::filter::{unfilter, FilterType, ReconstructedGrid};
pub use decoders::header::{ColorMode, ImageHeader, LumaAlphaMode, PixelLayout};
pub use decoders::inflate::{Backlog, InflateStream};
pub use decoders::png::{decode_tiles, DecoderState, PngTileDecoder};
pub use decoders::scanline::{ScanlineAssembler, ScanlineBlock};
pub use tiler::{tile, Tile, TileSink, Tiles};
pub use utils::error::{PngTileError, PngTileResult};
pub use utils::info::{DecodeSummary, PngInfo};
pub use utils::logger::Logger;
pub use utils::writer::{TileFormat, TileWriter};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

impl PngTileDecoder<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, config: TileConfig) -> PngTileResult<Self> {
        let file = File::open(path)?;
        PngTileDecoder::new(BufReader::new(file), config)
    }
}
