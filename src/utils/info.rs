use std::fmt::{self, Display, Formatter};

use crate::decoders::chunk::ChunkType;
use crate::decoders::header::{ImageHeader, PixelLayout};

/// Result of a full decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSummary {
    pub header: ImageHeader,
    pub layout: PixelLayout,
    pub row_bands: u32,
    pub tiles: u64,
    pub rows: u64,
    pub data_chunks: u32,
    pub compressed_bytes: u64,
    pub decompressed_bytes: u64,
}

/// Chunk inventory of a file, read without decompressing.
#[derive(Debug, Clone, PartialEq)]
pub struct PngInfo {
    pub signature: [u8; 8],
    pub header: ImageHeader,
    pub layout: PixelLayout,
    /// Chunk tags in first-seen order with their counts.
    pub chunk_counts: Vec<(ChunkType, u32)>,
}

impl PngInfo {
    pub fn count(&self, chunk_type: ChunkType) -> u32 {
        self.chunk_counts
            .iter()
            .find(|(ty, _)| *ty == chunk_type)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub(crate) fn record(&mut self, chunk_type: ChunkType) {
        match self.chunk_counts.iter_mut().find(|(ty, _)| *ty == chunk_type) {
            Some((_, count)) => *count += 1,
            None => self.chunk_counts.push((chunk_type, 1)),
        }
    }
}

impl Display for PngInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let signature: Vec<String> = self.signature.iter().map(|b| format!("{:02X}", b)).collect();
        writeln!(f, "Signature: {}", signature.join(""))?;

        let header = &self.header;
        writeln!(f, "Width: {}", header.width)?;
        writeln!(f, "Height: {}", header.height)?;
        writeln!(f, "Bit depth: {}", header.bit_depth)?;
        writeln!(f, "Color type: {}", header.color_type)?;
        writeln!(f, "Compression method: {}", header.compression_method)?;
        writeln!(f, "Filter method: {}", header.filter_method)?;
        writeln!(f, "Interlace method: {}", header.interlace_method)?;
        writeln!(
            f,
            "Layout: {} bytes per pixel, {:?}{}",
            self.layout.bytes_per_pixel,
            self.layout.color_mode,
            if self.layout.recognized { "" } else { " (fallback)" }
        )?;

        writeln!(f, "Chunks:")?;
        for (chunk_type, count) in &self.chunk_counts {
            writeln!(f, "  {}: {}", chunk_type, count)?;
        }

        Ok(())
    }
}
