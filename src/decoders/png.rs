use std::io::Read;

use crate::config::TileConfig;
use crate::decoders::chunk::{ChunkReader, ChunkType, PNG_SIGNATURE};
use crate::decoders::filter::unfilter;
use crate::decoders::header::{ImageHeader, PixelLayout};
use crate::decoders::inflate::{Backlog, InflateStream};
use crate::decoders::scanline::{ScanlineAssembler, ScanlineBlock};
use crate::tiler::{tile, TileSink};
use crate::utils::error::{PngTileError, PngTileResult};
use crate::utils::info::{DecodeSummary, PngInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    AwaitHeader,
    Streaming,
    Done,
    /// A fatal error ended the file; the reader is not touched again.
    Failed,
}

struct Session {
    header: ImageHeader,
    layout: PixelLayout,
    inflater: InflateStream,
    backlog: Backlog,
    assembler: ScanlineAssembler,
    row_bands: u32,
    tiles: u64,
    data_chunks: u32,
    decompressed_bytes: u64,
}

/// Streams a PNG file into tiles, one row band at a time.
///
/// At most one scanline block plus the undecoded backlog is resident.
pub struct PngTileDecoder<R: Read> {
    reader: ChunkReader<R>,
    config: TileConfig,
    state: DecoderState,
    session: Option<Session>,
    summary: Option<DecodeSummary>,
}

impl<R: Read> PngTileDecoder<R> {
    pub fn new(reader: R, config: TileConfig) -> PngTileResult<Self> {
        config.validate()?;

        Ok(Self {
            reader: ChunkReader::new(reader),
            config,
            state: DecoderState::AwaitHeader,
            session: None,
            summary: None,
        })
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn header(&self) -> Option<&ImageHeader> {
        match (&self.session, &self.summary) {
            (Some(session), _) => Some(&session.header),
            (None, Some(summary)) => Some(&summary.header),
            (None, None) => None,
        }
    }

    pub fn layout(&self) -> Option<&PixelLayout> {
        match (&self.session, &self.summary) {
            (Some(session), _) => Some(&session.layout),
            (None, Some(summary)) => Some(&summary.layout),
            (None, None) => None,
        }
    }

    /// Reads the signature and the header chunk. Idempotent once past the header.
    pub fn read_header(&mut self) -> PngTileResult<ImageHeader> {
        self.check_not_failed()?;

        if let Some(session) = &self.session {
            return Ok(session.header);
        }

        if let Some(summary) = &self.summary {
            return Ok(summary.header);
        }

        let session = self.start_session();
        let session = self.track(session)?;
        let header = session.header;
        self.session = Some(session);

        Ok(header)
    }

    /// Decodes the rest of the stream, handing every tile to `sink`.
    ///
    /// Any error aborts the file and moves the decoder to `Failed`.
    pub fn decode<S: TileSink + ?Sized>(&mut self, sink: &mut S) -> PngTileResult<DecodeSummary> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }

        self.check_not_failed()?;

        let result = self.stream_tiles(sink);
        self.track(result)
    }

    fn stream_tiles<S: TileSink + ?Sized>(&mut self, sink: &mut S) -> PngTileResult<DecodeSummary> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => self.start_session()?,
        };

        loop {
            let chunk = self.reader.read_chunk()?;

            match chunk.chunk_type {
                ChunkType::IDAT => {
                    session.data_chunks += 1;
                    let produced = session.inflater.feed(&chunk.data, &mut session.backlog, chunk.offset)?;
                    session.decompressed_bytes += produced as u64;

                    while let Some(block) = session.assembler.try_extract_block(&mut session.backlog, false)? {
                        emit_block(&mut session, &self.config, &block, sink)?;
                    }
                }
                ChunkType::IEND => {
                    while let Some(block) = session.assembler.try_extract_block(&mut session.backlog, true)? {
                        emit_block(&mut session, &self.config, &block, sink)?;
                    }

                    break;
                }
                ChunkType::IHDR => {
                    log::warn!("Ignoring repeated IHDR chunk at offset {}", chunk.offset);
                }
                other => {
                    if other.is_critical() && other != ChunkType::PLTE {
                        log::warn!("Skipping unknown critical chunk {} at offset {}", other, chunk.offset);
                    } else {
                        log::debug!("Skipping chunk {} ({} bytes)", other, chunk.len());
                    }
                }
            }
        }

        if !session.inflater.is_finished() {
            log::warn!("Compressed stream did not terminate before IEND");
        }

        let rows = session.assembler.rows_extracted();
        if rows != session.header.height as u64 {
            log::warn!("Decoded {} rows, header declares {}", rows, session.header.height);
        }

        let summary = DecodeSummary {
            header: session.header,
            layout: session.layout,
            row_bands: session.row_bands,
            tiles: session.tiles,
            rows,
            data_chunks: session.data_chunks,
            compressed_bytes: session.inflater.total_in(),
            decompressed_bytes: session.decompressed_bytes,
        };

        log::info!(
            "Finished: {} rows in {} bands, {} tiles",
            summary.rows,
            summary.row_bands,
            summary.tiles
        );

        self.summary = Some(summary.clone());
        self.state = DecoderState::Done;

        Ok(summary)
    }

    /// Reads every chunk without decompressing and counts them by type.
    ///
    /// Only valid on a decoder that has not read anything yet.
    pub fn inspect(mut self) -> PngTileResult<PngInfo> {
        if self.state != DecoderState::AwaitHeader {
            return Err(PngTileError::InvalidState(format!(
                "inspection needs an unread stream, decoder is {:?}",
                self.state
            )));
        }

        let signature = self.reader.read_signature()?;

        let chunk = self.reader.read_chunk()?;
        let header = ImageHeader::from_chunk(&chunk)?;
        let layout = self.derive_layout(&header)?;

        let mut info = PngInfo {
            signature,
            header,
            layout,
            chunk_counts: Vec::new(),
        };
        info.record(chunk.chunk_type);

        loop {
            let chunk = self.reader.read_chunk()?;
            info.record(chunk.chunk_type);

            if chunk.chunk_type == ChunkType::IEND {
                break;
            }
        }

        Ok(info)
    }

    fn check_not_failed(&self) -> PngTileResult<()> {
        if self.state == DecoderState::Failed {
            return Err(PngTileError::InvalidState(
                "decoding was aborted by an earlier error".to_string(),
            ));
        }

        Ok(())
    }

    fn track<T>(&mut self, result: PngTileResult<T>) -> PngTileResult<T> {
        if result.is_err() {
            self.state = DecoderState::Failed;
            self.session = None;
        }

        result
    }

    fn start_session(&mut self) -> PngTileResult<Session> {
        let signature = self.reader.read_signature()?;
        if signature != PNG_SIGNATURE {
            log::warn!("Unexpected file signature {:02X?}", signature);
        }

        let chunk = self.reader.read_chunk()?;
        let header = ImageHeader::from_chunk(&chunk)?;
        let layout = self.derive_layout(&header)?;

        log::info!(
            "Image {}x{}, bit depth {}, color type {}, {} bytes per pixel, {:?} tiles of {}x{}",
            header.width,
            header.height,
            header.bit_depth,
            header.color_type,
            layout.bytes_per_pixel,
            layout.color_mode,
            self.config.tile_height,
            self.config.tile_width
        );

        self.state = DecoderState::Streaming;

        Ok(Session {
            header,
            layout,
            inflater: InflateStream::new(),
            backlog: Backlog::new(),
            assembler: ScanlineAssembler::new(layout.stride(header.width), self.config.tile_height as usize),
            row_bands: 0,
            tiles: 0,
            data_chunks: 0,
            decompressed_bytes: 0,
        })
    }

    fn derive_layout(&self, header: &ImageHeader) -> PngTileResult<PixelLayout> {
        let layout = PixelLayout::derive(header, self.config.luma_alpha, self.config.strict_layout)?;

        if !layout.recognized {
            log::warn!(
                "Unrecognized bit depth {} / color type {}, reading as 1 byte per pixel",
                header.bit_depth,
                header.color_type
            );
        }

        if header.is_interlaced() {
            log::warn!("Interlaced image, rows will be read in stored order");
        }

        Ok(layout)
    }
}

fn emit_block<S: TileSink + ?Sized>(
    session: &mut Session,
    config: &TileConfig,
    block: &ScanlineBlock,
    sink: &mut S,
) -> PngTileResult<()> {
    let grid = unfilter(block, session.header.width, &session.layout)?;

    log::debug!(
        "Row band {}: rows {}..{}",
        session.row_bands,
        block.first_row,
        block.first_row + block.height as u64
    );

    for tile in tile(&grid, session.row_bands, config.tile_width) {
        log::debug!("tile ({}, {})", tile.row_index, tile.col_index);
        sink.write_tile(tile)?;
        session.tiles += 1;
    }

    session.row_bands += 1;

    Ok(())
}

/// Decodes one PNG stream into tiles.
///
/// Holds no state beyond the call, so independent files can be handed to
/// independent workers.
pub fn decode_tiles<R: Read, S: TileSink + ?Sized>(
    reader: R,
    config: &TileConfig,
    sink: &mut S,
) -> PngTileResult<DecodeSummary> {
    let mut decoder = PngTileDecoder::new(reader, config.clone())?;
    decoder.decode(sink)
}
