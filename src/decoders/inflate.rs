use flate2::{Decompress, FlushDecompress, Status};

use crate::utils::error::{PngTileError, PngTileResult};

const OUTPUT_CHUNK_SIZE: usize = 32 * 1024;

/// Decompressed bytes waiting to be cut into scanline blocks.
#[derive(Debug, Default)]
pub struct Backlog {
    buf: Vec<u8>,
}

impl Backlog {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Removes and returns the first `n` bytes, keeping the rest in order.
    pub fn drain_front(&mut self, n: usize) -> Vec<u8> {
        let rest = self.buf.split_off(n.min(self.buf.len()));
        std::mem::replace(&mut self.buf, rest)
    }

    fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

/// Stateful inflater for the concatenated IDAT payloads of one file.
///
/// Whether the stream carries a zlib wrapper is decided from its first two
/// bytes, so those are held back until both have arrived.
pub struct InflateStream {
    decompress: Option<Decompress>,
    zlib: Option<bool>,
    pending: Vec<u8>,
    finished: bool,
    total_in: u64,
}

impl InflateStream {
    pub fn new() -> Self {
        Self {
            decompress: None,
            zlib: None,
            pending: Vec::new(),
            finished: false,
            total_in: 0,
        }
    }

    /// True once the deflate stream signalled its end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// True if the stream carries a zlib wrapper; `None` until detected.
    pub fn is_zlib(&self) -> Option<bool> {
        self.zlib
    }

    /// Feeds one chunk payload and appends the output to `backlog`.
    ///
    /// `offset` is only used to locate errors. Returns the number of bytes
    /// appended. Input arriving after the end of the stream is ignored.
    pub fn feed(&mut self, payload: &[u8], backlog: &mut Backlog, offset: u64) -> PngTileResult<usize> {
        self.total_in += payload.len() as u64;

        if self.finished {
            if !payload.is_empty() {
                log::warn!("Ignoring {} compressed bytes after end of stream", payload.len());
            }
            return Ok(0);
        }

        if self.decompress.is_none() {
            self.pending.extend_from_slice(payload);

            if self.pending.len() < 2 {
                return Ok(0);
            }

            let zlib = looks_like_zlib(&self.pending);
            self.zlib = Some(zlib);
            log::debug!("Compressed stream is {}", if zlib { "zlib" } else { "raw deflate" });
            self.decompress = Some(Decompress::new(zlib));

            let pending = std::mem::take(&mut self.pending);
            return self.inflate(&pending, backlog, offset);
        }

        self.inflate(payload, backlog, offset)
    }

    fn inflate(&mut self, mut input: &[u8], backlog: &mut Backlog, offset: u64) -> PngTileResult<usize> {
        let decompress = match self.decompress.as_mut() {
            Some(decompress) => decompress,
            None => return Ok(0),
        };

        let out = backlog.as_mut_vec();
        let start_len = out.len();

        loop {
            out.reserve(OUTPUT_CHUNK_SIZE);

            let in_before = decompress.total_in();
            let out_before = decompress.total_out();

            let status = decompress
                .decompress_vec(input, out, FlushDecompress::None)
                .map_err(|e| PngTileError::Decompression {
                    offset,
                    message: e.to_string(),
                })?;

            let consumed = (decompress.total_in() - in_before) as usize;
            let produced = decompress.total_out() - out_before;
            input = &input[consumed..];

            if status == Status::StreamEnd {
                self.finished = true;

                if !input.is_empty() {
                    log::warn!("Ignoring {} compressed bytes after end of stream", input.len());
                }
                break;
            }

            if consumed == 0 && produced == 0 {
                break;
            }
        }

        Ok(out.len() - start_len)
    }
}

fn looks_like_zlib(head: &[u8]) -> bool {
    match head {
        [cmf, flg, ..] => {
            let method = cmf & 0x0F;
            let window = cmf >> 4;
            let check = (u16::from(*cmf) << 8) | u16::from(*flg);

            method == 8 && window <= 7 && check % 31 == 0
        }
        _ => true,
    }
}

impl Default for InflateStream {
    fn default() -> Self {
        Self::new()
    }
}
