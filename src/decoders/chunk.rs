use std::fmt::{self, Debug, Display, Formatter};
use std::io::{ErrorKind, Read};

use crate::utils::error::{PngTileError, PngTileResult};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

// Chunk lengths are limited to 2^31 - 1 by the format
const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

/// Four byte chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    pub const PLTE: ChunkType = ChunkType(*b"PLTE");
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    pub const IEND: ChunkType = ChunkType(*b"IEND");

    /// Critical chunks have an uppercase first letter.
    pub fn is_critical(&self) -> bool {
        self.0[0] & 0x20 == 0
    }
}

impl Display for ChunkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Debug for ChunkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({})", self)
    }
}

#[derive(Debug, Clone)]
pub struct Chunk {
    /// Offset of the length field from the start of the stream.
    pub offset: u64,
    pub chunk_type: ChunkType,
    pub data: Vec<u8>,
    pub crc: u32,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Reads the file signature and then one CRC-checked chunk at a time.
pub struct ChunkReader<R: Read> {
    reader: R,
    offset: u64,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Current position in the underlying stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn read_signature(&mut self) -> PngTileResult<[u8; 8]> {
        let mut signature = [0u8; 8];
        self.read_field(&mut signature, None)?;

        Ok(signature)
    }

    pub fn read_chunk(&mut self) -> PngTileResult<Chunk> {
        let offset = self.offset;

        let mut length = [0u8; 4];
        self.read_field(&mut length, None)?;
        let length = u32::from_be_bytes(length);

        if length > MAX_CHUNK_LENGTH {
            return Err(PngTileError::InvalidChunkLength { offset, length });
        }

        let mut tag = [0u8; 4];
        self.read_field(&mut tag, None)?;
        let chunk_type = ChunkType(tag);

        // A corrupt length must not turn into a huge up-front allocation
        let mut data = Vec::new();
        let read = (&mut self.reader).take(length as u64).read_to_end(&mut data)?;
        self.offset += read as u64;

        if read < length as usize {
            return Err(PngTileError::TruncatedStream {
                offset: self.offset,
                chunk_type: Some(chunk_type),
                expected: length as usize,
                actual: read,
            });
        }

        let mut crc = [0u8; 4];
        self.read_field(&mut crc, Some(chunk_type))?;
        let stored = u32::from_be_bytes(crc);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&tag);
        hasher.update(&data);
        let computed = hasher.finalize();

        if computed != stored {
            return Err(PngTileError::Integrity {
                chunk_type,
                offset,
                stored,
                computed,
            });
        }

        Ok(Chunk {
            offset,
            chunk_type,
            data,
            crc: stored,
        })
    }

    fn read_field(&mut self, buf: &mut [u8], chunk_type: Option<ChunkType>) -> PngTileResult<()> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(PngTileError::TruncatedStream {
                        offset: self.offset + filled as u64,
                        chunk_type,
                        expected: buf.len(),
                        actual: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.offset += filled as u64;

        Ok(())
    }
}
