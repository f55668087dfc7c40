pub mod chunk;
pub mod filter;
pub mod header;
pub mod inflate;
pub mod png;
pub mod scanline;
