#![doc = core::include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

macro_rules! trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}

pub mod deflate;

pub use deflate::{
    compress_bound, compress_slice, compress_stateless, stored_bound, DeflateConfig,
    DeflateStream, Histogram, HuffCode, HuffTables, Progress, Raw, StatelessOptions, Wrapper,
};

pub const MIN_WBITS: i32 = 8; // 256b LZ77 window
pub const MAX_WBITS: i32 = 15; // 32kb LZ77 window
pub(crate) const DEF_WBITS: i32 = MAX_WBITS;

pub const MIN_LEVEL: i32 = 0;
pub const MAX_LEVEL: i32 = 3;
pub const DEFAULT_LEVEL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "__internal-fuzz", derive(arbitrary::Arbitrary))]
pub enum Flush {
    /// Blocks may span calls; output is only guaranteed once the stream ends.
    #[default]
    NoFlush = 0,
    /// Close the current block and byte-align the output with an empty stored block.
    SyncFlush = 1,
    /// Like [`Flush::SyncFlush`], but later data never references earlier data.
    FullFlush = 2,
}

impl TryFrom<i32> for Flush {
    type Error = DeflateError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flush::NoFlush),
            1 => Ok(Flush::SyncFlush),
            2 => Ok(Flush::FullFlush),
            _ => Err(DeflateError::InvalidFlush),
        }
    }
}

/// Non-error outcome of a compression call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i32)]
pub enum ReturnCode {
    /// All input was consumed and the requested flush (if any) completed.
    Ok = 0,
    /// The final block and the container trailer have been written.
    StreamEnd = 1,
    /// The output buffer was filled completely; call again with more space.
    BufferFull = 2,
}

impl From<ReturnCode> for i32 {
    fn from(value: ReturnCode) -> Self {
        value as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeflateError {
    #[error("output buffer too small for a one-shot compression")]
    StatelessOverflow,
    #[error("invalid flush mode")]
    InvalidFlush,
    #[error("invalid compression level")]
    InvalidLevel,
    #[error("invalid window size")]
    InvalidWindowBits,
    #[error("no length-limited literal/length code exists for this histogram")]
    InvalidLiteralHuffmanCode,
    #[error("no length-limited distance code exists for this histogram")]
    InvalidDistanceHuffmanCode,
    #[error("no length-limited code-length code exists for this histogram")]
    InvalidHuffmanCode,
    #[error("input supplied after the end of the stream")]
    StreamFinished,
}
