use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{DeflateError, Flush, ReturnCode, DEF_WBITS, MAX_LEVEL, MAX_WBITS, MIN_WBITS};

use self::algorithm::{BlockTables, BlockType, ConstantRun, DirectSink};
use self::bit_writer::{BitWriter, PendingBits, BIT_WRITER_MARGIN};
use self::header::{write_stored_header, MAX_HEADER_BYTES};
use self::icf::{IcfBuffer, IcfSink};
use self::matcher::{MatchInput, MatchParams, Matcher, SymbolSink};
use self::tables::{dist_symbol, length_symbol, STD_MAX_MATCH};
use self::window::Window;

mod algorithm;
mod bit_writer;
mod compare258;
mod hash_calc;
mod header;
mod huffman;
mod icf;
mod matcher;
mod tables;
mod window;

pub use self::tables::{Histogram, HuffCode, HuffTables};

/// Distance a match may reach back at most.
const HIST_SIZE: usize = 1 << MAX_WBITS;

/// Input bytes after which a deferred block is closed. A final match may overshoot this, the
/// block still fits in a single stored block.
const MAX_BLOCK_INPUT: usize = algorithm::MAX_STORED - STD_MAX_MATCH;

/// Bytes that must follow a position before it is matched, unless the input is being flushed.
const LOOKAHEAD: usize = 288;

/// Records needed for one block of a constant run.
const CONSTANT_RECORDS: usize = MAX_BLOCK_INPUT / STD_MAX_MATCH + 3;

/// With this little output space left, codes go through the staging buffer.
const STAGING_THRESHOLD: usize = 16;

const STAGING_SIZE: usize = 64;

/// Bytes a stored block adds to its data: the block type padded to a byte, LEN and NLEN.
const STORED_BLOCK_OVERHEAD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// symbols are written as they are found, with a table that is known up front
    Direct,
    /// symbols are collected per block, and coded with the cheapest table for that block
    Deferred,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub(crate) mode: Mode,
    pub(crate) params: MatchParams,
    /// intermediate records per block. A record covers at least one input byte, so with
    /// `MAX_BLOCK_INPUT` records a deferred block is closed by its input length.
    pub(crate) icf_records: usize,
}

impl Config {
    const fn new(
        mode: Mode,
        hash_bits: u8,
        min_match: u8,
        max_chain: u16,
        limit_hash_update: bool,
        icf_records: usize,
    ) -> Self {
        Config {
            mode,
            params: MatchParams {
                hash_bits,
                min_match,
                max_chain,
                limit_hash_update,
            },
            icf_records,
        }
    }

    fn window_size(&self) -> usize {
        match self.mode {
            Mode::Direct => 2 * HIST_SIZE + 2 * LOOKAHEAD,
            // a whole block stays available for a stored fallback
            Mode::Deferred => 2 * HIST_SIZE + MAX_BLOCK_INPUT + 2 * LOOKAHEAD,
        }
    }
}

pub(crate) const CONFIGURATION_TABLE: [Config; 4] = [
    Config::new(Mode::Direct, 13, 4, 1, true, 0), // 0
    Config::new(Mode::Deferred, 15, 4, 1, true, MAX_BLOCK_INPUT), // 1
    Config::new(Mode::Deferred, 15, 4, 4, false, MAX_BLOCK_INPUT), // 2
    Config::new(Mode::Deferred, 16, 3, 16, false, MAX_BLOCK_INPUT), // 3
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "__internal-fuzz", derive(arbitrary::Arbitrary))]
pub struct DeflateConfig {
    /// 0 to 3, or -1 for the default level
    pub level: i32,
    /// base-2 logarithm of the history size, 8 to 15. Negative values mean the same.
    pub window_bits: i32,
}

#[cfg(any(test, feature = "__internal-test"))]
impl quickcheck::Arbitrary for DeflateConfig {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let levels: Vec<_> = (-1..=MAX_LEVEL).collect();
        let window_bits: Vec<_> = (MIN_WBITS..=MAX_WBITS)
            .chain(-MAX_WBITS..=-MIN_WBITS)
            .collect();

        Self {
            level: *g.choose(&levels).unwrap(),
            window_bits: *g.choose(&window_bits).unwrap(),
        }
    }
}

impl DeflateConfig {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    fn validate(self) -> Result<(Config, u32), DeflateError> {
        let level = match self.level {
            -1 => crate::DEFAULT_LEVEL,
            level if (crate::MIN_LEVEL..=MAX_LEVEL).contains(&level) => level,
            _ => return Err(DeflateError::InvalidLevel),
        };

        let window_bits = self.window_bits.unsigned_abs();
        if !(MIN_WBITS as u32..=MAX_WBITS as u32).contains(&window_bits) {
            return Err(DeflateError::InvalidWindowBits);
        }

        Ok((CONFIGURATION_TABLE[level as usize], window_bits))
    }
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            level: -1,
            window_bits: DEF_WBITS,
        }
    }
}

/// Container framing around the deflate data, for instance a gzip header and trailer.
pub trait Wrapper {
    /// Bytes written before the first block. Called at the start of every stream, including
    /// after [`DeflateStream::reset`].
    fn header(&mut self) -> Vec<u8>;

    /// Called with the input bytes consumed by a call, in stream order.
    fn update(&mut self, consumed: &[u8]);

    /// Bytes written after the final block.
    fn trailer(&mut self, total_in: u64) -> Vec<u8>;
}

/// A bare deflate stream without any container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Raw;

impl Wrapper for Raw {
    fn header(&mut self) -> Vec<u8> {
        Vec::new()
    }

    fn update(&mut self, _consumed: &[u8]) {}

    fn trailer(&mut self, _total_in: u64) -> Vec<u8> {
        Vec::new()
    }
}

/// The outcome of one [`DeflateStream::deflate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// bytes taken from the input
    pub consumed: usize,
    /// bytes written to the output
    pub produced: usize,
    pub code: ReturnCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Init,
    ContainerHeader,
    NewHeader,
    Header,
    Body,
    FlushReadBuffer,
    CreateHeader,
    FlushIcfBuffer,
    Type0Header,
    Type0Body,
    SyncFlush,
    FlushWriteBuffer,
    Trailer,
    End,
}

#[derive(Debug)]
enum Step {
    Continue,
    OutputFull,
    NeedInput,
}

#[derive(Debug)]
struct Block {
    block_type: BlockType,
    last: bool,
    /// the symbols are in the icf buffer
    deferred: bool,
    /// header bits written so far
    header_pos: usize,
    /// input bytes of the block, as absolute stream offsets
    start: u64,
    end: u64,
    /// the input bytes are still in the window, so the block may be stored
    raw: bool,
    stored_pos: u64,
    /// bytes left in the current stored chunk
    stored_left: usize,
    stored_started: bool,
    /// the flush that closed the block
    flush: Flush,
}

impl Block {
    const fn new(start: u64) -> Self {
        Self {
            block_type: BlockType::Default,
            last: false,
            deferred: false,
            header_pos: 0,
            start,
            end: start,
            raw: false,
            stored_pos: start,
            stored_left: 0,
            stored_started: false,
            flush: Flush::NoFlush,
        }
    }
}

/// Input of one call, and the wrapper that sees the consumed part.
struct Io<'a, W> {
    input: &'a [u8],
    consumed: usize,
    /// input bytes already passed to the wrapper
    reported: usize,
    wrapper: &'a mut W,
    /// total input before this call
    total_in: u64,
}

impl<W: Wrapper> Io<'_, W> {
    fn remaining(&self) -> &[u8] {
        &self.input[self.consumed..]
    }

    fn exhausted(&self) -> bool {
        self.consumed == self.input.len()
    }

    fn report(&mut self) {
        if self.reported < self.consumed {
            self.wrapper.update(&self.input[self.reported..self.consumed]);
            self.reported = self.consumed;
        }
    }
}

struct State {
    status: Status,
    config: Config,

    /// bits that did not make a whole output byte yet
    bits: PendingBits,

    window: Window,
    matcher: Matcher,
    icf: IcfBuffer,
    tables: BlockTables,

    /// installed with `set_hufftables`, used from the next block on
    installed: Option<HuffTables>,

    block: Block,

    flush: Flush,
    end_of_stream: bool,
    /// a sync point was written and no input was consumed since
    flushed: bool,

    constant: Option<ConstantRun>,

    /// container bytes that are copied to the output unchanged
    verbatim: Vec<u8>,
    verbatim_pos: usize,
}

impl State {
    fn new(config: Config, window_bits: u32) -> Self {
        Self {
            status: Status::Init,
            config,
            bits: PendingBits::default(),
            window: Window::new(config.window_size()),
            matcher: Matcher::new(config.params, window_bits),
            icf: IcfBuffer::new(Ord::max(config.icf_records, CONSTANT_RECORDS)),
            tables: BlockTables::new(HuffTables::builtin()),
            installed: None,
            block: Block::new(0),
            flush: Flush::NoFlush,
            end_of_stream: false,
            flushed: false,
            constant: None,
            verbatim: Vec::new(),
            verbatim_pos: 0,
        }
    }

    fn reset(&mut self) {
        self.status = Status::Init;
        self.bits = PendingBits::default();
        self.window.reset();
        self.matcher.reset(0);
        self.icf.clear();
        self.block = Block::new(0);
        self.flush = Flush::NoFlush;
        self.end_of_stream = false;
        self.flushed = false;
        self.constant = None;
        self.verbatim.clear();
        self.verbatim_pos = 0;
    }

    fn constant_left(&self) -> usize {
        self.constant.map_or(0, |run| run.remaining())
    }

    fn step<W: Wrapper>(&mut self, io: &mut Io<W>, writer: &mut BitWriter) -> Step {
        match self.status {
            Status::Init => {
                self.verbatim = io.wrapper.header();
                self.verbatim_pos = 0;
                self.status = Status::ContainerHeader;
                Step::Continue
            }
            Status::ContainerHeader => {
                if !self.write_verbatim(writer) {
                    return Step::OutputFull;
                }
                self.status = Status::NewHeader;
                Step::Continue
            }
            Status::NewHeader => self.new_header(io),
            Status::Header => self.write_header(writer),
            Status::Body => self.body(io, writer),
            Status::FlushReadBuffer => self.flush_read_buffer(writer),
            Status::CreateHeader => self.create_header(io),
            Status::FlushIcfBuffer => self.flush_icf_buffer(writer),
            Status::Type0Header => self.type0_header(writer),
            Status::Type0Body => self.type0_body(writer),
            Status::SyncFlush => self.sync_flush(writer),
            Status::FlushWriteBuffer => {
                if writer.pending_count() > 0 && writer.remaining() == 0 {
                    return Step::OutputFull;
                }
                writer.flush();

                // the trailer covers every consumed byte
                io.report();
                self.verbatim = io.wrapper.trailer(io.total_in + io.consumed as u64);
                self.verbatim_pos = 0;
                self.status = Status::Trailer;
                Step::Continue
            }
            Status::Trailer => {
                if !self.write_verbatim(writer) {
                    return Step::OutputFull;
                }
                self.status = Status::End;
                Step::Continue
            }
            Status::End => Step::Continue,
        }
    }

    fn write_verbatim(&mut self, writer: &mut BitWriter) -> bool {
        let rest = &self.verbatim[self.verbatim_pos..];
        let n = Ord::min(rest.len(), writer.remaining());
        writer.write_bytes(&rest[..n]);
        self.verbatim_pos += n;

        self.verbatim_pos == self.verbatim.len()
    }

    fn new_header<W: Wrapper>(&mut self, io: &mut Io<W>) -> Step {
        if let Some(tables) = self.installed.take() {
            self.tables.default = tables;
        }

        if self.constant.is_none()
            && self.end_of_stream
            && io.total_in == 0
            && io.consumed == 0
            && self.window.filled_abs() == 0
        {
            if let Some(byte) = algorithm::is_constant(io.input) {
                trace!("constant run of {} bytes of {byte:#04x}", io.input.len());
                self.constant = Some(ConstantRun::new(byte, io.input.len()));
                io.consumed = io.input.len();
                self.flushed = false;
            }
        }

        let start = self.window.processed_abs();

        if let Some(run) = self.constant.as_mut().filter(|run| run.remaining() > 0) {
            self.icf.clear();
            run.fill(&mut self.icf, MAX_BLOCK_INPUT);
            self.block = Block::new(start);
            self.status = Status::CreateHeader;
            return Step::Continue;
        }

        if self.window.unprocessed() == 0 && io.exhausted() {
            if self.end_of_stream {
                // the final block is empty
                self.icf.clear();
                self.block = Block::new(start);
                self.status = Status::CreateHeader;
            } else if self.flush != Flush::NoFlush && !self.flushed {
                self.block = Block::new(start);
                self.block.flush = self.flush;
                self.status = Status::SyncFlush;
            } else {
                return Step::NeedInput;
            }

            return Step::Continue;
        }

        self.block = Block::new(start);
        match self.config.mode {
            Mode::Direct => {
                self.block.block_type = BlockType::Default;
                self.block.last = self.end_of_stream;
                self.status = Status::Header;
            }
            Mode::Deferred => {
                self.icf.clear();
                self.block.raw = true;
                self.status = Status::Body;
            }
        }

        Step::Continue
    }

    fn write_header(&mut self, writer: &mut BitWriter) -> Step {
        let header = &self.tables.get(self.block.block_type).header;

        while self.block.header_pos < header.bit_len() {
            if writer.is_full() {
                return Step::OutputFull;
            }

            let (value, n) = header.chunk(self.block.header_pos, self.block.last);
            writer.write(value, n);
            self.block.header_pos += n as usize;
        }

        self.status = match self.block.deferred {
            true => Status::FlushIcfBuffer,
            false => Status::Body,
        };

        Step::Continue
    }

    fn body<W: Wrapper>(&mut self, io: &mut Io<W>, writer: &mut BitWriter) -> Step {
        let history_start = self
            .window
            .processed_abs()
            .saturating_sub(HIST_SIZE as u64);
        let keep_from = match self.config.mode {
            Mode::Direct => history_start,
            Mode::Deferred => Ord::min(self.block.start, history_start),
        };

        if !io.exhausted() {
            let n = self.window.read(io.remaining(), keep_from);
            io.consumed += n;
            if n > 0 {
                self.flushed = false;
            }
        }

        let flushing = self.end_of_stream || self.flush != Flush::NoFlush;
        let draining = flushing && io.exhausted();

        let filled = self.window.filled().len();
        let end = match draining {
            true => filled,
            false => filled.saturating_sub(LOOKAHEAD),
        };

        let mut pos = self.window.processed();
        let input = MatchInput {
            data: self.window.filled(),
            base: self.window.base(),
        };

        let done = pos >= end
            || match self.config.mode {
                Mode::Direct => {
                    let mut sink = DirectSink {
                        writer: &mut *writer,
                        tables: &self.tables.default,
                    };
                    self.matcher.run(input, &mut pos, end, &mut sink)
                }
                Mode::Deferred => {
                    let mut sink = IcfSink {
                        buffer: &mut self.icf,
                        max_input: MAX_BLOCK_INPUT,
                    };
                    self.matcher.run(input, &mut pos, end, &mut sink)
                }
            };

        self.window.set_processed(pos);

        if !done {
            return match self.config.mode {
                Mode::Direct => Step::OutputFull,
                Mode::Deferred => {
                    // the block is full
                    self.block.flush = Flush::NoFlush;
                    self.status = Status::FlushReadBuffer;
                    Step::Continue
                }
            };
        }

        if draining {
            self.block.flush = self.flush;
            self.status = Status::FlushReadBuffer;
            return Step::Continue;
        }

        if io.exhausted() {
            return Step::NeedInput;
        }

        Step::Continue
    }

    fn flush_read_buffer(&mut self, writer: &mut BitWriter) -> Step {
        match self.config.mode {
            Mode::Direct => {
                if writer.is_full() {
                    return Step::OutputFull;
                }

                let (bits, count) = self.tables.default.end_of_block();
                writer.write(bits, count);
                self.after_block()
            }
            Mode::Deferred => {
                self.status = Status::CreateHeader;
                Step::Continue
            }
        }
    }

    fn create_header<W: Wrapper>(&mut self, io: &Io<W>) -> Step {
        self.block.last = self.end_of_stream
            && io.exhausted()
            && self.window.unprocessed() == 0
            && self.constant_left() == 0;

        if self.block.raw {
            self.block.end = self.window.processed_abs();
        }

        let raw_len = match self.block.raw {
            true => Some((self.block.end - self.block.start) as usize),
            false => None,
        };

        self.block.block_type = algorithm::choose_block_type(&self.icf, raw_len, &mut self.tables);
        self.block.deferred = true;
        self.block.header_pos = 0;

        self.status = match self.block.block_type {
            BlockType::Stored => {
                self.block.stored_pos = self.block.start;
                self.block.stored_started = false;
                Status::Type0Header
            }
            _ => Status::Header,
        };

        Step::Continue
    }

    fn flush_icf_buffer(&mut self, writer: &mut BitWriter) -> Step {
        let tables = self.tables.get(self.block.block_type);

        if !algorithm::write_records(writer, &mut self.icf, tables) || writer.is_full() {
            return Step::OutputFull;
        }

        let (bits, count) = tables.end_of_block();
        writer.write(bits, count);

        self.after_block()
    }

    fn type0_header(&mut self, writer: &mut BitWriter) -> Step {
        let left = (self.block.end - self.block.stored_pos) as usize;
        if left == 0 && self.block.stored_started {
            return self.after_block();
        }

        if writer.is_full() {
            return Step::OutputFull;
        }

        let len = Ord::min(left, algorithm::MAX_STORED);
        let last = self.block.last && len == left;
        write_stored_header(writer, last, len as u16);

        self.block.stored_started = true;
        self.block.stored_left = len;
        self.status = Status::Type0Body;

        Step::Continue
    }

    fn type0_body(&mut self, writer: &mut BitWriter) -> Step {
        let n = Ord::min(self.block.stored_left, writer.remaining());
        let start = self.block.stored_pos;
        writer.write_bytes(self.window.range_abs(start, start + n as u64));

        self.block.stored_pos += n as u64;
        self.block.stored_left -= n;

        if self.block.stored_left > 0 {
            return Step::OutputFull;
        }

        self.status = Status::Type0Header;
        Step::Continue
    }

    fn after_block(&mut self) -> Step {
        self.status = if self.block.last {
            Status::FlushWriteBuffer
        } else if self.constant_left() > 0 {
            Status::NewHeader
        } else if self.block.flush != Flush::NoFlush {
            Status::SyncFlush
        } else {
            Status::NewHeader
        };

        Step::Continue
    }

    fn sync_flush(&mut self, writer: &mut BitWriter) -> Step {
        if writer.is_full() {
            return Step::OutputFull;
        }

        write_stored_header(writer, false, 0);

        if self.block.flush == Flush::FullFlush {
            let floor = self.window.processed_abs();
            trace!("full flush, history starts at {floor}");
            self.matcher.reset(floor);
        }

        self.block.flush = Flush::NoFlush;
        self.flushed = true;
        self.status = Status::NewHeader;

        Step::Continue
    }
}

/// Holds output bytes when the caller's buffer is too small to write codes into directly.
struct Staging {
    buf: [u8; STAGING_SIZE],
    start: usize,
    end: usize,
}

impl Staging {
    const fn new() -> Self {
        Self {
            buf: [0; STAGING_SIZE],
            start: 0,
            end: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn drain(&mut self, output: &mut [u8]) -> usize {
        let n = Ord::min(self.end - self.start, output.len());
        output[..n].copy_from_slice(&self.buf[self.start..][..n]);
        self.start += n;
        n
    }

    fn fill(&mut self, n: usize) {
        debug_assert!(self.is_empty());
        self.start = 0;
        self.end = n;
    }
}

/// A resumable compressor.
///
/// Input and output buffers of any size can be passed to [`DeflateStream::deflate`], the state
/// between calls lives in the stream.
pub struct DeflateStream<W: Wrapper = Raw> {
    state: Box<State>,
    staging: Staging,
    wrapper: W,
    total_in: u64,
    total_out: u64,
}

impl DeflateStream<Raw> {
    pub fn new(config: DeflateConfig) -> Result<Self, DeflateError> {
        Self::with_wrapper(config, Raw)
    }
}

impl<W: Wrapper> DeflateStream<W> {
    pub fn with_wrapper(config: DeflateConfig, wrapper: W) -> Result<Self, DeflateError> {
        let (config, window_bits) = config.validate()?;

        Ok(Self {
            state: Box::new(State::new(config, window_bits)),
            staging: Staging::new(),
            wrapper,
            total_in: 0,
            total_out: 0,
        })
    }

    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    pub fn wrapper(&self) -> &W {
        &self.wrapper
    }

    /// Use `tables` for level 0 blocks, starting with the next block.
    ///
    /// The tables must be able to encode every symbol, like the ones from
    /// [`HuffTables::from_histogram`].
    pub fn set_hufftables(&mut self, tables: HuffTables) -> Result<(), DeflateError> {
        if !tables.is_complete() {
            return Err(DeflateError::InvalidLiteralHuffmanCode);
        }

        self.state.installed = Some(tables);
        Ok(())
    }

    /// Start a new stream with the same configuration. Installed tables are kept.
    pub fn reset(&mut self) {
        self.state.reset();
        self.staging = Staging::new();
        self.total_in = 0;
        self.total_out = 0;
    }

    /// Compress as much of `input` into `output` as possible.
    ///
    /// With `flush` other than [`Flush::NoFlush`] all consumed input is written out, ending in a
    /// byte aligned sync point. Once `end_of_stream` is passed it stays in effect; the stream ends
    /// when [`ReturnCode::StreamEnd`] is returned.
    pub fn deflate(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: Flush,
        end_of_stream: bool,
    ) -> Result<Progress, DeflateError> {
        let state = &mut *self.state;

        if state.status == Status::End && !input.is_empty() {
            return Err(DeflateError::StreamFinished);
        }

        state.flush = flush;
        state.end_of_stream |= end_of_stream;

        let mut io = Io {
            input,
            consumed: 0,
            reported: 0,
            wrapper: &mut self.wrapper,
            total_in: self.total_in,
        };

        let mut produced = 0;
        let mut need_input = false;

        let code = loop {
            produced += self.staging.drain(&mut output[produced..]);
            if !self.staging.is_empty() {
                break ReturnCode::BufferFull;
            }

            if state.status == Status::End {
                break ReturnCode::StreamEnd;
            }

            if need_input {
                break ReturnCode::Ok;
            }

            let space = output.len() - produced;
            if space == 0 {
                break ReturnCode::BufferFull;
            }

            let step = if space > STAGING_THRESHOLD {
                let mut writer = BitWriter::new(&mut output[produced..], state.bits);
                let step = state.step(&mut io, &mut writer);
                let (n, bits) = writer.finish();
                produced += n;
                state.bits = bits;
                step
            } else {
                let mut writer = BitWriter::new(&mut self.staging.buf, state.bits);
                let step = state.step(&mut io, &mut writer);
                let (n, bits) = writer.finish();
                self.staging.fill(n);
                state.bits = bits;
                step
            };

            need_input = matches!(step, Step::NeedInput);
        };

        io.report();

        self.total_in += io.consumed as u64;
        self.total_out += produced as u64;

        Ok(Progress {
            consumed: io.consumed,
            produced,
            code,
        })
    }
}

/// Options of a [`compress_stateless`] call.
#[derive(Debug, Clone, Copy)]
pub struct StatelessOptions<'a> {
    /// Required when `end_of_stream` is false: the output then ends in a sync point, and further
    /// chunks can be appended to it.
    pub flush: Flush,
    pub end_of_stream: bool,
    /// level 0 tables; the builtin table is used when `None`
    pub tables: Option<&'a HuffTables>,
}

impl Default for StatelessOptions<'_> {
    fn default() -> Self {
        Self {
            flush: Flush::NoFlush,
            end_of_stream: true,
            tables: None,
        }
    }
}

/// Compress `input` into a complete raw deflate stream.
pub fn compress_slice<'a>(
    output: &'a mut [u8],
    input: &[u8],
    config: DeflateConfig,
) -> Result<&'a mut [u8], DeflateError> {
    compress_stateless(output, input, config, StatelessOptions::default())
}

/// Compress `input` in one go. The output does not refer to data of earlier calls.
///
/// When the compressed data does not fit, or is longer than the input written as stored blocks,
/// the input is written as stored blocks if [`stored_bound`] bytes are available (plus an empty
/// stored block for a chunk that does not end the stream).
pub fn compress_stateless<'a>(
    output: &'a mut [u8],
    input: &[u8],
    config: DeflateConfig,
    options: StatelessOptions,
) -> Result<&'a mut [u8], DeflateError> {
    let (config, window_bits) = config.validate()?;

    if !options.end_of_stream && options.flush == Flush::NoFlush {
        return Err(DeflateError::InvalidFlush);
    }

    if options.tables.is_some_and(|tables| !tables.is_complete()) {
        return Err(DeflateError::InvalidLiteralHuffmanCode);
    }

    // a chunk that does not end the stream still ends in a sync point
    let sync_point = !options.end_of_stream && !input.is_empty();
    let stored_len = stored_bound(input.len()) + usize::from(sync_point) * STORED_BLOCK_OVERHEAD;

    let written = match stateless_blocks(output, input, config, window_bits, &options) {
        Some(n) if n <= stored_len => n,
        _ if output.len() >= stored_len => {
            trace!("stored blocks are shorter or the only fit, rewriting {} bytes", input.len());

            let mut writer = BitWriter::new(output, PendingBits::default());
            algorithm::write_stored_blocks(&mut writer, input, options.end_of_stream);
            if sync_point {
                write_stored_header(&mut writer, false, 0);
            }
            writer.finish().0
        }
        Some(n) => n,
        None => return Err(DeflateError::StatelessOverflow),
    };

    Ok(&mut output[..written])
}

/// `None` when the output is too small.
fn stateless_blocks(
    output: &mut [u8],
    input: &[u8],
    config: Config,
    window_bits: u32,
    options: &StatelessOptions,
) -> Option<usize> {
    let mut writer = BitWriter::new(output, PendingBits::default());
    let mut matcher = Matcher::new(config.params, window_bits);

    let default = match options.tables {
        Some(tables) => tables.clone(),
        None => HuffTables::builtin(),
    };
    let mut tables = BlockTables::new(default);

    let last = options.end_of_stream;
    let data = MatchInput {
        data: input,
        base: 0,
    };

    match algorithm::is_constant(input).filter(|_| last) {
        Some(byte) => {
            let mut run = ConstantRun::new(byte, input.len());
            let mut icf = IcfBuffer::new(CONSTANT_RECORDS);

            while run.remaining() > 0 {
                icf.clear();
                run.fill(&mut icf, MAX_BLOCK_INPUT);

                let block_type = algorithm::choose_block_type(&icf, None, &mut tables);
                let block_last = run.remaining() == 0;
                write_deferred_block(&mut writer, &mut icf, tables.get(block_type), block_last)?;
            }
        }
        None if input.is_empty() => {
            if last {
                let mut icf = IcfBuffer::new(0);
                let block_type = algorithm::choose_block_type(&icf, None, &mut tables);
                write_deferred_block(&mut writer, &mut icf, tables.get(block_type), true)?;
            }
        }
        None => match config.mode {
            Mode::Direct => {
                write_header(&mut writer, &tables.default, last)?;

                let mut sink = DirectSink {
                    writer: &mut writer,
                    tables: &tables.default,
                };
                if !matcher.run(data, &mut 0, input.len(), &mut sink) {
                    return None;
                }

                write_end_of_block(&mut writer, &tables.default)?;
            }
            Mode::Deferred => {
                let mut icf = IcfBuffer::new(config.icf_records);
                let mut pos = 0;

                loop {
                    let start = pos;

                    icf.clear();
                    let mut sink = IcfSink {
                        buffer: &mut icf,
                        max_input: MAX_BLOCK_INPUT,
                    };
                    matcher.run(data, &mut pos, input.len(), &mut sink);

                    let raw = &input[start..pos];
                    let block_last = last && pos == input.len();

                    match algorithm::choose_block_type(&icf, Some(raw.len()), &mut tables) {
                        BlockType::Stored => {
                            let needed = algorithm::stored_block_bits(raw.len()).div_ceil(8);
                            if needed as usize > writer.remaining() {
                                return None;
                            }
                            algorithm::write_stored_blocks(&mut writer, raw, block_last);
                        }
                        block_type => {
                            let block_tables = tables.get(block_type);
                            write_deferred_block(&mut writer, &mut icf, block_tables, block_last)?;
                        }
                    }

                    if pos == input.len() {
                        break;
                    }
                }
            }
        },
    }

    if last {
        if writer.pending_count() > 0 && writer.remaining() == 0 {
            return None;
        }
        writer.flush();
    } else {
        if writer.is_full() {
            return None;
        }
        write_stored_header(&mut writer, false, 0);
    }

    Some(writer.finish().0)
}

fn write_header(writer: &mut BitWriter, tables: &HuffTables, last: bool) -> Option<()> {
    // one extra byte for the bits still pending in the writer
    if writer.remaining() < tables.header_bits().div_ceil(8) + 1 {
        return None;
    }

    tables.header.write_all(writer, last);
    Some(())
}

fn write_end_of_block(writer: &mut BitWriter, tables: &HuffTables) -> Option<()> {
    if writer.is_full() {
        return None;
    }

    let (bits, count) = tables.end_of_block();
    writer.write(bits, count);

    Some(())
}

fn write_deferred_block(
    writer: &mut BitWriter,
    icf: &mut IcfBuffer,
    tables: &HuffTables,
    last: bool,
) -> Option<()> {
    write_header(writer, tables, last)?;

    if !algorithm::write_records(writer, icf, tables) {
        return None;
    }

    write_end_of_block(writer, tables)
}

/// Output size that is always enough for a raw stream of `source_len` input bytes.
pub fn compress_bound(source_len: usize) -> usize {
    stored_bound(source_len)
        // level 0 codes may be up to 13 bits per literal
        .wrapping_add((source_len.wrapping_mul(5)).div_ceil(8))
        .wrapping_add(MAX_HEADER_BYTES)
        // end of block, a trailing empty block or sync point, and the bit writer margin
        .wrapping_add(2 * BIT_WRITER_MARGIN + 8)
}

/// Output size needed to write `source_len` bytes as stored blocks.
pub fn stored_bound(source_len: usize) -> usize {
    let blocks = Ord::max(1, source_len.div_ceil(algorithm::MAX_STORED));

    source_len.wrapping_add(blocks * STORED_BLOCK_OVERHEAD)
}

impl SymbolSink for Histogram {
    fn is_full(&self) -> bool {
        false
    }

    fn literal(&mut self, byte: u8) {
        self.add_literal(byte);
    }

    fn copy(&mut self, len: usize, dist: usize) {
        let (len_code, _, _) = length_symbol(len);
        let (dist_code, _, _) = dist_symbol(dist);
        self.add_copy(len_code, dist_code);
    }
}

impl Histogram {
    /// Count the symbols that level 1 finds in `data`.
    ///
    /// Sampling representative data and passing the result to [`HuffTables::from_histogram`] gives
    /// level 0 tables that fit that data.
    pub fn update(&mut self, data: &[u8]) {
        let mut matcher = Matcher::new(CONFIGURATION_TABLE[1].params, MAX_WBITS as u32);
        let input = MatchInput { data, base: 0 };
        matcher.run(input, &mut 0, data.len(), self);
    }
}
