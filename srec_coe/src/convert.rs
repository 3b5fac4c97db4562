use std::fmt;
use std::io::{self, BufRead};
use std::iter::Map;
use std::vec;

use log::{debug, warn};

use crate::common::RecordKind;
use crate::parse::{decode_payload, parse_header, Error, Result};

const RECORD_START: &[u8] = b"S";
const HEADER_RECORD_START: &[u8] = b"S0";

/// One entry of the COE memory initialization vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token {
    /// Rendered as `XX,`.
    Byte(u8),
    /// The closing `00;` sentinel.
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Byte(value) => write!(f, "{value:02X},"),
            Token::End => write!(f, "00;"),
        }
    }
}

/// Running totals for a conversion pass.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stats {
    pub data_records: usize,
    pub data_bytes: usize,
    pub gap_bytes: usize,
}

/// Raw lines of a reader, without the `\n` or `\r\n` terminator.
pub type ReaderLines<R> = Map<io::Split<R>, fn(io::Result<Vec<u8>>) -> io::Result<Vec<u8>>>;

/// Transcodes in-memory SREC lines.
pub fn convert<I, L>(lines: I) -> Tokens<Map<I::IntoIter, fn(L) -> io::Result<L>>>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    Tokens::new(lines.into_iter().map(Ok::<L, io::Error> as fn(L) -> io::Result<L>))
}

/// Transcodes SREC lines read from `reader`. Read errors end the pass.
///
/// Lines are read as bytes, so text in non-record lines need not be UTF-8.
pub fn convert_reader<R: BufRead>(reader: R) -> Tokens<ReaderLines<R>> {
    Tokens::new(reader.split(b'\n').map(strip_cr as fn(io::Result<Vec<u8>>) -> io::Result<Vec<u8>>))
}

fn strip_cr(line: io::Result<Vec<u8>>) -> io::Result<Vec<u8>> {
    let mut line = line?;
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(line)
}

/// Number of zero bytes needed to move from `current` up to `target`.
pub fn gap_len(current: u16, target: u16) -> u32 {
    target.saturating_sub(current) as u32
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Scanning,
    Done,
}

/// Lazily yields the COE tokens for a sequence of SREC lines.
///
/// Each data record first yields its gap fill, then its payload. Once the lines run out a
/// single [`Token::End`] is yielded. The first error is yielded in place of any further
/// tokens, so a failed pass never ends with the sentinel.
pub struct Tokens<I> {
    lines: I,
    line_no: usize,
    cursor: u16,
    gap: u32,
    payload: vec::IntoIter<u8>,
    state: State,
    stats: Stats,
}

impl<I, L> Tokens<I>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<[u8]>,
{
    fn new(lines: I) -> Self {
        Tokens {
            lines,
            line_no: 0,
            cursor: 0,
            gap: 0,
            payload: Vec::new().into_iter(),
            state: State::Scanning,
            stats: Stats::default(),
        }
    }

    /// Address following the last data record read so far.
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn process_line(&mut self, line: &[u8]) -> Result<()> {
        if !line.starts_with(RECORD_START) {
            debug!("line {}: not a record, skipped", self.line_no);
            return Ok(());
        }
        if line.starts_with(HEADER_RECORD_START) {
            debug!("line {}: S0 header record, skipped", self.line_no);
            return Ok(());
        }

        let header = parse_header(line).map_err(|kind| Error::malformed(self.line_no, kind))?;
        match header.kind {
            RecordKind::Data => {
                let payload = decode_payload(line, header.byte_count)
                    .map_err(|kind| Error::malformed(self.line_no, kind))?;
                self.emit_gap_fill(header.addr);
                self.emit_payload(payload);
            }
            RecordKind::StartAddress => {
                debug!("line {}: start address {:#06x}", self.line_no, header.addr);
            }
        }
        Ok(())
    }

    fn emit_gap_fill(&mut self, target: u16) {
        if target < self.cursor {
            warn!(
                "line {}: record at {:#06x} overlaps data ending at {:#06x}",
                self.line_no, target, self.cursor
            );
            return;
        }
        let gap = gap_len(self.cursor, target);
        if gap > 0 {
            debug!(
                "line {}: filling {} bytes from {:#06x} to {:#06x}",
                self.line_no, gap, self.cursor, target
            );
        }
        self.gap = gap;
        self.stats.gap_bytes += gap as usize;
        self.cursor = target;
    }

    fn emit_payload(&mut self, payload: Vec<u8>) {
        self.stats.data_records += 1;
        self.stats.data_bytes += payload.len();
        // The byte count fits in a u8, so this only wraps at the top of the address space.
        self.cursor = self.cursor.wrapping_add(payload.len() as u16);
        self.payload = payload.into_iter();
    }

    fn halt(&mut self, error: Error) -> Option<Result<Token>> {
        self.state = State::Done;
        self.gap = 0;
        self.payload = Vec::new().into_iter();
        Some(Err(error))
    }
}

impl<I, L> Iterator for Tokens<I>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<[u8]>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == State::Done {
                return None;
            }
            if self.gap > 0 {
                self.gap -= 1;
                return Some(Ok(Token::Byte(0)));
            }
            if let Some(value) = self.payload.next() {
                return Some(Ok(Token::Byte(value)));
            }

            match self.lines.next() {
                None => {
                    self.state = State::Done;
                    return Some(Ok(Token::End));
                }
                Some(Err(e)) => return self.halt(Error::Io(e)),
                Some(Ok(line)) => {
                    self.line_no += 1;
                    if let Err(e) = self.process_line(line.as_ref()) {
                        return self.halt(e);
                    }
                }
            }
        }
    }
}
