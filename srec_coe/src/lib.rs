//! Transcodes Motorola S-record (SREC) files into Xilinx COE memory initialization files.
//!
//! Only `S1` data and `S9` start address records are understood; `S0` header records and
//! lines that are not records are skipped. Checksums are not validated.

mod coe;
mod common;
mod config;
mod convert;
mod hex;
mod parse;

pub use coe::{convert_file, render_coe, write_coe, write_header};
pub use common::{Header, RecordKind};
pub use config::{default_output_path, CoeOptions, OUTPUT_EXTENSION, RADIX, TOOL_NAME};
pub use convert::{convert, convert_reader, gap_len, ReaderLines, Stats, Token, Tokens};
pub use parse::{decode_payload, parse_header, Error, RecordError, RecordResult, Result};
