use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use log::info;

use crate::config::{CoeOptions, GENERATED_BY_COMMENT, GENERATED_FROM_COMMENT, RADIX};
use crate::convert::{convert_reader, Stats};
use crate::parse::Result;

/// Writes the comment block and the radix/vector directives that open a COE file.
pub fn write_header<W: Write>(writer: &mut W, options: &CoeOptions) -> std::io::Result<()> {
    writeln!(writer, "{GENERATED_FROM_COMMENT} {}", options.source_name)?;
    writeln!(writer, "{GENERATED_BY_COMMENT} {}", options.tool_name)?;
    writeln!(writer)?;
    writeln!(writer, "memory_initialization_radix={RADIX};")?;
    writeln!(writer, "memory_initialization_vector=")
}

/// Streams a complete COE file for the SREC lines in `reader`.
/// On error, `writer` holds a partial file and must be discarded.
pub fn write_coe<R, W>(reader: R, writer: &mut W, options: &CoeOptions) -> Result<Stats>
where
    R: BufRead,
    W: Write,
{
    write_header(writer, options)?;
    let mut tokens = convert_reader(reader);
    for token in tokens.by_ref() {
        writeln!(writer, "{}", token?)?;
    }
    writer.flush()?;
    Ok(tokens.stats())
}

/// Renders the COE text for the SREC lines in `reader`.
pub fn render_coe<R: BufRead>(reader: R, options: &CoeOptions) -> Result<String> {
    let mut rendered = Vec::new();
    write_coe(reader, &mut rendered, options)?;
    // Every byte written comes from ASCII tokens or the UTF-8 header strings.
    Ok(String::from_utf8_lossy(&rendered).into_owned())
}

/// Converts the SREC file at `input` into a COE file at `output`.
///
/// The output file is only created once the whole input has converted successfully.
pub fn convert_file<P, Q>(input: P, output: Q) -> Result<Stats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();
    let options = CoeOptions::new(input.display().to_string());

    let reader = BufReader::new(File::open(input)?);
    let mut rendered = Vec::new();
    let stats = write_coe(reader, &mut rendered, &options)?;
    fs::write(output, rendered)?;

    info!(
        "converted {} -> {}: {} data records, {} data bytes, {} fill bytes",
        input.display(),
        output.display(),
        stats.data_records,
        stats.data_bytes,
        stats.gap_bytes
    );
    Ok(stats)
}
