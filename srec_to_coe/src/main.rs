use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use srec_coe::*;

/*
Usage:
  srec_to_coe firmware.srec
  srec_to_coe firmware.srec -out bram_init.coe

  The output defaults to the input path with a .coe extension.
 */

const LOG_ENV: &str = "SREC_TO_COE_LOG";

/// Converts Motorola SREC hex files into Xilinx COE files for memory initialization.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// SREC file to convert
    input: PathBuf,

    /// Explicitly specify the name of the output file
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();

    let args = Args::parse_from(std::env::args_os().map(legacy_flag));
    if let Err(e) = try_main(args) {
        eprintln!("ERROR: {:#}", e);
        eprintln!("Conversion of file failed!");
        process::exit(1);
    }
    println!("Conversion of file successful.");
}

fn try_main(args: Args) -> anyhow::Result<()> {
    let output = args
        .out
        .unwrap_or_else(|| default_output_path(&args.input));
    log::debug!("converting {} -> {}", args.input.display(), output.display());

    convert_file(&args.input, &output).with_context(|| {
        format!(
            "failed to convert {} into {}",
            args.input.display(),
            output.display()
        )
    })?;
    Ok(())
}

/// Older scripts spell the output flag `-out`.
fn legacy_flag(arg: OsString) -> OsString {
    if arg == "-out" {
        OsString::from("--out")
    } else {
        arg
    }
}
