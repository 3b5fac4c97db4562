use std::path::{Path, PathBuf};

/// Name written into the `; using ...` comment of every generated file.
pub const TOOL_NAME: &str = "srec_to_coe";

pub const RADIX: u32 = 16;

pub const OUTPUT_EXTENSION: &str = "coe";

pub(crate) const GENERATED_FROM_COMMENT: &str = "; This program generated from";
pub(crate) const GENERATED_BY_COMMENT: &str = "; using";

/// Per-conversion values rendered into the COE header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoeOptions {
    pub source_name: String,
    pub tool_name: String,
}

impl CoeOptions {
    pub fn new(source_name: impl Into<String>) -> Self {
        CoeOptions {
            source_name: source_name.into(),
            tool_name: TOOL_NAME.to_string(),
        }
    }
}

/// The input path with its extension replaced by `.coe`.
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension(OUTPUT_EXTENSION)
}
