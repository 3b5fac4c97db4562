use std::fmt;

/// The S-record types the transcoder understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// `S1`: data with a 16-bit address.
    Data,
    /// `S9`: start address, no payload.
    StartAddress,
}

impl RecordKind {
    pub fn from_int(kind: u8) -> Option<Self> {
        use RecordKind::*;
        match kind {
            1 => Some(Data),
            9 => Some(StartAddress),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RecordKind::*;
        match self {
            Data => write!(f, "Data"),
            StartAddress => write!(f, "StartAddress"),
        }
    }
}

/// The fixed-width front of a record: `S<type><len><addr>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Header {
    pub kind: RecordKind,
    /// Payload length, already excluding the address and checksum bytes.
    pub byte_count: u8,
    pub addr: u16,
}

#[cfg(test)]
pub(crate) mod test {
    use std::path::PathBuf;
    use std::process;
    use std::sync::OnceLock;

    static WORKSPACE_PATH: OnceLock<PathBuf> = OnceLock::new();

    pub fn test_file_path(name: &str) -> PathBuf {
        let workspace_path = WORKSPACE_PATH.get_or_init(|| {
            let output = process::Command::new(env!("CARGO"))
                .arg("locate-project")
                .arg("--workspace")
                .arg("--message-format=plain")
                .output()
                .unwrap()
                .stdout;
            let cargo_toml_path = String::from_utf8(output).unwrap();
            PathBuf::from(cargo_toml_path.trim())
                .parent()
                .unwrap()
                .to_path_buf()
        });

        let mut file_path = workspace_path.clone();
        file_path.push("test_files");
        file_path.push(name);
        file_path
    }
}
