use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

/// Rendering used for `plist` and `show`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per command.
    Json,
    /// Fixed-width tables and status reports.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// Writes `value` as JSON (json mode) or as the pre-rendered `human` text.
pub fn emit<W: Write, T: Serialize>(out: &mut W, format: OutputFormat, value: &T, human: &str) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, value)?;
            writeln!(out)
        }
        OutputFormat::Human => writeln!(out, "{human}"),
    }
}
