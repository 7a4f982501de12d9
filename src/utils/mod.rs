//! File handling shared by the reader, the output writers, and the CLI.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use std::convert::AsRef;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use zstd::stream::read::Decoder;

/// Path that stands for standard input.
pub const STDIN: &str = "-";

/// Compression formats recognized by file extension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decompress {
    Zst,
}

impl FromStr for Decompress {
    type Err = Report;
    fn from_str(s: &str) -> Result<Self, Report> {
        match s {
            "zst" => Ok(Decompress::Zst),
            _ext => Err(eyre!("Decompression for {_ext:?} is not implemented yet.")),
        }
    }
}

/// Open a text input for buffered reading.
///
/// `-` reads standard input, a `.zst` extension is decoded on the fly, and
/// anything else is read as plain text.
///
/// ## Examples
///
/// ```rust
/// use std::io::BufRead;
/// let dir = std::env::temp_dir().join("mslib_open_input_doctest");
/// std::fs::create_dir_all(&dir)?;
/// let path = dir.join("input.ms");
/// std::fs::write(&path, "ms 4 1\n")?;
/// let mut reader = mslib::utils::open_input(&path)?;
/// let mut line = String::new();
/// reader.read_line(&mut line)?;
/// assert_eq!(line, "ms 4 1\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn open_input<P>(path: &P) -> Result<Box<dyn BufRead>, Report>
where
    P: AsRef<Path> + Debug,
{
    let path = path.as_ref();
    if path == Path::new(STDIN) {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open input: {path:?}"))
        .suggestion("Use '-' to read the simulation from standard input.")?;

    let ext = path.extension().and_then(|ext| ext.to_str());
    match ext.map(Decompress::from_str) {
        Some(Ok(Decompress::Zst)) => {
            let decoder =
                Decoder::new(file).wrap_err_with(|| format!("Failed to decode: {path:?}"))?;
            Ok(Box::new(BufReader::new(decoder)))
        }
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Create the parent directory of a path, if it doesn't already exist.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory: {parent:?}"))?;
        }
    }
    Ok(())
}
