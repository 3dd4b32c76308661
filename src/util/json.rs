//! JSON file helpers shared by transfer files, mirror tables and config.
//!
//! Reads are scoped to a single `BufReader`; writes go through a temporary
//! file in the destination directory that is persisted only once fully
//! flushed, so a failed save never leaves a truncated file behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::{Error, Result};

/// Remove lines whose first non-blank characters are `//`.
///
/// Line count is preserved (comment lines become empty) so parser
/// error positions still point at the right line.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.trim_start().starts_with("//") {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Read and parse a JSON file.
///
/// Missing files map to [`Error::FileNotFound`], anything unparsable to
/// [`Error::Format`]. With `allow_comments`, `//` lines are stripped first.
pub fn read_json<T: DeserializeOwned>(path: &Path, allow_comments: bool) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parsed = if allow_comments {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::format(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&strip_comments(&text))
    } else {
        serde_json::from_reader(reader)
    };

    parsed.map_err(|e| Error::format(format!("{}: {}", path.display(), e)))
}

/// Serialize `value` as JSON and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        if pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
