//! On-disk cache files
//!
//! Layout: 8 byte magic, 1 byte format version, 1 byte payload kind, then the
//! bincode encoding of the payload. Files are written to a temporary sibling and
//! renamed into place, so a reader never sees a partial write.

use crate::{MapSetError, Result};
use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const MAGIC: [u8; 8] = *b"MAPSET\0\0";
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

/// Payload encoding: fixed-width little-endian integers
fn encoding() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// What a cache file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadKind {
    Feature = 1,
    MapSet = 2,
}

impl PayloadKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(PayloadKind::Feature),
            2 => Some(PayloadKind::MapSet),
            _ => None,
        }
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> MapSetError {
    MapSetError::CorruptCache {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(MapSetError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

fn read_header(reader: &mut impl Read, path: &Path) -> Result<PayloadKind> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            corrupt(path, "file shorter than header")
        } else {
            MapSetError::Io(e)
        }
    })?;

    if header[..MAGIC.len()] != MAGIC {
        return Err(corrupt(path, "bad magic"));
    }
    let version = header[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(corrupt(
            path,
            format!("unsupported format version {version} (expected {FORMAT_VERSION})"),
        ));
    }
    let kind_byte = header[MAGIC.len() + 1];
    PayloadKind::from_byte(kind_byte)
        .ok_or_else(|| corrupt(path, format!("unknown payload kind {kind_byte}")))
}

/// Kind of payload stored at `path`, reading only the header
pub fn peek_kind(path: impl AsRef<Path>) -> Result<PayloadKind> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    read_header(&mut reader, path)
}

pub(crate) fn write<T: Serialize>(path: &Path, kind: PayloadKind, value: &T) -> Result<()> {
    #[cfg(feature = "profiling")]
    profiling::scope!("persist::write");

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temp file on any early return removes it
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        writer.write_all(&MAGIC)?;
        writer.write_all(&[FORMAT_VERSION, kind as u8])?;
        encoding()
            .serialize_into(&mut writer, value)
            .map_err(io::Error::other)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| MapSetError::Io(e.error))?;

    tracing::info!("Saved {:?} cache to {}", kind, path.display());
    Ok(())
}

pub(crate) fn read<T: DeserializeOwned>(path: &Path, expected: PayloadKind) -> Result<T> {
    #[cfg(feature = "profiling")]
    profiling::scope!("persist::read");

    let mut reader = open(path)?;
    let kind = read_header(&mut reader, path)?;
    if kind != expected {
        return Err(corrupt(
            path,
            format!("expected {expected:?} payload, found {kind:?}"),
        ));
    }

    // Lengths inside the payload can never claim more than the file holds
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    let value = encoding()
        .with_limit(payload.len() as u64)
        .reject_trailing_bytes()
        .deserialize(&payload)
        .map_err(|e| corrupt(path, e.to_string()))?;
    tracing::debug!("Loaded {:?} cache from {}", kind, path.display());
    Ok(value)
}
