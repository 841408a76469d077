//! Loading a dump from disk.
//!
//! `sqlite3 .dump` output is often shipped compressed; the codec is picked
//! from the file extension and the text is decoded in one go.

use crate::error::{MigrateError, Result};
use crate::progress::ProgressReader;
use indicatif::ProgressBar;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// On-disk encoding of a dump file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpEncoding {
    Plain,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl DumpEncoding {
    /// `sqlitedata.sql.gz` is gzip, `sqlitedata.sql` is plain text
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => DumpEncoding::Gzip,
            Some("bz2" | "bzip2") => DumpEncoding::Bzip2,
            Some("xz" | "lzma") => DumpEncoding::Xz,
            Some("zst" | "zstd") => DumpEncoding::Zstd,
            _ => DumpEncoding::Plain,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DumpEncoding::Plain => "plain",
            DumpEncoding::Gzip => "gzip",
            DumpEncoding::Bzip2 => "bzip2",
            DumpEncoding::Xz => "xz",
            DumpEncoding::Zstd => "zstd",
        }
    }

    fn decode<'a>(self, raw: Box<dyn Read + 'a>) -> std::io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            DumpEncoding::Plain => raw,
            DumpEncoding::Gzip => Box::new(flate2::read::GzDecoder::new(raw)),
            DumpEncoding::Bzip2 => Box::new(bzip2::read::BzDecoder::new(raw)),
            DumpEncoding::Xz => Box::new(xz2::read::XzDecoder::new(raw)),
            // Only zstd validates its frame header up front
            DumpEncoding::Zstd => Box::new(zstd::stream::read::Decoder::new(raw)?),
        })
    }
}

/// Read the whole dump as UTF-8 text, feeding the spinner if one is shown.
///
/// A missing file is `InputNotFound`; any other failure, including a bad
/// codec stream or invalid UTF-8, is `InputUnreadable`.
pub fn read_dump(path: &Path, progress: Option<&ProgressBar>) -> Result<String> {
    let file = File::open(path).map_err(|e| MigrateError::input(path, e))?;
    let encoding = DumpEncoding::detect(path);
    debug!(encoding = encoding.name(), input = %path.display(), "opening dump");

    let raw: Box<dyn Read> = match progress {
        Some(pb) => {
            let pb = pb.clone();
            Box::new(ProgressReader::new(file, move |bytes| {
                pb.set_message(format!("Reading dump... {} KB", bytes / 1024));
            }))
        }
        None => Box::new(file),
    };

    let mut reader = encoding.decode(raw).map_err(|e| MigrateError::input(path, e))?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| MigrateError::input(path, e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_detects_encoding_from_extension() {
        assert_eq!(DumpEncoding::detect(Path::new("sqlitedata.sql")), DumpEncoding::Plain);
        assert_eq!(DumpEncoding::detect(Path::new("dump.sql.gz")), DumpEncoding::Gzip);
        assert_eq!(DumpEncoding::detect(Path::new("dump.sql.BZ2")), DumpEncoding::Bzip2);
        assert_eq!(DumpEncoding::detect(Path::new("dump.sql.xz")), DumpEncoding::Xz);
        assert_eq!(DumpEncoding::detect(Path::new("dump.sql.zst")), DumpEncoding::Zstd);
    }

    #[test]
    fn test_reads_gzip_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqlitedata.sql.gz");
        let dump = "INSERT INTO T VALUES('1');\n";

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(dump.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        assert_eq!(read_dump(&path, None).unwrap(), dump);
    }

    #[test]
    fn test_corrupt_gzip_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sqlitedata.sql.gz");
        std::fs::write(&path, b"PRAGMA foreign_keys=OFF;").unwrap();

        let err = read_dump(&path, None).unwrap_err();
        assert!(matches!(err, MigrateError::InputUnreadable { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_dump_is_not_found() {
        let err = read_dump(Path::new("/nonexistent/sqlitedata.sql"), None).unwrap_err();
        assert!(matches!(err, MigrateError::InputNotFound { .. }));
    }
}
