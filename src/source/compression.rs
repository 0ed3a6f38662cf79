//! Compression detection and streaming decoders.
//!
//! The dump is never decompressed into memory: every codec wraps the open file
//! in a streaming decoder and hands back a buffered reader.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::config::READ_BUFFER_SIZE;

/// Compression of an input dump, chosen from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// `.bz2`, as published by planet.openstreetmap.org. Parallel-compressed
    /// dumps are multi-stream, so all streams are decoded.
    Bzip2,
    /// `.gz`, multi-member.
    Gzip,
    /// Anything else is read as plain XML.
    None,
}

/// Leading bytes of a bzip2 stream (`BZh`, followed by the block size digit).
const BZIP2_MAGIC: &[u8] = b"BZh";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

impl Compression {
    /// Codec named by the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("bz2") => Compression::Bzip2,
            Some("gz") => Compression::Gzip,
            _ => Compression::None,
        }
    }

    /// Codec named by the magic bytes at the start of a stream, if any.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(BZIP2_MAGIC) {
            Some(Compression::Bzip2)
        } else if header.starts_with(GZIP_MAGIC) {
            Some(Compression::Gzip)
        } else {
            None
        }
    }

    /// Human-readable name of this codec (for logging).
    pub fn name(&self) -> &'static str {
        match self {
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
            Compression::None => "none",
        }
    }

    /// Opens `path` as a streaming, decompressing reader.
    ///
    /// The codec is taken from the leading bytes of the file; the extension
    /// only decides when the content carries no known magic.
    pub fn open(path: &Path) -> io::Result<(Self, Box<dyn BufRead + Send>)> {
        let mut file = BufReader::with_capacity(READ_BUFFER_SIZE, File::open(path)?);
        let by_extension = Self::from_path(path);
        let compression = match Self::sniff(file.fill_buf()?) {
            Some(sniffed) => {
                if sniffed != by_extension {
                    warn!(
                        "{} is {} compressed regardless of its extension",
                        path.display(),
                        sniffed.name()
                    );
                }
                sniffed
            }
            None => by_extension,
        };

        let reader: Box<dyn BufRead + Send> = match compression {
            Compression::None => Box::new(file),
            codec => codec.wrap(file),
        };
        Ok((compression, reader))
    }

    /// Wraps an already open compressed source.
    pub fn wrap<R>(&self, source: R) -> Box<dyn BufRead + Send>
    where
        R: io::Read + Send + 'static,
    {
        match self {
            Compression::Bzip2 => Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                bzip2::read::MultiBzDecoder::new(source),
            )),
            Compression::Gzip => Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                flate2::read::MultiGzDecoder::new(source),
            )),
            Compression::None => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, source)),
        }
    }
}
