//! Stream reader: incremental decompression and XML parsing of the dump.

mod compression;
mod reader;

pub use compression::Compression;
pub use reader::ChangesetReader;
