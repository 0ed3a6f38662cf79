//! Pull-based reader of `<changeset>` elements.

use std::io::BufRead;
use std::path::Path;

use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::changeset::RawAttributes;
use crate::config::RECORD_TAG;
use crate::error_handling::StreamParseError;

use super::Compression;

/// Streams the attributes of every `<changeset>` element in document order.
///
/// One scratch buffer is reused for every event and the attributes are copied
/// out before the next event is read, so memory does not grow with the size of
/// the document. Elements with any other tag, text and child elements
/// (`<tag>`, `<discussion>`) are skipped.
///
/// The reader cannot seek; to read the dump again, open it again.
pub struct ChangesetReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    root_seen: bool,
    elements: u64,
    finished: bool,
}

impl ChangesetReader<Box<dyn BufRead + Send>> {
    /// Opens a dump, picking the decompressor from the file extension.
    pub fn open(path: &Path) -> Result<Self, StreamParseError> {
        let (compression, input) =
            Compression::open(path).map_err(|source| StreamParseError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Reading {} (compression: {})",
            path.display(),
            compression.name()
        );
        Ok(Self::new(input))
    }
}

impl<R: BufRead> ChangesetReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::with_capacity(4096),
            depth: 0,
            root_seen: false,
            elements: 0,
            finished: false,
        }
    }

    /// Number of `<changeset>` elements emitted so far.
    pub fn elements_read(&self) -> u64 {
        self.elements
    }

    fn next_record(&mut self) -> Result<Option<RawAttributes>, StreamParseError> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(StreamParseError::Xml {
                        position: self.reader.buffer_position() as u64,
                        message: e.to_string(),
                    })
                }
            };
            let position = self.reader.buffer_position() as u64;

            match event {
                Event::Start(element) => {
                    self.depth += 1;
                    self.root_seen = true;
                    if element.name().as_ref() == RECORD_TAG.as_bytes() {
                        self.elements += 1;
                        return collect_attributes(&element, position).map(Some);
                    }
                }
                Event::Empty(element) => {
                    self.root_seen = true;
                    if element.name().as_ref() == RECORD_TAG.as_bytes() {
                        self.elements += 1;
                        return collect_attributes(&element, position).map(Some);
                    }
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(StreamParseError::Truncated { depth: self.depth });
                    }
                    if !self.root_seen {
                        return Err(StreamParseError::NoRootElement { bytes: position });
                    }
                    debug!("Reached end of document after {} changesets", self.elements);
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for ChangesetReader<R> {
    type Item = Result<RawAttributes, StreamParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(attributes)) => Some(Ok(attributes)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // No recovery mid-document
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn collect_attributes(
    element: &BytesStart<'_>,
    position: u64,
) -> Result<RawAttributes, StreamParseError> {
    let mut attributes = RawAttributes::with_capacity(12);
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| StreamParseError::Attribute {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| StreamParseError::Attribute {
                position,
                message: format!("attribute `{key}`: {e}"),
            })?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}
