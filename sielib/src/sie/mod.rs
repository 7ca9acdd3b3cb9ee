//! The SIE 4 codec: bytes to [`Document`] and back.

pub mod checksum;
pub mod encoding;
pub mod reader;
pub mod tokenizer;
pub mod writer;

pub use checksum::checksum;
pub use encoding::{OutputEncoding, SourceEncoding};
pub use reader::Parsed;
pub use writer::WriteOptions;

use crate::{error::Result, model::Document};
use std::io::{Read, Write};

/// SIE 4 in any of its variants. Writes PC8.
pub struct Sie4;

impl crate::traits::ReadFormat for Sie4 {
    fn read<R: Read>(mut r: R) -> Result<Document> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Ok(reader::read_bytes(&bytes)?.document)
    }
}

impl crate::traits::WriteFormat for Sie4 {
    fn write<W: Write>(mut w: W, doc: &Document) -> Result<()> {
        w.write_all(&writer::render(doc, &WriteOptions::default()))?;
        w.flush()?;
        Ok(())
    }
}
