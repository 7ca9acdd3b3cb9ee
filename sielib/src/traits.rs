//! Format-neutral read/write traits over `std::io::{Read, Write}`.

use crate::{error::Result, model::Document};
use std::io::{Read, Write};

pub trait ReadFormat {
    fn read<R: Read>(r: R) -> Result<Document>;
}

pub trait WriteFormat {
    fn write<W: Write>(w: W, doc: &Document) -> Result<()>;
}

pub trait Format: ReadFormat + WriteFormat {}
impl<T: ReadFormat + WriteFormat> Format for T {}
