// src/source.rs
// Random-access reads over a CFS file handle

use std::io::{Read, Seek, SeekFrom};

use crate::error::{CfsError, Result};
use crate::primitive::{decode_field, Fields};
use crate::structure::{layout_size, FieldLayout};

/// Byte source addressed by absolute offsets.
///
/// Every read names its own offset, so nested reads never depend on where a
/// previous read left the underlying cursor. The seek is skipped when the
/// cursor already sits at `offset`, so buffered readers keep their buffer
/// across contiguous reads.
pub struct ByteSource<R> {
    inner: R,
    /// Cursor position after the last successful read
    pos: Option<u64>,
}

impl<R: Read + Seek> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        ByteSource { inner, pos: None }
    }

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// The buffer only grows with bytes actually present, so a corrupt length
    /// ends in `Truncated` rather than a huge allocation.
    pub fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if self.pos != Some(offset) {
            self.pos = None;
            self.inner.seek(SeekFrom::Start(offset))?;
        }

        let mut buf = Vec::new();
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| {
                self.pos = None;
                CfsError::Io(e)
            })?;
        if read < len {
            self.pos = None;
            return Err(CfsError::Truncated {
                offset,
                needed: len,
            });
        }

        self.pos = Some(offset + len as u64);
        Ok(buf)
    }

    /// Read and decode a whole fixed structure at `offset`.
    ///
    /// `as_float` picks the float interpretation for 4-byte fields by name.
    pub fn read_layout<F>(&mut self, offset: u64, layout: FieldLayout, as_float: F) -> Result<Fields>
    where
        F: Fn(&str) -> bool,
    {
        let raw = self.read_at(offset, layout_size(layout))?;
        let mut fields = Fields::with_capacity(layout.len());
        let mut pos = 0;
        for &(name, width) in layout {
            let value = decode_field(&raw[pos..pos + width], width, as_float(name))?;
            fields.push(name, value);
            pos += width;
        }
        Ok(fields)
    }
}
