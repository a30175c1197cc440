use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_record, Record};
use crate::error::{RecordError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes records as delimited text lines to any `Write` sink.
///
/// Every record is flushed as soon as it is written so a consumer sees whole
/// lines even if the writer is interrupted afterwards.
pub struct RecordWriter<T> {
    inner: T,
    buf: BytesMut,
    records: u64,
    bytes: u64,
}

impl<T: Write> RecordWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            records: 0,
            bytes: 0,
        }
    }

    /// Write one record and its delimiter, then flush. Returns bytes written.
    pub fn write_record(&mut self, record: &Record) -> Result<usize> {
        self.buf.clear();
        encode_record(record, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(RecordError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }
        self.flush()?;

        self.records += 1;
        self.bytes += offset as u64;
        Ok(offset)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Bytes written so far, delimiters included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
