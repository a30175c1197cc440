use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{RecordError, Result};

/// Maximum number of integers in one record.
pub const MAX_FIELDS: usize = 5;

/// Field separator.
pub const SEPARATOR: u8 = b',';

/// Record terminator.
pub const DELIMITER: u8 = b'\n';

/// Longest line accepted before a delimiter must appear.
pub const MAX_LINE_LEN: usize = 256;

/// One decoded group of 1 to 5 signed integers.
///
/// The arity is exactly the number of integers present on the wire; records
/// are never padded.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Record {
    fields: [i32; MAX_FIELDS],
    len: u8,
}

impl Record {
    /// Build a record from 1 to 5 fields.
    pub fn new(fields: &[i32]) -> Result<Self> {
        if fields.is_empty() || fields.len() > MAX_FIELDS {
            return Err(RecordError::InvalidArity(fields.len()));
        }
        let mut buf = [0i32; MAX_FIELDS];
        buf[..fields.len()].copy_from_slice(fields);
        Ok(Self {
            fields: buf,
            len: fields.len() as u8,
        })
    }

    /// The fields actually present.
    pub fn fields(&self) -> &[i32] {
        &self.fields[..self.len as usize]
    }

    /// Number of fields (1 to 5).
    pub fn arity(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Record").field(&self.fields()).finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self> {
        parse_line(s.trim_end_matches(['\r', '\n']).as_bytes())
    }
}

/// Encode a record as comma-joined text followed by the delimiter.
pub fn encode_record(record: &Record, dst: &mut BytesMut) {
    let text = record.to_string();
    dst.reserve(text.len() + 1);
    dst.put_slice(text.as_bytes());
    dst.put_u8(DELIMITER);
}

/// Decode the next complete record from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a delimited record yet.
/// Blank lines are consumed and skipped. On success, consumes the line
/// including its delimiter.
pub fn decode_record(src: &mut BytesMut) -> Result<Option<Record>> {
    loop {
        let Some(pos) = src.iter().position(|&b| b == DELIMITER) else {
            if src.len() > MAX_LINE_LEN {
                return Err(RecordError::LineTooLong { max: MAX_LINE_LEN });
            }
            return Ok(None);
        };

        let line = src.split_to(pos + 1);
        if pos > MAX_LINE_LEN {
            return Err(RecordError::LineTooLong { max: MAX_LINE_LEN });
        }
        let body = &line[..pos];
        if is_blank(body) {
            continue;
        }
        return parse_line(body).map(Some);
    }
}

/// Decode whatever is left in the buffer once the stream has ended.
///
/// A non-blank unterminated fragment is parsed as a final record. The
/// buffer is always left empty.
pub fn decode_trailing(src: &mut BytesMut) -> Result<Option<Record>> {
    if let Some(record) = decode_record(src)? {
        return Ok(Some(record));
    }
    let rest = src.split();
    if is_blank(&rest) {
        return Ok(None);
    }
    parse_line(rest.chunk()).map(Some)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn parse_line(line: &[u8]) -> Result<Record> {
    let text = std::str::from_utf8(line).map_err(|_| RecordError::Malformed {
        line: String::from_utf8_lossy(line).into_owned(),
        reason: "not valid UTF-8",
    })?;
    let text = text.trim();

    let count = text.split(SEPARATOR as char).count();
    if count > MAX_FIELDS {
        return Err(RecordError::TooManyFields {
            count,
            max: MAX_FIELDS,
        });
    }

    let mut fields = [0i32; MAX_FIELDS];
    for (slot, raw) in fields.iter_mut().zip(text.split(SEPARATOR as char)) {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RecordError::Malformed {
                line: text.to_string(),
                reason: "empty field",
            });
        }
        *slot = raw.parse().map_err(|_| RecordError::Malformed {
            line: text.to_string(),
            reason: "field is not a 32-bit integer",
        })?;
    }

    Record::new(&fields[..count])
}
