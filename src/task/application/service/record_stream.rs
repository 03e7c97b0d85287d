//! Splitting of newline-delimited task output into raw JSON records.
//!
//! Task result output is not a JSON array: it is zero or more independent JSON
//! objects, one per line. Splitting is lazy and does not parse anything; each
//! [`RawRecord`] is decoded on demand so that errors can name their line.

use crate::{DirectorError, DirectorResult};
use serde::de::DeserializeOwned;
use std::iter::Enumerate;
use std::slice::Split;

/// One non-blank line of task output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    line: usize,
    bytes: &'a [u8],
}

impl<'a> RawRecord<'a> {
    /// 0-based line index within the output body.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The line's content with surrounding whitespace removed.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decodes this line as `T`.
    ///
    /// # Errors
    /// Returns `DirectorError::Decode` carrying this record's line index.
    pub fn decode<T>(&self) -> DirectorResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(self.bytes).map_err(|source| DirectorError::Decode {
            line: self.line,
            source,
            response: None,
        })
    }
}

/// A restartable view over the records of an output body.
///
/// Every call to [`RecordStream::iter`] starts again from the first line.
#[derive(Debug, Clone, Copy)]
pub struct RecordStream<'a> {
    body: &'a [u8],
}

impl<'a> RecordStream<'a> {
    pub fn iter(&self) -> Records<'a> {
        Records {
            lines: self.body.split(is_newline as fn(&u8) -> bool).enumerate(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for RecordStream<'a> {
    type Item = RawRecord<'a>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for &RecordStream<'a> {
    type Item = RawRecord<'a>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}

/// Iterator over the non-blank lines of an output body.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    lines: Enumerate<Split<'a, u8, fn(&u8) -> bool>>,
}

impl<'a> Iterator for Records<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<RawRecord<'a>> {
        self.lines.find_map(|(line, bytes)| {
            let bytes = bytes.trim_ascii();
            (!bytes.is_empty()).then_some(RawRecord { line, bytes })
        })
    }
}

fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

/// Splits an output body into its newline-separated records, skipping blank lines.
pub fn split_records(body: &[u8]) -> RecordStream<'_> {
    RecordStream { body }
}
