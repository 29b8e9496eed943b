// Sequential validating scan over every physical record in file order.
use std::io::{BufRead, BufReader, Seek, SeekFrom};

use crate::core::error::{Error, ErrorKind};
use crate::core::record::{self, RECORD_TERMINATOR};
use crate::core::schema::Schema;
use crate::core::table::Table;

/// One scanned row: its position, liveness, and trimmed field values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    pub index: u64,
    pub alive: bool,
    pub values: Vec<Vec<u8>>,
}

/// A one-pass scan over a table. Yields rows in ascending offset order,
/// tombstones included; alive-only filtering belongs to the caller. Not
/// restartable: rescan by creating a new scan.
pub struct Scan<'a> {
    reader: BufReader<&'a std::fs::File>,
    schema: &'a Schema,
    next_index: u64,
    buf: Vec<u8>,
}

impl Table {
    /// Starts a scan at byte 0 of the file.
    ///
    /// The table writes through an unbuffered handle, so repositioning alone
    /// guarantees the scan observes every mutation already made through this
    /// table, including rows just appended.
    pub fn scan(&self) -> Result<Scan<'_>, Error> {
        let mut handle = self.handle();
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|err| Error::new(ErrorKind::Io).with_path(self.path()).with_source(err))?;
        Ok(Scan {
            reader: BufReader::new(handle),
            schema: self.schema(),
            next_index: 0,
            buf: Vec::with_capacity(self.schema().row_size()),
        })
    }
}

impl Scan<'_> {
    /// Produces the next row, or `None` at end of file.
    ///
    /// A record whose length does not match the row size is a hard stop: the
    /// fault is surfaced and the scan must not continue, since every later
    /// offset is already suspect. A record whose status byte is unrecognized
    /// is skipped with a warning — its length is still trustworthy, so the
    /// scan resumes at the next row boundary.
    pub fn next(&mut self) -> Result<Option<Row>, Error> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(RECORD_TERMINATOR, &mut self.buf)
                .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
            if read == 0 {
                return Ok(None);
            }
            let index = self.next_index;
            self.next_index += 1;

            match record::decode(&self.buf, self.schema) {
                Ok(decoded) => {
                    return Ok(Some(Row {
                        index,
                        alive: decoded.alive,
                        values: decoded.values,
                    }));
                }
                Err(err) if err.kind() == ErrorKind::UnknownStatus => {
                    tracing::warn!(
                        row = index,
                        status = self.buf[0],
                        "skipping record with unrecognized status byte"
                    );
                    continue;
                }
                Err(err) => return Err(err.with_row(index)),
            }
        }
    }
}
