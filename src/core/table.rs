// Table file creation/opening with length validation, positional status
// flips, and an exclusive advisory lock held for the handle's lifetime.
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use libc::{EACCES, EPERM};

use crate::core::error::{Error, ErrorKind};
use crate::core::record::{self, STATUS_ALIVE, STATUS_DEAD};
use crate::core::schema::Schema;

/// Result of a `delete` or `resurrect`. `Already` signals idempotency (the
/// row was already in the target state); it is not an error and the byte on
/// disk is untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlipOutcome {
    Flipped,
    Already,
}

/// A fixed-width row table over a single random-access file.
///
/// The table owns the handle exclusively. Rows are append-only: `delete`
/// tombstones a row in place and `add` never reuses the slot, so the file
/// only grows until compacted externally. Exactly one handle should be open
/// against a given file; an advisory lock guards against cooperative second
/// openers, but an uncooperative external writer will still corrupt offsets
/// silently.
#[derive(Debug)]
pub struct Table {
    path: PathBuf,
    file: File,
    schema: Schema,
}

impl Table {
    /// Creates a new empty table file. Fails if the file already exists.
    pub fn create(path: impl AsRef<Path>, schema: Schema) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|err| open_error(err, &path))?;
        lock_handle(&file, &path)?;
        Ok(Self { path, file, schema })
    }

    /// Opens an existing table file for read/write random access.
    ///
    /// The schema must match the one that produced the file; there is no
    /// embedded header to check it against. The file length is validated to
    /// be a whole number of rows so that positional arithmetic can be
    /// trusted from the start.
    pub fn open(path: impl AsRef<Path>, schema: Schema) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|err| open_error(err, &path))?;
        lock_handle(&file, &path)?;

        let len = file
            .metadata()
            .map(|meta| meta.len())
            .map_err(|err| Error::new(ErrorKind::Io).with_path(&path).with_source(err))?;
        if len % schema.row_size() as u64 != 0 {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_path(&path)
                .with_message(format!(
                    "file length {len} is not a multiple of the row size ({})",
                    schema.row_size()
                ))
                .with_hint("Check that the schema matches the one that created the file."));
        }

        Ok(Self { path, file, schema })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> Result<u64, Error> {
        Ok(self.end_offset()? / self.schema.row_size() as u64)
    }

    /// Appends one record at end-of-file and returns its index. Values are
    /// validated against the column widths before anything is written; the
    /// file grows by exactly one row or not at all. Tombstoned slots are not
    /// searched for or reused.
    pub fn add(&mut self, values: &[impl AsRef<[u8]>]) -> Result<u64, Error> {
        let record = record::encode(values, &self.schema)?;
        let end = self
            .file
            .seek(SeekFrom::End(0))
            .map_err(|err| self.io_error(err))?;
        if end % self.schema.row_size() as u64 != 0 {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_path(&self.path)
                .with_offset(end)
                .with_message("end of file is not row-aligned"));
        }
        self.file
            .write_all(&record)
            .map_err(|err| self.io_error(err))?;
        Ok(end / self.schema.row_size() as u64)
    }

    /// Tombstones row `index` by flipping its status byte to `'-'`.
    pub fn delete(&mut self, index: u64) -> Result<FlipOutcome, Error> {
        self.flip_status(index, STATUS_ALIVE, STATUS_DEAD)
    }

    /// Revives row `index` by flipping its status byte back to `'+'`.
    pub fn resurrect(&mut self, index: u64) -> Result<FlipOutcome, Error> {
        self.flip_status(index, STATUS_DEAD, STATUS_ALIVE)
    }

    /// One seek, one read, and on a state change one more seek and a
    /// single-byte write. No other bytes of the record are touched.
    fn flip_status(&mut self, index: u64, from: u8, to: u8) -> Result<FlipOutcome, Error> {
        let len = self.end_offset()?;
        let offset = index
            .checked_mul(self.schema.row_size() as u64)
            .unwrap_or(u64::MAX);
        if offset >= len {
            return Err(Error::new(ErrorKind::OutOfBounds)
                .with_path(&self.path)
                .with_row(index)
                .with_message(format!(
                    "row does not exist (table has {} rows)",
                    len / self.schema.row_size() as u64
                )));
        }

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| self.io_error(err))?;
        let mut status = [0u8; 1];
        self.file
            .read_exact(&mut status)
            .map_err(|err| self.io_error(err))?;
        if status[0] == to {
            return Ok(FlipOutcome::Already);
        }
        if status[0] != from {
            return Err(Error::new(ErrorKind::WrongSymbol)
                .with_path(&self.path)
                .with_row(index)
                .with_offset(offset)
                .with_message(format!(
                    "status byte is {:?}, expected {:?} or {:?}",
                    status[0] as char, from as char, to as char
                )));
        }

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| self.io_error(err))?;
        self.file
            .write_all(&[to])
            .map_err(|err| self.io_error(err))?;
        Ok(FlipOutcome::Flipped)
    }

    pub(crate) fn handle(&self) -> &File {
        &self.file
    }

    fn end_offset(&self) -> Result<u64, Error> {
        self.file
            .metadata()
            .map(|meta| meta.len())
            .map_err(|err| self.io_error(err))
    }

    fn io_error(&self, err: io::Error) -> Error {
        Error::new(ErrorKind::Io)
            .with_path(&self.path)
            .with_source(err)
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_error(err: io::Error, path: &Path) -> Error {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::Usage,
        io::ErrorKind::AlreadyExists => ErrorKind::Usage,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    };
    Error::new(kind)
        .with_path(path)
        .with_message("cannot open table file")
        .with_source(err)
}

fn lock_handle(file: &File, path: &Path) -> Result<(), Error> {
    file.try_lock_exclusive().map_err(|err| {
        Error::new(lock_error_kind(&err))
            .with_path(path)
            .with_message("cannot lock table file")
            .with_hint("Another process may have the table open.")
            .with_source(err)
    })
}

fn lock_error_kind(err: &io::Error) -> ErrorKind {
    let errno = err.raw_os_error().unwrap_or_default();
    if errno == EACCES || errno == EPERM {
        return ErrorKind::Permission;
    }
    match err.kind() {
        io::ErrorKind::WouldBlock => ErrorKind::Busy,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}
