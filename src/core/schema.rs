// Column definitions and row layout arithmetic.
use std::io::{self, Write};

use crate::core::error::{Error, ErrorKind};

/// One field of a table: a name (for interactive output) and the exact
/// number of bytes reserved for the field's value on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    name: String,
    width: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// Ordered column list. Order is semantically significant: it fixes the byte
/// offset of every field. The schema is supplied out-of-band at open time;
/// nothing on disk records it, so it must match the schema that produced the
/// file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    row_size: usize,
}

impl Schema {
    /// Builds a schema and derives the fixed record size:
    /// one status byte, then each column's width plus one trailing byte
    /// (separator space for all but the last column, newline for the last).
    pub fn new(columns: Vec<Column>) -> Result<Self, Error> {
        if columns.is_empty() {
            return Err(Error::new(ErrorKind::Usage).with_message("schema has no columns"));
        }
        let mut row_size = 1usize;
        for column in &columns {
            if column.width == 0 {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("column `{}` has zero width", column.name)));
            }
            row_size += column.width + 1;
        }
        Ok(Self { columns, row_size })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Byte offset of field `index` within a record: `1 + Σ_{k<index}(width_k + 1)`.
    pub fn field_offset(&self, index: usize) -> usize {
        let mut offset = 1;
        for column in &self.columns[..index] {
            offset += column.width + 1;
        }
        offset
    }

    /// Writes a human-readable column listing, in declared order, to `out`.
    pub fn describe(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Table columns:")?;
        for (index, column) in self.columns.iter().enumerate() {
            writeln!(out, "{index}: {} ({})", column.name, column.width)?;
        }
        Ok(())
    }
}
