// Record layout constants and the fixed-width encode/decode pair.
use crate::core::error::{Error, ErrorKind};
use crate::core::schema::Schema;

pub const STATUS_ALIVE: u8 = b'+';
pub const STATUS_DEAD: u8 = b'-';
pub const FIELD_PAD: u8 = b' ';
pub const RECORD_TERMINATOR: u8 = b'\n';

/// A decoded record: the status flag plus one right-trimmed value per column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedRecord {
    pub alive: bool,
    pub values: Vec<Vec<u8>>,
}

/// Encodes one record: status byte, then per column the value bytes padded
/// with spaces to the column width, a space separator after every column but
/// the last, and a newline after the last. The output is always exactly
/// `schema.row_size()` bytes; a value longer than its column fails the whole
/// record with `FieldOverflow` (no truncation).
///
/// The encoding is lossy by design: trailing spaces in a value are
/// indistinguishable from padding, and a value containing the separator or
/// terminator byte is written as-is. Callers that need those bytes must not
/// use this format.
pub fn encode(values: &[impl AsRef<[u8]>], schema: &Schema) -> Result<Vec<u8>, Error> {
    if values.len() != schema.columns().len() {
        return Err(Error::new(ErrorKind::Usage).with_message(format!(
            "expected {} values, got {}",
            schema.columns().len(),
            values.len()
        )));
    }
    for (column, value) in schema.columns().iter().zip(values) {
        let value = value.as_ref();
        if value.len() > column.width() {
            return Err(Error::new(ErrorKind::FieldOverflow).with_message(format!(
                "value of {} bytes exceeds column `{}` ({} bytes)",
                value.len(),
                column.name(),
                column.width()
            )));
        }
    }

    let last = schema.columns().len() - 1;
    let mut record = Vec::with_capacity(schema.row_size());
    record.push(STATUS_ALIVE);
    for (index, (column, value)) in schema.columns().iter().zip(values).enumerate() {
        let value = value.as_ref();
        record.extend_from_slice(value);
        record.resize(record.len() + (column.width() - value.len()), FIELD_PAD);
        record.push(if index == last {
            RECORD_TERMINATOR
        } else {
            FIELD_PAD
        });
    }
    debug_assert_eq!(record.len(), schema.row_size());
    Ok(record)
}

/// Decodes one raw record. A length other than `schema.row_size()` is
/// `Corrupt`; a leading byte that is neither `'+'` nor `'-'` is
/// `UnknownStatus` (a single damaged record, not file-wide corruption — the
/// scanner treats the two very differently). Field values are sliced by the
/// schema offsets and right-trimmed of trailing spaces only.
pub fn decode(raw: &[u8], schema: &Schema) -> Result<DecodedRecord, Error> {
    if raw.len() != schema.row_size() {
        return Err(Error::new(ErrorKind::Corrupt).with_message(format!(
            "record is {} bytes, expected {}",
            raw.len(),
            schema.row_size()
        )));
    }
    let alive = match raw[0] {
        STATUS_ALIVE => true,
        STATUS_DEAD => false,
        other => {
            return Err(Error::new(ErrorKind::UnknownStatus)
                .with_message(format!("record starts with {:?}", other as char)));
        }
    };

    let mut values = Vec::with_capacity(schema.columns().len());
    let mut offset = 1;
    for column in schema.columns() {
        let field = &raw[offset..offset + column.width()];
        values.push(strip_padding(field).to_vec());
        offset += column.width() + 1;
    }
    Ok(DecodedRecord { alive, values })
}

/// Drops trailing pad spaces. Leading spaces are part of the value.
fn strip_padding(field: &[u8]) -> &[u8] {
    let mut end = field.len();
    while end > 0 && field[end - 1] == FIELD_PAD {
        end -= 1;
    }
    &field[..end]
}

#[cfg(test)]
mod tests {
    use super::{DecodedRecord, decode, encode, strip_padding};
    use crate::core::error::ErrorKind;
    use crate::core::schema::{Column, Schema};

    fn two_column_schema() -> Schema {
        Schema::new(vec![Column::new("a", 4), Column::new("b", 3)]).expect("schema")
    }

    #[test]
    fn encode_matches_worked_layout() {
        let schema = two_column_schema();
        let record = encode(&[b"ab".as_slice(), b"c".as_slice()], &schema).expect("encode");
        assert_eq!(record, b"+ab   c  \n");
    }

    #[test]
    fn record_round_trip_trims_padding() {
        let schema = two_column_schema();
        let record = encode(&[b"ab".as_slice(), b"c".as_slice()], &schema).expect("encode");
        let decoded = decode(&record, &schema).expect("decode");
        assert_eq!(
            decoded,
            DecodedRecord {
                alive: true,
                values: vec![b"ab".to_vec(), b"c".to_vec()],
            }
        );
    }

    #[test]
    fn trailing_spaces_are_unrecoverable() {
        let schema = two_column_schema();
        let record = encode(&[b"ab ".as_slice(), b"c".as_slice()], &schema).expect("encode");
        let decoded = decode(&record, &schema).expect("decode");
        // Documented lossy property: "ab " comes back as "ab".
        assert_eq!(decoded.values[0], b"ab".to_vec());
    }

    #[test]
    fn leading_spaces_survive() {
        let schema = two_column_schema();
        let record = encode(&[b" ab".as_slice(), b"c".as_slice()], &schema).expect("encode");
        let decoded = decode(&record, &schema).expect("decode");
        assert_eq!(decoded.values[0], b" ab".to_vec());
    }

    #[test]
    fn overlong_value_is_rejected_whole() {
        let schema = two_column_schema();
        let err = encode(&[b"abcde".as_slice(), b"c".as_slice()], &schema).expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::FieldOverflow);
    }

    #[test]
    fn wrong_value_count_is_usage() {
        let schema = two_column_schema();
        let err = encode(&[b"ab".as_slice()], &schema).expect_err("arity");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn wrong_length_is_corrupt() {
        let schema = two_column_schema();
        let err = decode(b"+ab   c  ", &schema).expect_err("short");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn unknown_status_byte_is_its_own_fault() {
        let schema = two_column_schema();
        let err = decode(b"xab   c  \n", &schema).expect_err("status");
        assert_eq!(err.kind(), ErrorKind::UnknownStatus);
    }

    #[test]
    fn dead_status_decodes_as_not_alive() {
        let schema = two_column_schema();
        let decoded = decode(b"-ab   c  \n", &schema).expect("decode");
        assert!(!decoded.alive);
        assert_eq!(decoded.values[0], b"ab".to_vec());
    }

    #[test]
    fn strip_padding_keeps_interior_spaces() {
        assert_eq!(strip_padding(b"a b  "), b"a b");
        assert_eq!(strip_padding(b"   "), b"");
    }
}
