//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC
//! records from any source that implements [`std::io::Read`]. A `MarcReader`
//! is the production [`RecordSource`](crate::source::RecordSource) for the
//! combining reader: it yields records in physical file order, which is
//! exactly the order the combiner's sort contract is defined over.
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use marc_combine::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("Record type: {}", record.leader.record_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::Leader;
use crate::record::{Field, Record, Subfield};
use crate::source::RecordSource;
use std::io::Read;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const DIRECTORY_ENTRY_LEN: usize = 12;

/// Reader for ISO 2709 binary MARC format.
///
/// Reads one record at a time from any source implementing
/// [`std::io::Read`]. Fields are returned in directory order, preserving the
/// document order of the original record.
///
/// In permissive mode, a record whose payload fails to decode (bad directory
/// entry, field data that is not UTF-8, field extents outside the record) is
/// skipped and reading continues with the next record. Errors in the leader
/// itself are always fatal: without a valid record length there is no way to
/// find the next record boundary.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    permissive: bool,
    records_read: usize,
    records_skipped: usize,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - Any source implementing [`std::io::Read`]
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::MarcReader;
    /// use std::io::Cursor;
    ///
    /// let reader = MarcReader::new(Cursor::new(Vec::new()));
    /// ```
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            permissive: false,
            records_read: 0,
            records_skipped: 0,
        }
    }

    /// Enable or disable permissive mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::MarcReader;
    /// use std::io::Cursor;
    ///
    /// let reader = MarcReader::new(Cursor::new(Vec::new())).with_permissive(true);
    /// ```
    #[must_use]
    pub fn with_permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read,
    /// `Ok(None)` if the end of the stream was reached.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The leader is malformed
    /// - The stream ends in the middle of a record
    /// - The record payload is malformed (strict mode only)
    /// - An I/O error occurs
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            // Read the leader (24 bytes); clean EOF here ends the stream
            let mut leader_bytes = [0u8; 24];
            match self.reader.read_exact(&mut leader_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(e) => return Err(MarcError::IoError(e)),
            }

            let leader = Leader::from_bytes(&leader_bytes)?;
            leader.validate_for_reading()?;

            // Read the rest of the record
            let record_length = leader.record_length as usize;
            let mut record_data = vec![0u8; record_length - 24];
            match self.reader.read_exact(&mut record_data) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(MarcError::TruncatedRecord(
                        "Unexpected end of file while reading record data".to_string(),
                    ));
                }
                Err(e) => return Err(MarcError::IoError(e)),
            }

            match parse_record(leader, &record_data) {
                Ok(record) => {
                    self.records_read += 1;
                    return Ok(Some(record));
                }
                Err(_) if self.permissive => {
                    // Payload failed to decode but the boundary held; skip it
                    self.records_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Returns the number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Returns the number of undecodable records skipped in permissive mode.
    #[must_use]
    pub fn records_skipped(&self) -> usize {
        self.records_skipped
    }
}

impl<R: Read> RecordSource for MarcReader<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        self.read_record()
    }
}

/// Parse the directory and data area of one record.
fn parse_record(leader: Leader, record_data: &[u8]) -> Result<Record> {
    let base_address = leader.data_base_address as usize;
    let directory_size = base_address - 24;
    if directory_size > record_data.len() {
        return Err(MarcError::InvalidRecord(
            "Base address points past the end of the record".to_string(),
        ));
    }

    let directory_bytes = &record_data[..directory_size];
    let data_section = &record_data[directory_size..];

    let mut record = Record::new(leader);

    // Directory entries are 12 bytes: 3-byte tag, 4-byte length, 5-byte start
    let mut i = 0;
    while i + DIRECTORY_ENTRY_LEN <= directory_bytes.len() {
        let entry = &directory_bytes[i..i + DIRECTORY_ENTRY_LEN];
        let tag = std::str::from_utf8(&entry[0..3])
            .map_err(|_| MarcError::InvalidRecord("Invalid tag encoding".to_string()))?
            .to_string();
        let length = parse_entry_number(&entry[3..7], "field length")?;
        let start = parse_entry_number(&entry[7..12], "field start position")?;

        let end = start + length;
        if end > data_section.len() {
            return Err(MarcError::InvalidRecord(
                "Field extends beyond data section".to_string(),
            ));
        }
        let field_data = &data_section[start..end];
        if field_data.is_empty() {
            return Err(MarcError::InvalidRecord(
                "Zero-length field data".to_string(),
            ));
        }

        if tag.as_str() < "010" {
            let value = std::str::from_utf8(&field_data[..field_data.len() - 1])
                .map_err(|_| {
                    MarcError::InvalidRecord("Invalid control field encoding".to_string())
                })?
                .to_string();
            record.add_control_field(tag, value);
        } else {
            record.add_field(parse_data_field(tag, field_data)?);
        }

        i += DIRECTORY_ENTRY_LEN;
    }

    Ok(record)
}

/// Parse an ASCII number out of a directory entry slice.
fn parse_entry_number(bytes: &[u8], what: &str) -> Result<usize> {
    let s = std::str::from_utf8(bytes)
        .map_err(|_| MarcError::InvalidRecord(format!("Invalid {what} encoding")))?;
    s.parse()
        .map_err(|_| MarcError::InvalidRecord(format!("Invalid {what} value: '{s}'")))
}

/// Parse one data field: two indicators, then delimited subfields.
fn parse_data_field(tag: String, field_data: &[u8]) -> Result<Field> {
    if field_data.len() < 3 {
        return Err(MarcError::InvalidRecord(
            "Data field too short for indicators".to_string(),
        ));
    }

    let mut field = Field::new(tag, field_data[0] as char, field_data[1] as char);

    let mut j = 2;
    while j < field_data.len() - 1 {
        if field_data[j] == SUBFIELD_DELIMITER {
            j += 1;
            if j >= field_data.len() - 1 {
                break;
            }
            let code = field_data[j] as char;
            j += 1;
            let value_start = j;
            while j < field_data.len()
                && field_data[j] != SUBFIELD_DELIMITER
                && field_data[j] != FIELD_TERMINATOR
            {
                j += 1;
            }
            let value = std::str::from_utf8(&field_data[value_start..j])
                .map_err(|_| MarcError::InvalidRecord("Invalid subfield encoding".to_string()))?
                .to_string();
            field.subfields.push(Subfield { code, value });
        } else {
            j += 1;
        }
    }

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::MarcWriter;
    use std::io::Cursor;

    fn sample_record() -> Record {
        Record::builder(Leader::default())
            .control_field_str("001", "u46")
            .control_field_str("008", "840508c19799999")
            .field(
                Field::builder("245".to_string(), '0', '0')
                    .subfield_str('a', "Tumult.")
                    .build(),
            )
            .field(
                Field::builder("999".to_string(), ' ', ' ')
                    .subfield_str('a', "AP30 .T75")
                    .subfield_str('l', "ALD-STKS")
                    .build(),
            )
            .build()
    }

    fn to_binary(records: &[Record]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = MarcWriter::new(&mut buffer);
            for record in records {
                writer.write_record(record).unwrap();
            }
        }
        buffer
    }

    #[test]
    fn test_read_roundtrip_preserves_field_order() {
        let record = sample_record();
        let binary = to_binary(std::slice::from_ref(&record));

        let mut reader = MarcReader::new(Cursor::new(binary));
        let parsed = reader.read_record().unwrap().unwrap();

        assert_eq!(parsed.get_control_field("001"), Some("u46"));
        assert_eq!(parsed.tag_sequence(), vec!["245", "999"]);
        assert_eq!(
            parsed.get_field("999").and_then(|f| f.get_subfield('l')),
            Some("ALD-STKS")
        );
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 1);
    }

    #[test]
    fn test_read_empty_stream() {
        let mut reader = MarcReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_read_truncated_record() {
        let mut binary = to_binary(&[sample_record()]);
        binary.truncate(binary.len() - 10);

        let mut reader = MarcReader::new(Cursor::new(binary));
        let result = reader.read_record();
        assert!(matches!(result, Err(MarcError::TruncatedRecord(_))));
    }

    #[test]
    fn test_read_bad_directory_entry_is_fatal_in_strict_mode() {
        let mut binary = to_binary(&[sample_record()]);
        // Corrupt the first directory entry's length digits (offset 24 is
        // the first entry: 3-byte tag then 4-byte length)
        binary[27] = b'9';
        binary[28] = b'9';

        let mut reader = MarcReader::new(Cursor::new(binary));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_permissive_mode_skips_bad_record() {
        let good = sample_record();
        let mut binary = to_binary(&[good.clone(), good]);
        binary[27] = b'9';
        binary[28] = b'9';

        let mut reader = MarcReader::new(Cursor::new(binary)).with_permissive(true);
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.get_control_field("001"), Some("u46"));
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 1);
        assert_eq!(reader.records_skipped(), 1);
    }
}
