//! Writing MARC records to binary format.
//!
//! This module provides [`MarcWriter`] for serializing [`Record`] instances
//! to ISO 2709 binary format, the same format the reader consumes. Combined
//! records can be re-serialized for downstream tooling, and tests use the
//! writer to build binary fixtures.
//!
//! # Examples
//!
//! ```
//! use marc_combine::{MarcWriter, Record, Field, Leader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = MarcWriter::new(&mut buffer);
//!     let mut record = Record::new(Leader::default());
//!     let mut field = Field::new("245".to_string(), '1', '0');
//!     field.add_subfield('a', "Title".to_string());
//!     record.add_field(field);
//!     writer.write_record(&record)?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{MarcError, Result};
use crate::record::Record;
use std::io::Write;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const RECORD_TERMINATOR: u8 = 0x1D;

/// Writer for ISO 2709 binary MARC format.
///
/// Serializes records one at a time to any destination implementing
/// [`std::io::Write`]. Control fields are written first, then data fields in
/// their document order; the leader's length fields are recomputed from the
/// serialized sizes.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new MARC writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - Any destination implementing [`std::io::Write`]
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Write a single MARC record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The writer has already been finished
    /// - The record is too large for the format's 5-digit length fields
    /// - An I/O error occurs during writing
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        // Build the data area first
        let mut data_area = Vec::new();
        let mut directory = Vec::new();
        let mut current_position = 0;

        // Control fields (000-009) come first
        for (tag, value) in &record.control_fields {
            if tag.as_str() < "010" {
                let field_data = value.as_bytes();
                let field_length = field_data.len() + 1; // +1 for terminator

                push_directory_entry(&mut directory, tag, field_length, current_position)?;
                data_area.extend_from_slice(field_data);
                data_area.push(FIELD_TERMINATOR);
                current_position += field_length;
            }
        }

        // Data fields in document order
        for field in &record.fields {
            let mut field_data = Vec::new();
            field_data.push(field.indicator1 as u8);
            field_data.push(field.indicator2 as u8);

            for subfield in &field.subfields {
                field_data.push(SUBFIELD_DELIMITER);
                field_data.push(subfield.code as u8);
                field_data.extend_from_slice(subfield.value.as_bytes());
            }

            field_data.push(FIELD_TERMINATOR);
            let field_length = field_data.len();

            push_directory_entry(&mut directory, &field.tag, field_length, current_position)?;
            data_area.extend_from_slice(&field_data);
            current_position += field_length;
        }

        directory.push(FIELD_TERMINATOR);

        // Recompute the leader's length fields
        let base_address = 24 + directory.len();
        let record_length = base_address + data_area.len() + 1; // +1 for record terminator
        if record_length > 99999 {
            return Err(MarcError::InvalidRecord(format!(
                "Record length {record_length} exceeds the format limit of 99999 bytes"
            )));
        }

        let mut leader = record.leader.clone();
        leader.record_length = u32::try_from(record_length)
            .map_err(|_| MarcError::InvalidRecord("Record length overflow".to_string()))?;
        leader.data_base_address = u32::try_from(base_address)
            .map_err(|_| MarcError::InvalidRecord("Base address overflow".to_string()))?;

        let leader_bytes = leader.as_bytes()?;
        self.writer.write_all(&leader_bytes)?;
        self.writer.write_all(&directory)?;
        self.writer.write_all(&data_area)?;
        self.writer.write_all(&[RECORD_TERMINATOR])?;

        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more records can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

/// Append one 12-byte directory entry: tag, 4-digit length, 5-digit start.
fn push_directory_entry(
    directory: &mut Vec<u8>,
    tag: &str,
    length: usize,
    position: usize,
) -> Result<()> {
    if tag.len() != 3 {
        return Err(MarcError::InvalidRecord(format!(
            "Field tag must be 3 characters, got '{tag}'"
        )));
    }
    if length > 9999 {
        return Err(MarcError::InvalidRecord(format!(
            "Field length {length} exceeds the format limit of 9999 bytes"
        )));
    }
    directory.extend_from_slice(tag.as_bytes());
    directory.extend_from_slice(format!("{length:04}").as_bytes());
    directory.extend_from_slice(format!("{position:05}").as_bytes());
    Ok(())
}
