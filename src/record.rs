//! MARC record structures and operations.
//!
//! This module provides the core record types:
//! - [`Record`] — a leader, control fields, and an ordered list of data fields
//! - [`Field`] — variable data fields (010+)
//! - [`Subfield`] — named data elements within fields
//!
//! Data fields are stored flat, in document order. Combining split records
//! depends on field position (appended fields land at the end, spliced
//! holdings fields land immediately before an anchor field), so the model
//! preserves the exact order fields were read or added in, across tags.
//!
//! # Examples
//!
//! Create a record with the builder API:
//!
//! ```
//! use marc_combine::{Record, Field, Leader};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "u46")
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('a', "Title")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.get_control_field("001"), Some("u46"));
//! ```

use crate::leader::Leader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A MARC record: leader, control fields, and ordered data fields.
///
/// Control fields (tags 000-009) are single-valued and stored in insertion
/// order. Data fields are stored in a flat list preserving document order,
/// which is what merge operations and the binary writer iterate over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// Control fields (000-009) - tag -> value, preserves insertion order
    pub control_fields: IndexMap<String, String>,
    /// Data fields (010+) in document order
    pub fields: Vec<Field>,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            control_fields: IndexMap::new(),
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing MARC records
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::{Record, Leader, Field};
    ///
    /// let record = Record::builder(Leader::default())
    ///     .control_field_str("001", "12345")
    ///     .field(Field::builder("245".to_string(), '1', '0')
    ///         .subfield_str('a', "Title")
    ///         .build())
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Add or replace a control field (000-009)
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.insert(tag, value);
    }

    /// Add a control field using string slices
    ///
    /// Convenience method that converts &str arguments to String automatically.
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get a control field value
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields.get(tag).map(String::as_str)
    }

    /// Iterate over all control fields
    ///
    /// Returns an iterator of (tag, value) tuples in insertion order.
    pub fn control_fields_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.control_fields
            .iter()
            .map(|(tag, value)| (tag.as_str(), value.as_str()))
    }

    /// Append a data field to the end of the field list
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Insert a data field at the given position, shifting later fields down
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the current field count.
    pub fn insert_field(&mut self, index: usize, field: Field) {
        self.fields.insert(index, field);
    }

    /// Iterate over all data fields in document order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Iterate over data fields with a specific tag, in document order
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::{Record, Field, Leader};
    ///
    /// let mut record = Record::new(Leader::default());
    /// record.add_field(Field::new("650".to_string(), ' ', '0'));
    /// record.add_field(Field::new("245".to_string(), '1', '0'));
    /// record.add_field(Field::new("650".to_string(), ' ', '0'));
    ///
    /// assert_eq!(record.fields_by_tag("650").count(), 2);
    /// ```
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    /// Get the first data field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Position of the first data field with a given tag
    ///
    /// This is the splice point used by anchored merges.
    #[must_use]
    pub fn first_index_of_tag(&self, tag: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.tag == tag)
    }

    /// Number of data fields on the record
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// List the data field tags in document order
    ///
    /// Handy in tests and diagnostics for asserting field arrangement.
    #[must_use]
    pub fn tag_sequence(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.tag.as_str()).collect()
    }

    /// Remove data fields matching a predicate, preserving the order of the rest
    ///
    /// Returns the removed fields in document order.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::{Record, Field, Leader};
    ///
    /// let mut record = Record::new(Leader::default());
    /// record.add_field(Field::new("852".to_string(), ' ', ' '));
    /// record.add_field(Field::new("999".to_string(), ' ', ' '));
    ///
    /// let removed = record.remove_fields_where(|field| field.tag == "852");
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(record.field_count(), 1);
    /// ```
    pub fn remove_fields_where<F>(&mut self, predicate: F) -> Vec<Field>
    where
        F: Fn(&Field) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.fields.len());
        for field in self.fields.drain(..) {
            if predicate(&field) {
                removed.push(field);
            } else {
                kept.push(field);
            }
        }
        self.fields = kept;
        removed
    }
}

/// Builder for fluently constructing MARC records
///
/// # Examples
///
/// ```
/// use marc_combine::{Record, Leader, Field};
///
/// let record = Record::builder(Leader::default())
///     .control_field_str("001", "12345")
///     .field(Field::builder("245".to_string(), '1', '0')
///         .subfield_str('a', "The Great Gatsby")
///         .subfield_str('c', "F. Scott Fitzgerald")
///         .build())
///     .build();
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field using string slices
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::Field;
    ///
    /// let field = Field::builder("245".to_string(), '1', '0')
    ///     .subfield('a', "The Great Gatsby".to_string())
    ///     .subfield('c', "F. Scott Fitzgerald".to_string())
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    ///
    /// Convenience method that converts &str to String automatically.
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Get all values for a subfield code
    #[must_use]
    pub fn get_subfield_values(&self, code: char) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
            .collect()
    }

    /// Iterate over all subfields
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }
}

/// Builder for fluently constructing fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield(mut self, code: char, value: String) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Add a subfield using a string slice
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = Record::new(Leader::default());
        assert!(record.control_fields.is_empty());
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_add_control_field() {
        let mut record = Record::new(Leader::default());

        record.add_control_field("001".to_string(), "12345".to_string());
        assert_eq!(record.get_control_field("001"), Some("12345"));
    }

    #[test]
    fn test_control_field_replaces() {
        let mut record = Record::new(Leader::default());

        record.add_control_field_str("001", "first");
        record.add_control_field_str("001", "second");
        assert_eq!(record.get_control_field("001"), Some("second"));
        assert_eq!(record.control_fields_iter().count(), 1);
    }

    #[test]
    fn test_field_subfields() {
        let mut field = Field::new("245".to_string(), '1', '0');
        field.add_subfield('a', "Title".to_string());
        field.add_subfield('c', "Author".to_string());
        field.add_subfield('a', "Title continued".to_string());

        assert_eq!(field.get_subfield('a'), Some("Title"));
        let a_values = field.get_subfield_values('a');
        assert_eq!(a_values.len(), 2);
    }

    #[test]
    fn test_fields_preserve_document_order() {
        let mut record = Record::new(Leader::default());
        for tag in ["245", "852", "863", "999"] {
            record.add_field(Field::new(tag.to_string(), ' ', ' '));
        }

        assert_eq!(record.tag_sequence(), vec!["245", "852", "863", "999"]);
    }

    #[test]
    fn test_insert_field_shifts_following() {
        let mut record = Record::new(Leader::default());
        record.add_field(Field::new("245".to_string(), ' ', ' '));
        record.add_field(Field::new("999".to_string(), ' ', ' '));

        record.insert_field(1, Field::new("852".to_string(), ' ', ' '));
        assert_eq!(record.tag_sequence(), vec!["245", "852", "999"]);
    }

    #[test]
    fn test_first_index_of_tag() {
        let mut record = Record::new(Leader::default());
        record.add_field(Field::new("245".to_string(), ' ', ' '));
        record.add_field(Field::new("999".to_string(), ' ', ' '));
        record.add_field(Field::new("999".to_string(), ' ', ' '));

        assert_eq!(record.first_index_of_tag("999"), Some(1));
        assert_eq!(record.first_index_of_tag("852"), None);
    }

    #[test]
    fn test_remove_fields_where_keeps_order() {
        let mut record = Record::new(Leader::default());
        for tag in ["245", "852", "866", "852", "999"] {
            record.add_field(Field::new(tag.to_string(), ' ', ' '));
        }

        let removed = record.remove_fields_where(|field| field.tag == "852");
        assert_eq!(removed.len(), 2);
        assert_eq!(record.tag_sequence(), vec!["245", "866", "999"]);
    }

    #[test]
    fn test_multiple_fields_same_tag() {
        let mut record = Record::new(Leader::default());

        for i in 0..3 {
            let mut field = Field::new("650".to_string(), ' ', '0');
            field.add_subfield('a', format!("Subject {i}"));
            record.add_field(field);
        }

        assert_eq!(record.fields_by_tag("650").count(), 3);
    }

    #[test]
    fn test_builder() {
        let record = Record::builder(Leader::default())
            .control_field_str("001", "u46")
            .field(
                Field::builder("245".to_string(), '1', '0')
                    .subfield_str('a', "Test Title")
                    .build(),
            )
            .build();

        assert_eq!(record.get_control_field("001"), Some("u46"));
        assert_eq!(
            record.get_field("245").and_then(|f| f.get_subfield('a')),
            Some("Test Title")
        );
    }
}
