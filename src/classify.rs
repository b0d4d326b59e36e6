//! Bibliographic vs. holdings-summary classification.
//!
//! An export interleaves two kinds of record, and the combiner treats them
//! differently: bibliographic records seed and extend a logical record,
//! holdings-summary (MHLD) records only ever contribute holdings fields to an
//! open one. The distinction is carried by the record type character at
//! leader position 6.

use crate::record::Record;

/// Leader record-type characters that denote a holdings record:
/// `u` unknown, `v` multipart item, `x` single-part item, `y` serial item.
pub const HOLDINGS_RECORD_TYPES: [char; 4] = ['u', 'v', 'x', 'y'];

/// The two kinds of record a combining input may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A bibliographic record describing a catalog item.
    Bibliographic,
    /// A holdings-summary (MHLD) record describing holdings for an item.
    HoldingsSummary,
}

impl RecordKind {
    /// Classify a record from its leader record type.
    ///
    /// Types `u`/`v`/`x`/`y` are holdings summaries; everything else is
    /// treated as bibliographic.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_combine::{Leader, Record, RecordKind};
    ///
    /// let bib = Record::new(Leader::default());
    /// assert_eq!(RecordKind::of(&bib), RecordKind::Bibliographic);
    ///
    /// let mhld = Record::new(Leader::with_record_type('x'));
    /// assert_eq!(RecordKind::of(&mhld), RecordKind::HoldingsSummary);
    /// ```
    #[must_use]
    pub fn of(record: &Record) -> RecordKind {
        if HOLDINGS_RECORD_TYPES.contains(&record.leader.record_type) {
            RecordKind::HoldingsSummary
        } else {
            RecordKind::Bibliographic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;

    #[test]
    fn test_bibliographic_types() {
        for record_type in ['a', 'c', 'e', 'g', 'm', 'p', 't'] {
            let record = Record::new(Leader::with_record_type(record_type));
            assert_eq!(RecordKind::of(&record), RecordKind::Bibliographic);
        }
    }

    #[test]
    fn test_holdings_types() {
        for record_type in HOLDINGS_RECORD_TYPES {
            let record = Record::new(Leader::with_record_type(record_type));
            assert_eq!(RecordKind::of(&record), RecordKind::HoldingsSummary);
        }
    }
}
