//! Record sources for the combining reader.
//!
//! A [`RecordSource`] is any forward-only supplier of decoded records in
//! physical file order. The production source is
//! [`MarcReader`](crate::reader::MarcReader) over a file or buffer;
//! [`VecSource`] serves records already in memory, which is also what tests
//! use. Sources own whatever resource backs them and release it on drop.
//!
//! Decode-level concerns such as skipping malformed records belong to the
//! source. A consumer of this trait only ever sees fully decoded [`Record`]
//! values or a hard error.

use crate::error::Result;
use crate::record::Record;

/// A forward-only stream of decoded MARC records.
pub trait RecordSource {
    /// Pull the next record.
    ///
    /// Returns `Ok(None)` when the stream is exhausted. Exhaustion is final:
    /// once `None` is returned, every later call returns `None` too.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails to produce a record,
    /// e.g. an I/O failure or an undecodable record in strict mode.
    fn next_record(&mut self) -> Result<Option<Record>>;
}

/// An in-memory record source.
///
/// # Examples
///
/// ```
/// use marc_combine::{Leader, Record, RecordSource, VecSource};
///
/// let mut source = VecSource::new(vec![Record::new(Leader::default())]);
/// assert!(source.next_record()?.is_some());
/// assert!(source.next_record()?.is_none());
/// # Ok::<(), marc_combine::MarcError>(())
/// ```
#[derive(Debug)]
pub struct VecSource {
    records: std::vec::IntoIter<Record>,
}

impl VecSource {
    /// Create a source that yields the given records in order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        VecSource {
            records: records.into_iter(),
        }
    }
}

impl From<Vec<Record>> for VecSource {
    fn from(records: Vec<Record>) -> Self {
        VecSource::new(records)
    }
}

impl RecordSource for VecSource {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }
}
