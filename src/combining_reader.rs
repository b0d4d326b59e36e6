//! The combining reader: reconstitutes logical records from split ones.
//!
//! Binary MARC records have a maximum size of 99999 bytes, for bibliographic
//! and holdings records alike. Export systems faced with a record that would
//! exceed the limit write it out as several consecutive physical records
//! carrying the same match key: one or more bib records (each with a subset
//! of the item-level fields), then any holdings-summary records. There may be
//! several holdings records per library/location, and several per location
//! when one location's holdings run long.
//!
//! [`CombiningReader`] walks such a file and yields one combined record per
//! key. It reads one record ahead of the record being assembled, merging
//! follow-on records in while their keys match and closing the record the
//! moment a higher-keyed bib record appears. The input must be sorted
//! ascending by match key with all records for a key contiguous; a key that
//! goes backwards, or a holdings record that matches nothing, is reported as
//! [`MarcError::OutOfSequence`] and ends processing, since once the sort
//! order is broken no later match can be trusted.
//!
//! # Examples
//!
//! ```no_run
//! use marc_combine::{CombiningReader, MarcReader};
//! use std::fs::File;
//!
//! let file = File::open("export_with_split_records.mrc")?;
//! let mut reader = CombiningReader::new(MarcReader::new(file));
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{:?}", record.get_control_field("001"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cmp::Ordering;

use crate::classify::RecordKind;
use crate::error::{MarcError, Result};
use crate::field_merge::{merge_anchored, merge_append, splice_before_anchor};
use crate::match_key::{match_key, MatchFieldSpec};
use crate::natural_sort::natural_cmp;
use crate::record::Record;
use crate::source::RecordSource;
use crate::tag_selector::TagSelector;

/// Default control field used for record matching.
pub const DEFAULT_FIELD_TO_MATCH: &str = "001";

/// Default pattern of bib fields merged when a bib record is split.
pub const DEFAULT_BIB_FIELDS_TO_MERGE: &str = "999";

/// Default pattern of holdings fields merged into the bib record.
pub const DEFAULT_MHLD_FIELDS_TO_MERGE: &str = "852|853|863|866|867|868";

/// Default bib field that merged holdings fields are inserted before.
pub const DEFAULT_ANCHOR_TAG: &str = "999";

/// Immutable merge rules for a [`CombiningReader`].
///
/// Built once, at construction, from plain configuration strings; the
/// selectors and match field specs inside are already compiled and validated.
/// [`CombineConfig::default`] gives the conventional rules (match on `001`,
/// merge bib `999`s, splice holdings `852|853|863|866|867|868` before the
/// first `999`).
///
/// # Examples
///
/// ```
/// use marc_combine::CombineConfig;
///
/// let config = CombineConfig::builder()
///     .bib_fields_to_merge("998|999")
///     .anchor_tag("998")
///     .build()?;
/// assert_eq!(config.anchor_tag(), "998");
/// # Ok::<(), marc_combine::MarcError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CombineConfig {
    first_bib_match_field: MatchFieldSpec,
    look_ahead_bib_match_field: MatchFieldSpec,
    mhld_match_field: MatchFieldSpec,
    bib_fields_to_merge: TagSelector,
    mhld_fields_to_merge: TagSelector,
    anchor_tag: String,
}

impl Default for CombineConfig {
    fn default() -> Self {
        CombineConfig::builder()
            .build()
            .expect("default combine configuration is valid")
    }
}

impl CombineConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> CombineConfigBuilder {
        CombineConfigBuilder {
            first_bib_match_field: DEFAULT_FIELD_TO_MATCH.to_string(),
            look_ahead_bib_match_field: DEFAULT_FIELD_TO_MATCH.to_string(),
            mhld_match_field: DEFAULT_FIELD_TO_MATCH.to_string(),
            bib_fields_to_merge: DEFAULT_BIB_FIELDS_TO_MERGE.to_string(),
            mhld_fields_to_merge: DEFAULT_MHLD_FIELDS_TO_MERGE.to_string(),
            anchor_tag: DEFAULT_ANCHOR_TAG.to_string(),
        }
    }

    /// Match field read from the record that opens a combined record.
    #[must_use]
    pub fn first_bib_match_field(&self) -> &MatchFieldSpec {
        &self.first_bib_match_field
    }

    /// Match field read from a look-ahead bib record.
    #[must_use]
    pub fn look_ahead_bib_match_field(&self) -> &MatchFieldSpec {
        &self.look_ahead_bib_match_field
    }

    /// Match field read from a holdings-summary record.
    #[must_use]
    pub fn mhld_match_field(&self) -> &MatchFieldSpec {
        &self.mhld_match_field
    }

    /// Selector for bib fields merged from follow-on bib records.
    #[must_use]
    pub fn bib_fields_to_merge(&self) -> &TagSelector {
        &self.bib_fields_to_merge
    }

    /// Selector for holdings fields merged from holdings-summary records.
    #[must_use]
    pub fn mhld_fields_to_merge(&self) -> &TagSelector {
        &self.mhld_fields_to_merge
    }

    /// Tag that merged holdings fields are inserted before.
    #[must_use]
    pub fn anchor_tag(&self) -> &str {
        &self.anchor_tag
    }
}

/// Builder for [`CombineConfig`].
///
/// Setters take the raw configuration strings; [`build`](Self::build)
/// validates and compiles them.
#[derive(Debug, Clone)]
pub struct CombineConfigBuilder {
    first_bib_match_field: String,
    look_ahead_bib_match_field: String,
    mhld_match_field: String,
    bib_fields_to_merge: String,
    mhld_fields_to_merge: String,
    anchor_tag: String,
}

impl CombineConfigBuilder {
    /// Field to match on in the record that opens a combined record.
    #[must_use]
    pub fn first_bib_match_field(mut self, spec: impl Into<String>) -> Self {
        self.first_bib_match_field = spec.into();
        self
    }

    /// Field to match on in a look-ahead bib record.
    #[must_use]
    pub fn look_ahead_bib_match_field(mut self, spec: impl Into<String>) -> Self {
        self.look_ahead_bib_match_field = spec.into();
        self
    }

    /// Field to match on in a holdings-summary record.
    #[must_use]
    pub fn mhld_match_field(mut self, spec: impl Into<String>) -> Self {
        self.mhld_match_field = spec.into();
        self
    }

    /// Pattern of bib fields to merge from follow-on bib records.
    #[must_use]
    pub fn bib_fields_to_merge(mut self, pattern: impl Into<String>) -> Self {
        self.bib_fields_to_merge = pattern.into();
        self
    }

    /// Pattern of holdings fields to merge from holdings-summary records.
    #[must_use]
    pub fn mhld_fields_to_merge(mut self, pattern: impl Into<String>) -> Self {
        self.mhld_fields_to_merge = pattern.into();
        self
    }

    /// Bib field that merged holdings fields are inserted before.
    #[must_use]
    pub fn anchor_tag(mut self, tag: impl Into<String>) -> Self {
        self.anchor_tag = tag.into();
        self
    }

    /// Validate and compile the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidConfig`] if a match field spec is
    /// malformed or a merge pattern fails to compile.
    pub fn build(self) -> Result<CombineConfig> {
        Ok(CombineConfig {
            first_bib_match_field: MatchFieldSpec::parse(&self.first_bib_match_field)?,
            look_ahead_bib_match_field: MatchFieldSpec::parse(&self.look_ahead_bib_match_field)?,
            mhld_match_field: MatchFieldSpec::parse(&self.mhld_match_field)?,
            bib_fields_to_merge: compile_selector(&self.bib_fields_to_merge)?,
            mhld_fields_to_merge: compile_selector(&self.mhld_fields_to_merge)?,
            anchor_tag: self.anchor_tag,
        })
    }
}

fn compile_selector(pattern: &str) -> Result<TagSelector> {
    TagSelector::new(pattern)
        .map_err(|e| MarcError::InvalidConfig(format!("Bad merge field pattern '{pattern}': {e}")))
}

/// A recorded ordering violation.
///
/// Kept so that every call after the first failure reports the same error
/// instead of yielding records from an untrustworthy stream.
#[derive(Debug, Clone)]
struct SequenceViolation {
    current_key: String,
    found_key: String,
    detail: &'static str,
}

impl SequenceViolation {
    fn to_error(&self) -> MarcError {
        MarcError::OutOfSequence {
            current_key: self.current_key.clone(),
            found_key: self.found_key.clone(),
            detail: self.detail.to_string(),
        }
    }
}

/// Reader that combines consecutive same-key records into one.
///
/// Wraps any [`RecordSource`] and yields logical records. See the
/// [module documentation](self) for the file layout this expects.
///
/// The reader holds at most one record of look-ahead: a record pulled from
/// the source either merges into the record being assembled or is buffered
/// as the seed of the next one. All state is private to the reader value;
/// dropping it releases the source.
#[derive(Debug)]
pub struct CombiningReader<S: RecordSource> {
    source: S,
    config: CombineConfig,
    lookahead: Option<Record>,
    pending_error: Option<MarcError>,
    failure: Option<SequenceViolation>,
    records_combined: usize,
}

impl<S: RecordSource> CombiningReader<S> {
    /// Create a combining reader with the default merge rules.
    pub fn new(source: S) -> Self {
        CombiningReader::with_config(source, CombineConfig::default())
    }

    /// Create a combining reader with explicit merge rules.
    pub fn with_config(source: S, config: CombineConfig) -> Self {
        CombiningReader {
            source,
            config,
            lookahead: None,
            pending_error: None,
            failure: None,
            records_combined: 0,
        }
    }

    /// The merge rules this reader was built with.
    #[must_use]
    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Number of combined records yielded so far.
    #[must_use]
    pub fn records_combined(&self) -> usize {
        self.records_combined
    }

    /// Whether another combined record is available.
    ///
    /// True if a record is buffered or the source has more. May pull one
    /// record from the source into the look-ahead buffer to find out; a
    /// source error encountered while probing is parked and returned by the
    /// next call to [`next_record`](Self::next_record). Always false after
    /// an ordering violation.
    pub fn has_next(&mut self) -> bool {
        if self.failure.is_some() {
            return false;
        }
        if self.lookahead.is_some() || self.pending_error.is_some() {
            return true;
        }
        match self.source.next_record() {
            Ok(Some(record)) => {
                self.lookahead = Some(record);
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.pending_error = Some(e);
                true
            }
        }
    }

    /// Read the next combined record.
    ///
    /// Pulls records from the source, merging them into the record being
    /// assembled for as long as their match keys are equal under natural
    /// comparison. Follow-on bib records contribute their selected bib
    /// fields, appended. Holdings-summary records contribute their selected
    /// holdings fields, spliced before the anchor tag: any bib-carried
    /// fields under those tags are discarded when the first holdings record
    /// arrives, and later holdings records accumulate after it. A bib
    /// record with a greater key closes the combined record and seeds the
    /// next call.
    ///
    /// # Errors
    ///
    /// - [`MarcError::OutOfSequence`] if a holdings record's key does not
    ///   equal the open record's key, or a bib record's key sorts before it.
    ///   The reader yields no further records afterwards; every subsequent
    ///   call returns the same error.
    /// - [`MarcError::EmptySource`] if nothing is available; call
    ///   [`has_next`](Self::has_next) first.
    /// - Any error the source raises while producing records.
    pub fn next_record(&mut self) -> Result<Record> {
        if let Some(violation) = &self.failure {
            return Err(violation.to_error());
        }

        let seed = match self.pull()? {
            Some(record) => record,
            None => return Err(MarcError::EmptySource),
        };
        let current_key = match_key(&seed, &self.config.first_bib_match_field);
        let mut combined = seed;
        let mut holdings_absorbed = false;

        while let Some(record) = self.pull()? {
            match RecordKind::of(&record) {
                RecordKind::HoldingsSummary => {
                    let key = match_key(&record, &self.config.mhld_match_field);
                    if natural_cmp(&key, &current_key) != Ordering::Equal {
                        return Err(self.fail(current_key, key, "unmatched holdings record"));
                    }
                    if holdings_absorbed {
                        splice_before_anchor(
                            &mut combined,
                            &record,
                            &self.config.mhld_fields_to_merge,
                            &self.config.anchor_tag,
                        );
                    } else {
                        merge_anchored(
                            &mut combined,
                            &record,
                            &self.config.mhld_fields_to_merge,
                            &self.config.anchor_tag,
                        );
                        holdings_absorbed = true;
                    }
                }
                RecordKind::Bibliographic => {
                    let key = match_key(&record, &self.config.look_ahead_bib_match_field);
                    match natural_cmp(&key, &current_key) {
                        Ordering::Greater => {
                            // Start of the next logical record
                            self.lookahead = Some(record);
                            break;
                        }
                        Ordering::Equal => {
                            merge_append(
                                &mut combined,
                                &record,
                                &self.config.bib_fields_to_merge,
                            );
                        }
                        Ordering::Less => {
                            return Err(self.fail(current_key, key, "input not sorted ascending"));
                        }
                    }
                }
            }
        }

        self.records_combined += 1;
        Ok(combined)
    }

    /// Read the next combined record, or `None` on clean exhaustion.
    ///
    /// The loop-friendly form of [`next_record`](Self::next_record):
    ///
    /// ```no_run
    /// # use marc_combine::{CombiningReader, MarcReader};
    /// # use std::fs::File;
    /// # let file = File::open("records.mrc")?;
    /// # let mut reader = CombiningReader::new(MarcReader::new(file));
    /// while let Some(record) = reader.read_record()? {
    ///     // ...
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`next_record`](Self::next_record), except that exhaustion is
    /// `Ok(None)` rather than [`MarcError::EmptySource`].
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.has_next() {
            self.next_record().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Take the next record: the buffered one, a parked source error, or a
    /// fresh pull from the source.
    fn pull(&mut self) -> Result<Option<Record>> {
        if let Some(e) = self.pending_error.take() {
            return Err(e);
        }
        if let Some(record) = self.lookahead.take() {
            return Ok(Some(record));
        }
        self.source.next_record()
    }

    /// Record an ordering violation and return its error.
    fn fail(&mut self, current_key: String, found_key: String, detail: &'static str) -> MarcError {
        let violation = SequenceViolation {
            current_key,
            found_key,
            detail,
        };
        let error = violation.to_error();
        self.failure = Some(violation);
        error
    }
}
