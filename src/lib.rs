#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Library overview
//!
//! Binary MARC records are capped at 99999 bytes. Catalog systems that dump
//! records larger than that split them: the logical record becomes several
//! consecutive physical records sharing one match key, bibliographic
//! records first, then any holdings-summary (MHLD) records. This crate
//! reassembles them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marc_combine::{CombiningReader, MarcReader};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("export.mrc")?;
//! let mut reader = CombiningReader::new(MarcReader::new(file));
//!
//! while let Some(record) = reader.read_record()? {
//!     if let Some(title) = record.get_field("245").and_then(|f| f.get_subfield('a')) {
//!         println!("Title: {title}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`combining_reader`] — the combining state machine and its configuration
//! - [`record`] — core record structures (`Record`, `Field`, `Subfield`)
//! - [`leader`] — MARC record leader (24-byte header)
//! - [`classify`] — bibliographic vs. holdings-summary classification
//! - [`natural_sort`] — digit-aware match key comparison
//! - [`match_key`] — match key extraction
//! - [`tag_selector`] — merge field selectors
//! - [`field_merge`] — append and anchored field merges
//! - [`source`] — the `RecordSource` trait and in-memory sources
//! - [`reader`] — reading ISO 2709 binary MARC records
//! - [`writer`] — writing ISO 2709 binary MARC records
//! - [`error`] — error types and result type

pub mod classify;
pub mod combining_reader;
pub mod error;
pub mod field_merge;
pub mod leader;
pub mod match_key;
pub mod natural_sort;
pub mod reader;
/// Core MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod source;
pub mod tag_selector;
pub mod writer;

pub use classify::{RecordKind, HOLDINGS_RECORD_TYPES};
pub use combining_reader::{CombineConfig, CombineConfigBuilder, CombiningReader};
pub use error::{MarcError, Result};
pub use field_merge::{merge_anchored, merge_append, splice_before_anchor};
pub use leader::Leader;
pub use match_key::{match_key, MatchFieldSpec};
pub use natural_sort::natural_cmp;
pub use reader::MarcReader;
pub use record::{Field, FieldBuilder, Record, RecordBuilder, Subfield};
pub use source::{RecordSource, VecSource};
pub use tag_selector::TagSelector;
pub use writer::MarcWriter;
