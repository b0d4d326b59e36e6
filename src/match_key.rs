//! Match key extraction for record combining.
//!
//! Split records are tied together by a shared identifier, conventionally the
//! `001` control number. A [`MatchFieldSpec`] names where that identifier
//! lives: a control field, or a data field subfield for exports that carry
//! their ids elsewhere (e.g. `"035a"`). [`match_key`] pulls the trimmed
//! value out of a record.

use crate::error::{MarcError, Result};
use crate::record::Record;

/// Which field of a record carries its match key.
///
/// Parsed from a configuration string: a 3-character tag, optionally followed
/// by a single subfield code. Tags below `010` address a control field and
/// take no subfield code; other tags address the first data field with that
/// tag, reading the named subfield (subfield `a` when none is given).
///
/// # Examples
///
/// ```
/// use marc_combine::MatchFieldSpec;
///
/// let control = MatchFieldSpec::parse("001")?;
/// assert_eq!(control.tag(), "001");
/// assert_eq!(control.subfield(), None);
///
/// let data = MatchFieldSpec::parse("035a")?;
/// assert_eq!(data.tag(), "035");
/// assert_eq!(data.subfield(), Some('a'));
/// # Ok::<(), marc_combine::MarcError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFieldSpec {
    tag: String,
    subfield: Option<char>,
}

impl MatchFieldSpec {
    /// Parse a spec string of the form `"TTT"` or `"TTTc"`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidConfig`] if the string is not a
    /// 3-character alphanumeric tag with at most one subfield code, or if a
    /// subfield code is given for a control field tag.
    pub fn parse(spec: &str) -> Result<Self> {
        let chars: Vec<char> = spec.chars().collect();
        if chars.len() < 3 || chars.len() > 4 || !chars.iter().all(char::is_ascii_alphanumeric) {
            return Err(MarcError::InvalidConfig(format!(
                "Match field spec must be a 3-character tag plus optional subfield code, got '{spec}'"
            )));
        }

        let tag: String = chars[..3].iter().collect();
        let subfield = chars.get(3).copied();

        if tag.as_str() < "010" && subfield.is_some() {
            return Err(MarcError::InvalidConfig(format!(
                "Control field tag '{tag}' takes no subfield code"
            )));
        }

        Ok(MatchFieldSpec { tag, subfield })
    }

    /// The field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The subfield code, if one was given.
    #[must_use]
    pub fn subfield(&self) -> Option<char> {
        self.subfield
    }

    /// Whether this spec addresses a control field (tags `000`-`009`).
    #[must_use]
    pub fn is_control_field(&self) -> bool {
        self.tag.as_str() < "010"
    }
}

/// Extract a record's match key.
///
/// Returns the trimmed value of the field named by `spec`, or the empty
/// string when the field (or subfield) is absent. Absence is not
/// special-cased further: well-formed exports always carry the match field,
/// and two records that both lack it compare as equal empty keys.
///
/// # Examples
///
/// ```
/// use marc_combine::{match_key, Leader, MatchFieldSpec, Record};
///
/// let spec = MatchFieldSpec::parse("001")?;
/// let record = Record::builder(Leader::default())
///     .control_field_str("001", "  u46  ")
///     .build();
///
/// assert_eq!(match_key(&record, &spec), "u46");
/// # Ok::<(), marc_combine::MarcError>(())
/// ```
#[must_use]
pub fn match_key(record: &Record, spec: &MatchFieldSpec) -> String {
    let value = if spec.is_control_field() {
        record.get_control_field(spec.tag())
    } else {
        let code = spec.subfield().unwrap_or('a');
        record
            .fields_by_tag(spec.tag())
            .find_map(|field| field.get_subfield(code))
    };

    value.map_or_else(String::new, |v| v.trim().to_string())
}
