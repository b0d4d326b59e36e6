//! Merge field selectors.
//!
//! Which fields move from one record to another during a combine is
//! configured as a regular expression over field tags, conventionally a plain
//! alternation such as `"999"` or `"852|853|863|866|867|868"`. A
//! [`TagSelector`] compiles the pattern once, anchored so it must match a
//! whole tag, and is then applied to every candidate field.

use regex::Regex;

/// A compiled predicate over field tags.
///
/// # Examples
///
/// ```
/// use marc_combine::TagSelector;
///
/// let selector = TagSelector::new("852|853|863")?;
/// assert!(selector.matches("852"));
/// assert!(!selector.matches("999"));
/// # Ok::<(), regex::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TagSelector {
    source: String,
    pattern: Regex,
}

impl TagSelector {
    /// Compile a selector from a tag pattern.
    ///
    /// The pattern is anchored on both ends, so `"99"` does not match tag
    /// `"999"` and `"999"` does not match inside a longer string.
    ///
    /// # Errors
    ///
    /// Returns a `regex::Error` if the pattern is not a valid regular
    /// expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TagSelector {
            source: pattern.to_string(),
            pattern: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    /// Check whether a tag is selected.
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        self.pattern.is_match(tag)
    }

    /// The pattern string this selector was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for TagSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
