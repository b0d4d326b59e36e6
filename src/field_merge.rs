//! Field-level merge operations.
//!
//! When several physical records make up one logical record, only a selected
//! subset of each follow-on record's fields is carried over; everything else
//! (leader, control fields, the repeated descriptive fields) is already
//! present on the first record and is not duplicated.
//!
//! Three operations:
//!
//! - [`merge_append`] — the bib-into-bib rule: selected fields are appended
//!   to the end of the target, which is otherwise untouched.
//! - [`merge_anchored`] — the first holdings-into-bib merge: any target
//!   fields with selected tags are dropped (a bib record split for size may
//!   carry stale placeholders for holdings tags), then the incoming fields
//!   are spliced in immediately before the target's first anchor-tag field.
//! - [`splice_before_anchor`] — the continuation form for second and later
//!   holdings records of the same logical record: splice without removal, so
//!   fields already contributed by earlier holdings records accumulate in
//!   arrival order.
//!
//! All three mutate the target in place and never touch the source.

use crate::record::{Field, Record};
use crate::tag_selector::TagSelector;

/// Append `source`'s selected fields to the end of `target`.
///
/// Fields are taken in source document order. Existing target fields are not
/// inspected, removed, or reordered.
///
/// # Examples
///
/// ```
/// use marc_combine::{merge_append, Field, Leader, Record, TagSelector};
///
/// let mut target = Record::builder(Leader::default())
///     .field(Field::new("245".to_string(), '1', '0'))
///     .field(Field::new("999".to_string(), ' ', ' '))
///     .build();
/// let source = Record::builder(Leader::default())
///     .field(Field::new("999".to_string(), ' ', ' '))
///     .build();
///
/// merge_append(&mut target, &source, &TagSelector::new("999")?);
/// assert_eq!(target.tag_sequence(), vec!["245", "999", "999"]);
/// # Ok::<(), regex::Error>(())
/// ```
pub fn merge_append(target: &mut Record, source: &Record, selector: &TagSelector) {
    for field in selected(source, selector) {
        target.add_field(field.clone());
    }
}

/// Splice `source`'s selected fields into `target`, discarding collisions.
///
/// First removes every existing target field whose tag the selector matches,
/// then behaves as [`splice_before_anchor`]. This is the correct operation
/// for the first holdings record merged into a bib record: any selector-tag
/// fields already on the bib are placeholders superseded by the real
/// holdings data. Once holdings fields have been merged, use
/// [`splice_before_anchor`] for further holdings records, or their
/// contributions would be discarded as collisions too.
pub fn merge_anchored(
    target: &mut Record,
    source: &Record,
    selector: &TagSelector,
    anchor_tag: &str,
) {
    target.remove_fields_where(|field| selector.matches(&field.tag));
    splice_before_anchor(target, source, selector, anchor_tag);
}

/// Splice `source`'s selected fields into `target` before the anchor field.
///
/// Inserts the selected source fields, in source order, immediately before
/// the first target field tagged `anchor_tag` (at the end if the target has
/// none). Existing target fields are kept. Repeated calls compose: the
/// anchor position is re-evaluated against the current target each time, so
/// fields from successive records land in arrival order, all ahead of the
/// anchor.
pub fn splice_before_anchor(
    target: &mut Record,
    source: &Record,
    selector: &TagSelector,
    anchor_tag: &str,
) {
    let incoming: Vec<Field> = selected(source, selector).cloned().collect();
    let splice_at = target
        .first_index_of_tag(anchor_tag)
        .unwrap_or(target.fields.len());
    target.fields.splice(splice_at..splice_at, incoming);
}

fn selected<'a>(
    source: &'a Record,
    selector: &'a TagSelector,
) -> impl Iterator<Item = &'a Field> + 'a {
    source.fields().filter(|field| selector.matches(&field.tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;

    fn record_with_tags(tags: &[&str]) -> Record {
        let mut record = Record::new(Leader::default());
        for tag in tags {
            record.add_field(Field::new((*tag).to_string(), ' ', ' '));
        }
        record
    }

    fn tagged_field(tag: &str, marker: &str) -> Field {
        Field::builder(tag.to_string(), ' ', ' ')
            .subfield_str('a', marker)
            .build()
    }

    #[test]
    fn test_append_preserves_source_order() {
        let mut target = record_with_tags(&["245", "999"]);
        let mut source = Record::new(Leader::default());
        source.add_field(tagged_field("999", "one"));
        source.add_field(tagged_field("999", "two"));

        merge_append(&mut target, &source, &TagSelector::new("999").unwrap());

        assert_eq!(target.tag_sequence(), vec!["245", "999", "999", "999"]);
        let markers: Vec<_> = target
            .fields_by_tag("999")
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(markers, vec!["one", "two"]);
    }

    #[test]
    fn test_append_ignores_unselected_fields() {
        let mut target = record_with_tags(&["245"]);
        let source = record_with_tags(&["500", "999", "500"]);

        merge_append(&mut target, &source, &TagSelector::new("999").unwrap());

        assert_eq!(target.tag_sequence(), vec!["245", "999"]);
    }

    #[test]
    fn test_append_does_not_mutate_source() {
        let mut target = record_with_tags(&["245"]);
        let source = record_with_tags(&["999"]);
        let before = source.clone();

        merge_append(&mut target, &source, &TagSelector::new("999").unwrap());

        assert_eq!(source, before);
    }

    #[test]
    fn test_anchored_splices_before_anchor() {
        let mut target = record_with_tags(&["245", "999"]);
        let source = record_with_tags(&["852", "863"]);

        merge_anchored(
            &mut target,
            &source,
            &TagSelector::new("852|863").unwrap(),
            "999",
        );

        assert_eq!(target.tag_sequence(), vec!["245", "852", "863", "999"]);
    }

    #[test]
    fn test_anchored_appends_when_anchor_absent() {
        let mut target = record_with_tags(&["245"]);
        let source = record_with_tags(&["852"]);

        merge_anchored(
            &mut target,
            &source,
            &TagSelector::new("852").unwrap(),
            "999",
        );

        assert_eq!(target.tag_sequence(), vec!["245", "852"]);
    }

    #[test]
    fn test_anchored_removes_colliding_target_fields() {
        let mut target = Record::new(Leader::default());
        target.add_field(tagged_field("245", "title"));
        target.add_field(tagged_field("852", "stale"));
        target.add_field(tagged_field("999", "item"));
        let mut source = Record::new(Leader::default());
        source.add_field(tagged_field("852", "real"));

        merge_anchored(
            &mut target,
            &source,
            &TagSelector::new("852").unwrap(),
            "999",
        );

        assert_eq!(target.tag_sequence(), vec!["245", "852", "999"]);
        let markers: Vec<_> = target
            .fields_by_tag("852")
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(markers, vec!["real"]);
    }

    #[test]
    fn test_splice_composes_in_arrival_order() {
        let selector = TagSelector::new("852|853|863|866|867|868").unwrap();
        let mut target = record_with_tags(&["245", "999"]);
        let mut first = Record::new(Leader::default());
        first.add_field(tagged_field("852", "location"));
        first.add_field(tagged_field("866", "v.1-28"));
        let mut second = Record::new(Leader::default());
        second.add_field(tagged_field("863", "v.29"));
        second.add_field(tagged_field("863", "v.30"));

        merge_anchored(&mut target, &first, &selector, "999");
        splice_before_anchor(&mut target, &second, &selector, "999");

        assert_eq!(
            target.tag_sequence(),
            vec!["245", "852", "866", "863", "863", "999"]
        );
        let markers: Vec<_> = target
            .fields()
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(markers, vec!["location", "v.1-28", "v.29", "v.30"]);
    }

    #[test]
    fn test_splice_keeps_earlier_contributions() {
        // A second anchored merge with the full selector would discard the
        // first record's fields; the splice form keeps them.
        let selector = TagSelector::new("866").unwrap();
        let mut target = record_with_tags(&["245", "999"]);
        let mut first = Record::new(Leader::default());
        first.add_field(tagged_field("866", "one"));
        let mut second = Record::new(Leader::default());
        second.add_field(tagged_field("866", "two"));

        merge_anchored(&mut target, &first, &selector, "999");
        splice_before_anchor(&mut target, &second, &selector, "999");

        let markers: Vec<_> = target
            .fields_by_tag("866")
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(markers, vec!["one", "two"]);
    }

    #[test]
    fn test_anchored_does_not_touch_control_fields() {
        let mut target = Record::builder(Leader::default())
            .control_field_str("001", "u46")
            .field(Field::new("999".to_string(), ' ', ' '))
            .build();
        let source = Record::builder(Leader::default())
            .control_field_str("001", "u46")
            .field(Field::new("852".to_string(), ' ', ' '))
            .build();

        merge_anchored(
            &mut target,
            &source,
            &TagSelector::new("852").unwrap(),
            "999",
        );

        assert_eq!(target.get_control_field("001"), Some("u46"));
        assert_eq!(target.control_fields_iter().count(), 1);
    }
}
