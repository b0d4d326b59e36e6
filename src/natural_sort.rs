//! Digit-aware ("natural") ordering for record match keys.
//!
//! Catalog identifiers mix letters and numbers (`a11`, `u9`, `ocm00098765`),
//! and plain lexicographic order sorts `u10` before `u9`. [`natural_cmp`]
//! orders such keys the way an export sorted on numeric record ids does:
//! digit runs compare by magnitude, everything else by code points.
//!
//! The comparison is a pure function over its arguments. It keeps no cached
//! or shared state, so it is safe to call from any number of threads.
//!
//! # Examples
//!
//! ```
//! use marc_combine::natural_cmp;
//! use std::cmp::Ordering;
//!
//! assert_eq!(natural_cmp("9", "10"), Ordering::Less);
//! assert_eq!(natural_cmp("a9", "a10"), Ordering::Less);
//! assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
//! ```

use std::cmp::Ordering;

/// Compare two keys in natural order.
///
/// Each key is split into maximal runs of ASCII digits and maximal runs of
/// other characters, preserving order. Corresponding runs compare pairwise:
/// two digit runs compare by integer magnitude (leading zeros do not affect
/// magnitude), any other pairing compares by code-point order. The first run
/// pair that differs decides the result; if one key's run sequence is a
/// strict prefix of the other's, the shorter key sorts first.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut runs_a = runs(a);
    let mut runs_b = runs(b);

    loop {
        match (runs_a.next(), runs_b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(run_a), Some(run_b)) => {
                let ordering = compare_runs(run_a, run_b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// One maximal same-kind run of a key.
#[derive(Debug, Clone, Copy)]
struct Run<'a> {
    text: &'a str,
    is_digits: bool,
}

/// Split a key into maximal digit / non-digit runs, in order.
fn runs(key: &str) -> impl Iterator<Item = Run<'_>> {
    let mut rest = key;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_digits = first.is_ascii_digit();
        let split = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != is_digits)
            .map_or(rest.len(), |(i, _)| i);
        let (text, remainder) = rest.split_at(split);
        rest = remainder;
        Some(Run { text, is_digits })
    })
}

fn compare_runs(a: Run<'_>, b: Run<'_>) -> Ordering {
    if a.is_digits && b.is_digits {
        compare_magnitudes(a.text, b.text)
    } else {
        // Non-digit runs, and the mixed digit/non-digit case, compare by
        // code points. ASCII digits already sort before letters.
        a.text.cmp(b.text)
    }
}

/// Compare two all-digit runs by integer magnitude.
///
/// Works on runs of any length: leading zeros are stripped, then the longer
/// remaining run is the larger number, and equal lengths fall back to a
/// lexicographic digit comparison. No numeric conversion, so keys with more
/// digits than any machine integer still compare correctly.
fn compare_magnitudes(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_strings_compare_lexically() {
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
        assert_eq!(natural_cmp("b", "a"), Ordering::Greater);
    }

    #[test]
    fn test_digit_runs_compare_by_magnitude() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("a9", "a10"), Ordering::Less);
        assert_eq!(natural_cmp("a10b3", "a10b20"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_do_not_affect_magnitude() {
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("a007", "a7"), Ordering::Equal);
        assert_eq!(natural_cmp("008", "7"), Ordering::Greater);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("abc", "abc1"), Ordering::Less);
        assert_eq!(natural_cmp("a1", "a1b"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_mixed_runs_compare_by_code_point() {
        // ["a", "1"] vs ["aa"]: first runs decide
        assert_eq!(natural_cmp("a1", "aa"), Ordering::Less);
        // digit run vs letter run: digits sort first
        assert_eq!(natural_cmp("1", "a"), Ordering::Less);
    }

    #[test]
    fn test_long_digit_runs_do_not_overflow() {
        let small = "u99999999999999999999999999999999999998";
        let large = "u99999999999999999999999999999999999999";
        assert_eq!(natural_cmp(small, large), Ordering::Less);
        assert_eq!(natural_cmp(large, large), Ordering::Equal);
    }

    #[test]
    fn test_typical_catalog_identifiers() {
        assert_eq!(natural_cmp("u46", "u46"), Ordering::Equal);
        assert_eq!(natural_cmp("u46", "u47"), Ordering::Less);
        assert_eq!(natural_cmp("u9", "u10"), Ordering::Less);
        assert_eq!(natural_cmp("ocm00098765", "ocm98766"), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_reflexive(key in "[a-z0-9]{0,12}") {
            prop_assert_eq!(natural_cmp(&key, &key), Ordering::Equal);
        }

        #[test]
        fn prop_antisymmetric(a in "[a-z0-9]{0,12}", b in "[a-z0-9]{0,12}") {
            prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        }

        #[test]
        fn prop_transitive(
            a in "[a-z0-9]{0,8}",
            b in "[a-z0-9]{0,8}",
            c in "[a-z0-9]{0,8}",
        ) {
            if natural_cmp(&a, &b) != Ordering::Greater
                && natural_cmp(&b, &c) != Ordering::Greater
            {
                prop_assert_ne!(natural_cmp(&a, &c), Ordering::Greater);
            }
        }

        #[test]
        fn prop_agrees_with_integer_order(x in 0u64..1_000_000, y in 0u64..1_000_000) {
            prop_assert_eq!(
                natural_cmp(&x.to_string(), &y.to_string()),
                x.cmp(&y)
            );
        }
    }
}
