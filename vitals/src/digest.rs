//! Identity fingerprinting.

use std::hash::Hasher;

use fnv::FnvHasher;

// Field and string separators keep `("ab", "c")` and `("a", "bc")` from hashing identically.
const STRING_SEPARATOR: u8 = 0x00;
const FIELD_SEPARATOR: u8 = 0xff;

/// Computes a stable 64-bit fingerprint of a metric series.
///
/// The fingerprint covers the scrubbed name, the sorted constant label name/value pairs, and the
/// sorted variable label names. It is used purely as an index hint into the registry's series map;
/// the registry always reconfirms equality field by field, so fingerprint collisions cost a
/// comparison rather than a correctness bug.
pub(crate) fn series_digest(
    name: &str,
    constant_labels: &[(String, String)],
    sorted_variable_labels: &[String],
) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(name.as_bytes());
    hasher.write_u8(FIELD_SEPARATOR);
    for (label, value) in constant_labels {
        hasher.write(label.as_bytes());
        hasher.write_u8(STRING_SEPARATOR);
        hasher.write(value.as_bytes());
        hasher.write_u8(STRING_SEPARATOR);
    }
    hasher.write_u8(FIELD_SEPARATOR);
    for label in sorted_variable_labels {
        hasher.write(label.as_bytes());
        hasher.write_u8(STRING_SEPARATOR);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::series_digest;

    fn pairs(input: &[(&str, &str)]) -> Vec<(String, String)> {
        input.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn names(input: &[&str]) -> Vec<String> {
        input.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_equal_identities_hash_equal() {
        let a = series_digest("foo", &pairs(&[("bar", "baz")]), &names(&["quux"]));
        let b = series_digest("foo", &pairs(&[("bar", "baz")]), &names(&["quux"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_are_part_of_the_digest() {
        let a = series_digest("foo", &pairs(&[("bar", "baz")]), &[]);
        let b = series_digest("foo", &pairs(&[("bar", "quux")]), &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        // A constant label can't masquerade as a variable label, and a name can't bleed into the
        // label list.
        let a = series_digest("foo", &pairs(&[("bar", "")]), &[]);
        let b = series_digest("foo", &[], &names(&["bar"]));
        assert_ne!(a, b);

        let c = series_digest("foobar", &[], &[]);
        let d = series_digest("foo", &[], &names(&["bar"]));
        assert_ne!(c, d);
    }
}
