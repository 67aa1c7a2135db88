//! Identifier scrubbing.
//!
//! Prometheus metric and label names must match `[a-zA-Z_][a-zA-Z0-9_]*`. Rather than rejecting
//! user-supplied identifiers outright, every name and label value is passed through a scrubbing
//! step that maps each invalid character to an underscore. Uniqueness is enforced on the scrubbed
//! form, which is why `foo&bar` and `foo_bar` identify the same metric.

/// Scrubs a metric or label name into the Prometheus name grammar.
///
/// Invalid characters become underscores, including a leading character that is valid elsewhere in
/// a name but not in the first position (so `123` scrubs to `_23`). Scrubbing is idempotent:
/// `scrub_name(scrub_name(s)) == scrub_name(s)` for all `s`.
pub fn scrub_name(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 && valid_name_start_character(c) || i != 0 && valid_name_character(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Scrubs a label value.
///
/// Values share the name character set but not the first-character rule, so a value may begin with
/// a digit. Like [`scrub_name`], this is idempotent.
pub fn scrub_label_value(value: &str) -> String {
    value.chars().map(|c| if valid_name_character(c) { c } else { '_' }).collect()
}

#[inline]
fn valid_name_start_character(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn valid_name_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
