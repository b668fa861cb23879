//! Links that carry a username in their path.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the RFC 3986 unreserved set is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

pub fn user_profile(username: &str) -> String {
    format!("/users/{}", segment(username))
}

pub fn add_feedback(username: &str) -> String {
    format!("/users/{}/feedback/add", segment(username))
}
