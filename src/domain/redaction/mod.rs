//! PHI de-identification and re-identification
//!
//! Pure, rule-driven text transforms. De-identification replaces each
//! recognized identifier with its category's placeholder token and records
//! the original value in an ephemeral [`PhiMap`]; re-identification reverses
//! the substitution for authorized rendering. Nothing in this module
//! performs I/O or retains state between calls.

mod phi_map;
mod redactor;
mod rules;

pub use phi_map::{PhiCategory, PhiMap};
pub use redactor::{de_identify, re_identify};
pub use rules::{EmailRule, GazetteerRule, HonorificRule, Matcher, PhiMatch, PhoneRule};
