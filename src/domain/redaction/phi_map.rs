//! PHI category and substitution map

use std::collections::BTreeMap;
use std::fmt;

/// Categories of recognizable personal identifiers.
///
/// Categories are coarse by design: one placeholder per category, not per
/// entity, so a map entry holds the last value seen for that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhiCategory {
    PatientName,
    Location,
    Phone,
    Email,
}

impl PhiCategory {
    /// The placeholder token substituted into de-identified text.
    /// Placeholders never re-match any redaction rule.
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::PatientName => "[PATIENT_NAME]",
            Self::Location => "[LOCATION]",
            Self::Phone => "[PHONE]",
            Self::Email => "[EMAIL]",
        }
    }

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PatientName => "patient_name",
            Self::Location => "location",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ephemeral map of category -> original value for one de-identification run.
///
/// Exists only to support later re-identification by an authorized caller.
/// Must never be persisted or logged in plaintext; the `Debug` impl masks
/// every value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PhiMap {
    entries: BTreeMap<PhiCategory, String>,
}

impl PhiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an original value for a category (last write wins)
    pub fn insert(&mut self, category: PhiCategory, original: impl Into<String>) {
        self.entries.insert(category, original.into());
    }

    /// Get the recorded original for a category
    pub fn get(&self, category: PhiCategory) -> Option<&str> {
        self.entries.get(&category).map(String::as_str)
    }

    /// Iterate over (category, original) pairs
    pub fn iter(&self) -> impl Iterator<Item = (PhiCategory, &str)> {
        self.entries.iter().map(|(c, v)| (*c, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PhiMap {
    // Values are PHI: only categories are ever printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_map();
        for (category, _) in self.entries.iter() {
            dbg.entry(category, &"<redacted>");
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_tokens() {
        assert_eq!(PhiCategory::PatientName.placeholder(), "[PATIENT_NAME]");
        assert_eq!(PhiCategory::Location.placeholder(), "[LOCATION]");
        assert_eq!(PhiCategory::Phone.placeholder(), "[PHONE]");
        assert_eq!(PhiCategory::Email.placeholder(), "[EMAIL]");
    }

    #[test]
    fn insert_and_get() {
        let mut map = PhiMap::new();
        map.insert(PhiCategory::Phone, "08012345678");
        assert_eq!(map.get(PhiCategory::Phone), Some("08012345678"));
        assert_eq!(map.get(PhiCategory::Email), None);
    }

    #[test]
    fn last_write_wins_per_category() {
        let mut map = PhiMap::new();
        map.insert(PhiCategory::PatientName, "Chidi");
        map.insert(PhiCategory::PatientName, "Ngozi");
        assert_eq!(map.get(PhiCategory::PatientName), Some("Ngozi"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn debug_never_prints_values() {
        let mut map = PhiMap::new();
        map.insert(PhiCategory::Email, "chidi@example.com");
        map.insert(PhiCategory::Phone, "08012345678");
        let printed = format!("{:?}", map);
        assert!(!printed.contains("chidi@example.com"));
        assert!(!printed.contains("08012345678"));
        assert!(printed.contains("Email"));
        assert!(printed.contains("<redacted>"));
    }
}
