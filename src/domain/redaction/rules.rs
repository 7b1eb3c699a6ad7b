//! Redaction matcher rules
//!
//! Each rule is an independent matcher over raw text. The redactor applies
//! them as an ordered, immutable list; individual rules stay unit-testable
//! and new languages only add entries here, never orchestration changes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::PhiCategory;

/// One matched identifier span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhiMatch {
    pub start: usize,
    pub end: usize,
    pub category: PhiCategory,
}

/// A single redaction rule
pub trait Matcher: Send + Sync {
    /// Rule name for diagnostics
    fn name(&self) -> &'static str;

    /// Find every span this rule recognizes in `text`
    fn find(&self, text: &str) -> Vec<PhiMatch>;
}

// Nigerian mobile numbers (0801/+234 801 style, optional group separators)
// plus generic international numbers. No digit survives a match, so the
// placeholder token can never re-match.
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+234[\s-]?|\b0)[789][01]\d[\s-]?\d{3}[\s-]?\d{4}\b|\+\d{10,14}\b")
        .unwrap()
});

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static HONORIFIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:Dr|Mr|Mrs|Ms|Miss|Prof)\.?\s+([A-Z][a-z]+)").unwrap());

/// Closed gazetteer of regional place names
pub const LOCATIONS: &[&str] = &[
    "Port Harcourt",
    "Victoria Island",
    "Lagos",
    "Abuja",
    "Ikeja",
    "Lekki",
    "Ibadan",
    "Surulere",
    "Yaba",
    "Kano",
    "Enugu",
    "Abeokuta",
];

/// Closed gazetteer of regional personal first names
pub const FIRST_NAMES: &[&str] = &[
    "Chidi", "Ngozi", "Emeka", "Amaka", "Tunde", "Funke", "Kemi", "Sade", "Bola", "Chioma",
    "Ifeanyi", "Yemi", "Uche", "Segun", "Adaeze", "Femi", "Zainab", "Aisha", "Musa", "Obi",
];

/// Phone-number pattern rule
pub struct PhoneRule;

impl Matcher for PhoneRule {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn find(&self, text: &str) -> Vec<PhiMatch> {
        PHONE_REGEX
            .find_iter(text)
            .map(|m| PhiMatch {
                start: m.start(),
                end: m.end(),
                category: PhiCategory::Phone,
            })
            .collect()
    }
}

/// Email pattern rule
pub struct EmailRule;

impl Matcher for EmailRule {
    fn name(&self) -> &'static str {
        "email"
    }

    fn find(&self, text: &str) -> Vec<PhiMatch> {
        EMAIL_REGEX
            .find_iter(text)
            .map(|m| PhiMatch {
                start: m.start(),
                end: m.end(),
                category: PhiCategory::Email,
            })
            .collect()
    }
}

/// Closed word-list rule, word-bounded and case-sensitive
pub struct GazetteerRule {
    name: &'static str,
    category: PhiCategory,
    regex: Regex,
}

impl GazetteerRule {
    pub fn new(name: &'static str, category: PhiCategory, entries: &[&str]) -> Self {
        let escaped: Vec<String> = entries.iter().map(|e| regex::escape(e)).collect();
        let pattern = format!(r"\b(?:{})\b", escaped.join("|"));
        Self {
            name,
            category,
            // Entries are static identifiers; the pattern is valid by construction
            regex: Regex::new(&pattern).expect("gazetteer pattern"),
        }
    }

    /// The standard location gazetteer
    pub fn locations() -> Self {
        Self::new("location", PhiCategory::Location, LOCATIONS)
    }

    /// The standard first-name gazetteer
    pub fn first_names() -> Self {
        Self::new("first_name", PhiCategory::PatientName, FIRST_NAMES)
    }
}

impl Matcher for GazetteerRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, text: &str) -> Vec<PhiMatch> {
        self.regex
            .find_iter(text)
            .map(|m| PhiMatch {
                start: m.start(),
                end: m.end(),
                category: self.category,
            })
            .collect()
    }
}

/// Heuristic rule: a capitalized word following an honorific is a name.
/// Only the name is redacted; the honorific itself survives.
pub struct HonorificRule;

impl Matcher for HonorificRule {
    fn name(&self) -> &'static str {
        "honorific"
    }

    fn find(&self, text: &str) -> Vec<PhiMatch> {
        HONORIFIC_REGEX
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| PhiMatch {
                start: m.start(),
                end: m.end(),
                category: PhiCategory::PatientName,
            })
            .collect()
    }
}
