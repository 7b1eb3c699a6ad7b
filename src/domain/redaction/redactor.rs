//! De-identification and re-identification transforms

use once_cell::sync::Lazy;

use super::phi_map::{PhiCategory, PhiMap};
use super::rules::{EmailRule, GazetteerRule, HonorificRule, Matcher, PhiMatch, PhoneRule};

// Rule order is part of the contract: pattern rules run before gazetteers,
// the honorific heuristic runs last. Earlier rules win on overlapping spans.
static RULES: Lazy<Vec<Box<dyn Matcher>>> = Lazy::new(|| {
    vec![
        Box::new(PhoneRule),
        Box::new(EmailRule),
        Box::new(GazetteerRule::locations()),
        Box::new(GazetteerRule::first_names()),
        Box::new(HonorificRule),
    ]
});

/// Replace every recognized identifier with its category placeholder.
///
/// Pure and deterministic: output depends only on `text` and the static rule
/// tables. Applying the function to its own output changes nothing, because
/// placeholder tokens match no rule.
pub fn de_identify(text: &str) -> (String, PhiMap) {
    let mut accepted: Vec<PhiMatch> = Vec::new();

    for rule in RULES.iter() {
        for m in rule.find(text) {
            let overlaps = accepted.iter().any(|a| m.start < a.end && a.start < m.end);
            if !overlaps {
                accepted.push(m);
            }
        }
    }

    accepted.sort_by_key(|m| m.start);

    let mut output = String::with_capacity(text.len());
    let mut map = PhiMap::new();
    let mut cursor = 0;

    for m in &accepted {
        output.push_str(&text[cursor..m.start]);
        output.push_str(m.category.placeholder());
        map.insert(m.category, &text[m.start..m.end]);
        cursor = m.end;
    }
    output.push_str(&text[cursor..]);

    (output, map)
}

/// Substitute each placeholder present in `map` back to its original value.
///
/// Placeholders with no corresponding map entry are left untouched.
pub fn re_identify(text: &str, map: &PhiMap) -> String {
    let mut output = text.to_string();
    for (category, original) in map.iter() {
        output = output.replace(category.placeholder(), original);
    }
    output
}
