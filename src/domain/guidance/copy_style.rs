//! Copy-style rules for assistant text.
//!
//! Assistant output must never read as a diagnosis. These patterns catch the
//! common ways a sentence asserts one.

use once_cell::sync::Lazy;
use regex::Regex;

struct CopyRule {
    regex: Regex,
    description: &'static str,
}

fn rule(pattern: &str, description: &'static str) -> CopyRule {
    CopyRule {
        regex: Regex::new(pattern).expect("copy-style patterns are valid regexes"),
        description,
    }
}

static DIAGNOSTIC_RULES: Lazy<Vec<CopyRule>> = Lazy::new(|| {
    vec![
        rule(
            r"(?i)\byou\s+have\s+(?:a\s+|an\s+)?(?:been\s+)?(?:diagnosed\s+with\s+)?[a-z]",
            "Direct diagnosis: 'you have [condition]'",
        ),
        rule(
            r"(?i)\byou(?:'re|\s+are)\s+suffering\s+from\b",
            "Direct diagnosis: 'you are suffering from'",
        ),
        rule(
            r"(?i)\byou\s+(?:likely|probably|possibly|definitely)\s+have\b",
            "Speculative diagnosis: 'you likely have'",
        ),
        rule(
            r"(?i)\bthis\s+(?:means|indicates|confirms|proves)\s+(?:that\s+)?you\s+have\b",
            "Indirect diagnosis: 'this means you have'",
        ),
        rule(
            r"(?i)\byour\s+condition\s+is\b",
            "Condition assertion: 'your condition is'",
        ),
        rule(
            r"(?i)\byou\s+(?:appear|seem)\s+to\s+have\b",
            "Implied diagnosis: 'you appear to have'",
        ),
        rule(
            r"(?i)\b(?:the\s+)?diagnosis\s+is\b",
            "Diagnosis statement: 'the diagnosis is'",
        ),
    ]
});

/// Descriptions of every rule `text` breaks.
pub fn violations(text: &str) -> Vec<&'static str> {
    DIAGNOSTIC_RULES
        .iter()
        .filter(|rule| rule.regex.is_match(text))
        .map(|rule| rule.description)
        .collect()
}

/// True if `text` breaks none of the rules.
pub fn is_compliant(text: &str) -> bool {
    DIAGNOSTIC_RULES.iter().all(|rule| !rule.regex.is_match(text))
}
