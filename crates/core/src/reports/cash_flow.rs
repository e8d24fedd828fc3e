//! Cash-flow classification.
//!
//! An explicit tag on the entry wins. Without one, the narration's words are
//! matched against keyword lists in financing, investing, operating order;
//! anything unmatched is operating. Keywords match whole words (a trailing
//! plural `s` is accepted), so "repayment" is not "payment" and "current" is
//! not "rent".

use tally_shared::CashFlowMode;

use super::types::ClassificationSource;
use crate::ledger::CashFlowCategory;

/// Narration keywords for day-to-day trading.
pub const OPERATING_KEYWORDS: &[&str] = &[
    "sale",
    "invoice",
    "payment",
    "expense",
    "salary",
    "salaries",
    "wage",
    "receipt",
    "purchase of inventory",
    "inventory",
    "rent",
    "utilities",
    "tax",
];

/// Narration keywords for long-lived assets and investments.
pub const INVESTING_KEYWORDS: &[&str] = &[
    "asset purchase",
    "purchase of asset",
    "fixed asset",
    "equipment",
    "machinery",
    "vehicle",
    "property",
    "investment",
];

/// Narration keywords for funding.
pub const FINANCING_KEYWORDS: &[&str] = &[
    "loan",
    "capital",
    "dividend",
    "share",
    "shareholder",
    "drawing",
    "borrowing",
    "repayment",
];

/// Lowercased alphanumeric words of a narration.
fn words(narration: &str) -> Vec<String> {
    narration
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn word_matches(word: &str, keyword: &str) -> bool {
    word == keyword || word.strip_suffix('s') == Some(keyword)
}

/// Returns true if the keyword's words appear consecutively in `words`.
fn contains_keyword(words: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    if parts.is_empty() {
        return false;
    }
    words.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(word, part)| word_matches(word, part))
    })
}

/// Decides the cash-flow section of an entry.
#[must_use]
pub fn classify(
    mode: CashFlowMode,
    tag: Option<CashFlowCategory>,
    narration: &str,
) -> (CashFlowCategory, ClassificationSource) {
    if let (CashFlowMode::TagThenKeywords, Some(category)) = (mode, tag) {
        return (category, ClassificationSource::Tag);
    }

    let words = words(narration);
    let matches = |keywords: &[&str]| keywords.iter().any(|k| contains_keyword(&words, k));

    if matches(FINANCING_KEYWORDS) {
        (CashFlowCategory::Financing, ClassificationSource::Keyword)
    } else if matches(INVESTING_KEYWORDS) {
        (CashFlowCategory::Investing, ClassificationSource::Keyword)
    } else if matches(OPERATING_KEYWORDS) {
        (CashFlowCategory::Operating, ClassificationSource::Keyword)
    } else {
        (CashFlowCategory::Operating, ClassificationSource::Default)
    }
}
