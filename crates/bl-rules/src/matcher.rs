//! Rule matchers and match-quality scoring.
//!
//! A matcher decides whether one rule applies to an utterance and how
//! cleanly it applied. Quality scales the rule's base weight: an exact
//! phrase earns a small boost, scattered or fuzzy evidence is discounted.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

/// Flat boost for an utterance that is exactly a rule phrase.
pub const EXACT_BOOST: f64 = 0.05;
/// Discount for phrase words present but not contiguous.
pub const PARTIAL_FACTOR: f64 = 0.85;
/// Discount for terms matched only by token similarity.
pub const FUZZY_FACTOR: f64 = 0.7;

/// Similarity floor for fuzzy token matches. High enough that inflection
/// variants pass ("booking"/"bookings") while unrelated words
/// ("booking"/"cooking") do not.
const FUZZY_FLOOR: f64 = 0.92;

/// How cleanly a matcher applied, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// Terms found only via token similarity.
    Fuzzy,
    /// Phrase words all present but not contiguous.
    Partial,
    /// Matcher satisfied outright.
    Full,
    /// The utterance is exactly the rule phrase.
    Exact,
}

impl MatchQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Partial => "partial",
            Self::Full => "full",
            Self::Exact => "exact",
        }
    }

    /// Scale a rule's base weight by this quality.
    pub fn apply(&self, weight: f64) -> f64 {
        match self {
            Self::Exact => (weight + EXACT_BOOST).min(1.0),
            Self::Full => weight,
            Self::Partial => weight * PARTIAL_FACTOR,
            Self::Fuzzy => weight * FUZZY_FACTOR,
        }
    }
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preprocessed view of one utterance, built once and shared by every rule.
pub struct TextProbe<'a> {
    raw: &'a str,
    lowered: String,
    tokens: Vec<String>,
    token_text: String,
}

impl<'a> TextProbe<'a> {
    pub fn new(text: &'a str) -> Self {
        let lowered = text.to_ascii_lowercase();
        let tokens: Vec<String> = lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        let token_text = tokens.join(" ");
        Self {
            raw: text,
            lowered,
            tokens,
            token_text,
        }
    }

    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The utterance reduced to lowercase tokens joined by single spaces.
    /// "Cancel my booking!" becomes "cancel my booking".
    pub fn token_text(&self) -> &str {
        &self.token_text
    }

    /// Substring check with the left edge anchored on a word boundary.
    ///
    /// "cancel my book" matches inside "cancel my bookings" (a term may
    /// stop short of a word's end) but "ook" never matches "booking".
    pub fn contains_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        let mut from = 0;
        while let Some(pos) = self.lowered[from..].find(term) {
            let at = from + pos;
            let on_boundary = !self.lowered[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
            if on_boundary {
                return true;
            }
            // Step over one char so overlapping occurrences are still seen.
            from = at
                + self.lowered[at..]
                    .chars()
                    .next()
                    .map_or(1, |c| c.len_utf8());
        }
        false
    }

    /// Whether some token of the utterance is near-identical to `word`.
    pub fn fuzzy_token(&self, word: &str) -> bool {
        self.tokens
            .iter()
            .any(|t| strsim::jaro_winkler(t, word) >= FUZZY_FLOOR)
    }

    /// How a term appears in the utterance: contained outright, only via
    /// token similarity, or not at all. Multi-word terms match fuzzily
    /// when every word does.
    pub fn term_presence(&self, term: &str) -> Option<MatchQuality> {
        if self.contains_term(term) {
            return Some(MatchQuality::Full);
        }
        let mut words = term.split_whitespace().peekable();
        words.peek()?;
        if words.all(|w| self.fuzzy_token(w)) {
            return Some(MatchQuality::Fuzzy);
        }
        None
    }
}

/// How a rule decides whether it applies to an utterance.
///
/// Terms and phrases are matched case-insensitively; patterns run over the
/// raw utterance and choose their own flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// At least one term must be present.
    AnyOf { terms: Vec<String> },
    /// Every term must be present somewhere in the utterance.
    AllOf { terms: Vec<String> },
    /// A contiguous phrase. The whole utterance being the phrase earns
    /// the exact boost; the phrase's words scattered still count, discounted.
    Phrase { phrase: String },
    /// Regular expression over the raw utterance.
    Pattern { pattern: String },
}

impl Matcher {
    /// Validate and compile, lowercasing terms so rule authors may write
    /// them in any case. `rule` is only used for error context.
    pub fn compile(&self, rule: &str) -> RuleResult<CompiledMatcher> {
        let lower_terms = |terms: &[String]| -> RuleResult<Vec<String>> {
            let cleaned: Vec<String> = terms
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            if cleaned.is_empty() {
                return Err(RuleError::EmptyMatcher { rule: rule.into() });
            }
            Ok(cleaned)
        };

        match self {
            Self::AnyOf { terms } => Ok(CompiledMatcher::AnyOf {
                terms: lower_terms(terms)?,
            }),
            Self::AllOf { terms } => Ok(CompiledMatcher::AllOf {
                terms: lower_terms(terms)?,
            }),
            Self::Phrase { phrase } => {
                let phrase = phrase.trim().to_ascii_lowercase();
                if phrase.is_empty() {
                    return Err(RuleError::EmptyMatcher { rule: rule.into() });
                }
                let token_text = phrase
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(CompiledMatcher::Phrase { phrase, token_text })
            }
            Self::Pattern { pattern } => {
                let regex = Regex::new(pattern).map_err(|e| RuleError::Pattern {
                    rule: rule.into(),
                    message: e.to_string(),
                })?;
                Ok(CompiledMatcher::Pattern { regex })
            }
        }
    }
}

/// A matcher with its terms normalized and its regex compiled.
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    AnyOf { terms: Vec<String> },
    AllOf { terms: Vec<String> },
    Phrase { phrase: String, token_text: String },
    Pattern { regex: Regex },
}

impl CompiledMatcher {
    /// Evaluate against an utterance. `None` means the rule does not apply.
    pub fn evaluate(&self, probe: &TextProbe<'_>) -> Option<MatchQuality> {
        match self {
            Self::AnyOf { terms } => terms
                .iter()
                .filter_map(|t| probe.term_presence(t))
                .max(),
            Self::AllOf { terms } => {
                let mut worst = MatchQuality::Full;
                for term in terms {
                    worst = worst.min(probe.term_presence(term)?);
                }
                Some(worst)
            }
            Self::Phrase { phrase, token_text } => {
                if probe.token_text() == token_text {
                    return Some(MatchQuality::Exact);
                }
                if probe.contains_term(phrase) {
                    return Some(MatchQuality::Full);
                }
                let mut worst = MatchQuality::Full;
                for word in phrase.split_whitespace() {
                    worst = worst.min(probe.term_presence(word)?);
                }
                Some(worst.min(MatchQuality::Partial))
            }
            Self::Pattern { regex } => {
                regex.is_match(probe.raw()).then_some(MatchQuality::Full)
            }
        }
    }
}
