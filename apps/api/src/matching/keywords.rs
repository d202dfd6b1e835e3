//! Fuzzy Keyword Extractor: JD phrases that approximately appear in the CV.
//!
//! Algorithm:
//! 1. Normalize both raw texts and cap each side's token count.
//! 2. Build candidate phrases per side: all tokens, then bigrams, then trigrams.
//! 3. For each JD phrase of at least `min_phrase_chars`, find the best indel
//!    ratio against every CV phrase; keep it when ≥ `score_cutoff`.
//! 4. Stable-sort kept phrases by descending ratio and take the first `topk`
//!    case-insensitively distinct ones.
//!
//! Step 3 is O(|JD phrases| × |CV phrases|). A length-only upper bound on the
//! ratio skips pairs that cannot reach the cutoff or beat the current best.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::matching::fuzzy::{ratio, ratio_upper_bound, RATIO_EPSILON};
use crate::matching::normalizer::TextNormalizer;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Minimum accepted ratio (0–100).
    pub score_cutoff: f64,
    pub min_phrase_chars: usize,
    /// Tokens considered per document when building phrases.
    pub max_phrase_tokens: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            score_cutoff: 70.0,
            min_phrase_chars: 3,
            max_phrase_tokens: 2_000,
        }
    }
}

pub struct KeywordExtractor {
    normalizer: Arc<TextNormalizer>,
    config: ExtractorConfig,
}

impl KeywordExtractor {
    pub fn new(normalizer: Arc<TextNormalizer>, config: ExtractorConfig) -> Self {
        Self { normalizer, config }
    }

    /// Returns up to `topk` JD phrases with a close match in the CV, strongest first.
    ///
    /// Takes raw text and runs its own normalization pass.
    pub fn extract(&self, jd_text: &str, cv_text: &str, topk: usize) -> Vec<String> {
        if topk == 0 || jd_text.trim().is_empty() || cv_text.trim().is_empty() {
            return vec![];
        }

        let jd_clean = self.normalizer.normalize(jd_text);
        let cv_clean = self.normalizer.normalize(cv_text);
        self.extract_normalized(&jd_clean, &cv_clean, topk)
    }

    /// Same as `extract`, for text that is already normalized.
    pub fn extract_normalized(&self, jd_clean: &str, cv_clean: &str, topk: usize) -> Vec<String> {
        if topk == 0 {
            return vec![];
        }

        let jd_phrases = generate_phrases(&self.capped_tokens(jd_clean));
        let cv_phrases = generate_phrases(&self.capped_tokens(cv_clean));
        if jd_phrases.is_empty() || cv_phrases.is_empty() {
            return vec![];
        }

        let cv_candidates: Vec<(&str, usize)> = cv_phrases
            .iter()
            .map(|p| (p.as_str(), p.chars().count()))
            .collect();

        let mut best_by_phrase: HashMap<&str, Option<f64>> = HashMap::new();
        let mut matches: Vec<(&str, f64)> = Vec::new();

        for phrase in &jd_phrases {
            if phrase.trim().chars().count() < self.config.min_phrase_chars {
                continue;
            }
            let best = *best_by_phrase
                .entry(phrase.as_str())
                .or_insert_with(|| self.best_match(phrase, &cv_candidates));
            if let Some(score) = best {
                matches.push((phrase.as_str(), score));
            }
        }

        // sort_by is stable: equal scores keep generation order
        matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut seen: HashSet<String> = HashSet::new();
        let mut keywords = Vec::new();
        for (phrase, _) in matches {
            if phrase.trim().chars().count() < self.config.min_phrase_chars {
                continue;
            }
            if seen.insert(phrase.to_lowercase()) {
                keywords.push(phrase.to_string());
                if keywords.len() >= topk {
                    break;
                }
            }
        }

        keywords
    }

    /// Best ratio of `phrase` against the CV phrases, if it clears the cutoff.
    fn best_match(&self, phrase: &str, cv_candidates: &[(&str, usize)]) -> Option<f64> {
        let jd_len = phrase.chars().count();
        let cutoff = self.config.score_cutoff - RATIO_EPSILON;
        let mut best: Option<f64> = None;

        for &(candidate, cv_len) in cv_candidates {
            let bound = ratio_upper_bound(jd_len, cv_len);
            if bound < cutoff || best.is_some_and(|b| bound <= b) {
                continue;
            }
            let score = ratio(phrase, candidate);
            if score >= cutoff && best.map_or(true, |b| score > b) {
                best = Some(score);
                if score >= 100.0 - RATIO_EPSILON {
                    break;
                }
            }
        }

        best
    }

    fn capped_tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace()
            .take(self.config.max_phrase_tokens)
            .collect()
    }
}

/// Unigrams, then bigrams, then trigrams, each in source order.
pub fn generate_phrases(tokens: &[&str]) -> Vec<String> {
    let mut phrases: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    phrases.extend(tokens.windows(2).map(|w| w.join(" ")));
    phrases.extend(tokens.windows(3).map(|w| w.join(" ")));
    phrases
}
