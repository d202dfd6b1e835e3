//! Text Normalizer: turns raw JD / CV text into a lemmatized token string.
//!
//! Two stages:
//! 1. `clean` strips markup, contact details, and stray symbols, then lower-cases.
//! 2. `normalize` tokenizes the cleaned text, drops stopwords and short tokens,
//!    and lemmatizes each survivor under its tagged word class.
//!
//! Output is stable under re-application: `normalize(normalize(x)) == normalize(x)`.

use std::sync::Arc;

use regex::Regex;

use crate::matching::lexicon::{LexicalResources, WordClass};

/// Tunables for the normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Tokens (and lemmas) shorter than this many characters are dropped.
    pub min_token_len: usize,
    pub remove_digits: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: 2,
            remove_digits: false,
        }
    }
}

/// Upper bound on `normalize` passes.
const MAX_PASSES: usize = 8;

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

pub struct TextNormalizer {
    lexicon: Arc<dyn LexicalResources>,
    config: NormalizerConfig,
    markup: Regex,
    url: Regex,
    email: Regex,
    phone: Regex,
    disallowed: Regex,
    digits: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    pub fn new(
        lexicon: Arc<dyn LexicalResources>,
        config: NormalizerConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            lexicon,
            config,
            markup: Regex::new(r"<[^>]+>")?,
            url: Regex::new(r"https?://\S+|www\.\S+")?,
            email: Regex::new(r"\S+@\S+")?,
            phone: Regex::new(r"\+?\d[\d\-\s()]{6,}\d")?,
            disallowed: Regex::new(r"[^A-Za-z0-9+#.\-\s]")?,
            digits: Regex::new(r"\d+")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Character-level cleanup: markup, URLs, emails, phone numbers, symbols, case.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let s = text.replace('\0', " ");
        let s = self.markup.replace_all(&s, " ");
        let s = decode_entities(&s);
        let s = self.url.replace_all(&s, " ");
        let s = self.email.replace_all(&s, " ");
        let s = self.phone.replace_all(&s, " ");
        let s = self.disallowed.replace_all(&s, " ");
        let s = if self.config.remove_digits {
            self.digits.replace_all(&s, " ")
        } else {
            s
        };
        let s = self.whitespace.replace_all(&s, " ");
        // stripping symbols can join digit groups into a phone-shaped run
        let s = self.phone.replace_all(&s, " ");
        let s = self.whitespace.replace_all(&s, " ");

        s.trim().to_lowercase()
    }

    /// Full normalization: `clean`, then tokenize, filter, and lemmatize.
    ///
    /// Passes repeat until the text stops changing: dropping a stopword or a
    /// short token can leave digit groups adjacent, which the next pass cleans.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.normalize_pass(text);
        for _ in 1..MAX_PASSES {
            let next = self.normalize_pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn normalize_pass(&self, text: &str) -> String {
        let cleaned = self.clean(text);
        if cleaned.is_empty() {
            return String::new();
        }

        let tokens = tokenize(&cleaned);
        let tags = self.lexicon.tag_parts_of_speech(&tokens);

        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        for (token, tag) in tokens.iter().zip(tags.iter()) {
            if !self.keeps(token) {
                continue;
            }
            let lemma = self.lexicon.lemmatize(token, WordClass::from_tag(tag));
            let lemma = lemma.trim();
            if lemma.is_empty() || !self.keeps(lemma) {
                continue;
            }
            out.push(lemma.to_string());
        }

        out.join(" ")
    }

    fn keeps(&self, token: &str) -> bool {
        token.chars().count() >= self.config.min_token_len && !self.lexicon.is_stopword(token)
    }
}

/// Splits cleaned text into word tokens, shedding sentence punctuation at the edges.
fn tokenize(cleaned: &str) -> Vec<&str> {
    cleaned
        .split_whitespace()
        .map(|t| {
            t.trim_start_matches('-')
                .trim_end_matches(|c| c == '.' || c == '-')
        })
        .filter(|t| t.chars().any(|c| c.is_alphanumeric()))
        .collect()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    HTML_ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}
