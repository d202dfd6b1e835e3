//! Lexical resources: the linguistic capabilities the normalizer depends on.
//!
//! `TextNormalizer` only sees `Arc<dyn LexicalResources>`, so alternate
//! language packs or test doubles plug in without touching the pipeline.
//! `EnglishLexicon` is built once at startup and shared read-only.

pub mod lemmatizer;
pub mod stopwords;
pub mod tagger;

use std::collections::HashSet;

/// Coarse grammatical role used to pick lemmatization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    Adjective,
    Verb,
    Noun,
    Adverb,
}

impl WordClass {
    /// Maps a Penn Treebank tag to a word class. Unknown tags are nouns.
    pub fn from_tag(tag: &str) -> Self {
        match tag.chars().next() {
            Some('J') => WordClass::Adjective,
            Some('V') => WordClass::Verb,
            Some('N') => WordClass::Noun,
            Some('R') => WordClass::Adverb,
            _ => WordClass::Noun,
        }
    }
}

/// Capability interface for stopword filtering, tagging, and lemmatization.
pub trait LexicalResources: Send + Sync {
    fn is_stopword(&self, token: &str) -> bool;

    /// Returns one part-of-speech tag per token, in order.
    fn tag_parts_of_speech(&self, tokens: &[&str]) -> Vec<String>;

    fn lemmatize(&self, token: &str, class: WordClass) -> String;
}

/// Default English resources: NLTK stopword list, suffix tagger, morphy-style lemmatizer.
#[derive(Debug, Clone)]
pub struct EnglishLexicon {
    stopwords: HashSet<&'static str>,
}

impl EnglishLexicon {
    pub fn new() -> Self {
        Self {
            stopwords: stopwords::ENGLISH_STOPWORDS.iter().copied().collect(),
        }
    }
}

impl Default for EnglishLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalResources for EnglishLexicon {
    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    fn tag_parts_of_speech(&self, tokens: &[&str]) -> Vec<String> {
        tagger::tag_tokens(tokens)
    }

    fn lemmatize(&self, token: &str, class: WordClass) -> String {
        lemmatizer::lemmatize(token, class)
    }
}
