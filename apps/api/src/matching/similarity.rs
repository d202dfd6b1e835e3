//! Similarity Scorer: clamped cosine similarity behind a pluggable scorer trait.
//!
//! Default: `TfidfScorer` (pairwise TF-IDF vectors, deterministic).
//! Other backends (e.g. an embedding model) implement `MatchScorer` and are
//! handed to `MatchEngine::with_scorer` at startup.

use tracing::debug;

use crate::matching::vectorizer::{TermVector, TfidfVectorizer, VectorizerConfig};

// ────────────────────────────────────────────────────────────────────────────
// Outcome type
// ────────────────────────────────────────────────────────────────────────────

/// Why a similarity is what it is. All non-score variants project to 0.0.
#[derive(Debug, Clone, PartialEq)]
pub enum Similarity {
    Score(f64),
    /// Nothing left to compare after vectorization (zero-norm vector).
    Degenerate,
    InternalError(String),
}

/// Cosine similarity of two unit-length vectors, clamped to `[0, 1]`.
pub fn cosine(a: &TermVector, b: &TermVector) -> Similarity {
    if a.norm() == 0.0 || b.norm() == 0.0 {
        return Similarity::Degenerate;
    }

    let dot = a.dot(b);
    if !dot.is_finite() {
        return Similarity::InternalError(format!("non-finite dot product: {dot}"));
    }

    Similarity::Score(dot.clamp(0.0, 1.0))
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer trait
// ────────────────────────────────────────────────────────────────────────────

/// Scores two normalized documents. Implementations must not panic on any
/// input; the engine still guards the call.
pub trait MatchScorer: Send + Sync {
    /// Short backend label for logs.
    fn name(&self) -> &'static str;

    fn similarity(&self, jd_clean: &str, cv_clean: &str) -> Similarity;
}

/// Pairwise TF-IDF + cosine.
pub struct TfidfScorer {
    vectorizer: TfidfVectorizer,
}

impl TfidfScorer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(config),
        }
    }
}

impl MatchScorer for TfidfScorer {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn similarity(&self, jd_clean: &str, cv_clean: &str) -> Similarity {
        let fitted = self.vectorizer.fit(jd_clean, cv_clean);
        if fitted.vocabulary.is_empty() {
            return Similarity::Degenerate;
        }
        debug!("Fitted pair vocabulary: {} terms", fitted.vocabulary.len());
        cosine(&fitted.a, &fitted.b)
    }
}
