//! Vectorizer: pairwise TF-IDF over word n-grams.
//!
//! The vocabulary is fitted on exactly the two documents being compared and
//! thrown away afterwards. With a two-document corpus the IDF term can only
//! take two values (term in one document vs. both); `IdfWeighting` is the seam
//! for swapping in a corpus-trained table later.

use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Word n-gram lengths considered, inclusive.
pub const NGRAM_RANGE: (usize, usize) = (1, 3);

/// Documents in the fitted corpus: always the JD and the CV.
const PAIR_DOCS: usize = 2;

#[derive(Debug, Clone)]
pub struct VectorizerConfig {
    pub max_features: usize,
    /// Minimum number of documents (0–2) a term must occur in.
    pub min_df: usize,
    /// Maximum fraction of the two documents a term may occur in.
    pub max_df: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            min_df: 1,
            max_df: 1.0,
        }
    }
}

/// Inverse-document-frequency strategy.
pub trait IdfWeighting: Send + Sync {
    fn idf(&self, term: &str, df: usize, n_docs: usize) -> f64;
}

/// Smooth IDF over the document pair: `ln((1 + N) / (1 + df)) + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseIdf;

impl IdfWeighting for PairwiseIdf {
    fn idf(&self, _term: &str, df: usize, n_docs: usize) -> f64 {
        ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
    }
}

/// Sparse term vector: `(term index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
}

impl TermVector {
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product, walking both index-sorted entry lists in step.
    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ia, wa) = self.entries[i];
            let (ib, wb) = other.entries[j];
            if ia == ib {
                sum += wa * wb;
                i += 1;
                j += 1;
            } else if ia < ib {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Terms of a fitted pair, in index order (lexical).
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Output of fitting the vectorizer on one document pair.
#[derive(Debug, Clone, Default)]
pub struct FittedPair {
    pub vocabulary: Vocabulary,
    pub a: TermVector,
    pub b: TermVector,
}

pub struct TfidfVectorizer {
    config: VectorizerConfig,
    idf: Box<dyn IdfWeighting>,
}

impl TfidfVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self::with_idf(config, Box::new(PairwiseIdf))
    }

    pub fn with_idf(config: VectorizerConfig, idf: Box<dyn IdfWeighting>) -> Self {
        Self { config, idf }
    }

    /// Fits a vocabulary on the pair and returns it with both vectors.
    pub fn fit(&self, doc_a: &str, doc_b: &str) -> FittedPair {
        // BTreeMap keeps every downstream pass in lexical order, so repeated
        // calls produce bit-identical weights.
        let mut counts: BTreeMap<String, [usize; PAIR_DOCS]> = BTreeMap::new();
        for (doc_idx, doc) in [doc_a, doc_b].into_iter().enumerate() {
            let tokens: Vec<&str> = doc.split_whitespace().collect();
            for n in NGRAM_RANGE.0..=NGRAM_RANGE.1 {
                for window in tokens.windows(n) {
                    counts.entry(window.join(" ")).or_insert([0; PAIR_DOCS])[doc_idx] += 1;
                }
            }
        }

        let mut candidates: Vec<(String, [usize; PAIR_DOCS])> = counts
            .into_iter()
            .filter(|(_, c)| {
                let df = document_frequency(c);
                df >= self.config.min_df && (df as f64 / PAIR_DOCS as f64) <= self.config.max_df
            })
            .collect();

        if candidates.len() > self.config.max_features {
            // Stable sort: equal totals stay in lexical order.
            candidates.sort_by_key(|(_, c)| Reverse(c.iter().sum::<usize>()));
            candidates.truncate(self.config.max_features);
            candidates.sort_by(|(x, _), (y, _)| x.cmp(y));
        }

        if candidates.is_empty() {
            return FittedPair::default();
        }

        let mut a = Vec::new();
        let mut b = Vec::new();
        for (index, (term, c)) in candidates.iter().enumerate() {
            let idf = self.idf.idf(term, document_frequency(c), PAIR_DOCS);
            if c[0] > 0 {
                a.push((index, c[0] as f64 * idf));
            }
            if c[1] > 0 {
                b.push((index, c[1] as f64 * idf));
            }
        }

        FittedPair {
            vocabulary: Vocabulary {
                terms: candidates.into_iter().map(|(term, _)| term).collect(),
            },
            a: TermVector { entries: a }.l2_normalized(),
            b: TermVector { entries: b }.l2_normalized(),
        }
    }
}

fn document_frequency(counts: &[usize; PAIR_DOCS]) -> usize {
    counts.iter().filter(|&&c| c > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::new(VectorizerConfig::default())
    }

    #[test]
    fn test_vocabulary_holds_unigrams_bigrams_trigrams() {
        let fitted = vectorizer().fit("rust tokio axum", "rust");
        // rust, tokio, axum, rust tokio, tokio axum, rust tokio axum
        assert_eq!(fitted.vocabulary.len(), 6);
        assert_eq!(fitted.vocabulary.terms[0], "axum");
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let FittedPair { a, b, .. } =
            vectorizer().fit("python developer django", "python flask developer");
        assert!((a.norm() - 1.0).abs() < 1e-12);
        assert!((b.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_documents_give_empty_vectors() {
        let FittedPair { a, b, .. } = vectorizer().fit("", "");
        assert!(a.entries.is_empty());
        assert!(b.entries.is_empty());
        assert_eq!(a.norm(), 0.0);
    }

    #[test]
    fn test_one_empty_document_has_zero_norm() {
        let FittedPair { a, b, .. } = vectorizer().fit("python", "");
        assert!((a.norm() - 1.0).abs() < 1e-12);
        assert_eq!(b.norm(), 0.0);
    }

    #[test]
    fn test_pairwise_idf_values() {
        let idf = PairwiseIdf;
        assert!((idf.idf("x", 2, 2) - 1.0).abs() < 1e-12);
        assert!((idf.idf("x", 1, 2) - (1.5_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_shared_terms_weigh_less_than_unique_terms() {
        let fitted = vectorizer().fit("python java", "python");
        // lexical order: java, python, python java
        let weights: Vec<(usize, f64)> = fitted.a.entries.clone();
        let java = weights.iter().find(|(i, _)| *i == 0).unwrap().1;
        let python = weights.iter().find(|(i, _)| *i == 1).unwrap().1;
        assert!(java > python);
    }

    #[test]
    fn test_max_features_keeps_most_frequent_terms() {
        let v = TfidfVectorizer::new(VectorizerConfig {
            max_features: 2,
            ..VectorizerConfig::default()
        });
        let fitted = v.fit("go rust go", "rust zig");
        assert_eq!(fitted.vocabulary.len(), 2);
        // go: 2, rust: 2; everything else occurs once
        assert_eq!(fitted.vocabulary.terms[0], "go");
        assert_eq!(fitted.vocabulary.terms[1], "rust");
    }

    #[test]
    fn test_max_features_ties_break_lexically() {
        let v = TfidfVectorizer::new(VectorizerConfig {
            max_features: 1,
            ..VectorizerConfig::default()
        });
        let fitted = v.fit("beta alpha", "gamma");
        assert_eq!(fitted.vocabulary.terms[0], "alpha");
    }

    #[test]
    fn test_min_df_two_keeps_only_shared_terms() {
        let v = TfidfVectorizer::new(VectorizerConfig {
            min_df: 2,
            ..VectorizerConfig::default()
        });
        let fitted = v.fit("python java", "python go");
        assert_eq!(fitted.vocabulary.len(), 1);
        assert_eq!(fitted.vocabulary.terms[0], "python");
    }

    #[test]
    fn test_max_df_below_one_drops_shared_terms() {
        let v = TfidfVectorizer::new(VectorizerConfig {
            max_df: 0.95,
            ..VectorizerConfig::default()
        });
        let fitted = v.fit("python", "python");
        assert!(fitted.vocabulary.is_empty());
        assert!(fitted.a.entries.is_empty());
    }

    #[test]
    fn test_dot_of_disjoint_vectors_is_zero() {
        let FittedPair { a, b, .. } = vectorizer().fit("java developer", "marketing specialist");
        assert_eq!(a.dot(&b), 0.0);
    }
}
