//! Matching Orchestrator: sequences normalize → score → extract and times it.
//!
//! `MatchEngine` is fail-soft: empty input, degenerate vectors, and internal
//! failures (including panics inside the pipeline) all come back as the zero
//! `MatchResult`. `assess` keeps the reason visible for tests and callers that
//! care; `predict` projects it to the wire shape.
//!
//! Built once at startup and shared as `Arc<MatchEngine>`. Holds no mutable
//! state, so concurrent calls need no locking.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::matching::keywords::{ExtractorConfig, KeywordExtractor};
use crate::matching::lexicon::{EnglishLexicon, LexicalResources};
use crate::matching::normalizer::{NormalizerConfig, TextNormalizer};
use crate::matching::similarity::{MatchScorer, Similarity, TfidfScorer};
use crate::matching::vectorizer::VectorizerConfig;

// ────────────────────────────────────────────────────────────────────────────
// Configuration / construction errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub normalizer: NormalizerConfig,
    pub vectorizer: VectorizerConfig,
    pub extractor: ExtractorConfig,
    /// Feature count used when a caller does not pass one.
    pub default_topk: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            vectorizer: VectorizerConfig::default(),
            extractor: ExtractorConfig::default(),
            default_topk: 6,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to compile normalizer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Public prediction result. Serialized as-is in HTTP responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: f64,            // 0.0 – 1.0
    pub percent: String,       // floor(score · 100) + "%"
    pub features: Vec<String>, // JD phrases, strongest first
    pub latency_ms: u64,
}

impl MatchResult {
    /// The zero result: no score, no features, only timing.
    pub fn zero(latency_ms: u64) -> Self {
        Self {
            score: 0.0,
            percent: format_percent(0.0),
            features: vec![],
            latency_ms,
        }
    }
}

/// Why an assessment produced the score it did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Scored(f64),
    EmptyInput,
    Degenerate,
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub outcome: Outcome,
    pub features: Vec<String>,
    pub elapsed: Duration,
}

impl Assessment {
    pub fn into_result(self) -> MatchResult {
        let latency_ms = (self.elapsed.as_secs_f64() * 1000.0).round() as u64;
        match self.outcome {
            Outcome::Scored(score) => MatchResult {
                score,
                percent: format_percent(score),
                features: self.features,
                latency_ms,
            },
            Outcome::Degenerate => MatchResult {
                features: self.features,
                ..MatchResult::zero(latency_ms)
            },
            Outcome::EmptyInput => MatchResult::zero(latency_ms),
            Outcome::InternalError(message) => {
                debug!("Projecting internal error to the zero result: {message}");
                MatchResult::zero(latency_ms)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct MatchEngine {
    normalizer: Arc<TextNormalizer>,
    scorer: Arc<dyn MatchScorer>,
    extractor: KeywordExtractor,
    default_topk: usize,
}

impl MatchEngine {
    /// Engine with the default pairwise TF-IDF scorer.
    pub fn new(
        config: EngineConfig,
        lexicon: Arc<dyn LexicalResources>,
    ) -> Result<Self, EngineError> {
        let scorer = Arc::new(TfidfScorer::new(config.vectorizer.clone()));
        Self::with_scorer(config, lexicon, scorer)
    }

    /// Default configuration with the built-in English lexicon.
    #[allow(dead_code)]
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(EngineConfig::default(), Arc::new(EnglishLexicon::new()))
    }

    /// Engine with a caller-supplied similarity backend.
    pub fn with_scorer(
        config: EngineConfig,
        lexicon: Arc<dyn LexicalResources>,
        scorer: Arc<dyn MatchScorer>,
    ) -> Result<Self, EngineError> {
        let normalizer = Arc::new(TextNormalizer::new(lexicon, config.normalizer)?);
        let extractor = KeywordExtractor::new(normalizer.clone(), config.extractor);

        Ok(Self {
            normalizer,
            scorer,
            extractor,
            default_topk: config.default_topk,
        })
    }

    pub fn default_topk(&self) -> usize {
        self.default_topk
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Scores a JD / CV pair and lists up to `topk` JD phrases found in the CV.
    pub fn predict(&self, jd_text: &str, cv_text: &str, topk: usize) -> MatchResult {
        self.assess(jd_text, cv_text, topk).into_result()
    }

    /// Same as `predict` over many pairs, in parallel. Output order matches input.
    pub fn batch_predict(&self, pairs: &[(String, String)], topk: usize) -> Vec<MatchResult> {
        pairs
            .par_iter()
            .map(|(jd, cv)| self.predict(jd, cv, topk))
            .collect()
    }

    /// Runs the pipeline and reports the outcome without projecting it.
    pub fn assess(&self, jd_text: &str, cv_text: &str, topk: usize) -> Assessment {
        let start = Instant::now();

        if jd_text.trim().is_empty() || cv_text.trim().is_empty() {
            return Assessment {
                outcome: Outcome::EmptyInput,
                features: vec![],
                elapsed: start.elapsed(),
            };
        }

        let run = catch_unwind(AssertUnwindSafe(|| self.run_pipeline(jd_text, cv_text, topk)));

        let (outcome, features) = match run {
            Ok(pair) => pair,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Match pipeline panicked: {message}");
                (Outcome::InternalError(message), vec![])
            }
        };

        let elapsed = start.elapsed();
        debug!(
            "Assessed pair with {}: {:?}, {} features in {:?}",
            self.scorer.name(),
            outcome,
            features.len(),
            elapsed
        );

        Assessment {
            outcome,
            features,
            elapsed,
        }
    }

    fn run_pipeline(&self, jd_text: &str, cv_text: &str, topk: usize) -> (Outcome, Vec<String>) {
        let jd_clean = self.normalizer.normalize(jd_text);
        let cv_clean = self.normalizer.normalize(cv_text);
        if jd_clean.is_empty() || cv_clean.is_empty() {
            return (Outcome::EmptyInput, vec![]);
        }

        let outcome = match self.scorer.similarity(&jd_clean, &cv_clean) {
            Similarity::Score(s) if s.is_finite() => Outcome::Scored(s.clamp(0.0, 1.0)),
            Similarity::Score(s) => {
                error!("Scorer {} returned non-finite score {s}", self.scorer.name());
                return (Outcome::InternalError(format!("non-finite score: {s}")), vec![]);
            }
            Similarity::Degenerate => {
                warn!("Degenerate vectors for non-empty pair; scoring 0");
                Outcome::Degenerate
            }
            Similarity::InternalError(message) => {
                error!("Scorer {} failed: {message}", self.scorer.name());
                return (Outcome::InternalError(message), vec![]);
            }
        };

        // normalize is idempotent, so the phrases come from the same tokens that were scored
        let features = self.extractor.extract(jd_text, cv_text, topk);

        (outcome, features)
    }
}

fn format_percent(score: f64) -> String {
    format!("{}%", (score * 100.0).floor() as u32)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MatchEngine {
        MatchEngine::with_defaults().unwrap()
    }

    const JD: &str = "We are looking for a Python developer with Django and REST API experience";
    const CV: &str = "Python developer, 5 years of Django, built REST APIs";

    #[test]
    fn test_reflexive_pair_scores_near_one() {
        let text = "Senior Rust engineer building distributed systems with tokio and axum";
        let result = engine().predict(text, text, 6);
        assert!(result.score > 0.95, "score was {}", result.score);
        assert!(result.score <= 1.0);
    }

    #[test]
    fn test_disjoint_pair_scores_zero() {
        let result = engine().predict(
            "Looking for a Java developer",
            "Digital marketing specialist",
            6,
        );
        assert_eq!(result.score, 0.0);
        assert_eq!(result.percent, "0%");
    }

    #[test]
    fn test_empty_side_gives_zero_result() {
        for (jd, cv) in [("", CV), (JD, ""), ("   ", "\n\t"), ("the and of", CV)] {
            let result = engine().predict(jd, cv, 6);
            assert_eq!(result.score, 0.0);
            assert_eq!(result.percent, "0%");
            assert!(result.features.is_empty());
        }
    }

    #[test]
    fn test_empty_input_outcome() {
        assert_eq!(engine().assess("", CV, 6).outcome, Outcome::EmptyInput);
        // only stopwords left after normalization
        assert_eq!(engine().assess("and the", CV, 6).outcome, Outcome::EmptyInput);
    }

    #[test]
    fn test_python_django_scenario() {
        let e = engine();
        let result = e.predict(JD, CV, 5);
        assert!(result.features.len() <= 5);
        assert!(result.features.iter().any(|f| f.contains("python")));
        assert!(result.features.iter().any(|f| f.contains("django")));

        let unrelated = e.predict(JD, "Digital marketing specialist", 5);
        assert!(result.score > 0.1, "score was {}", result.score);
        assert!(result.score > unrelated.score);
    }

    #[test]
    fn test_python_django_flask_scenario() {
        let e = engine();
        let result = e.predict(
            "Senior Python Developer with Django, Flask, and REST API experience",
            "Python Developer with 5 years experience in Django, Flask, and REST API development",
            5,
        );
        assert_eq!(result.features.len(), 5);
        assert!(result.features.contains(&"python".to_string()));
        assert!(result.features.contains(&"django".to_string()));
        assert!(result.features.contains(&"flask".to_string()));

        // pairwise TF-IDF cosine: 13 / sqrt(28.8 · 34.7) ≈ 0.41
        assert!((result.score - 0.41).abs() < 0.02, "score was {}", result.score);
        assert_eq!(result.percent, "41%");
    }

    #[test]
    fn test_features_respect_topk() {
        for topk in [1, 2, 3, 10] {
            let result = engine().predict(JD, CV, topk);
            assert!(result.features.len() <= topk);
        }
        assert!(engine().predict(JD, CV, 0).features.is_empty());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let e = engine();
        let a = e.predict(JD, CV, 6);
        let b = e.predict(JD, CV, 6);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.percent, b.percent);
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_features_are_jd_phrases() {
        let e = engine();
        let jd_clean = e.normalizer.normalize(JD);
        let tokens: Vec<&str> = jd_clean.split_whitespace().collect();
        let phrases = crate::matching::keywords::generate_phrases(&tokens);
        for feature in e.predict(JD, CV, 10).features {
            assert!(phrases.contains(&feature), "{feature} is not a JD phrase");
        }
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(0.4199), "41%");
        assert_eq!(format_percent(1.0), "100%");

        let result = engine().predict(JD, CV, 6);
        let digits = result.percent.trim_end_matches('%');
        assert!(result.percent.ends_with('%'));
        assert!((1..=3).contains(&digits.len()));
        assert_eq!(digits.parse::<u32>().unwrap(), (result.score * 100.0).floor() as u32);
    }

    #[test]
    fn test_batch_preserves_order_and_isolates_items() {
        let e = engine();
        let pairs = vec![
            (JD.to_string(), CV.to_string()),
            (String::new(), CV.to_string()),
            (JD.to_string(), JD.to_string()),
        ];
        let results = e.batch_predict(&pairs, 5);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].features, e.predict(JD, CV, 5).features);
        assert_eq!(results[0].score, e.predict(JD, CV, 5).score);
        assert_eq!(results[1].score, 0.0);
        assert!(results[2].score > 0.95);
    }

    #[test]
    fn test_batch_of_nothing_is_empty() {
        assert!(engine().batch_predict(&[], 5).is_empty());
    }

    struct PanickingScorer;

    impl MatchScorer for PanickingScorer {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn similarity(&self, _jd_clean: &str, _cv_clean: &str) -> Similarity {
            panic!("scorer blew up")
        }
    }

    struct FixedScorer(Similarity);

    impl MatchScorer for FixedScorer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn similarity(&self, _jd_clean: &str, _cv_clean: &str) -> Similarity {
            self.0.clone()
        }
    }

    fn engine_with(scorer: Arc<dyn MatchScorer>) -> MatchEngine {
        MatchEngine::with_scorer(
            EngineConfig::default(),
            Arc::new(EnglishLexicon::new()),
            scorer,
        )
        .unwrap()
    }

    #[test]
    fn test_panicking_scorer_yields_zero_result() {
        let e = engine_with(Arc::new(PanickingScorer));
        let assessment = e.assess(JD, CV, 6);
        assert_eq!(
            assessment.outcome,
            Outcome::InternalError("scorer blew up".to_string())
        );

        let result = e.predict(JD, CV, 6);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.percent, "0%");
        assert!(result.features.is_empty());
    }

    #[test]
    fn test_scorer_internal_error_yields_zero_result() {
        let e = engine_with(Arc::new(FixedScorer(Similarity::InternalError("nan".into()))));
        let result = e.predict(JD, CV, 6);
        assert_eq!(result, MatchResult { latency_ms: result.latency_ms, ..MatchResult::zero(0) });
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let high = engine_with(Arc::new(FixedScorer(Similarity::Score(1.5))));
        assert_eq!(high.predict(JD, CV, 6).score, 1.0);

        let low = engine_with(Arc::new(FixedScorer(Similarity::Score(-0.2))));
        assert_eq!(low.predict(JD, CV, 6).score, 0.0);

        let nan = engine_with(Arc::new(FixedScorer(Similarity::Score(f64::NAN))));
        assert!(matches!(nan.assess(JD, CV, 6).outcome, Outcome::InternalError(_)));
    }

    #[test]
    fn test_degenerate_keeps_features() {
        let e = engine_with(Arc::new(FixedScorer(Similarity::Degenerate)));
        let assessment = e.assess(JD, CV, 5);
        assert_eq!(assessment.outcome, Outcome::Degenerate);

        let result = assessment.into_result();
        assert_eq!(result.score, 0.0);
        assert!(!result.features.is_empty());
    }

    #[test]
    fn test_match_result_json_shape() {
        let value = serde_json::to_value(MatchResult::zero(3)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"score": 0.0, "percent": "0%", "features": [], "latency_ms": 3})
        );
    }
}
