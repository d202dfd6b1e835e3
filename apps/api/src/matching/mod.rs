//! Résumé / job-description matching.
//!
//! Pipeline: `normalizer` → `vectorizer` → `similarity` for the score, and
//! `keywords` (on top of `fuzzy`) for the JD phrases behind it. `engine` ties
//! them together; `handlers` exposes it over HTTP.

pub mod engine;
pub mod fuzzy;
pub mod handlers;
pub mod keywords;
pub mod lexicon;
pub mod normalizer;
pub mod similarity;
pub mod vectorizer;
