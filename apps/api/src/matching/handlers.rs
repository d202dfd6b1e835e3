//! Axum route handlers for the Matching API.
//!
//! Every handler validates, then moves the CPU-bound work (text extraction,
//! matching) onto `spawn_blocking` so the async executor stays responsive.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::matching::engine::{MatchEngine, MatchResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub jd_text: String,
    pub cv_text: String,
    pub topk: Option<usize>,
}

/// One pair in a JSON batch. Missing texts score as empty input.
#[derive(Debug, Deserialize)]
pub struct PairInput {
    pub jd_text: Option<String>,
    pub cv_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchJsonRequest {
    pub pairs: Vec<PairInput>,
    pub topk: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchJsonResponse {
    pub results: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct CvResult {
    pub cv_name: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

#[derive(Debug, Serialize)]
pub struct BatchFilesResponse {
    pub jd_name: String,
    pub results: Vec<CvResult>,
}

struct UploadedFile {
    name: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /predict
///
/// Scores one JD / CV pair given as JSON text.
pub async fn handle_predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<MatchResult>, AppError> {
    let Json(request) = payload?;
    let topk = resolve_topk(&state, request.topk)?;
    validate_text(&state, "jd_text", &request.jd_text)?;
    validate_text(&state, "cv_text", &request.cv_text)?;

    info!(
        "Prediction request: JD {} chars, CV {} chars, topk {topk}",
        request.jd_text.chars().count(),
        request.cv_text.chars().count()
    );

    let engine = state.engine.clone();
    let result = run_blocking("prediction", move || {
        engine.predict(&request.jd_text, &request.cv_text, topk)
    })
    .await?;

    Ok(Json(result))
}

/// POST /predict/batch_json
///
/// Scores up to `batch_limit` pairs. Results come back in request order.
pub async fn handle_predict_batch_json(
    State(state): State<AppState>,
    payload: Result<Json<BatchJsonRequest>, JsonRejection>,
) -> Result<Json<BatchJsonResponse>, AppError> {
    let Json(request) = payload?;
    let topk = resolve_topk(&state, request.topk)?;
    validate_batch_size(&state, request.pairs.len(), "pairs")?;

    let mut pairs = Vec::with_capacity(request.pairs.len());
    for (i, pair) in request.pairs.into_iter().enumerate() {
        let jd = pair.jd_text.unwrap_or_default();
        let cv = pair.cv_text.unwrap_or_default();
        check_length(&state, &format!("pairs[{i}].jd_text"), &jd)?;
        check_length(&state, &format!("pairs[{i}].cv_text"), &cv)?;
        pairs.push((jd, cv));
    }

    info!("Batch prediction request: {} pairs, topk {topk}", pairs.len());

    let engine = state.engine.clone();
    let results = run_blocking("batch prediction", move || {
        engine.batch_predict(&pairs, topk)
    })
    .await?;

    Ok(Json(BatchJsonResponse { results }))
}

/// POST /predict/files
///
/// Multipart upload: `jd_file`, `cv_file`, optional `topk`.
pub async fn handle_predict_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchResult>, AppError> {
    let mut jd_file: Option<UploadedFile> = None;
    let mut cv_file: Option<UploadedFile> = None;
    let mut topk_field: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "jd_file" => jd_file = Some(read_file(field).await?),
            "cv_file" => cv_file = Some(read_file(field).await?),
            "topk" => topk_field = Some(read_text(field).await?),
            other => warn!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    let jd_file = jd_file.ok_or_else(|| AppError::Validation("jd_file is required".to_string()))?;
    let cv_file = cv_file.ok_or_else(|| AppError::Validation("cv_file is required".to_string()))?;
    let topk = resolve_topk(&state, parse_topk(topk_field)?)?;

    info!(
        "File prediction request: JD '{}', CV '{}'",
        jd_file.name, cv_file.name
    );

    let engine = state.engine.clone();
    let result = run_blocking("file prediction", move || {
        let jd_text = extract_text(&jd_file.bytes, &jd_file.name)?;
        let cv_text = extract_text(&cv_file.bytes, &cv_file.name)?;
        Ok::<_, AppError>(engine.predict(&jd_text, &cv_text, topk))
    })
    .await??;

    Ok(Json(result))
}

/// POST /predict/batch
///
/// Multipart upload: one `jd_file`, one or more `cv_files`, optional `topk`.
/// A CV that cannot be read gets the zero result; the JD must be readable.
pub async fn handle_predict_batch_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchFilesResponse>, AppError> {
    let mut jd_file: Option<UploadedFile> = None;
    let mut cv_files: Vec<UploadedFile> = Vec::new();
    let mut topk_field: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "jd_file" => jd_file = Some(read_file(field).await?),
            "cv_files" => cv_files.push(read_file(field).await?),
            "topk" => topk_field = Some(read_text(field).await?),
            other => warn!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    let jd_file = jd_file.ok_or_else(|| AppError::Validation("jd_file is required".to_string()))?;
    validate_batch_size(&state, cv_files.len(), "cv_files")?;
    let topk = resolve_topk(&state, parse_topk(topk_field)?)?;

    info!(
        "Batch file prediction request: JD '{}', {} CVs",
        jd_file.name,
        cv_files.len()
    );

    let engine = state.engine.clone();
    let jd_name = jd_file.name.clone();
    let results = run_blocking("batch file prediction", move || {
        let jd_text = extract_text(&jd_file.bytes, &jd_file.name)?;
        Ok::<_, AppError>(score_cv_files(&engine, &jd_text, &cv_files, topk))
    })
    .await??;

    Ok(Json(BatchFilesResponse { jd_name, results }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn score_cv_files(
    engine: &Arc<MatchEngine>,
    jd_text: &str,
    cv_files: &[UploadedFile],
    topk: usize,
) -> Vec<CvResult> {
    cv_files
        .par_iter()
        .map(|cv| {
            let result = match extract_text(&cv.bytes, &cv.name) {
                Ok(cv_text) => engine.predict(jd_text, &cv_text, topk),
                Err(e) => {
                    warn!("Skipping unreadable CV '{}': {e}", cv.name);
                    MatchResult::zero(0)
                }
            };
            CvResult {
                cv_name: cv.name.clone(),
                result,
            }
        })
        .collect()
}

async fn run_blocking<T, F>(label: &str, work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {label}: {e}")))
}

fn resolve_topk(state: &AppState, requested: Option<usize>) -> Result<usize, AppError> {
    let topk = requested.unwrap_or_else(|| state.engine.default_topk());
    let max = state.config.max_topk;
    if !(1..=max).contains(&topk) {
        return Err(AppError::Validation(format!(
            "topk must be between 1 and {max}"
        )));
    }
    Ok(topk)
}

fn validate_text(state: &AppState, field: &str, text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    check_length(state, field, text)
}

fn check_length(state: &AppState, field: &str, text: &str) -> Result<(), AppError> {
    let max = state.config.max_text_len;
    if text.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}

fn validate_batch_size(state: &AppState, len: usize, field: &str) -> Result<(), AppError> {
    let limit = state.config.batch_limit;
    if len == 0 {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if len > limit {
        return Err(AppError::Validation(format!(
            "Too many {field} (max {limit})"
        )));
    }
    Ok(())
}

fn parse_topk(field: Option<String>) -> Result<Option<usize>, AppError> {
    field
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| AppError::Validation(format!("topk must be an integer, got '{raw}'")))
        })
        .transpose()
}

async fn next_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, AppError> {
    let name = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| field.name().unwrap_or_default().to_string());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read upload '{name}': {e}")))?;
    Ok(UploadedFile { name, bytes })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read form field: {e}")))
}
