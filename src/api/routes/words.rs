//! Word Routes
//!
//! - GET /api/v1/words/top - One-shot top-N query
//! - POST /api/v1/words/ingest - Split identifiers and add their words

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{IngestRequest, IngestResponse, TopWordsParams, TopWordsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::view::WordRecord;
use crate::words::{record_tally, WordTally};

/// Largest window a single request may ask for
const MAX_TOP_LIMIT: usize = 1000;

/// Largest identifier batch accepted by ingest
const MAX_IDENTIFIERS: usize = 10_000;

/// GET /api/v1/words/top
///
/// Evaluates the dashboard query once, optionally with a different limit.
pub async fn top_words(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopWordsParams>,
) -> ApiResult<Json<TopWordsResponse>> {
    let limit = params.limit.unwrap_or(state.dashboard.limit);
    if limit > MAX_TOP_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit exceeds maximum of {}",
            MAX_TOP_LIMIT
        )));
    }

    let query = state.dashboard.query().limit(limit);
    let snapshot = state.words.query(&query)?;
    let words: Vec<WordRecord> = snapshot.docs.iter().map(WordRecord::from_document).collect();

    Ok(Json(TopWordsResponse {
        count: words.len(),
        words,
        read_time: snapshot.read_time,
    }))
}

/// POST /api/v1/words/ingest
///
/// Splits the identifiers by the language's naming convention and adds the
/// resulting word counts in one batch. Live dashboards update once.
pub async fn ingest_identifiers(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    if req.identifiers.is_empty() {
        return Err(ApiError::Validation("No identifiers given".to_string()));
    }

    if req.identifiers.len() > MAX_IDENTIFIERS {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} identifiers",
            MAX_IDENTIFIERS
        )));
    }

    let tally = WordTally::from_identifiers(req.language, &req.identifiers);

    if tally.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(IngestResponse {
                status: "empty".to_string(),
                words: 0,
                occurrences: 0,
                skipped: tally.skipped,
            }),
        ));
    }

    record_tally(&state.words, &tally)?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "ok".to_string(),
            words: tally.counts.len(),
            occurrences: tally.total(),
            skipped: tally.skipped,
        }),
    ))
}
