//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::view::WordRecord;
use crate::words::Language;

// ============================================
// WORDS DTOs
// ============================================

/// Query string for the top words endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TopWordsParams {
    /// Window size, defaults to the dashboard limit
    pub limit: Option<usize>,
}

/// Current top words
#[derive(Debug, Serialize)]
pub struct TopWordsResponse {
    pub words: Vec<WordRecord>,
    pub count: usize,
    pub read_time: DateTime<Utc>,
}

/// Identifiers to split and count
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Language whose naming convention applies
    pub language: Language,
    /// Function or method names
    pub identifiers: Vec<String>,
}

/// Ingest outcome
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Status: "ok" or "empty"
    pub status: String,
    /// Distinct words written
    pub words: usize,
    /// Total word occurrences
    pub occurrences: u64,
    /// Identifiers that did not follow the naming convention
    pub skipped: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "ok" or "terminated"
    pub backend: String,
    pub project_id: String,
    pub documents: usize,
    pub listeners: usize,
    pub ws_connections: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
