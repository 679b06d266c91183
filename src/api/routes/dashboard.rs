//! Dashboard Route
//!
//! - GET / - The chart page. It connects to `/ws` and redraws on every snapshot.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
