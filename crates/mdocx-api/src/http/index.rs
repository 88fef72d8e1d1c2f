//! Static upload page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
