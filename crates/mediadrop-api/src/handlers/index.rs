use crate::state::AppState;
use axum::{extract::State, response::Html};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const MAX_FILE_SIZE_PLACEHOLDER: &str = "{{MAX_FILE_SIZE}}";

/// Browser upload page, showing the configured per-file limit
pub async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(INDEX_HTML.replace(
        MAX_FILE_SIZE_PLACEHOLDER,
        &format_size_limit(state.max_file_size_bytes()),
    ))
}

/// Largest whole unit that represents the limit exactly.
fn format_size_limit(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB && b % GB == 0 => format!("{}GB", b / GB),
        b if b >= MB && b % MB == 0 => format!("{}MB", b / MB),
        b if b >= KB && b % KB == 0 => format!("{}KB", b / KB),
        b => format!("{} bytes", b),
    }
}
