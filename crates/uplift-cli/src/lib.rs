use anyhow::Context;
use bytes::Bytes;
use std::path::Path;
use uplift_core::SelectionItem;

/// Guess a content type from the file extension. Falls back to
/// application/octet-stream; the server stores whatever it is given.
pub fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "json" => "application/json",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Read a file from disk into a batch selection item.
pub async fn read_selection_item(path: &Path) -> anyhow::Result<SelectionItem> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid filename: {}", path.display()))?
        .to_string();

    let mime_type = guess_content_type(&name).to_string();
    Ok(SelectionItem::new(name, mime_type, Bytes::from(data)))
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
