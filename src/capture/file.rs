use crate::capture::Snapshot;
use crate::error::CaptureError;
use std::path::Path;
use url::Url;

/// Reads an HTML file from disk and treats it as served from `url`
pub async fn load(path: &Path, url: &str) -> Result<Snapshot, CaptureError> {
    // Fail early: a snapshot with an unparsable URL is useless downstream
    Url::parse(url)?;

    ::log::debug!("Loading {} as {}", path.display(), url);
    let html = tokio::fs::read_to_string(path).await?;
    Ok(Snapshot::new(url, html))
}

/// The `file://` URL for a path, used when no URL is given
pub fn file_url(path: &Path) -> Result<String, CaptureError> {
    let absolute = std::fs::canonicalize(path)?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|_| {
            CaptureError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not an absolute path: {}", absolute.display()),
            ))
        })
}
