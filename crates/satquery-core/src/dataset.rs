use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::http_client::{HttpClient, HttpRequest};
use crate::QueryError;

/// Whether `path` is missing or was last modified more than `max_age` ago.
pub async fn is_stale(path: &Path, max_age: Duration) -> Result<bool, QueryError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(error) => return Err(error.into()),
    };
    let age = SystemTime::now()
        .duration_since(metadata.modified()?)
        .unwrap_or(Duration::ZERO);
    Ok(age > max_age)
}

/// Downloads `url` to `path` when the local copy is missing or older than
/// `max_age`. Returns whether a download happened.
pub async fn ensure_fresh(
    path: &Path,
    url: &str,
    max_age: Duration,
    http: &dyn HttpClient,
) -> Result<bool, QueryError> {
    if !is_stale(path, max_age).await? {
        tracing::debug!(path = %path.display(), "dataset is up to date");
        return Ok(false);
    }

    tracing::info!(url, path = %path.display(), "downloading dataset");
    let body = download(url, http).await?;
    write_dataset(path, &body).await?;
    Ok(true)
}

/// Fetches `url` and returns the raw body of a successful response.
pub async fn download(url: &str, http: &dyn HttpClient) -> Result<Vec<u8>, QueryError> {
    let response = http
        .execute(HttpRequest::get(url).with_timeout_ms(120_000))
        .await
        .map_err(|error| QueryError::Download {
            url: url.to_owned(),
            message: error.message().to_owned(),
        })?;
    if !response.is_success() {
        return Err(QueryError::Download {
            url: url.to_owned(),
            message: format!("status {}", response.status),
        });
    }
    Ok(response.body)
}

/// Writes `contents` to `path`, creating missing parent directories.
pub async fn write_dataset(path: &Path, contents: &[u8]) -> Result<(), QueryError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
