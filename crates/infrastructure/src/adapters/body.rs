//! Bounded response body reading.

use reqwest::Response;

/// Largest response body read from the exchange endpoint or the platform.
pub(crate) const MAX_BODY_BYTES: usize = 64 * 1024;

/// Failure while reading a response body.
#[derive(Debug)]
pub(crate) enum BodyError {
    Transport(reqwest::Error),
    TooLarge { limit: usize },
}

/// Reads the body, giving up once it exceeds `limit` bytes.
///
/// A declared `Content-Length` above the limit fails before any chunk is
/// read.
pub(crate) async fn read_limited(
    mut response: Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    let max = u64::try_from(limit).unwrap_or(u64::MAX);
    if response.content_length().is_some_and(|len| len > max) {
        return Err(BodyError::TooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(BodyError::Transport)? {
        if body.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
