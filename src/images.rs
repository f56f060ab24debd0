//! Image URL resolution and download.
//!
//! Result thumbnails point at a resizing proxy that carries the real image
//! location in its `url` query parameter, e.g.
//! `https://ca-times.brightspotcdn.com/dims4/default/abc/2147483647/resize/320x/?url=https%3A%2F%2Fcdn.example.com%2Fchip.jpg`.

use crate::error::{Result, ScrapeError};
use percent_encoding::percent_decode_str;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Something that can GET a URL and hand back the response body.
pub trait FetchBytes {
    /// Fetch `url`; non-2xx responses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

impl FetchBytes for reqwest::Client {
    #[instrument(level = "debug", skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded image");
        Ok(body.to_vec())
    }
}

/// Extract the real image location from a proxy `wrapper_url`.
///
/// Relative wrappers are resolved against `base`. Returns `None` when the
/// URL cannot be parsed or carries no `url` parameter.
pub fn resolve_image_url(wrapper_url: &str, base: &str) -> Option<String> {
    let parsed = match Url::parse(base) {
        Ok(base) => base.join(wrapper_url).ok()?,
        Err(_) => Url::parse(wrapper_url).ok()?,
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Last path segment of `url`, percent-decoded, with `.{default_extension}`
/// appended when it has no extension of its own.
pub fn filename_with_extension(url: &str, default_extension: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };
    // A decoded `%2F` must not turn the name into a path.
    let segment = percent_decode_str(&raw)
        .decode_utf8_lossy()
        .replace(['/', '\\'], "_");
    let name = if segment.is_empty() {
        "image".to_string()
    } else {
        segment
    };

    if Path::new(&name).extension().is_none() {
        format!("{name}.{default_extension}")
    } else {
        name
    }
}

/// Download `url` and write it to `{output_dir}/{filename}`.
///
/// The directory is created when missing; an existing file is overwritten.
#[instrument(level = "info", skip(fetcher, output_dir), fields(output_dir = %output_dir.display()))]
pub async fn fetch_and_store<F: FetchBytes>(
    fetcher: &F,
    url: &str,
    output_dir: &Path,
    filename: &str,
) -> Result<()> {
    let body = fetcher.get_bytes(url).await?;
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(filename);
    fs::write(&path, &body).await?;
    info!(path = %path.display(), bytes = body.len(), "Stored image");
    Ok(())
}
