use reqwest::Client;
use songbird::input::{HttpRequest, Input};
use std::fmt;
use tracing::debug;
use url::Url;

use super::music_manager::{MusicError, MusicResult};

/// A link to a media file on the trusted origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrl(Url);

impl MediaUrl {
    /// Accept `raw` only if it points to a file below `allowed_prefix`.
    ///
    /// The prefix is checked again after parsing so that dot segments cannot
    /// walk the path out of the trusted directory.
    pub fn parse(raw: &str, allowed_prefix: &str) -> MusicResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MusicError::InvalidInput("no link given".to_string()));
        }
        if !raw.starts_with(allowed_prefix) {
            return Err(MusicError::InvalidInput(format!(
                "only links starting with {} can be played",
                allowed_prefix
            )));
        }

        let url = Url::parse(raw).map_err(|e| MusicError::InvalidInput(e.to_string()))?;
        if !url.as_str().starts_with(allowed_prefix) {
            return Err(MusicError::InvalidInput(format!(
                "only links starting with {} can be played",
                allowed_prefix
            )));
        }

        let has_file = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .is_some_and(|segment| !segment.is_empty());
        if !has_file {
            return Err(MusicError::InvalidInput(
                "the link does not point to a file".to_string(),
            ));
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Short display name for a track: the file name at the end of its link
pub fn track_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| url.to_string())
}

/// Creates a songbird input that streams `url` over HTTP as it plays
pub fn create_input_from_url(client: &Client, url: &str) -> Input {
    debug!("Creating HTTP audio input for {}", url);
    HttpRequest::new(client.clone(), url.to_string()).into()
}
