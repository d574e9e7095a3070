//! Latest-upload lookup through the YouTube Data API v3.
//! Requires the `youtube` feature flag and `YOUTUBE_API_KEY` environment variable.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Errors that can occur during YouTube API interactions.
#[derive(Error, Debug)]
pub enum YouTubeError {
    /// Error during HTTP request communication or a non-2xx status.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// The most recent upload of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVideo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// Keyed by size name (`default`, `medium`, `high`, ...).
    pub thumbnails: HashMap<String, Thumbnail>,
}

impl LatestVideo {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// The largest thumbnail available.
    pub fn best_thumbnail(&self) -> Option<&str> {
        ["maxres", "high", "medium", "default"]
            .iter()
            .find_map(|size| self.thumbnails.get(*size))
            .map(|thumbnail| thumbnail.url.as_str())
    }
}

impl From<SearchItem> for LatestVideo {
    fn from(item: SearchItem) -> Self {
        Self {
            video_id: item.id.video_id,
            title: item.snippet.title,
            description: item.snippet.description,
            thumbnails: item.snippet.thumbnails,
        }
    }
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(YOUTUBE_API_BASE, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Fetches the newest video of `channel_id`, or `None` when the channel has none.
    pub async fn latest_video(&self, channel_id: &str) -> Result<Option<LatestVideo>, YouTubeError> {
        let url = format!("{}/search", self.base_url);
        debug!("Fetching latest video of channel {}", channel_id);

        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", "1"),
                ("order", "date"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.items.into_iter().next().map(LatestVideo::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_latest_video() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UC123"))
            .and(query_param("order", "date"))
            .and(query_param("maxResults", "1"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": { "kind": "youtube#video", "videoId": "abc123" },
                    "snippet": {
                        "title": "Latest Video Title",
                        "description": "Description",
                        "thumbnails": {
                            "default": { "url": "https://i.ytimg.com/default.jpg" },
                            "high": { "url": "https://i.ytimg.com/high.jpg", "width": 480, "height": 360 }
                        }
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url(server.uri(), "secret");
        let video = client.latest_video("UC123").await.unwrap().unwrap();

        assert_eq!(video.video_id, "abc123");
        assert_eq!(video.title, "Latest Video Title");
        assert_eq!(video.url(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(video.best_thumbnail(), Some("https://i.ytimg.com/high.jpg"));
    }

    #[tokio::test]
    async fn test_channel_without_videos() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url(server.uri(), "secret");

        assert_eq!(client.latest_video("UC123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = YouTubeClient::with_base_url(server.uri(), "bad");

        assert_matches!(client.latest_video("UC123").await, Err(YouTubeError::Api(_)));
    }
}
