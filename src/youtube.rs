use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::resolver::VideoId;
use crate::segments::Segment;
use crate::source::{FetchError, TranscriptSource};

/// How long we wait on any single YouTube request before giving up.
/// Bounds worker occupancy when YouTube is slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A desktop UA keeps YouTube serving the standard watch page markup.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A `TranscriptSource` backed by YouTube's public watch page.
///
/// Fetch flow:
/// 1. Download the watch page for the video id.
/// 2. Extract the embedded `ytInitialPlayerResponse` JSON.
/// 3. Walk it to the first caption track's `baseUrl`.
/// 4. Download the timed-text XML and parse it into segments.
///
/// Missing caption data anywhere along that path is classified as
/// `FetchError::NotAvailable`; transport failures and unparseable pages are
/// `FetchError::Other`.
pub struct YouTubeSource {
    client: reqwest::Client,
    cue: Regex,
}

impl YouTubeSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let cue = Regex::new(r#"<text start="([^"]+)" dur="([^"]+)"[^>]*>([^<]+)</text>"#)
            .context("invalid cue pattern")?;

        Ok(Self { client, cue })
    }

    async fn watch_page(&self, id: &VideoId) -> Result<String> {
        let url = format!("https://www.youtube.com/watch?v={id}");
        let html = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("failed to fetch watch page for {id}"))?
            .text()
            .await
            .context("failed to read watch page body")?;

        Ok(html)
    }

    /// Parse the timed-text XML document into ordered segments.
    fn parse_timedtext(&self, xml: &str) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();

        for cap in self.cue.captures_iter(xml) {
            let start: f64 = cap[1].parse().context("cue start is not a number")?;
            let duration: f64 = cap[2].parse().context("cue duration is not a number")?;
            let text = html_escape::decode_html_entities(&cap[3]).into_owned();

            segments.push(Segment {
                text,
                start,
                duration,
            });
        }

        Ok(segments)
    }
}

#[async_trait]
impl TranscriptSource for YouTubeSource {
    async fn fetch(&self, id: &VideoId) -> Result<Vec<Segment>, FetchError> {
        let html = self.watch_page(id).await?;

        let json_str = extract_player_response(&html)
            .ok_or_else(|| anyhow!("no player response found in watch page"))?;
        let player: serde_json::Value =
            serde_json::from_str(json_str).context("player response is not valid JSON")?;

        // Videos without captions simply omit this subtree.
        let Some(base_url) = first_caption_track_url(&player) else {
            debug!(video_id = %id, "watch page has no caption tracks");
            return Err(FetchError::NotAvailable);
        };

        let xml = self
            .client
            .get(base_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .context("failed to fetch caption track")?
            .text()
            .await
            .context("failed to read caption track body")?;

        let segments = self.parse_timedtext(&xml)?;
        if segments.is_empty() {
            // A track URL that serves no cues is treated the same as no track.
            debug!(video_id = %id, "caption track contained no cues");
            return Err(FetchError::NotAvailable);
        }

        Ok(segments)
    }
}

/// Extract the `ytInitialPlayerResponse` JSON blob from watch page HTML.
fn extract_player_response(html: &str) -> Option<&str> {
    let start_marker = "ytInitialPlayerResponse = ";
    let end_marker = ";</script>";

    html.find(start_marker).map(|start_idx| {
        let start_pos = start_idx + start_marker.len();
        let sub_str = &html[start_pos..];
        let end_pos = sub_str.find(end_marker).unwrap_or(sub_str.len());
        &sub_str[..end_pos]
    })
}

/// Walk the player response to the first caption track's URL.
fn first_caption_track_url(player: &serde_json::Value) -> Option<&str> {
    player
        .get("captions")?
        .get("playerCaptionsTracklistRenderer")?
        .get("captionTracks")?
        .as_array()?
        .first()?
        .get("baseUrl")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_player_response_between_markers() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions": {}};</script>"#;
        assert_eq!(extract_player_response(html), Some(r#"{"captions": {}}"#));
    }

    #[test]
    fn extract_player_response_missing_marker_is_none() {
        assert_eq!(extract_player_response("<html></html>"), None);
    }

    #[test]
    fn finds_first_caption_track_url() {
        let player = serde_json::json!({
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {"baseUrl": "https://example.com/track1"},
                        {"baseUrl": "https://example.com/track2"}
                    ]
                }
            }
        });
        assert_eq!(
            first_caption_track_url(&player),
            Some("https://example.com/track1")
        );
    }

    #[test]
    fn missing_captions_subtree_yields_none() {
        let player = serde_json::json!({"videoDetails": {}});
        assert_eq!(first_caption_track_url(&player), None);

        let empty_tracks = serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": []}}
        });
        assert_eq!(first_caption_track_url(&empty_tracks), None);
    }

    #[test]
    fn parses_timedtext_cues_in_order() -> anyhow::Result<()> {
        let source = YouTubeSource::new()?;
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="1.5">Hi</text>
<text start="1.5" dur="2.04">it&#39;s me &amp; you</text>
</transcript>"#;

        let segments = source.parse_timedtext(xml)?;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hi");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].duration, 1.5);
        assert_eq!(segments[1].text, "it's me & you");
        assert_eq!(segments[1].start, 1.5);
        Ok(())
    }

    #[test]
    fn timedtext_without_cues_parses_to_empty() -> anyhow::Result<()> {
        let source = YouTubeSource::new()?;
        let segments = source.parse_timedtext("<transcript></transcript>")?;
        assert!(segments.is_empty());
        Ok(())
    }
}
