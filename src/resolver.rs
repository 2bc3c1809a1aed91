use std::fmt;

use anyhow::{Result, anyhow};
use url::Url;

/// A canonical YouTube video identifier.
///
/// Identifiers are 11 characters drawn from `[A-Za-z0-9_-]`. We validate at
/// construction so everything downstream can treat the inner string as safe
/// to interpolate into request URLs and log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.len() != 11 || !raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return Err(anyhow!("'{raw}' is not a valid video id"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps an arbitrary video URL to the platform's canonical identifier.
///
/// This is a capability seam: the gateway only needs "URL in, id or failure
/// out", so tests can substitute a deterministic stub.
pub trait ResolveVideoId: Send + Sync {
    fn resolve(&self, url: &str) -> Result<VideoId>;
}

/// A resolver that extracts video ids from YouTube URL shapes by parsing,
/// with no network access.
///
/// Accepted shapes:
/// - `youtube.com/watch?v=<id>` (any `*.youtube.com` host)
/// - `youtu.be/<id>`
/// - `youtube.com/shorts/<id>`, `/embed/<id>`, `/live/<id>`
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlResolver;

impl UrlResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ResolveVideoId for UrlResolver {
    fn resolve(&self, raw: &str) -> Result<VideoId> {
        let url = Url::parse(raw.trim())?;

        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host"))?;
        if !is_youtube_host(host) {
            return Err(anyhow!("'{host}' is not a YouTube host"));
        }

        let raw_id =
            extract_raw_id(&url).ok_or_else(|| anyhow!("no video id found in URL path or query"))?;
        VideoId::parse(&raw_id)
    }
}

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h == "youtu.be" || h.ends_with(".youtube.com")
}

fn extract_raw_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    // youtu.be/<id>
    if host.eq_ignore_ascii_case("youtu.be") {
        let seg = url.path_segments()?.next()?.trim();
        if !seg.is_empty() {
            return Some(seg.to_string());
        }
        return None;
    }

    // youtube.com/watch?v=<id>
    if url.path().starts_with("/watch") {
        for (k, v) in url.query_pairs() {
            if k == "v" {
                let s = v.trim().to_string();
                if !s.is_empty() {
                    return Some(s);
                }
            }
        }
        return None;
    }

    // youtube.com/shorts/<id>, /embed/<id>, /live/<id>
    let mut segs = url.path_segments()?;
    let a = segs.next().unwrap_or("");
    let b = segs.next().unwrap_or("").trim();
    if matches!(a, "shorts" | "embed" | "live") && !b.is_empty() {
        return Some(b.to_string());
    }

    None
}
