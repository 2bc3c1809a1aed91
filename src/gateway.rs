//! High-level API for serving transcript requests.
//!
//! We expose a single entry point (`Gateway`) that wires up the per-request
//! pipeline: rate-limit gate → identifier resolution → transcript fetch →
//! output encoding. Control flow is strictly linear; no stage retains state
//! across requests except the limiter's counters.
//!
//! The resolver and transcript source are generic so tests can drive the
//! whole pipeline with deterministic stubs.

use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::json_array_encoder::JsonArrayEncoder;
use crate::output_format::OutputFormat;
use crate::plain_text_encoder::PlainTextEncoder;
use crate::rate_limit::{RateLimit, SlidingWindowLimiter};
use crate::report::{ErrorEvent, ErrorSink, NoopSink};
use crate::resolver::{ResolveVideoId, UrlResolver};
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::source::{FetchError, TranscriptSource};
use crate::srt_encoder::SrtEncoder;
use crate::youtube::YouTubeSource;

/// A validated transcript request.
///
/// Built once at request entry (`from_parts`) and dropped when the response
/// goes out.
#[derive(Debug, Clone)]
pub struct TranscriptRequest {
    /// The raw video URL supplied by the client.
    pub url: String,

    /// The requested output encoding.
    pub format: OutputFormat,

    /// The client address the rate limiter keys on.
    pub client_addr: String,
}

impl TranscriptRequest {
    /// Validate raw query parameters into a request.
    ///
    /// - `url` is required and must be non-empty.
    /// - `output` defaults to JSON when absent; unknown values are rejected.
    ///
    /// Pure string checks; nothing here touches the network.
    pub fn from_parts(
        url: Option<String>,
        output: Option<&str>,
        client_addr: impl Into<String>,
    ) -> Result<Self> {
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::bad_request("Missing YouTube URL"))?;

        let format = match output {
            None => OutputFormat::default(),
            Some(raw) => raw.parse().map_err(Error::BadRequest)?,
        };

        Ok(Self {
            url,
            format,
            client_addr: client_addr.into(),
        })
    }
}

/// A ready-to-send transcript body.
#[derive(Debug, Clone)]
pub struct FormattedTranscript {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// The transcript gateway.
///
/// `Gateway` owns the request pipeline's collaborators:
/// - a resolver that maps URLs to video identifiers
/// - a transcript source that fetches segments by identifier
/// - the rate limiter gating the whole pipeline
/// - an error sink for unexpected failures
///
/// Typical usage:
/// - Construct once at startup.
/// - Call `handle` for every transcript request.
pub struct Gateway<R: ResolveVideoId = UrlResolver, S: TranscriptSource = YouTubeSource> {
    resolver: R,
    source: S,
    limiter: SlidingWindowLimiter,
    sink: Arc<dyn ErrorSink>,
}

impl Gateway<UrlResolver, YouTubeSource> {
    /// Create a gateway with the production resolver and YouTube source.
    pub fn new(limits: Vec<RateLimit>) -> AnyResult<Self> {
        Ok(Self::with_parts(
            UrlResolver::new(),
            YouTubeSource::new()?,
            SlidingWindowLimiter::new(limits),
            Arc::new(NoopSink),
        ))
    }
}

impl<R: ResolveVideoId, S: TranscriptSource> Gateway<R, S> {
    /// Create a gateway from explicit collaborators.
    pub fn with_parts(
        resolver: R,
        source: S,
        limiter: SlidingWindowLimiter,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            resolver,
            source,
            limiter,
            sink,
        }
    }

    /// Replace the error sink.
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Access the configured resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Access the configured transcript source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the pipeline for one request.
    ///
    /// The limiter is consulted first: a rejected request performs no
    /// resolution or fetch work at all.
    pub async fn handle(&self, req: &TranscriptRequest) -> Result<FormattedTranscript> {
        if let Err(exceeded) = self.limiter.check(&req.client_addr) {
            warn!(client = %req.client_addr, limit = %exceeded, "rate limit exceeded");
            return Err(Error::RateLimited(exceeded.to_string()));
        }

        // Resolution failures collapse to one client-visible shape; the
        // detail stays in the log so internal error text never leaks out.
        let video_id = match self.resolver.resolve(&req.url) {
            Ok(id) => id,
            Err(err) => {
                warn!(url = %req.url, error = ?err, "failed to resolve video URL");
                return Err(Error::bad_request("Invalid YouTube URL"));
            }
        };

        let segments = match self.source.fetch(&video_id).await {
            Ok(segments) => segments,
            Err(FetchError::NotAvailable) => {
                warn!(video_id = %video_id, "transcript not available");
                return Err(Error::not_found("Transcript not available for this video"));
            }
            Err(FetchError::Other(err)) => {
                error!(video_id = %video_id, error = ?err, "transcript fetch failed");
                self.sink.report(ErrorEvent::error(
                    format!("{err:#}"),
                    Some(video_id.to_string()),
                ));
                return Err(Error::Internal(err));
            }
        };

        info!(video_id = %video_id, segments = segments.len(), "fetched transcript");

        let body = encode_segments(&segments, req.format).map_err(Error::Internal)?;
        Ok(FormattedTranscript {
            body,
            content_type: req.format.content_type(),
        })
    }
}

/// Serialize segments in the requested format.
///
/// Pure function of its inputs: identical segments always produce
/// byte-identical output.
pub fn encode_segments(segments: &[Segment], format: OutputFormat) -> AnyResult<Vec<u8>> {
    let mut out = Vec::new();

    // Select an encoder based on the requested output format.
    // We keep this explicit (no trait objects) to avoid lifetime surprises.
    match format {
        OutputFormat::Json => {
            let mut encoder = JsonArrayEncoder::new(&mut out);
            let run_res = write_all(segments, &mut encoder);
            merge_run_and_close(run_res, encoder.close())?;
        }
        OutputFormat::Srt => {
            let mut encoder = SrtEncoder::new(&mut out);
            let run_res = write_all(segments, &mut encoder);
            merge_run_and_close(run_res, encoder.close())?;
        }
        OutputFormat::Text => {
            let mut encoder = PlainTextEncoder::new(&mut out);
            let run_res = write_all(segments, &mut encoder);
            merge_run_and_close(run_res, encoder.close())?;
        }
    }

    Ok(out)
}

fn write_all<E: SegmentEncoder>(segments: &[Segment], encoder: &mut E) -> AnyResult<()> {
    for seg in segments {
        encoder.write_segment(seg)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: AnyResult<()>, close_res: AnyResult<()>) -> AnyResult<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(err.context(close_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_requires_url() {
        let err = TranscriptRequest::from_parts(None, None, "1.2.3.4").unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Missing YouTube URL"));

        let err =
            TranscriptRequest::from_parts(Some("  ".to_string()), None, "1.2.3.4").unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn from_parts_defaults_to_json() -> crate::Result<()> {
        let req =
            TranscriptRequest::from_parts(Some("https://youtu.be/x".to_string()), None, "1.2.3.4")?;
        assert_eq!(req.format, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn from_parts_rejects_unknown_format() {
        let err = TranscriptRequest::from_parts(
            Some("https://youtu.be/x".to_string()),
            Some("yaml"),
            "1.2.3.4",
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg.contains("unknown output format")));
    }

    #[test]
    fn encode_segments_is_deterministic_across_formats() -> anyhow::Result<()> {
        let segments = vec![
            Segment {
                text: "Hi".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            Segment {
                text: "there".to_string(),
                start: 1.5,
                duration: 0.7,
            },
        ];

        for format in [OutputFormat::Json, OutputFormat::Srt, OutputFormat::Text] {
            assert_eq!(
                encode_segments(&segments, format)?,
                encode_segments(&segments, format)?
            );
        }
        Ok(())
    }

    #[test]
    fn encode_segments_srt_matches_expected_bytes() -> anyhow::Result<()> {
        let segments = vec![Segment {
            text: "Hi".to_string(),
            start: 0.0,
            duration: 1.5,
        }];

        let out = encode_segments(&segments, OutputFormat::Srt)?;
        assert!(out.starts_with(b"1\n00:00:00,000 --> 00:00:01,500\nHi\n\n"));
        Ok(())
    }
}
