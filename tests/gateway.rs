use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use subtext::rate_limit::{RateLimit, SlidingWindowLimiter};
use subtext::report::{ErrorEvent, ErrorSink, NoopSink};
use subtext::{
    Error, FetchError, Gateway, OutputFormat, ResolveVideoId, Segment, TranscriptRequest,
    TranscriptSource, VideoId,
};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

/// A resolver that counts invocations and either resolves to a fixed id or
/// fails.
struct StubResolver {
    calls: AtomicUsize,
    fail: bool,
}

impl StubResolver {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

impl ResolveVideoId for StubResolver {
    fn resolve(&self, _url: &str) -> anyhow::Result<VideoId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("stub resolver failure with internal detail");
        }
        VideoId::parse(VIDEO_ID)
    }
}

enum StubFetch {
    Segments(Vec<Segment>),
    NotAvailable,
    Broken,
}

/// A transcript source that counts invocations and returns a canned outcome.
struct StubSource {
    calls: AtomicUsize,
    outcome: StubFetch,
}

impl StubSource {
    fn new(outcome: StubFetch) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome,
        }
    }
}

#[async_trait]
impl TranscriptSource for StubSource {
    async fn fetch(&self, _id: &VideoId) -> Result<Vec<Segment>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StubFetch::Segments(segments) => Ok(segments.clone()),
            StubFetch::NotAvailable => Err(FetchError::NotAvailable),
            StubFetch::Broken => Err(FetchError::Other(anyhow::anyhow!(
                "stub network failure with internal detail"
            ))),
        }
    }
}

/// A sink that records every event it receives.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ErrorEvent>>,
}

impl ErrorSink for RecordingSink {
    fn report(&self, event: ErrorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn segments() -> Vec<Segment> {
    vec![
        Segment {
            text: "Hi".to_string(),
            start: 0.0,
            duration: 1.5,
        },
        Segment {
            text: "there".to_string(),
            start: 1.5,
            duration: 0.5,
        },
    ]
}

fn gateway(
    resolver: StubResolver,
    source: StubSource,
    limits: Vec<RateLimit>,
) -> Gateway<StubResolver, StubSource> {
    Gateway::with_parts(
        resolver,
        source,
        SlidingWindowLimiter::new(limits),
        Arc::new(NoopSink),
    )
}

fn request(format: OutputFormat) -> TranscriptRequest {
    TranscriptRequest {
        url: format!("https://youtu.be/{VIDEO_ID}"),
        format,
        client_addr: "1.2.3.4".to_string(),
    }
}

#[tokio::test]
async fn json_response_round_trips_segments_in_order() -> anyhow::Result<()> {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::Segments(segments())),
        Vec::new(),
    );

    let out = gw.handle(&request(OutputFormat::Json)).await?;
    assert!(out.content_type.starts_with("application/json"));

    let parsed: Vec<Segment> = serde_json::from_slice(&out.body)?;
    assert_eq!(parsed, segments());
    Ok(())
}

#[tokio::test]
async fn srt_response_matches_expected_bytes() -> anyhow::Result<()> {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::Segments(segments())),
        Vec::new(),
    );

    let out = gw.handle(&request(OutputFormat::Srt)).await?;
    assert!(out.content_type.starts_with("text/plain"));
    assert!(out.body.starts_with(b"1\n00:00:00,000 --> 00:00:01,500\nHi\n\n"));
    assert!(
        std::str::from_utf8(&out.body)?.contains("2\n00:00:01,500 --> 00:00:02,000\nthere\n\n")
    );
    Ok(())
}

#[tokio::test]
async fn text_response_joins_segments_with_newlines() -> anyhow::Result<()> {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::Segments(segments())),
        Vec::new(),
    );

    let out = gw.handle(&request(OutputFormat::Text)).await?;
    assert!(out.content_type.starts_with("text/plain"));
    assert_eq!(out.body, b"Hi\nthere\n");
    Ok(())
}

#[tokio::test]
async fn unresolvable_url_is_a_uniform_bad_request() {
    let source = StubSource::new(StubFetch::Segments(segments()));
    let gw = gateway(StubResolver::failing(), source, Vec::new());

    let err = gw.handle(&request(OutputFormat::Json)).await.unwrap_err();
    match err {
        Error::BadRequest(msg) => {
            assert_eq!(msg, "Invalid YouTube URL");
            // Resolver internals must not leak into the client-visible shape.
            assert!(!msg.contains("internal detail"));
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }
    assert_eq!(gw.source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_transcript_maps_to_not_found() {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::NotAvailable),
        Vec::new(),
    );

    let err = gw.handle(&request(OutputFormat::Json)).await.unwrap_err();
    match err {
        Error::NotFound(msg) => assert_eq!(msg, "Transcript not available for this video"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_failure_is_internal_and_reported() {
    let sink = Arc::new(RecordingSink::default());
    let gw = Gateway::with_parts(
        StubResolver::ok(),
        StubSource::new(StubFetch::Broken),
        SlidingWindowLimiter::new(Vec::new()),
        sink.clone(),
    );

    let err = gw.handle(&request(OutputFormat::Json)).await.unwrap_err();
    assert!(matches!(err, Error::Internal(_)));

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, "error");
    assert_eq!(events[0].video_id.as_deref(), Some(VIDEO_ID));
    assert!(events[0].message.contains("stub network failure"));
}

#[tokio::test]
async fn over_quota_requests_are_rejected_before_any_work() {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::Segments(segments())),
        vec![RateLimit::per_minute(2)],
    );

    let req = request(OutputFormat::Json);
    assert!(gw.handle(&req).await.is_ok());
    assert!(gw.handle(&req).await.is_ok());

    let err = gw.handle(&req).await.unwrap_err();
    match err {
        Error::RateLimited(msg) => assert_eq!(msg, "2 per 1 minute"),
        other => panic!("expected RateLimited, got {other:?}"),
    }

    // The gate is a precondition: the rejected request never reached the
    // resolver or the source.
    assert_eq!(gw.resolver().calls.load(Ordering::SeqCst), 2);
    assert_eq!(gw.source().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quota_is_tracked_per_client_address() {
    let gw = gateway(
        StubResolver::ok(),
        StubSource::new(StubFetch::Segments(segments())),
        vec![RateLimit::per_minute(1)],
    );

    let mut first = request(OutputFormat::Json);
    first.client_addr = "1.2.3.4".to_string();
    let mut second = request(OutputFormat::Json);
    second.client_addr = "5.6.7.8".to_string();

    assert!(gw.handle(&first).await.is_ok());
    assert!(gw.handle(&first).await.is_err());
    assert!(gw.handle(&second).await.is_ok());
}
