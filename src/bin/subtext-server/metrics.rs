use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts as PromOpts, Registry,
    TextEncoder,
};

/// Routes whose traffic would drown out the interesting series.
const UNTRACKED_ROUTES: &[&str] = &["/metrics", "/healthz"];

struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    in_flight_requests: IntGauge,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

fn metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let registry = Registry::new();

        // Labeling by route keeps transcript traffic separate from the
        // info endpoints without a counter per handler.
        let requests_total = IntCounterVec::new(
            PromOpts::new(
                "subtext_http_requests_total",
                "Total HTTP requests served by subtext-server.",
            ),
            &["route", "status"],
        )
        .expect("metrics definition must be valid");

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "subtext_http_request_duration_seconds",
                "HTTP request latency in seconds.",
            ),
            &["route"],
        )
        .expect("metrics definition must be valid");

        let in_flight_requests = IntGauge::new(
            "subtext_http_in_flight_requests",
            "Current number of in-flight HTTP requests.",
        )
        .expect("metrics definition must be valid");

        for collector in [
            Box::new(requests_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(request_duration_seconds.clone()),
            Box::new(in_flight_requests.clone()),
        ] {
            registry.register(collector).expect("metrics must register");
        }

        Metrics {
            registry,
            requests_total,
            request_duration_seconds,
            in_flight_requests,
        }
    })
}

pub fn init() {
    let _ = metrics();
}

pub async fn prometheus_metrics() -> Response {
    let families = metrics().registry.gather();
    let mut buf = Vec::new();
    if TextEncoder::new().encode(&families, &mut buf).is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics",
        )
            .into_response();
    }

    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
        )],
        buf,
    )
        .into_response()
}

pub async fn track_http_metrics(req: Request<Body>, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str())
        .unwrap_or_else(|| req.uri().path())
        .to_owned();

    if UNTRACKED_ROUTES.contains(&route.as_str()) {
        return next.run(req).await;
    }

    let start = Instant::now();

    metrics().in_flight_requests.inc();
    let response = next.run(req).await;
    metrics().in_flight_requests.dec();

    let status = response.status().as_u16().to_string();
    metrics()
        .requests_total
        .with_label_values(&[&route, &status])
        .inc();
    metrics()
        .request_duration_seconds
        .with_label_values(&[&route])
        .observe(start.elapsed().as_secs_f64());

    response
}
