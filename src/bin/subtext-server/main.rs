use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::from_fn;
use axum::response::{Html, IntoResponse, Response};
use axum::{Json, Router};
use axum::routing::get;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

mod metrics;
mod openapi;
mod pages;

use subtext::rate_limit::RateLimit;
use subtext::report::{ErrorSink, HttpErrorSink, NoopSink};
use subtext::{Error, Gateway, TranscriptRequest};

#[derive(Parser, Debug)]
#[command(name = "subtext-server")]
#[command(about = "HTTP gateway for YouTube transcripts")]
struct Params {
    /// Host interface to bind to.
    #[arg(long = "host", default_value = "0.0.0.0")]
    host: String,

    /// TCP port to listen on.
    #[arg(long = "port", env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Per-client quota(s) for the transcript endpoint, repeatable
    /// (e.g. `10/minute`, `200/day`, `5/30s`).
    #[arg(
        long = "rate-limit",
        value_name = "N/PERIOD",
        default_values_t = [RateLimit::per_day(200), RateLimit::per_hour(50), RateLimit::per_minute(10)],
    )]
    rate_limits: Vec<RateLimit>,

    /// Ingestion endpoint for unexpected-failure reports. Reporting is
    /// disabled when unset.
    #[arg(long = "error-report-dsn", env = "ERROR_REPORT_DSN")]
    error_report_dsn: Option<String>,
}

#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
}

#[derive(Debug, Deserialize)]
struct TranscriptQuery {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Debug, Serialize)]
struct HelloResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    description: String,
}

struct AppError {
    status: StatusCode,
    error: String,
    description: String,
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRequest(description) => Self {
                status: StatusCode::BAD_REQUEST,
                error: "Bad Request".to_string(),
                description,
            },
            Error::NotFound(description) => Self {
                status: StatusCode::NOT_FOUND,
                error: "Not Found".to_string(),
                description,
            },
            Error::RateLimited(description) => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                error: "Rate limit exceeded".to_string(),
                description,
            },
            // Detail was already logged (and reported) where it happened;
            // clients only ever see the generic text.
            Error::Internal(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: "Internal Server Error".to_string(),
                description: "An unexpected error occurred while fetching the transcript"
                    .to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.error,
            description: self.description,
        });
        (self.status, body).into_response()
    }
}

#[tokio::main]
async fn main() {
    subtext::logging::init();

    if let Err(err) = run().await {
        error!(error = ?err, "subtext-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();

    metrics::init();

    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .context("invalid host/port bind address")?;

    let sink: Arc<dyn ErrorSink> = match params.error_report_dsn.as_deref() {
        Some(dsn) => {
            info!("error reporting enabled");
            Arc::new(HttpErrorSink::new(dsn).context("failed to configure error reporting")?)
        }
        None => Arc::new(NoopSink),
    };

    let gateway = Gateway::new(params.rate_limits)
        .context("failed to initialize transcript gateway")?
        .with_sink(sink);

    let state = AppState {
        gateway: Arc::new(gateway),
    };

    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.context("bind failed")?;
    info!(%addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    // Only the transcript handler consults the gateway's limiter; the
    // health/info routes stay open regardless of call volume.
    Router::new()
        .route("/api/hello", get(hello))
        .route("/api/transcript", get(transcript))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/openapi.json", get(openapi_document))
        .route("/privacy-policy", get(privacy_policy))
        .route_layer(from_fn(metrics::track_http_metrics))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello, World!",
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn transcript(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<TranscriptQuery>,
) -> std::result::Result<Response, AppError> {
    // The limiter keys on the peer IP, so the port is dropped here.
    let request =
        TranscriptRequest::from_parts(query.url, query.output.as_deref(), peer.ip().to_string())?;

    let formatted = state.gateway.handle(&request).await?;

    let content_type = HeaderValue::from_static(formatted.content_type);
    Ok(([(header::CONTENT_TYPE, content_type)], formatted.body).into_response())
}

async fn openapi_document(headers: HeaderMap) -> Json<serde_json::Value> {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    Json(openapi::document(&server_url_from_host(host)))
}

async fn privacy_policy() -> Html<&'static str> {
    Html(pages::PRIVACY_POLICY_HTML)
}

/// Derive the OpenAPI server URL from the inbound `Host` header, forced to
/// the secure scheme.
fn server_url_from_host(host: Option<&str>) -> String {
    let host = host
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    format!("https://{host}")
}
