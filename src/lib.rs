//! `subtext` — a small, focused HTTP gateway for YouTube transcripts.
//!
//! This crate provides:
//! - Video URL validation and identifier resolution
//! - Transcript retrieval with error classification
//! - Pluggable output encoders (JSON, SRT, plain text)
//! - A per-client sliding-window rate limiter
//!
//! The library is designed so the whole pipeline can be exercised with
//! deterministic stubs; the network-backed adapters plug in at the edges.

// High-level API (most consumers should start here).
pub mod gateway;

// Segment data structures.
pub mod segments;

// Identifier resolution and transcript retrieval seams.
pub mod resolver;
pub mod source;
pub mod youtube;

// Output selection and encoder interfaces.
pub mod output_format;
pub mod segment_encoder;

// Output encoders that serialize segments into various formats.
pub mod json_array_encoder;
pub mod plain_text_encoder;
pub mod srt_encoder;

// Request gating and failure reporting.
pub mod rate_limit;
pub mod report;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use error::{Error, Result};
pub use gateway::{FormattedTranscript, Gateway, TranscriptRequest};
pub use output_format::OutputFormat;
pub use resolver::{ResolveVideoId, UrlResolver, VideoId};
pub use segments::Segment;
pub use source::{FetchError, TranscriptSource};
