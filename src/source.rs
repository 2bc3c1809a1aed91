use async_trait::async_trait;
use thiserror::Error;

use crate::resolver::VideoId;
use crate::segments::Segment;

/// Why a transcript could not be fetched.
///
/// The gateway maps `NotAvailable` to a 404 and everything else to a 500, so
/// sources must be careful to classify "this video has no usable captions"
/// separately from transport or parse failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The video exists but has no transcript (captions disabled, none
    /// published, or an empty caption track).
    #[error("transcript is disabled or missing")]
    NotAvailable,

    /// Network failure, quota rejection, unexpected response shape.
    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

/// Retrieves the ordered segments of a video's transcript.
///
/// This is a capability seam: the gateway only needs "id in, segments or a
/// classified failure out", so tests can substitute deterministic stubs and
/// the network-backed adapter plugs in at the boundary.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, id: &VideoId) -> Result<Vec<Segment>, FetchError>;
}
