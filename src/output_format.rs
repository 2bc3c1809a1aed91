use std::str::FromStr;

/// The supported output formats for encoded transcript segments.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the HTTP layer and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps format
///   selection explicit and discoverable.
///
/// Each variant maps to a concrete `SegmentEncoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Output segments as a JSON array of `{text, start, duration}` objects.
    Json,

    /// Output segments in SRT (SubRip) subtitle format.
    Srt,

    /// Output segment text only, one segment per line.
    Text,
}

impl OutputFormat {
    /// The `Content-Type` header value for responses in this format.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json; charset=utf-8",
            OutputFormat::Srt | OutputFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

impl Default for OutputFormat {
    /// JSON is the format clients get when they don't ask for one.
    fn default() -> Self {
        OutputFormat::Json
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!(
                "unknown output format '{other}' (expected 'json', 'srt' or 'text')"
            )),
        }
    }
}
