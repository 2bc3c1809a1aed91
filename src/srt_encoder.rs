use std::io::Write;

use anyhow::{Result, bail};

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segments in SRT (SubRip) format.
///
/// Design:
/// - We stream output directly to a `Write` implementation.
/// - The encoder tracks the cue index itself so callers only feed segments;
///   numbering starts at 1 and increments by 1 with no gaps.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// The index the next cue will be written with.
    next_index: u64,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    /// Write a single numbered cue in SRT format.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            bail!("cannot write segment: encoder is already closed");
        }

        // SRT timestamps use `HH:MM:SS,mmm`.
        let start = format_timestamp_srt(seg.start);
        let end = format_timestamp_srt(seg.end());

        // Cue index line.
        writeln!(&mut self.w, "{}", self.next_index)?;
        self.next_index += 1;

        // Cue timing line.
        writeln!(&mut self.w, "{start} --> {end}")?;

        // Cue text, written verbatim.
        writeln!(&mut self.w, "{}", seg.text)?;

        // Blank line separates cues.
        writeln!(&mut self.w)?;

        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounding policy:
/// - Milliseconds are truncated toward zero, so a mid-millisecond offset maps
///   to the millisecond it falls inside rather than the nearest one.
fn format_timestamp_srt(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0) as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
