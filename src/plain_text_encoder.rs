use std::io::Write;

use anyhow::{Result, bail};

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segment text only, one segment per line.
///
/// Timing information is discarded. The newline join is a fixed contract:
/// every segment is written followed by `\n`, including the last one.
pub struct PlainTextEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> PlainTextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> SegmentEncoder for PlainTextEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            bail!("cannot write segment: encoder is already closed");
        }

        writeln!(&mut self.w, "{}", seg.text)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Segment {
        Segment {
            text: text.to_string(),
            start: 0.0,
            duration: 1.0,
        }
    }

    #[test]
    fn text_close_without_segments_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = PlainTextEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn text_joins_segments_with_newlines() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = PlainTextEncoder::new(&mut out);
        enc.write_segment(&seg("hello"))?;
        enc.write_segment(&seg("world"))?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "hello\nworld\n");
        Ok(())
    }

    #[test]
    fn text_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = PlainTextEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(&seg("nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
