use serde::{Deserialize, Serialize};

/// One timed unit of transcript text.
///
/// Segments arrive from the transcript source in playback order and keep that
/// order through every encoder. `start` and `duration` are seconds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Segment {
    /// The segment's end offset in seconds (`start + duration`).
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_start_plus_duration() {
        let seg = Segment {
            text: "hello".to_string(),
            start: 1.5,
            duration: 2.25,
        };
        assert_eq!(seg.end(), 3.75);
    }

    #[test]
    fn serializes_with_wire_field_names() -> anyhow::Result<()> {
        let seg = Segment {
            text: "hello".to_string(),
            start: 0.0,
            duration: 1.5,
        };
        let v: serde_json::Value = serde_json::to_value(&seg)?;
        assert_eq!(v["text"], "hello");
        assert_eq!(v["start"], 0.0);
        assert_eq!(v["duration"], 1.5);
        Ok(())
    }
}
