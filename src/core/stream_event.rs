//! Decoding of the chat endpoint's streamed body.
//!
//! Only lines starting with `data: ` carry events; everything else, and any
//! payload that is not a known event, is skipped.

use tracing::debug;

use crate::api::StreamEvent;
use crate::core::line_reader::LineReader;

pub const DATA_PREFIX: &str = "data: ";

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Decode one stream line. Lines without the `data: ` prefix and payloads
/// that are not a known event are skipped.
pub fn parse_event_line(line: &str) -> Option<StreamEvent> {
    let payload = extract_data_payload(line)?;
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            debug!(error = %err, payload, "skipping undecodable stream line");
            None
        }
    }
}

/// Turns raw body chunks into stream events, in arrival order.
#[derive(Debug, Default)]
pub struct EventDecoder {
    lines: LineReader,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<'a>(&'a mut self, chunk: &[u8]) -> impl Iterator<Item = StreamEvent> + 'a {
        self.lines
            .push(chunk)
            .filter_map(|line| parse_event_line(&line))
    }

    /// True when a partial line is still waiting for its newline.
    pub fn has_pending(&self) -> bool {
        !self.lines.pending().is_empty()
    }
}
