//! Streaming Result Writer (C21): emits one NDJSON line per
//! [`StreamEvent`], with monotonically increasing sequence numbers.
//!
//! Not required to be thread-safe (callers serialize); a single writer
//! instance owns the sequence counter for one command's lifetime.

use crate::commands::CommandResult;
use relay_protocol::ErrorCode;
use relay_protocol::OutputStream;
use relay_protocol::StreamEvent;
use relay_protocol::StreamEventKind;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

/// Writes NDJSON [`StreamEvent`] lines to any `std::io::Write`, such as
/// stdout. One instance per command invocation.
pub struct NdjsonWriter<W: Write> {
    out: W,
    seq: u64,
    include_stack: bool,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(out: W, include_stack: bool) -> Self {
        Self { out, seq: 0, include_stack }
    }

    fn write_event(&mut self, kind: StreamEventKind) -> std::io::Result<()> {
        let event = StreamEvent {
            seq: self.seq,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
        };
        self.seq += 1;
        let line = serde_json::to_string(&event).expect("StreamEvent always serializes");
        writeln!(self.out, "{line}")
    }

    pub fn start(&mut self, command: String, args: Option<serde_json::Value>) -> std::io::Result<()> {
        self.write_event(StreamEventKind::Start { command, args })
    }

    pub fn metadata(&mut self, fields: HashMap<String, serde_json::Value>) -> std::io::Result<()> {
        self.write_event(StreamEventKind::Metadata { fields })
    }

    pub fn progress(&mut self, current: u64, total: Option<u64>, message: Option<String>) -> std::io::Result<()> {
        let percentage = total.filter(|t| *t > 0).map(|t| (current as f64 / t as f64) * 100.0);
        self.write_event(StreamEventKind::Progress {
            current,
            total,
            message,
            percentage,
        })
    }

    pub fn output(&mut self, content: String, stream: OutputStream) -> std::io::Result<()> {
        self.write_event(StreamEventKind::Output { content, stream })
    }

    pub fn result(&mut self, result: &CommandResult) -> std::io::Result<()> {
        self.write_event(StreamEventKind::Result {
            result: result.to_projection(),
        })
    }

    pub fn error(&mut self, code: ErrorCode, message: String, stack: Option<String>) -> std::io::Result<()> {
        let stack = if self.include_stack { stack } else { None };
        self.write_event(StreamEventKind::Error {
            code: code.to_string(),
            message,
            stack,
        })
    }

    pub fn complete(&mut self, exit_code: i32, duration: Duration) -> std::io::Result<()> {
        self.write_event(StreamEventKind::Complete {
            exit_code,
            duration_ms: duration.as_millis() as u64,
        })
    }
}
