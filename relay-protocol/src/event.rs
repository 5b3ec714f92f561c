//! NDJSON streaming event schema (C21).

use crate::result::ErrorPayload;
use crate::result::InteractivePayload;
use crate::result::PendingPayload;
use crate::result::SuccessPayload;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A result projection embedded in a `result` event, tagged by kind so the
/// consumer can distinguish them without a separate `kind` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultProjection {
    Success(SuccessPayload),
    Error(ErrorPayload),
    Interactive(InteractivePayload),
    Pending(PendingPayload),
}

/// One line of the NDJSON event stream. Every variant corresponds to a row
/// in the spec's §4.19 table; `seq` and `timestamp` are stamped by the
/// writer, not the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEventKind {
    Start {
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        args: Option<Value>,
    },
    Metadata {
        #[serde(flatten)]
        fields: HashMap<String, Value>,
    },
    Progress {
        current: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        percentage: Option<f64>,
    },
    Output {
        content: String,
        stream: OutputStream,
    },
    Result {
        result: ResultProjection,
    },
    Error {
        code: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
    Complete {
        exit_code: i32,
        duration_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A full NDJSON event line: the event payload plus its monotonic sequence
/// number and ISO-8601 UTC timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub seq: u64,
    pub timestamp: String,
    #[serde(flatten)]
    pub kind: StreamEventKind,
}
