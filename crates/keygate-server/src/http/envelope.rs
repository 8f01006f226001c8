//! Uniform JSON response wrapper

use keygate_core::{ClockSource, SystemClock};
use serde::Serialize;

/// `{code, message, data, timestamp}`; `code` is 0 on success
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// 0 on success, otherwise the HTTP status
    pub code: u16,
    /// `ok` or the failure reason
    pub message: String,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Response time, epoch milliseconds
    pub timestamp: u64,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
            timestamp: SystemClock.now_ms(),
        }
    }
}

impl Envelope<()> {
    /// Failure response with the status as `code`
    pub fn fail(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: SystemClock.now_ms(),
        }
    }
}
