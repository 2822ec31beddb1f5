//! Server-Sent Events wire framing.
//!
//! The browser side listens with `EventSource` and `addEventListener("update")`
//! / `addEventListener("reload")`. Browsers only dispatch an event once a
//! `data` field was seen, so every event carries an empty `data:` line.

use crate::dev::ReloadKind;
use axum::body::Bytes;
use std::time::Duration;

/// A single frame written to an event-stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseFrame {
    /// Reconnection delay advertised to the client.
    Retry(Duration),
    /// Named event with an empty payload.
    Event(ReloadKind),
}

impl SseFrame {
    /// Encode the frame, including the blank line that terminates it.
    pub fn encode(&self) -> String {
        match self {
            SseFrame::Retry(delay) => format!("retry: {}\n\n", delay.as_millis()),
            SseFrame::Event(kind) => format!("event: {}\ndata:\n\n", kind.as_str()),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.encode())
    }
}

impl From<ReloadKind> for SseFrame {
    fn from(kind: ReloadKind) -> Self {
        SseFrame::Event(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_frame() {
        let frame = SseFrame::Retry(Duration::from_secs(10));
        assert_eq!(frame.encode(), "retry: 10000\n\n");
    }

    #[test]
    fn test_event_frames() {
        assert_eq!(
            SseFrame::from(ReloadKind::Update).encode(),
            "event: update\ndata:\n\n"
        );
        assert_eq!(
            SseFrame::Event(ReloadKind::Reload).to_bytes(),
            Bytes::from_static(b"event: reload\ndata:\n\n")
        );
    }
}
