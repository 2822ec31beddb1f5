//! Shared state for the development server.
//!
//! The HTTP handlers and the orchestrator share exactly one thing: the
//! registry of open event-stream connections. Everything else the handlers
//! need is immutable serving configuration.

use crate::dev::{ReloadKind, SseFrame};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Identifier of one event-stream connection.
pub type ConnectionId = u64;

/// Frames buffered per connection before a slow client starts missing events.
const CONNECTION_BUFFER: usize = 16;

/// Registry of open event-stream connections.
///
/// Each connection is the sending half of a channel whose receiver feeds the
/// streaming response body. Dropping the sender ends the response once the
/// already queued frames have been written.
#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: RwLock<HashMap<ConnectionId, mpsc::Sender<SseFrame>>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection.
    ///
    /// # Returns
    ///
    /// Connection ID and receiver for frames
    pub fn subscribe(&self) -> (ConnectionId, mpsc::Receiver<SseFrame>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        self.connections.write().insert(id, tx);

        tracing::debug!(connection = id, "event stream connected");
        (id, rx)
    }

    /// Remove a connection. Unknown IDs are ignored: a reload may already
    /// have dropped it.
    pub fn unsubscribe(&self, id: ConnectionId) {
        if self.connections.write().remove(&id).is_some() {
            tracing::debug!(connection = id, "event stream disconnected");
        }
    }

    /// Send `kind` to every open connection.
    ///
    /// Connections whose receiver is gone are pruned. After a reload the
    /// registry is emptied: the pages navigate away and reconnect.
    ///
    /// # Returns
    ///
    /// Number of connections the event was queued on
    pub fn broadcast(&self, kind: ReloadKind) -> usize {
        let frame = SseFrame::Event(kind);
        let mut connections = self.connections.write();
        let mut delivered = 0;

        connections.retain(|id, tx| match tx.try_send(frame) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    connection = *id,
                    "event stream is not draining, dropping {}",
                    kind
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        if kind.invalidates_connections() {
            connections.clear();
        }

        delivered
    }

    /// Drop every connection, ending their streams. Used on shutdown.
    pub fn close_all(&self) {
        self.connections.write().clear();
    }

    /// Get number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }
}

/// Immutable configuration the request router needs.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Directory served for static requests
    pub serve_dir: PathBuf,
    /// Single-page entry document served for unknown routes
    pub index_path: PathBuf,
    /// Prefix of the live-reload event stream
    pub events_prefix: String,
    /// Prefix answered with 501
    pub api_prefix: String,
    /// Reconnect interval advertised to event-stream clients
    pub retry: Duration,
}

/// Shared development server state.
#[derive(Debug)]
pub struct DevServerState {
    pub serve: ServeConfig,
    pub broadcaster: Arc<Broadcaster>,
}

impl DevServerState {
    pub fn new(serve: ServeConfig, broadcaster: Arc<Broadcaster>) -> Self {
        Self { serve, broadcaster }
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_assigns_distinct_ids() {
        let broadcaster = Broadcaster::new();

        let (id1, _rx1) = broadcaster.subscribe();
        let (id2, _rx2) = broadcaster.subscribe();

        assert_eq!(broadcaster.connection_count(), 2);
        assert_ne!(id1, id2);

        broadcaster.unsubscribe(id1);
        assert_eq!(broadcaster.connection_count(), 1);

        // Removing twice is harmless
        broadcaster.unsubscribe(id1);
        assert_eq!(broadcaster.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_connections() {
        let broadcaster = Broadcaster::new();
        let (_id1, mut rx1) = broadcaster.subscribe();
        let (_id2, mut rx2) = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(ReloadKind::Update), 2);
        assert_eq!(broadcaster.connection_count(), 2);

        assert_eq!(rx1.recv().await, Some(SseFrame::Event(ReloadKind::Update)));
        assert_eq!(rx2.recv().await, Some(SseFrame::Event(ReloadKind::Update)));
    }

    #[tokio::test]
    async fn test_reload_clears_connections() {
        let broadcaster = Broadcaster::new();
        let (_id, mut rx) = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(ReloadKind::Reload), 1);
        assert_eq!(broadcaster.connection_count(), 0);

        // The queued reload is still delivered, then the stream ends
        assert_eq!(rx.recv().await, Some(SseFrame::Event(ReloadKind::Reload)));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_broadcast_prunes_closed_receivers() {
        let broadcaster = Broadcaster::new();
        let (_id1, rx1) = broadcaster.subscribe();
        let (_id2, _rx2) = broadcaster.subscribe();
        drop(rx1);

        assert_eq!(broadcaster.broadcast(ReloadKind::Update), 1);
        assert_eq!(broadcaster.connection_count(), 1);
    }

    #[test]
    fn test_full_buffer_keeps_connection() {
        let broadcaster = Broadcaster::new();
        let (_id, _rx) = broadcaster.subscribe();

        for _ in 0..CONNECTION_BUFFER {
            assert_eq!(broadcaster.broadcast(ReloadKind::Update), 1);
        }
        assert_eq!(broadcaster.broadcast(ReloadKind::Update), 0);
        assert_eq!(broadcaster.connection_count(), 1);
    }

    #[test]
    fn test_broadcast_without_connections() {
        let broadcaster = Broadcaster::new();
        assert_eq!(broadcaster.broadcast(ReloadKind::Reload), 0);
        assert_eq!(broadcaster.broadcast(ReloadKind::Update), 0);
    }
}
