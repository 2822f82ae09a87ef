//! Active session registry.
//!
//! Tracks connected clients and routes [`ServerEvent`]s to them. Clone it
//! cheaply – all clones share the same underlying map. Pushing to a session
//! whose transport has already closed is a logged no-op; the registry never
//! panics on a dead channel.

use std::collections::HashMap;
use std::sync::Arc;

use titros_types::{ServerEvent, SessionId};
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

/// Outbound half handed to the registry when a session connects.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;
/// Receiving half held by the session's connection task.
pub type OutboundReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Shared map of live sessions to their outbound channels.
///
/// Mutations are only ever driven through the coordinator, so registration
/// changes stay on the same logical timeline as queue changes. The telemetry
/// loop holds its own clone and only reads.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, OutboundSender>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session's outbound channel.
    ///
    /// Idempotent with respect to duplicate transport events: registering an
    /// id that is already present replaces the stale sender.
    pub async fn register(&self, id: SessionId, sender: OutboundSender) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, sender);
    }

    /// Remove a session. No-op when the id is absent.
    pub async fn unregister(&self, id: SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&id);
    }

    /// Whether `id` currently has a registered channel.
    pub async fn is_registered(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Push one event to a single session.
    ///
    /// Returns `false` when the session is unknown or its channel has
    /// closed; both cases are swallowed by design (the disconnect path will
    /// clean the entry up).
    pub async fn send_to(&self, id: SessionId, event: ServerEvent) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(&id) {
            Some(sender) => {
                let delivered = sender.send(event).is_ok();
                if !delivered {
                    debug!(session = %id, "dropping event for closed channel");
                }
                delivered
            }
            None => {
                debug!(session = %id, "dropping event for unknown session");
                false
            }
        }
    }

    /// Push one event to every registered session.
    ///
    /// The recipient set is a consistent snapshot: the read lock is held for
    /// the whole pass, so a concurrent connect/disconnect either sees all of
    /// this broadcast or none of it. Returns the number of sessions the
    /// event was delivered to.
    pub async fn broadcast(&self, event: ServerEvent) -> usize {
        let sessions = self.sessions.read().await;
        let mut delivered = 0;
        for (id, sender) in sessions.iter() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(session = %id, "skipping closed channel during broadcast");
            }
        }
        delivered
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Snapshot of the registered session ids, in unspecified order.
    pub async fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().copied().collect()
    }
}
