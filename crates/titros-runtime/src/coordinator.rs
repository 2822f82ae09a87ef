//! [`Coordinator`] – the serialized heart of the access queue.
//!
//! One actor task owns the [`AccessQueue`], the [`CommandAuthorizer`], and
//! the [`TitrationRig`]. Connection tasks never touch shared queue state;
//! they send [`CoordinatorMsg`]s through a [`CoordinatorHandle`] and the
//! actor drains them one at a time, so every join, leave, and authorization
//! check observes a linearizable history of the queue.
//!
//! After every membership change the coordinator recomputes and pushes a
//! fresh [`QueueStatus`] to **all** members in one pass. Partial publication
//! would let two clients disagree about the queue, so the pass always runs
//! to completion before the next message is taken.

use titros_hal::TitrationRig;
use titros_kernel::{AccessQueue, CommandAuthorizer, Decision};
use titros_middleware::{OutboundSender, SessionRegistry};
use titros_types::{PumpCommand, QueueStatus, ServerEvent, SessionId, TitrError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Requests processed by the coordinator actor, in arrival order.
#[derive(Debug)]
pub enum CoordinatorMsg {
    /// A transport connection was accepted: register its outbound channel
    /// and append it to the queue.
    Connect {
        id: SessionId,
        sender: OutboundSender,
    },
    /// The transport closed: remove the session everywhere. This is the only
    /// code path that releases head position.
    Disconnect { id: SessionId },
    /// The session asked to drive the pump.
    Command {
        id: SessionId,
        command: PumpCommand,
    },
}

/// Cheap, clonable front door to the coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<CoordinatorMsg>,
}

impl CoordinatorHandle {
    /// Announce a new session and hand over its outbound channel.
    pub fn connect(&self, id: SessionId, sender: OutboundSender) -> Result<(), TitrError> {
        self.send(CoordinatorMsg::Connect { id, sender })
    }

    /// Announce that a session's transport closed.
    pub fn disconnect(&self, id: SessionId) -> Result<(), TitrError> {
        self.send(CoordinatorMsg::Disconnect { id })
    }

    /// Forward a pump command for authorization.
    pub fn command(&self, id: SessionId, command: PumpCommand) -> Result<(), TitrError> {
        self.send(CoordinatorMsg::Command { id, command })
    }

    fn send(&self, msg: CoordinatorMsg) -> Result<(), TitrError> {
        self.tx
            .send(msg)
            .map_err(|e| TitrError::Channel(format!("coordinator channel closed: {e}")))
    }
}

/// The actor owning all mutable arbitration state.
///
/// Build with [`Coordinator::new`], spawn [`Coordinator::run`] as a task,
/// and hand the returned [`CoordinatorHandle`] to the transport layer.
pub struct Coordinator {
    queue: AccessQueue,
    authorizer: CommandAuthorizer,
    registry: SessionRegistry,
    rig: TitrationRig,
    rx: mpsc::UnboundedReceiver<CoordinatorMsg>,
}

impl Coordinator {
    /// Create the actor and its handle.
    ///
    /// The coordinator holds a clone of `registry` so that registration and
    /// queue membership always change together, on its own timeline.
    pub fn new(registry: SessionRegistry, rig: TitrationRig) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            queue: AccessQueue::new(),
            authorizer: CommandAuthorizer::new(),
            registry,
            rig,
            rx,
        };
        (coordinator, CoordinatorHandle { tx })
    }

    /// Drain messages until every handle is dropped.
    pub async fn run(mut self) {
        info!("coordinator started");
        while let Some(msg) = self.rx.recv().await {
            self.handle_message(msg).await;
        }
        info!("coordinator stopped");
    }

    async fn handle_message(&mut self, msg: CoordinatorMsg) {
        match msg {
            CoordinatorMsg::Connect { id, sender } => {
                info!(session = %id, "session connected");
                self.registry.register(id, sender).await;
                self.queue.join(id);
                self.publish_all().await;
            }
            CoordinatorMsg::Disconnect { id } => {
                info!(session = %id, "session disconnected");
                self.queue.leave(id);
                self.registry.unregister(id).await;
                self.publish_all().await;
            }
            CoordinatorMsg::Command { id, command } => {
                match self.authorizer.authorize(&self.queue, id, &command) {
                    Decision::Granted => {
                        // Authorization never rotates the head; the session
                        // keeps pump rights until it disconnects.
                        if let Err(e) = self.rig.dispatch(command) {
                            warn!(session = %id, error = %e, "pump dispatch failed");
                        }
                    }
                    Decision::Denied(_) => {
                        // Already logged by the authorizer. Silent drop: the
                        // client gets no error event by design.
                    }
                }
            }
        }
    }

    /// Push a freshly computed [`QueueStatus`] to every queue member.
    ///
    /// Runs to completion within one message, so all statuses of a pass
    /// share the same `total_users` and no member is skipped.
    async fn publish_all(&self) {
        let total_users = self.queue.len();
        for (position, id) in self.queue.iter().enumerate() {
            let status = QueueStatus {
                my_position: position,
                total_users,
            };
            self.registry
                .send_to(id, ServerEvent::QueueStatus(status))
                .await;
        }
        debug!(total_users, "queue status published");
    }
}
