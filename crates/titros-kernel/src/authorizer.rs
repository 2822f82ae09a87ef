//! [`CommandAuthorizer`] – the single interception point for pump commands.
//!
//! Before any command reaches the hardware rig, call
//! [`CommandAuthorizer::authorize`] to verify the sender currently holds the
//! queue head. A denial is a normal protocol event, not an error: the
//! coordinator logs it and drops the command without any client-visible
//! response.
//!
//! Authorization never mutates the queue. Granting a command does not
//! dequeue or rotate the head; the head keeps exclusive access until its
//! transport disconnects.

use titros_types::{DenyReason, PumpCommand, SessionId};
use tracing::{info, warn};

use crate::access_queue::AccessQueue;

/// Outcome of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The sender is the queue head; forward the command to the rig.
    Granted,
    /// The command must be dropped.
    Denied(DenyReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }
}

/// Validates inbound commands against the current queue head.
///
/// # Example
///
/// ```
/// use titros_kernel::{AccessQueue, CommandAuthorizer};
/// use titros_types::{PumpCommand, SessionId};
///
/// let mut queue = AccessQueue::new();
/// let head = SessionId::new();
/// queue.join(head);
///
/// let authorizer = CommandAuthorizer::new();
/// let decision = authorizer.authorize(&queue, head, &PumpCommand::ShortPulse);
/// assert!(decision.is_granted());
/// ```
#[derive(Debug, Default)]
pub struct CommandAuthorizer;

impl CommandAuthorizer {
    pub fn new() -> Self {
        Self
    }

    /// Check whether `sender` may issue `command` right now.
    ///
    /// Granted iff the queue head is `sender`. An empty queue denies
    /// everything. The decision is logged either way; callers must not
    /// surface denials to the client.
    pub fn authorize(
        &self,
        queue: &AccessQueue,
        sender: SessionId,
        command: &PumpCommand,
    ) -> Decision {
        match queue.head() {
            Some(head) if head == sender => {
                info!(session = %sender, %command, "command authorized");
                Decision::Granted
            }
            Some(head) => {
                warn!(session = %sender, %command, head = %head, "command denied: not head");
                Decision::Denied(DenyReason::NotHead { head })
            }
            None => {
                warn!(session = %sender, %command, "command denied: empty queue");
                Decision::Denied(DenyReason::EmptyQueue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_is_granted() {
        let mut queue = AccessQueue::new();
        let head = SessionId::new();
        queue.join(head);

        let authorizer = CommandAuthorizer::new();
        assert!(
            authorizer
                .authorize(&queue, head, &PumpCommand::ShortPulse)
                .is_granted()
        );
    }

    #[test]
    fn non_head_is_denied_with_head_identity() {
        let mut queue = AccessQueue::new();
        let head = SessionId::new();
        let waiter = SessionId::new();
        queue.join(head);
        queue.join(waiter);

        let authorizer = CommandAuthorizer::new();
        let decision = authorizer.authorize(&queue, waiter, &PumpCommand::LongPulse);
        assert_eq!(decision, Decision::Denied(DenyReason::NotHead { head }));
    }

    #[test]
    fn empty_queue_denies_everyone() {
        let queue = AccessQueue::new();
        let authorizer = CommandAuthorizer::new();

        let decision =
            authorizer.authorize(&queue, SessionId::new(), &PumpCommand::ShortPulse);
        assert_eq!(decision, Decision::Denied(DenyReason::EmptyQueue));
    }

    #[test]
    fn grant_does_not_rotate_head() {
        let mut queue = AccessQueue::new();
        let head = SessionId::new();
        let waiter = SessionId::new();
        queue.join(head);
        queue.join(waiter);

        let authorizer = CommandAuthorizer::new();
        for _ in 0..3 {
            assert!(
                authorizer
                    .authorize(&queue, head, &PumpCommand::ShortPulse)
                    .is_granted()
            );
        }
        // Repeated grants leave the queue untouched.
        assert_eq!(queue.head(), Some(head));
        assert_eq!(queue.position_of(waiter), Some(1));
    }

    #[test]
    fn denial_does_not_mutate_queue() {
        let mut queue = AccessQueue::new();
        let head = SessionId::new();
        let waiter = SessionId::new();
        queue.join(head);
        queue.join(waiter);

        let authorizer = CommandAuthorizer::new();
        let _ = authorizer.authorize(&queue, waiter, &PumpCommand::ShortPulse);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.head(), Some(head));
    }
}
