//! `titros-kernel` – Arbitration Rules
//!
//! The central rule-keeper of TitrOS. It does not move liquid; it decides
//! who is allowed to.
//!
//! # Modules
//!
//! - [`access_queue`] – [`AccessQueue`][access_queue::AccessQueue]: the
//!   ordered, duplicate-free arrival queue of connected sessions. The front
//!   entry holds exclusive pump rights.
//! - [`authorizer`] – [`CommandAuthorizer`][authorizer::CommandAuthorizer]:
//!   the single interception point every inbound
//!   [`PumpCommand`][titros_types::PumpCommand] must pass before it reaches
//!   the hardware rig. Grants iff the sender is the current queue head.

pub mod access_queue;
pub mod authorizer;

pub use access_queue::AccessQueue;
pub use authorizer::{CommandAuthorizer, Decision};
