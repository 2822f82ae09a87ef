//! `titros-middleware` – The Nervous System
//!
//! Routes events from the coordinator and the telemetry loop to connected
//! transport sessions without caring about the events' meaning.
//!
//! # Modules
//!
//! - [`registry`] – [`SessionRegistry`][registry::SessionRegistry]: maps each
//!   live session identity to its outbound channel and fans events out to
//!   one or all of them.

pub mod registry;

pub use registry::{OutboundReceiver, OutboundSender, SessionRegistry};
