//! `titros-runtime` – The Coordinator Loops
//!
//! The two long-running tasks that make the system tick, plus process-level
//! observability setup.
//!
//! # Modules
//!
//! - [`coordinator`] – [`Coordinator`][coordinator::Coordinator]: the actor
//!   that owns the [`AccessQueue`][titros_kernel::AccessQueue] and serializes
//!   every join/leave/command on one logical timeline. Connection tasks talk
//!   to it through a [`CoordinatorHandle`][coordinator::CoordinatorHandle].
//! - [`broadcaster`] – [`TelemetryBroadcaster`][broadcaster::TelemetryBroadcaster]:
//!   the fixed-period sensor loop that fans one reading per tick out to every
//!   connected session, independent of queue state.
//! - [`observability`] – [`init_tracing`][observability::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter. Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to an OTLP-compatible collector.

pub mod broadcaster;
pub mod coordinator;
pub mod observability;

pub use broadcaster::TelemetryBroadcaster;
pub use coordinator::{Coordinator, CoordinatorHandle, CoordinatorMsg};
