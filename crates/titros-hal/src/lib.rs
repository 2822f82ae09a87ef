//! `titros-hal` – Hardware Abstraction Layer
//!
//! The only part of the stack that knows dispensing hardware exists. The
//! coordinator talks exclusively to the traits defined here, so the simulated
//! drivers used in tests and the real ESP32-backed drivers can be swapped
//! without touching queue or scheduling logic.
//!
//! # Modules
//!
//! - [`pump`] – [`Pump`][pump::Pump]: a pulse-driven dispensing pump.
//! - [`sensor`] – [`LightSensor`][sensor::LightSensor]: the optical
//!   transmittance probe sampled by the telemetry loop.
//! - [`rig`] – [`TitrationRig`][rig::TitrationRig]: dispatches a
//!   [`PumpCommand`][titros_types::PumpCommand] to the registered pump.
//! - [`sim`] – stub drivers that record commands and return plausible
//!   readings, so the full stack runs headless in CI.

pub mod pump;
pub mod rig;
pub mod sensor;
pub mod sim;

pub use pump::Pump;
pub use rig::TitrationRig;
pub use sensor::LightSensor;
pub use sim::{SimLightSensor, SimPump};
