//! Generic `Pump` trait for pulse-driven dispensing hardware.
//!
//! Drivers implement this trait and are handed to a
//! [`TitrationRig`][crate::rig::TitrationRig]. The rest of the stack only
//! ever talks to the trait, so the Wokwi/ESP32 relay driver and the
//! in-process simulator are interchangeable.

use std::time::Duration;

use titros_types::TitrError;

/// A dispensing pump driven by timed relay pulses.
///
/// Every pump has a stable string identifier so faults can be attributed to
/// the right piece of hardware in logs.
pub trait Pump: Send + Sync {
    /// Stable identifier for this pump, e.g. `"titrant_pump"`.
    fn id(&self) -> &str;

    /// Energise the pump relay for `duration`, then release it.
    ///
    /// # Errors
    ///
    /// Returns [`TitrError::HardwareFault`] if the pulse cannot be applied
    /// (e.g. the relay is in a fault state or the controller is unreachable).
    fn pulse(&mut self, duration: Duration) -> Result<(), TitrError>;
}
