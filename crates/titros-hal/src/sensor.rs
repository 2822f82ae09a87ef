//! `LightSensor` trait – the optical transmittance probe.
//!
//! The titration endpoint is detected optically: an LED shines through the
//! solution onto an LDR, and the raw ADC reading rises sharply at the colour
//! change. The telemetry loop samples this trait once per tick; substituting
//! the real ADC driver for the simulator never touches scheduling logic.

use titros_types::TitrError;

/// A transmittance sensor returning raw ADC counts.
pub trait LightSensor: Send {
    /// Stable identifier for this sensor, e.g. `"ldr_probe"`.
    fn id(&self) -> &str;

    /// Take one reading.
    ///
    /// # Errors
    ///
    /// Returns [`TitrError::SensorFault`] when the reading cannot be taken.
    /// The telemetry loop treats this as a skipped tick, never as fatal.
    fn sample(&mut self) -> Result<u16, TitrError>;
}
