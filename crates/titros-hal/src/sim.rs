//! In-process stub drivers for CI/CD testing without physical hardware.
//!
//! [`SimPump`] records commands and always succeeds; [`SimLightSensor`]
//! returns plausible transmittance readings from a bounded uniform
//! distribution. Together they let the full TitrOS stack run in headless
//! tests and CI pipelines without an ESP32 on the bench.

use std::time::Duration;

use rand::Rng;
use titros_types::TitrError;
use tracing::debug;

use crate::pump::Pump;
use crate::sensor::LightSensor;

/// Default simulated transmittance band, matching the original backend's
/// stand-in generator: raw readings in `[600, 800)`.
pub const SIM_SENSOR_FLOOR: u16 = 600;
pub const SIM_SENSOR_CEILING: u16 = 800;

// ────────────────────────────────────────────────────────────────────────────
// Stub pump
// ────────────────────────────────────────────────────────────────────────────

/// A simulated dispensing pump that records the most recent pulse.
/// Always succeeds.
pub struct SimPump {
    id: String,
    last_pulse: Option<Duration>,
    pulse_count: u64,
}

impl SimPump {
    /// Create a new simulated pump with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_pulse: None,
            pulse_count: 0,
        }
    }

    /// The most recently commanded pulse duration, if any.
    pub fn last_pulse(&self) -> Option<Duration> {
        self.last_pulse
    }

    /// Total number of pulses applied since construction.
    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }
}

impl Pump for SimPump {
    fn id(&self) -> &str {
        &self.id
    }

    fn pulse(&mut self, duration: Duration) -> Result<(), TitrError> {
        self.last_pulse = Some(duration);
        self.pulse_count += 1;
        debug!(pump = %self.id, ?duration, "sim pump pulsed");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated transmittance sensor yielding uniform readings in
/// `[floor, ceiling)`. Always succeeds.
pub struct SimLightSensor {
    id: String,
    floor: u16,
    ceiling: u16,
}

impl SimLightSensor {
    /// Create a simulator over the default `[600, 800)` band.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_bounds(id, SIM_SENSOR_FLOOR, SIM_SENSOR_CEILING)
    }

    /// Create a simulator over a custom half-open band `[floor, ceiling)`.
    /// `ceiling` must be strictly greater than `floor`.
    pub fn with_bounds(id: impl Into<String>, floor: u16, ceiling: u16) -> Self {
        assert!(ceiling > floor, "sensor band must be non-empty");
        Self {
            id: id.into(),
            floor,
            ceiling,
        }
    }
}

impl LightSensor for SimLightSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample(&mut self) -> Result<u16, TitrError> {
        Ok(rand::rng().random_range(self.floor..self.ceiling))
    }
}
