//! [`TitrationRig`] – command dispatcher for the dispensing hardware.
//!
//! The rig owns the registered [`Pump`] driver and translates an authorized
//! [`PumpCommand`] into the corresponding relay pulse. It is the stub
//! boundary of the coordinator: everything past `dispatch` is hardware
//! territory, everything before it is queue arbitration.

use titros_types::{PumpCommand, TitrError};
use tracing::info;

use crate::pump::Pump;

/// Owns the dispensing pump and dispatches [`PumpCommand`]s to it.
///
/// Construct with [`TitrationRig::new`], then call
/// [`TitrationRig::dispatch`] with commands that have already passed
/// authorization.
pub struct TitrationRig {
    pump: Box<dyn Pump>,
}

impl TitrationRig {
    /// Create a rig around the given pump driver.
    pub fn new(pump: Box<dyn Pump>) -> Self {
        Self { pump }
    }

    /// Identifier of the registered pump driver.
    pub fn pump_id(&self) -> &str {
        self.pump.id()
    }

    /// Apply `command` to the pump.
    ///
    /// # Errors
    ///
    /// Returns [`TitrError::HardwareFault`] when the underlying driver call
    /// fails. Callers treat this as log-and-continue; a hardware fault never
    /// tears down the coordinator.
    pub fn dispatch(&mut self, command: PumpCommand) -> Result<(), TitrError> {
        let duration = command.pulse_duration();
        info!(pump = %self.pump.id(), %command, ?duration, "dispatching pump command");
        self.pump.pulse(duration)
    }
}
