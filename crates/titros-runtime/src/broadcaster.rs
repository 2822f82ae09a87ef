//! [`TelemetryBroadcaster`] – the fixed-period sensor fan-out loop.
//!
//! Once per period the loop takes a single [`LightSensor`] reading and
//! pushes it to every registered session, whatever their queue position.
//! The loop runs on its own clock and never waits on the coordinator; it
//! only takes a read-lock snapshot of the session registry per tick.
//!
//! A failed reading skips the tick and the loop continues; sensor trouble
//! must never silence the queue or tear down the process.

use std::time::Duration;

use titros_hal::LightSensor;
use titros_middleware::SessionRegistry;
use titros_types::{ServerEvent, TelemetrySample};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Default publication period, matching the original backend's 1 Hz stream.
pub const DEFAULT_TELEMETRY_PERIOD: Duration = Duration::from_millis(1000);

/// Periodic sensor sampling and broadcast task.
///
/// # Example
///
/// ```rust,no_run
/// use titros_hal::SimLightSensor;
/// use titros_middleware::SessionRegistry;
/// use titros_runtime::TelemetryBroadcaster;
///
/// # async fn run() {
/// let registry = SessionRegistry::new();
/// let broadcaster =
///     TelemetryBroadcaster::new(registry, Box::new(SimLightSensor::new("ldr_probe")));
/// tokio::spawn(broadcaster.run());
/// # }
/// ```
pub struct TelemetryBroadcaster {
    registry: SessionRegistry,
    sensor: Box<dyn LightSensor>,
    period: Duration,
}

impl TelemetryBroadcaster {
    /// Create a broadcaster with the [`DEFAULT_TELEMETRY_PERIOD`].
    pub fn new(registry: SessionRegistry, sensor: Box<dyn LightSensor>) -> Self {
        Self {
            registry,
            sensor,
            period: DEFAULT_TELEMETRY_PERIOD,
        }
    }

    /// Override the publication period (builder-style).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// The configured publication period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run the loop forever. Spawn this as its own task.
    pub async fn run(mut self) {
        info!(sensor = %self.sensor.id(), period = ?self.period, "telemetry broadcaster started");
        let mut ticker = tokio::time::interval(self.period);
        // A stalled executor must not cause a burst of catch-up samples.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick_once().await;
        }
    }

    /// Sample once and broadcast; a sampling failure skips the tick.
    async fn tick_once(&mut self) {
        match self.sensor.sample() {
            Ok(value) => {
                let sample = TelemetrySample::now(value);
                let delivered = self
                    .registry
                    .broadcast(ServerEvent::SensorData(sample.value))
                    .await;
                debug!(value = sample.value, delivered, "telemetry tick");
            }
            Err(e) => {
                warn!(sensor = %self.sensor.id(), error = %e, "sampling failed; tick skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titros_hal::{SimLightSensor, sim::{SIM_SENSOR_CEILING, SIM_SENSOR_FLOOR}};
    use titros_types::{SessionId, TitrError};
    use tokio::sync::mpsc;

    /// Sensor double that fails on selected ticks.
    struct FlakySensor {
        calls: u32,
        fail_on: u32,
    }

    impl LightSensor for FlakySensor {
        fn id(&self) -> &str {
            "flaky"
        }
        fn sample(&mut self) -> Result<u16, TitrError> {
            self.calls += 1;
            if self.calls == self.fail_on {
                Err(TitrError::SensorFault("adc timeout".to_string()))
            } else {
                Ok(650)
            }
        }
    }

    #[tokio::test]
    async fn tick_broadcasts_to_every_session() {
        let registry = SessionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.register(SessionId::new(), tx).await;
            receivers.push(rx);
        }

        let mut broadcaster = TelemetryBroadcaster::new(
            registry,
            Box::new(SimLightSensor::new("ldr_probe")),
        );
        broadcaster.tick_once().await;

        for rx in &mut receivers {
            match rx.recv().await {
                Some(ServerEvent::SensorData(value)) => {
                    assert!((SIM_SENSOR_FLOOR..SIM_SENSOR_CEILING).contains(&value));
                }
                other => panic!("expected sensor_data, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn failed_sample_skips_tick_and_loop_survives() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(SessionId::new(), tx).await;

        let mut broadcaster = TelemetryBroadcaster::new(
            registry,
            Box::new(FlakySensor { calls: 0, fail_on: 2 }),
        );

        broadcaster.tick_once().await; // ok
        broadcaster.tick_once().await; // fails, skipped
        broadcaster.tick_once().await; // ok again

        assert_eq!(rx.recv().await, Some(ServerEvent::SensorData(650)));
        assert_eq!(rx.recv().await, Some(ServerEvent::SensorData(650)));
        // Exactly two events: the failed tick produced nothing.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn tick_with_no_sessions_is_harmless() {
        let registry = SessionRegistry::new();
        let mut broadcaster = TelemetryBroadcaster::new(
            registry,
            Box::new(SimLightSensor::new("ldr_probe")),
        );
        // Must not panic or block.
        broadcaster.tick_once().await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_emits_one_sample_per_period() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(SessionId::new(), tx).await;

        let broadcaster = TelemetryBroadcaster::new(
            registry,
            Box::new(SimLightSensor::new("ldr_probe")),
        )
        .with_period(Duration::from_millis(100));
        tokio::spawn(broadcaster.run());

        // Paused clock auto-advances whenever the runtime is idle, so three
        // receives correspond to three interval ticks.
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, ServerEvent::SensorData(_)));
        }
    }

    #[test]
    fn with_period_overrides_default() {
        let broadcaster = TelemetryBroadcaster::new(
            SessionRegistry::new(),
            Box::new(SimLightSensor::new("ldr_probe")),
        );
        assert_eq!(broadcaster.period(), DEFAULT_TELEMETRY_PERIOD);

        let broadcaster = broadcaster.with_period(Duration::from_millis(250));
        assert_eq!(broadcaster.period(), Duration::from_millis(250));
    }
}
