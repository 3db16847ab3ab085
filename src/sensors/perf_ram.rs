use crate::errors::SensorError;
use crate::sensors::powercap_dram::{PowercapDramCounter, DEFAULT_BASE_PATH};
use crate::sensors::units::Unit;
use crate::sensors::{MetricSnapshot, Sensor};
use std::time::Duration;

const ENERGY_METRIC: &str = "RAM Energy (J)";
const POWER_METRIC: &str = "RAM Power (W)";

/// Handle to an open memory energy counter session. Opening is each
/// implementing type's fallible constructor; an open failure is what a
/// probe reads as "not available on this host".
///
/// One session is owned exclusively by one sensor instance; `start` and
/// `stop` must not be called concurrently on the same session.
pub trait CounterSession {
    /// Arms the session at the beginning of a measurement window.
    fn start(&mut self) -> Result<(), SensorError>;
    /// Disarms the session; deltas queried after this point fail.
    fn stop(&mut self) -> Result<(), SensorError>;
    /// Energy accumulated since `start`, in microjoules, scoped to the
    /// elapsed `duration`.
    fn delta(&mut self, duration: Duration) -> Result<f64, SensorError>;
}

/// Sensor measuring memory subsystem energy through a counter session.
///
/// Unlike the poll-per-call CPU sensor, the lifecycle is explicit: `start`
/// arms the session, the caller waits out the measurement window, then
/// `get_energy` asks for the delta over that window. Read failures are
/// surfaced to the caller here, not swallowed: querying without a session
/// is a contract violation, not a "no data" situation.
pub struct PerfRAMSensor {
    counter: Box<dyn CounterSession>,
    started: bool,
}

impl PerfRAMSensor {
    /// Opens the default memory energy counter of the host. Hosts without
    /// a readable counter interface get `Unavailable`, which is what
    /// `is_available(SensorKind::Ram)` reports as `false`.
    pub fn new() -> Result<PerfRAMSensor, SensorError> {
        let counter = PowercapDramCounter::open(DEFAULT_BASE_PATH)?;
        Ok(PerfRAMSensor::with_counter(Box::new(counter)))
    }

    /// Builds the sensor on top of any other counter implementation.
    ///
    /// ```
    /// use std::time::Duration;
    /// use wattmeter::sensors::{debug::DebugCounter, perf_ram::PerfRAMSensor, Sensor};
    ///
    /// let mut sensor = PerfRAMSensor::with_counter(Box::new(DebugCounter::new(2_000_000.0)));
    /// sensor.start().unwrap();
    /// let details = sensor.get_energy(Duration::from_secs(2)).unwrap();
    /// assert_eq!(details["RAM Energy (J)"], 2.0);
    /// assert_eq!(details["RAM Power (W)"], 1.0);
    /// ```
    pub fn with_counter(counter: Box<dyn CounterSession>) -> PerfRAMSensor {
        PerfRAMSensor {
            counter,
            started: false,
        }
    }

    /// Energy consumed since `start`, expressed over the supplied elapsed
    /// duration. The caller is responsible for having waited that long;
    /// no polling delay happens here.
    pub fn get_energy(&mut self, duration: Duration) -> Result<MetricSnapshot, SensorError> {
        if !self.started {
            return Err(SensorError::SessionState(
                "energy delta queried outside of a start/stop window",
            ));
        }
        let delta_uj = self.counter.delta(duration)?;
        let joules = Unit::to(delta_uj, &Unit::MicroJoule, &Unit::Joule).unwrap();
        let mut details = MetricSnapshot::new();
        details.insert(String::from(ENERGY_METRIC), joules);
        if duration.as_secs_f64() > 0.0 {
            details.insert(String::from(POWER_METRIC), joules / duration.as_secs_f64());
        }
        Ok(details)
    }

    /// Closes the measurement window. Further delta queries fail fast
    /// until the next `start` rather than returning stale data.
    pub fn stop(&mut self) -> Result<(), SensorError> {
        self.started = false;
        self.counter.stop()
    }
}

impl Sensor for PerfRAMSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        // Counters that cannot be read at session start are as good as
        // absent; report them the way construction would have.
        self.counter.start().map_err(|error| match error {
            SensorError::MeasurementRead(source) => {
                SensorError::Unavailable(source.to_string())
            }
            other => other,
        })?;
        self.started = true;
        Ok(())
    }

    fn get_details(&mut self, window: Duration) -> Result<MetricSnapshot, SensorError> {
        self.get_energy(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::debug::DebugCounter;

    fn debug_sensor(delta_uj: f64) -> PerfRAMSensor {
        PerfRAMSensor::with_counter(Box::new(DebugCounter::new(delta_uj)))
    }

    #[test]
    fn energy_query_without_start_fails_fast() {
        let mut sensor = debug_sensor(1_000_000.0);
        let result = sensor.get_energy(Duration::from_secs(1));
        assert!(matches!(result, Err(SensorError::SessionState(_))));
    }

    #[test]
    fn energy_query_after_stop_fails_fast() {
        let mut sensor = debug_sensor(1_000_000.0);
        sensor.start().unwrap();
        sensor.stop().unwrap();
        let result = sensor.get_energy(Duration::from_secs(1));
        assert!(matches!(result, Err(SensorError::SessionState(_))));
    }

    #[test]
    fn microjoule_deltas_come_back_as_joules_and_watts() {
        let mut sensor = debug_sensor(3_000_000.0);
        sensor.start().unwrap();
        let details = sensor.get_energy(Duration::from_secs(2)).unwrap();
        assert_eq!(details[ENERGY_METRIC], 3.0);
        assert_eq!(details[POWER_METRIC], 1.5);
    }

    #[test]
    fn zero_duration_reports_energy_without_a_rate() {
        let mut sensor = debug_sensor(1_000_000.0);
        sensor.start().unwrap();
        let details = sensor.get_energy(Duration::from_secs(0)).unwrap();
        assert_eq!(details[ENERGY_METRIC], 1.0);
        assert!(!details.contains_key(POWER_METRIC));
    }

    #[test]
    fn session_can_be_rearmed_after_stop() {
        let mut sensor = debug_sensor(1_000_000.0);
        sensor.start().unwrap();
        sensor.stop().unwrap();
        sensor.start().unwrap();
        assert!(sensor.get_energy(Duration::from_secs(1)).is_ok());
    }
}
