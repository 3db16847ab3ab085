pub mod debug;
pub mod perf_ram;
pub mod power_gadget;
pub mod powercap_dram;
pub mod units;

use crate::errors::SensorError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Normalized output of one measurement: metric name to value. Produced
/// fresh on every call and owned by the caller. Bookkeeping columns of the
/// underlying measurement protocol never appear here, only derived energy
/// and power metrics.
pub type MetricSnapshot = HashMap<String, f64>;

/// Selects which concrete sensor to probe or construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorKind {
    /// CPU package power, measured by the Intel Power Gadget logging tool.
    Cpu,
    /// Memory subsystem energy, measured by a counter session.
    Ram,
}

/// Sensor trait, the common capability contract of every hardware energy
/// sensor. Callers hold a `Box<dyn Sensor>` and drive the same lifecycle
/// whatever the measurement facility underneath.
pub trait Sensor {
    /// Prepares the sensor for a measurement window. Sensors that run a
    /// fresh poll cycle on every read have nothing to arm and return Ok
    /// immediately.
    fn start(&mut self) -> Result<(), SensorError>;
    /// Returns the normalized metrics for an elapsed measurement window of
    /// `window`. Sensors driven by their own configured poll duration
    /// ignore `window`.
    fn get_details(&mut self, window: Duration) -> Result<MetricSnapshot, SensorError>;
}

/// Measurement parameters of one sensor instance. Supplied at
/// construction, never mutated afterwards.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementConfig {
    /// Directory the external tool writes its sample log into.
    pub output_dir: PathBuf,
    /// Length of one poll cycle, in seconds.
    pub duration_secs: u64,
    /// Sampling resolution of the tool, in milliseconds.
    pub resolution_ms: u64,
    /// Name of the sample log file, overwritten on every poll cycle.
    pub log_file_name: String,
}

impl MeasurementConfig {
    pub(crate) fn log_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file_name)
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        MeasurementConfig {
            output_dir: PathBuf::from("."),
            duration_secs: 1,
            resolution_ms: 100,
            log_file_name: String::from("intel_power_gadget_log.csv"),
        }
    }
}

/// Tells whether a sensor of the given kind can be constructed on this
/// host. This is a capability check only: the trial instance is dropped
/// without starting any measurement, and a construction failure is
/// reported as `false`, never propagated.
pub fn is_available(kind: SensorKind) -> bool {
    let result = match kind {
        SensorKind::Cpu => {
            power_gadget::PowerGadgetSensor::new(MeasurementConfig::default()).map(|_| ())
        }
        SensorKind::Ram => perf_ram::PerfRAMSensor::new().map(|_| ()),
    };
    match result {
        Ok(()) => true,
        Err(error) => {
            debug!("sensor {:?} not available on this host: {}", kind, error);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_idempotent() {
        assert_eq!(is_available(SensorKind::Cpu), is_available(SensorKind::Cpu));
        assert_eq!(is_available(SensorKind::Ram), is_available(SensorKind::Ram));
    }

    #[test]
    fn default_config_matches_tool_defaults() {
        let config = MeasurementConfig::default();
        assert_eq!(config.duration_secs, 1);
        assert_eq!(config.resolution_ms, 100);
        assert_eq!(config.log_file_name, "intel_power_gadget_log.csv");
        assert_eq!(
            config.log_file_path(),
            PathBuf::from("./intel_power_gadget_log.csv")
        );
    }
}
