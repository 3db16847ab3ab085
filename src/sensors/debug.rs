use crate::errors::SensorError;
use crate::sensors::perf_ram::CounterSession;
use std::time::Duration;

/// In-memory counter session yielding a fixed energy delta. Used in
/// tests and doc examples on hosts without real counters.
pub struct DebugCounter {
    delta_uj: f64,
    armed: bool,
}

impl DebugCounter {
    /// A counter that reports `delta_uj` microjoules on every query of an
    /// armed session.
    pub fn new(delta_uj: f64) -> DebugCounter {
        DebugCounter {
            delta_uj,
            armed: false,
        }
    }
}

impl CounterSession for DebugCounter {
    fn start(&mut self) -> Result<(), SensorError> {
        self.armed = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        self.armed = false;
        Ok(())
    }

    fn delta(&mut self, _duration: Duration) -> Result<f64, SensorError> {
        if !self.armed {
            return Err(SensorError::SessionState(
                "debug counter queried while disarmed",
            ));
        }
        Ok(self.delta_uj)
    }
}
