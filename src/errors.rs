use std::convert;
use std::io;
use std::{error::Error, fmt};

/// Error raised while constructing a sensor or driving a measurement.
#[derive(Debug)]
pub enum SensorError {
    /// The host platform has no support at all for the requested sensor.
    /// Fatal: the caller must not use this sensor kind on this host.
    UnsupportedPlatform(String),
    /// The platform could support the sensor but its measurement facility
    /// is absent (tool not installed, counter interface not exposed).
    /// Expected and recoverable: fall back to another strategy.
    Unavailable(String),
    /// A measurement source could not be read.
    MeasurementRead(io::Error),
    /// A counter session was queried outside of a start/stop window.
    SessionState(&'static str),
}

impl Error for SensorError {}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SensorError::UnsupportedPlatform(msg) => {
                write!(f, "platform not supported: {}", msg)
            }
            SensorError::Unavailable(msg) => {
                write!(f, "measurement facility unavailable: {}", msg)
            }
            SensorError::MeasurementRead(error) => {
                write!(f, "couldn't read from the measurement source: {}", error)
            }
            SensorError::SessionState(msg) => write!(f, "counter session misuse: {}", msg),
        }
    }
}

impl convert::From<io::Error> for SensorError {
    fn from(error: io::Error) -> Self {
        SensorError::MeasurementRead(error)
    }
}

//  Copyright 2024 The wattmeter authors.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
