use std::fmt;

/// Orders of magnitude of the energy and power metrics handled by the
/// sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Joule,
    MilliJoule,
    MicroJoule,
    MegaWatt,
    KiloWatt,
    Watt,
    MilliWatt,
    MicroWatt,
}

impl Unit {
    /// Converts a measure between two units of the same dimension.
    /// Converting an energy value to a power unit (or the reverse) has no
    /// meaning without a time dimension and is refused.
    pub fn to(measure: f64, source_unit: &Unit, dest_unit: &Unit) -> Result<f64, String> {
        let energy_order = [Unit::Joule, Unit::MilliJoule, Unit::MicroJoule];
        let power_order = [
            Unit::MegaWatt,
            Unit::KiloWatt,
            Unit::Watt,
            Unit::MilliWatt,
            Unit::MicroWatt,
        ];
        let pos_source_energy = energy_order.iter().position(|x| x == source_unit);
        let pos_dest_energy = energy_order.iter().position(|x| x == dest_unit);
        let pos_source_power = power_order.iter().position(|x| x == source_unit);
        let pos_dest_power = power_order.iter().position(|x| x == dest_unit);
        if let (Some(pos_source), Some(pos_dest)) = (pos_source_energy, pos_dest_energy) {
            Ok(measure * Unit::get_mult(pos_source, pos_dest))
        } else if let (Some(pos_source), Some(pos_dest)) = (pos_source_power, pos_dest_power) {
            Ok(measure * Unit::get_mult(pos_source, pos_dest))
        } else {
            Err(format!(
                "impossible conversion asked from {} to {} (no time dimension)",
                source_unit, dest_unit
            ))
        }
    }

    fn get_mult(pos_source: usize, pos_dest: usize) -> f64 {
        let mut mult: f64 = 1.0;
        if pos_dest > pos_source {
            // source < dest
            for _ in 0..(pos_dest - pos_source) {
                mult *= 1000.0;
            }
        } else if pos_dest < pos_source {
            // source > dest
            for _ in 0..(pos_source - pos_dest) {
                mult /= 1000.0;
            }
        }
        mult
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Joule => write!(f, "Joules"),
            Unit::MilliJoule => write!(f, "MilliJoules"),
            Unit::MicroJoule => write!(f, "MicroJoules"),
            Unit::MegaWatt => write!(f, "MegaWatts"),
            Unit::KiloWatt => write!(f, "KiloWatts"),
            Unit::Watt => write!(f, "Watts"),
            Unit::MilliWatt => write!(f, "MilliWatts"),
            Unit::MicroWatt => write!(f, "MicroWatts"),
        }
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
