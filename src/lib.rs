//! Hardware energy measurement sensors for electricity consumption metrics.
//!
//! This crate discovers which low-level power measurement facilities exist
//! on the host (the Intel Power Gadget logging utility for CPU power, or a
//! powercap-style counter interface for memory subsystem energy), drives
//! whichever one is present, and normalizes its output into a flat set of
//! energy and power metrics. A reporting pipeline built on top of it never
//! needs to know which facility produced the numbers.

#[macro_use]
extern crate log;

pub mod errors;
pub mod sensors;

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
