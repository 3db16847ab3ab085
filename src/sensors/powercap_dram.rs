use crate::errors::SensorError;
use crate::sensors::perf_ram::CounterSession;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default sysfs tree exposing the energy counters.
pub const DEFAULT_BASE_PATH: &str = "/sys/class/powercap";

/// One DRAM energy domain: its monotonic microjoule counter file and the
/// baseline captured at session start.
struct DramDomain {
    counter_uj_path: PathBuf,
    baseline_uj: Option<f64>,
}

/// Counter session over the DRAM domains of a powercap sysfs tree.
///
/// The kernel exposes one directory per RAPL domain; the ones whose
/// `name` file reads `dram` carry the memory subsystem energy counter in
/// `energy_uj`. `start` captures a baseline per domain and `delta` sums
/// the increments since then.
pub struct PowercapDramCounter {
    domains: Vec<DramDomain>,
}

impl PowercapDramCounter {
    /// Opens a session over every DRAM domain found under `base_path`.
    /// A host without the tree, or with a tree holding no DRAM domain,
    /// is reported as `Unavailable`.
    pub fn open(base_path: impl AsRef<Path>) -> Result<PowercapDramCounter, SensorError> {
        let base_path = base_path.as_ref();
        let re_domain = Regex::new(r"^.*/intel-rapl:\d+:\d+$").unwrap();
        let folders = fs::read_dir(base_path).map_err(|error| {
            SensorError::Unavailable(format!(
                "no powercap tree at {}: {}",
                base_path.display(),
                error
            ))
        })?;
        let mut domains = vec![];
        for folder in folders.flatten() {
            let folder_name = String::from(folder.path().to_string_lossy());
            // let's catch domain folders
            if !re_domain.is_match(&folder_name) {
                continue;
            }
            let name = fs::read_to_string(folder.path().join("name")).unwrap_or_default();
            if name.trim() != "dram" {
                continue;
            }
            domains.push(DramDomain {
                counter_uj_path: folder.path().join("energy_uj"),
                baseline_uj: None,
            });
        }
        if domains.is_empty() {
            return Err(SensorError::Unavailable(format!(
                "no dram energy domain under {}",
                base_path.display()
            )));
        }
        debug!(
            "opened {} dram energy domain(s) under {}",
            domains.len(),
            base_path.display()
        );
        Ok(PowercapDramCounter { domains })
    }

    fn read_counter_uj(path: &Path) -> Result<f64, SensorError> {
        let raw = fs::read_to_string(path)?;
        raw.trim().parse::<f64>().map_err(|error| {
            SensorError::MeasurementRead(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unparseable counter value in {}: {}", path.display(), error),
            ))
        })
    }
}

impl CounterSession for PowercapDramCounter {
    fn start(&mut self) -> Result<(), SensorError> {
        for domain in &mut self.domains {
            domain.baseline_uj = Some(Self::read_counter_uj(&domain.counter_uj_path)?);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        for domain in &mut self.domains {
            domain.baseline_uj = None;
        }
        Ok(())
    }

    fn delta(&mut self, _duration: Duration) -> Result<f64, SensorError> {
        let mut total_uj = 0.0;
        for domain in &self.domains {
            let baseline = domain.baseline_uj.ok_or(SensorError::SessionState(
                "counter delta queried before start",
            ))?;
            let current = Self::read_counter_uj(&domain.counter_uj_path)?;
            if current >= baseline {
                total_uj += current - baseline;
            } else {
                // The kernel counter wrapped since the baseline.
                total_uj += current;
            }
        }
        Ok(total_uj)
    }
}
