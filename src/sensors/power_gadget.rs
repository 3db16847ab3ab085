use crate::errors::SensorError;
use crate::sensors::{MeasurementConfig, MetricSnapshot, Sensor};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const WINDOWS_EXEC: &str = "PowerLog.exe";
const OSX_EXEC: &str = "PowerLog";
const OSX_EXEC_BACKUP: &str = "/Applications/Intel Power Gadget/PowerLog";

/// Columns that belong to the measurement protocol itself and must never
/// surface as metrics.
const BOOKKEEPING_COLUMNS: [&str; 3] = ["System Time", "Elapsed Time (sec)", "RDTSC"];

/// Sensor wrapping the Intel Power Gadget command line tool. One
/// `get_cpu_details` call runs one bounded poll cycle of the tool, reads
/// the sample log it wrote and reduces it to summary metrics.
///
/// The poll cycle overwrites a single log path, so one instance must not
/// be polled concurrently; a measurement task owns its instance
/// exclusively.
pub struct PowerGadgetSensor {
    cli: PathBuf,
    config: MeasurementConfig,
}

impl PowerGadgetSensor {
    /// Locates the power logging tool for the current platform. Hosts
    /// without the tool get `Unavailable`, platforms the tool does not
    /// exist for get `UnsupportedPlatform`; both are what
    /// `is_available(SensorKind::Cpu)` reports as `false`.
    pub fn new(config: MeasurementConfig) -> Result<PowerGadgetSensor, SensorError> {
        let cli = resolve_cli(env::consts::OS, env::var_os("PATH").unwrap_or_default())?;
        Ok(PowerGadgetSensor { cli, config })
    }

    #[cfg(test)]
    fn with_cli(cli: PathBuf, config: MeasurementConfig) -> PowerGadgetSensor {
        PowerGadgetSensor { cli, config }
    }

    /// Runs one poll cycle of the tool, writing the sample log at the
    /// configured path. Blocks for about `duration_secs` seconds, the
    /// tool's own polling loop. A failed launch is not fatal: the
    /// reduction step treats a missing or partial log as an empty sample
    /// set.
    fn log_values(&self) {
        let status = Command::new(&self.cli)
            .arg("-duration")
            .arg(self.config.duration_secs.to_string())
            .arg("-resolution")
            .arg(self.config.resolution_ms.to_string())
            .arg("-file")
            .arg(self.config.log_file_path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(code) if !code.success() => {
                debug!("power logging tool exited with {}", code)
            }
            Err(error) => debug!(
                "couldn't launch power logging tool {}: {}",
                self.cli.display(),
                error
            ),
            _ => {}
        }
    }

    /// Fetches the CPU power details of one fresh poll cycle. Always
    /// returns a snapshot: an absent or unreadable log is logged and
    /// yields an empty one, it never becomes an error for the caller.
    pub fn get_cpu_details(&mut self) -> MetricSnapshot {
        self.log_values();
        let path = self.config.log_file_path();
        match reduce_log(&path) {
            Ok(details) => details,
            Err(error) => {
                debug!(
                    "unable to read power gadget log at {}: {}",
                    path.display(),
                    error
                );
                MetricSnapshot::new()
            }
        }
    }

    /// Runs one poll cycle on a dedicated worker thread, so the blocking
    /// external invocation does not stall the calling task. The sensor is
    /// handed back through the channel together with the snapshot, which
    /// keeps polls on one instance serialized by ownership.
    pub fn get_details_in_background(
        mut self,
    ) -> mpsc::Receiver<(PowerGadgetSensor, MetricSnapshot)> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let details = self.get_cpu_details();
            let _ = tx.send((self, details));
        });
        rx
    }
}

impl Sensor for PowerGadgetSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        // Nothing to arm: every get_details call runs a fresh poll cycle.
        Ok(())
    }

    fn get_details(&mut self, _window: Duration) -> Result<MetricSnapshot, SensorError> {
        Ok(self.get_cpu_details())
    }
}

/// Locates the power logging executable for the given platform identity.
/// Windows requires the tool on the search path; Darwin falls back to the
/// fixed install location of the vendor package.
fn resolve_cli(os: &str, path_var: impl AsRef<OsStr>) -> Result<PathBuf, SensorError> {
    match os {
        "windows" => find_in_path(WINDOWS_EXEC, path_var.as_ref()).ok_or_else(|| {
            SensorError::Unavailable(format!("{} not found on the search path", WINDOWS_EXEC))
        }),
        "macos" => find_in_path(OSX_EXEC, path_var.as_ref())
            .or_else(|| {
                let backup = PathBuf::from(OSX_EXEC_BACKUP);
                if backup.is_file() {
                    Some(backup)
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                SensorError::Unavailable(format!(
                    "{} not found on the search path nor at {}",
                    OSX_EXEC, OSX_EXEC_BACKUP
                ))
            }),
        other => Err(SensorError::UnsupportedPlatform(format!(
            "no power logging tool exists for {}",
            other
        ))),
    }
}

/// Searches a PATH-style variable for a file with the exact given name.
fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Reads one sample log and reduces it to summary metrics, column by
/// column: a column whose name contains "Cumulative" is a monotonically
/// accumulated quantity and keeps its last sample, every other column is
/// a rate and is averaged over the window. The split is a naming
/// convention of the tool, not a fixed schema; its column set varies
/// across versions.
fn reduce_log(path: &Path) -> Result<MetricSnapshot, SensorError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let header: Vec<String> = match lines.next() {
        Some(line) => line.split(',').map(|h| String::from(h.trim())).collect(),
        None => return Ok(MetricSnapshot::new()),
    };
    let bookkeeping: Vec<bool> = header
        .iter()
        .map(|name| BOOKKEEPING_COLUMNS.contains(&name.as_str()))
        .collect();

    let mut rows: Vec<Vec<f64>> = vec![];
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != header.len() {
            debug!(
                "dropping sample row with {} fields where {} were expected",
                fields.len(),
                header.len()
            );
            continue;
        }
        let mut values = Vec::with_capacity(fields.len());
        let mut usable = true;
        for (index, field) in fields.iter().enumerate() {
            if field.is_empty() {
                usable = false;
                break;
            }
            if bookkeeping[index] {
                // Timestamps and cycle counters are not metrics; the
                // placeholder is never read back.
                values.push(0.0);
                continue;
            }
            match field.parse::<f64>() {
                Ok(value) => values.push(value),
                Err(_) => {
                    usable = false;
                    break;
                }
            }
        }
        if usable {
            rows.push(values);
        } else {
            // A row is only usable if every field is populated.
            debug!("dropping sample row with missing values");
        }
    }

    let mut details = MetricSnapshot::new();
    if rows.is_empty() {
        return Ok(details);
    }
    for (index, name) in header.iter().enumerate() {
        if bookkeeping[index] {
            continue;
        }
        let value = if name.contains("Cumulative") {
            rows[rows.len() - 1][index]
        } else {
            rows.iter().map(|row| row[index]).sum::<f64>() / rows.len() as f64
        };
        details.insert(name.clone(), value);
    }
    Ok(details)
}
