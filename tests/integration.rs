use std::fs;
use std::path::Path;
use std::time::Duration;
use wattmeter::errors::SensorError;
use wattmeter::sensors::perf_ram::PerfRAMSensor;
use wattmeter::sensors::powercap_dram::PowercapDramCounter;
use wattmeter::sensors::{is_available, Sensor, SensorKind};

fn add_dram_domain(base: &Path, socket: u16, energy_uj: u64) {
    let dir = base.join(format!("intel-rapl:{}:0", socket));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("name"), "dram\n").unwrap();
    fs::write(dir.join("energy_uj"), format!("{}\n", energy_uj)).unwrap();
}

#[test]
fn probing_twice_reports_the_same_capability() {
    for kind in [SensorKind::Cpu, SensorKind::Ram] {
        assert_eq!(is_available(kind), is_available(kind));
    }
}

#[test]
fn ram_measurement_cycle_over_synthetic_counters() {
    let tree = tempfile::tempdir().unwrap();
    add_dram_domain(tree.path(), 0, 1_000_000);

    let counter = PowercapDramCounter::open(tree.path()).unwrap();
    let mut sensor: Box<dyn Sensor> = Box::new(PerfRAMSensor::with_counter(Box::new(counter)));
    sensor.start().unwrap();

    // The caller waited out a 2 second window during which the domain
    // accumulated 4 J.
    fs::write(
        tree.path().join("intel-rapl:0:0").join("energy_uj"),
        "5000000\n",
    )
    .unwrap();
    let details = sensor.get_details(Duration::from_secs(2)).unwrap();
    assert_eq!(details["RAM Energy (J)"], 4.0);
    assert_eq!(details["RAM Power (W)"], 2.0);
}

#[test]
fn ram_sensor_refuses_queries_after_stop() {
    let tree = tempfile::tempdir().unwrap();
    add_dram_domain(tree.path(), 0, 1_000_000);

    let counter = PowercapDramCounter::open(tree.path()).unwrap();
    let mut sensor = PerfRAMSensor::with_counter(Box::new(counter));
    sensor.start().unwrap();
    sensor.stop().unwrap();
    let result = sensor.get_energy(Duration::from_secs(1));
    assert!(matches!(result, Err(SensorError::SessionState(_))));
}
