//! End-to-end runs of the full tick loop against a temporary consumption table.

use std::io::Write;

use ev_fleet_scheduler::config::SimulationConfig;
use ev_fleet_scheduler::driver;

fn small_config() -> SimulationConfig {
    SimulationConfig {
        cant_vehiculos_por_edificio: 3,
        min_salidas: 1,
        max_salidas: 2,
        hora_primera_salida: "6:00".to_string(),
        hora_ultimo_regreso: "20:00".to_string(),
        ..SimulationConfig::default()
    }
}

fn write_table(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::with_suffix(".csv").expect("create temp file");
    write!(file, "{contents}").expect("write temp file");
    file
}

#[test]
fn run_produces_one_table_per_enabled_policy() {
    let cfg = small_config();
    let input = write_table("Tiempo,B1,B2\n9:00,10,5\n9:15,20,8\n9:30,15,12\n");
    let out_dir = std::env::temp_dir().join("ev-fleet-scheduler-it-run-basic");
    std::fs::remove_dir_all(&out_dir).ok();

    driver::run(&cfg, input.path(), &out_dir).expect("run should succeed");

    for building in ["B1", "B2"] {
        for policy in ["FIFO", "RoundRobin", "Priority"] {
            let path = out_dir.join(format!("{building} {policy}.csv"));
            assert!(path.exists(), "expected {path:?} to exist");
        }
        let priorities = out_dir.join(format!("Prioridades {building} Priority.csv"));
        assert!(priorities.exists(), "expected {priorities:?} to exist");
    }

    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn run_with_only_fifo_enabled_writes_no_other_policy_tables() {
    let mut cfg = small_config();
    cfg.simular_roundrobin = false;
    cfg.simular_inteligente = false;
    let input = write_table("Tiempo,B1\n9:00,10\n9:15,20\n");
    let out_dir = std::env::temp_dir().join("ev-fleet-scheduler-it-run-fifo-only");
    std::fs::remove_dir_all(&out_dir).ok();

    driver::run(&cfg, input.path(), &out_dir).expect("run should succeed");

    assert!(out_dir.join("B1 FIFO.csv").exists());
    assert!(!out_dir.join("B1 RoundRobin.csv").exists());
    assert!(!out_dir.join("B1 Priority.csv").exists());

    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn same_seed_and_input_produce_identical_output_bytes() {
    let cfg = small_config();
    let input_contents = "Tiempo,B1\n9:00,10\n9:15,20\n9:30,30\n9:45,5\n";

    let input_a = write_table(input_contents);
    let out_a = std::env::temp_dir().join("ev-fleet-scheduler-it-determinism-a");
    std::fs::remove_dir_all(&out_a).ok();
    driver::run(&cfg, input_a.path(), &out_a).expect("run a should succeed");

    let input_b = write_table(input_contents);
    let out_b = std::env::temp_dir().join("ev-fleet-scheduler-it-determinism-b");
    std::fs::remove_dir_all(&out_b).ok();
    driver::run(&cfg, input_b.path(), &out_b).expect("run b should succeed");

    let bytes_a = std::fs::read(out_a.join("B1 Priority.csv")).expect("read run a output");
    let bytes_b = std::fs::read(out_b.join("B1 Priority.csv")).expect("read run b output");
    assert_eq!(bytes_a, bytes_b);

    std::fs::remove_dir_all(&out_a).ok();
    std::fs::remove_dir_all(&out_b).ok();
}

#[test]
fn malformed_time_column_is_reported_as_input_error() {
    let cfg = small_config();
    let input = write_table("Tiempo,B1\nnot-a-time,10\n");
    let out_dir = std::env::temp_dir().join("ev-fleet-scheduler-it-bad-time");

    let result = driver::run(&cfg, input.path(), &out_dir);
    assert!(result.is_err());
}
