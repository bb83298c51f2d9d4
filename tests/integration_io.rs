//! Round-trips a written output table back through the input-table reader.

use ev_fleet_scheduler::io::{OutputFormat, OutputWriter, read_table};

#[test]
fn csv_written_by_writer_reads_back_with_same_header_and_rows() {
    let dir = std::env::temp_dir().join("ev-fleet-scheduler-it-io-roundtrip");
    std::fs::remove_dir_all(&dir).ok();

    let mut writer = OutputWriter::new(&dir, OutputFormat::Csv);
    writer.push_building_row(
        "B1",
        &["V0", "V1"],
        &ev_fleet_scheduler::building::TickRow {
            timestamp: "2024-01-01 09:00".to_string(),
            available_power_kw: 30.0,
            power_used_kw: 12.5,
            battery_ratios: vec![0.4, 0.6],
            priorities: None,
        },
    );
    writer.flush().expect("flush should succeed");

    let table = read_table(&dir.join("B1.csv")).expect("read back should succeed");
    assert_eq!(table.buildings, vec!["Potencia Disponible", "Gasto de Cargadores", "V0", "V1"]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].tiempo, "2024-01-01 09:00");
    assert_eq!(table.rows[0].values, vec!["30.00", "12.50", "0.40", "0.60"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn tsv_extension_dispatches_to_tab_delimited_parsing() {
    let dir = std::env::temp_dir().join("ev-fleet-scheduler-it-io-tsv");
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("table.tsv");
    std::fs::write(&path, "Tiempo\tB1\tB2\n9:00\t10\t5\n").unwrap();

    let table = read_table(&path).expect("read tsv should succeed");
    assert_eq!(table.buildings, vec!["B1", "B2"]);
    assert_eq!(table.rows[0].values, vec!["10", "5"]);

    std::fs::remove_dir_all(&dir).ok();
}
