use std::collections::BTreeMap;
use std::fs;

use bcqm_soft_rudder::output::{read_amplitude_table, AMPLITUDE_CSV, MANIFEST_JSON};
use bcqm_soft_rudder::{fit_beta_from_csv, run_scan, write_scan_outputs, RunConfig};

fn exponential_scan_config() -> RunConfig {
    RunConfig::from_yaml_str(
        "
simulation:
  dt: 1.0
  n_steps: 1024
  n_ensembles: 8
  seed: 7
scan:
  wcoh_values: [5, 40]
  label: e2e
slip:
  law: exponential
",
    )
    .unwrap()
}

#[test]
fn repeated_scans_are_bit_identical() {
    let config = exponential_scan_config();
    let first = run_scan(&config).unwrap();
    let second = run_scan(&config).unwrap();

    assert_eq!(first.points.len(), 2);
    for (a, b) in first.points.iter().zip(&second.points) {
        assert_eq!(a.amplitude.to_bits(), b.amplitude.to_bits());
        assert_eq!(a.omega_c.to_bits(), b.omega_c.to_bits());
    }
}

#[test]
fn higher_coherence_smooths_acceleration() {
    let result = run_scan(&exponential_scan_config()).unwrap();
    let amplitudes = result.amplitudes();
    assert!(amplitudes[0] > 0.0);
    assert!(
        amplitudes[1] < amplitudes[0],
        "A(W=40) = {} should be below A(W=5) = {}",
        amplitudes[1],
        amplitudes[0]
    );
}

#[test]
fn near_ballistic_inverse_law_has_vanishing_amplitude() {
    let reference = run_scan(&exponential_scan_config()).unwrap();

    let mut config = exponential_scan_config();
    config.slip.law = "inv".to_string();
    config.slip.params = BTreeMap::from([("k".to_string(), 2.0)]);
    config.scan.wcoh_values = vec![1e9];
    let result = run_scan(&config).unwrap();

    let point = &result.points[0];
    assert!(1.0 - point.p_stay < 1e-8);
    assert!(point.amplitude < 0.1 * reference.points[0].amplitude);
}

#[test]
fn unknown_law_runs_with_fallback() {
    let mut config = exponential_scan_config();
    config.slip.law = "unknown_law".to_string();
    let result = run_scan(&config).unwrap();
    assert!(result.points.iter().all(|p| p.p_stay == 0.9));
}

#[test]
fn outputs_round_trip_into_beta_fit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = exponential_scan_config();
    config.scan.wcoh_values = vec![5.0, 10.0, 20.0, 40.0];
    config.output.base_dir = dir.path().join("run");

    let result = run_scan(&config).unwrap();
    let outputs = write_scan_outputs(&config, &result, &config.output.base_dir).unwrap();

    assert_eq!(outputs.spectrum_paths.len(), 4);
    assert!(outputs.output_dir.join("Wcoh_5.csv").exists());
    assert!(outputs.output_dir.join("Wcoh_40.csv").exists());
    assert_eq!(outputs.amplitude_csv, outputs.output_dir.join(AMPLITUDE_CSV));

    let rows = read_amplitude_table(&outputs.amplitude_csv).unwrap();
    assert_eq!(rows.len(), 4);
    for (row, point) in rows.iter().zip(&result.points) {
        assert_eq!(row.wcoh, point.wcoh);
        assert!((row.amplitude - point.amplitude).abs() <= 1e-15 * point.amplitude.max(1.0));
    }

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(outputs.output_dir.join(MANIFEST_JSON)).unwrap())
            .unwrap();
    assert_eq!(manifest["label"], "e2e");
    assert_eq!(manifest["law"]["law"], "exponential");
    assert_eq!(manifest["points"].as_array().map(Vec::len), Some(4));

    let fit = fit_beta_from_csv(&outputs.amplitude_csv).unwrap();
    assert_eq!(fit.n_points, 4);
    assert!(fit.beta > 0.0);
}
