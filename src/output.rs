use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, SimulationParameters};
use crate::law::PersistenceLaw;
use crate::scan::{CoherencePoint, ScanResult};
use crate::spectrum::Spectrum;
use crate::SoftRudderError;

pub const AMPLITUDE_CSV: &str = "amplitude_scaling_soft_rudder.csv";
pub const MANIFEST_JSON: &str = "run_manifest.json";

#[derive(Debug, Clone)]
pub struct ScanOutputs {
    pub output_dir: PathBuf,
    pub amplitude_csv: PathBuf,
    pub manifest_path: PathBuf,
    pub spectrum_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest<'a> {
    pub label: &'a str,
    pub requested_law: &'a str,
    pub law: &'a PersistenceLaw,
    pub simulation: &'a SimulationParameters,
    pub points: &'a [CoherencePoint],
    pub spectrum_files: Vec<String>,
    pub created_utc: String,
}

/// One row of the amplitude table as read back for fitting.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AmplitudeRow {
    #[serde(rename = "Wcoh")]
    pub wcoh: f64,
    #[serde(rename = "A")]
    pub amplitude: f64,
}

fn fmt_sci(value: f64) -> String {
    format!("{value:.16e}")
}

/// Coherence value as used in file names and the `Wcoh` column.
pub fn fmt_wcoh(value: f64) -> String {
    format!("{value}")
}

pub fn spectrum_filename(wcoh: f64) -> String {
    format!("Wcoh_{}.csv", fmt_wcoh(wcoh))
}

pub fn write_spectrum_csv(path: &Path, spectrum: &Spectrum) -> Result<(), SoftRudderError> {
    if spectrum.omega.len() != spectrum.s.len() {
        return Err(SoftRudderError::LengthMismatch {
            context: "spectrum csv",
            expected: spectrum.omega.len(),
            got: spectrum.s.len(),
        });
    }

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["omega", "S"])?;

    for (omega, s) in spectrum.omega.iter().zip(&spectrum.s) {
        writer.write_record([fmt_sci(*omega), fmt_sci(*s)])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_amplitude_csv(path: &Path, points: &[CoherencePoint]) -> Result<(), SoftRudderError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["Wcoh", "A", "omega_c"])?;

    for point in points {
        writer.write_record([
            fmt_wcoh(point.wcoh),
            fmt_sci(point.amplitude),
            fmt_sci(point.omega_c),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Read the `Wcoh` and `A` columns of an amplitude table; other columns are ignored.
pub fn read_amplitude_table(path: &Path) -> Result<Vec<AmplitudeRow>, SoftRudderError> {
    let mut reader = Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<AmplitudeRow>, csv::Error>>()?;
    Ok(rows)
}

/// Write per-value spectra, the amplitude table and the run manifest into `output_dir`.
pub fn write_scan_outputs(
    config: &RunConfig,
    result: &ScanResult,
    output_dir: &Path,
) -> Result<ScanOutputs, SoftRudderError> {
    fs::create_dir_all(output_dir)?;

    let mut spectrum_paths = Vec::with_capacity(result.points.len());
    for point in &result.points {
        let path = output_dir.join(spectrum_filename(point.wcoh));
        write_spectrum_csv(&path, &point.spectrum)?;
        spectrum_paths.push(path);
    }

    let amplitude_csv = output_dir.join(AMPLITUDE_CSV);
    write_amplitude_csv(&amplitude_csv, &result.points)?;

    let manifest = RunManifest {
        label: &result.label,
        requested_law: &config.slip.law,
        law: &result.law,
        simulation: &config.simulation,
        points: &result.points,
        spectrum_files: result
            .points
            .iter()
            .map(|p| spectrum_filename(p.wcoh))
            .collect(),
        created_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    };
    let manifest_path = output_dir.join(MANIFEST_JSON);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    Ok(ScanOutputs {
        output_dir: output_dir.to_path_buf(),
        amplitude_csv,
        manifest_path,
        spectrum_paths,
    })
}
