use std::path::PathBuf;

use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use serde::Serialize;
use tempdir::TempDir;

use touch_size::calibration::{CalibrationData, Config, Measurement, REFERENCE_DPI};
use touch_size::selection::{calibrate, evaluate};
use touch_size::transform::ReportingStyle;
use touch_size::{Error, Result, Variable};

#[derive(Serialize)]
struct Row {
    physical: f64,
    reported: f64,
}

fn write_measurements(tmp_dir: &TempDir, measurements: &[Measurement<f64>]) -> PathBuf {
    let path = tmp_dir.path().join("measurements.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    for measurement in measurements {
        wtr.serialize(Row {
            physical: measurement.physical,
            reported: measurement.reported,
        })
        .unwrap();
    }
    wtr.flush().unwrap();
    path
}

#[test]
fn reference_data_prefers_diameter_reporting() -> Result<()> {
    let data = CalibrationData::reference();
    let config = Config::default();

    let calibration = calibrate(&data, &config)?;
    let candidates = calibration.selection.candidates();

    assert_eq!(candidates.len(), 2);
    let diameter = &candidates[0];
    let area = &candidates[1];
    assert_eq!(diameter.label, ReportingStyle::Diameter);
    assert_eq!(area.label, ReportingStyle::Area);

    // On this digitizer the reported size tracks diameter much more closely than area
    approx::assert_relative_eq!(diameter.error, 0.203_969_991_851_148_34, max_relative = 1e-9);
    approx::assert_relative_eq!(area.error, 0.727_488_590_085_877_3, max_relative = 1e-9);
    assert!(diameter.error < area.error);

    let winner = calibration.selection.winner();
    assert_eq!(winner.label, ReportingStyle::Diameter);
    approx::assert_relative_eq!(winner.scale, 0.761_745_454_545_454_4, max_relative = 1e-9);
    approx::assert_relative_eq!(winner.bias, 0.445_272_727_272_730_15, max_relative = 1e-9);

    assert_eq!(calibration.device.bias, REFERENCE_DPI * winner.bias);
    assert_eq!(calibration.device.scale, REFERENCE_DPI * winner.scale);

    assert_eq!(
        winner.to_string(),
        "OptimizationResult{Type=diameter, Scale=0.761745, Bias=0.445273, Error=0.203970}"
    );
    assert_eq!(calibration.device.to_string(), "Bias=7.395980, Scale=12.652592");

    Ok(())
}

#[test]
fn area_reporting_digitizer_is_detected() -> Result<()> {
    let seed = 40;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    // A digitizer reporting contact area: reported = (k * diameter)^2
    let k: f64 = rng.gen_range(1.0..3.0);
    let measurements = (0..20)
        .map(|_| {
            let physical = rng.gen_range(3.0..25.0);
            Measurement {
                physical,
                reported: (k * physical).powi(2),
            }
        })
        .collect::<Vec<_>>();
    let data = CalibrationData::new(measurements);

    let calibration = calibrate(&data, &Config::default())?;
    let winner = calibration.selection.winner();

    assert_eq!(winner.label, ReportingStyle::Area);
    approx::assert_relative_eq!(winner.scale, 1. / k, max_relative = 1e-9);
    assert!(winner.bias.abs() < 1e-9);
    assert!(winner.error < 1e-9);

    Ok(())
}

#[test]
fn each_style_is_scored_on_its_own_transformed_samples() -> Result<()> {
    let data = CalibrationData::reference();

    let area = evaluate(ReportingStyle::Area, data.measurements())?;
    let transformed = ReportingStyle::Area.apply_all(data.measurements())?;
    let refit = touch_size::linear::fit(&transformed)?;

    assert_eq!(area.scale, refit.slope);
    assert_eq!(area.bias, refit.intercept);
    assert_eq!(area.error, refit.rms_error(&transformed)?);

    Ok(())
}

#[test]
fn measurements_are_read_from_csv() -> Result<()> {
    let tmp_dir = TempDir::new("measurements_are_read_from_csv").unwrap();
    let reference = CalibrationData::reference();
    let path = write_measurements(&tmp_dir, reference.measurements());

    let data: CalibrationData<f64> = CalibrationData::from_file(&path)?;

    assert_eq!(data, reference);
    Ok(())
}

#[test]
fn missing_measurement_file_is_an_error() {
    let tmp_dir = TempDir::new("missing_measurement_file_is_an_error").unwrap();

    let result: Result<CalibrationData<f64>> =
        CalibrationData::from_file(&tmp_dir.path().join("absent.csv"));

    assert!(matches!(result, Err(Error::Csv(_))));
}

#[test]
fn config_is_read_from_toml() -> Result<()> {
    let tmp_dir = TempDir::new("config_is_read_from_toml").unwrap();
    let path = tmp_dir.path().join("config.toml");
    std::fs::write(&path, "dpi = 20.0\nstyles = [\"area\"]\n").unwrap();

    let config: Config<f64> = Config::from_file(&path)?;
    assert_eq!(config.styles, vec![ReportingStyle::Area]);

    // Only the listed styles are evaluated
    let calibration = calibrate(&CalibrationData::reference(), &config)?;
    assert_eq!(calibration.selection.candidates().len(), 1);
    assert_eq!(calibration.selection.winner().label, ReportingStyle::Area);
    assert_eq!(
        calibration.device.scale,
        20. * calibration.selection.winner().scale
    );

    Ok(())
}

#[test]
fn config_without_styles_is_rejected() {
    let tmp_dir = TempDir::new("config_without_styles_is_rejected").unwrap();
    let path = tmp_dir.path().join("config.toml");
    std::fs::write(&path, "dpi = 20.0\nstyles = []\n").unwrap();

    let result: Result<Config<f64>> = Config::from_file(&path);

    assert!(matches!(result, Err(Error::EmptyStyleList)));
}

#[test]
fn nan_cell_in_measurement_file_is_reported_against_its_column() -> Result<()> {
    let tmp_dir = TempDir::new("nan_cell_in_measurement_file").unwrap();
    let mut measurements = CalibrationData::reference().measurements().to_vec();
    measurements[2].physical = f64::NAN;
    let path = write_measurements(&tmp_dir, &measurements);

    let data: CalibrationData<f64> = CalibrationData::from_file(&path)?;
    let result = calibrate(&data, &Config::default());

    match result {
        Err(Error::NoValidCandidate { failures }) => {
            assert_eq!(failures.len(), 2);
            for (_, e) in &failures {
                assert!(matches!(
                    e,
                    Error::NonFiniteValue {
                        variable: Variable::Physical,
                        ..
                    }
                ));
            }
        }
        other => panic!("expected no valid candidate, got {other:?}"),
    }
    Ok(())
}
