use touch_size::calibration::{CalibrationData, Config};
use touch_size::selection::calibrate;
use tracing_subscriber::EnvFilter;

fn main() -> touch_size::Result<()> {
    // Logs go to stderr so stdout only carries the calibration
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let data = CalibrationData::reference();
    let config = Config::default();

    let calibration = calibrate(&data, &config)?;
    println!("{}", calibration.selection.winner());
    // Copy into the device's input configuration file
    println!("{}", calibration.device);

    Ok(())
}
