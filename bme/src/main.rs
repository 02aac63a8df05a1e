//!
//! Compensates one raw temperature and pressure reading with the reference calibration
//!

use std::process::ExitCode;
use log::debug;

use bme280::{Bme280, Calibration};
use config::Config;
use weather_err::Result;

mod args;

const REFERENCE_TOML : &str = include_str!("../reference.toml");


//----------------------------------------------------------------------------------------------------------------------------------
fn reference_calibration() -> Result<Calibration> {
    Config::parse(REFERENCE_TOML)?.calibration("reference")
}


//----------------------------------------------------------------------------------------------------------------------------------
fn main() -> ExitCode {
    env_logger::init();

    let argv : Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let raw = match args::parse_args(&argv[..]) {
        Ok(raw) => raw,
        Err(error) if error.is_usage() => {
            debug!("{:?}", error);
            println!("{}", args::USAGE);
            return ExitCode::from(1);
        }
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::from(1);
        }
    };

    let calibration = match reference_calibration() {
        Ok(calibration) => calibration,
        Err(error) => {
            eprintln!("Calibration error {}", error);
            return ExitCode::from(1);
        }
    };

    let mut sensor = Bme280::new(calibration);
    let measurement = sensor.measure(raw.temperature, raw.pressure);
    debug!("{}", measurement);

    println!("Temperature: {:.6}", measurement.temperature);
    // labelled Humidity for compatibility with existing consumers, the value is pressure in Pa
    println!("Humidity: {:.6}", measurement.pressure);

    ExitCode::SUCCESS
}
