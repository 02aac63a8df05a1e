//!
//! BME280 compensation, turning raw ADC counts into physical units using the
//! double precision formulas of the Bosch datasheet
//!

use std::fmt;
use log::{debug, warn};

mod calibration;

pub use calibration::{Calibration, TemperatureCalibration, PressureCalibration, HumidityCalibration};
pub use calibration::{TP_BLOCK_LEN, H_BLOCK_LEN};


//----------------------------------------------------------------------------------------------------------------------------------
/// One temperature and pressure pair, as produced by `Bme280::measure`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature : f64,
    pub pressure : f64,
}


//----------------------------------------------------------------------------------------------------------------------------------
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}C {:.2}Pa", self.temperature, self.pressure)
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
/// Compensation engine for a single sensor session.
///
/// Pressure and humidity depend on the fine temperature left behind by the
/// last `compensate_temperature` call, so read temperature first. Sessions
/// must not share an engine, clone one per session instead.
#[derive(Debug, Clone)]
pub struct Bme280 {
    calibration : Calibration,

    // last known t_fine, only compensate_temperature writes it
    fine_temperature : i32,
    fine_temperature_set : bool,
}


//----------------------------------------------------------------------------------------------------------------------------------
impl Bme280 {

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn new(calibration : Calibration) -> Self {
        Self {
            calibration,
            fine_temperature : 0,
            fine_temperature_set : false,
        }
    }


    //------------------------------------------------------------------------------------------------------------------------------
    pub fn reference() -> Self {
        Self::new(Calibration::REFERENCE)
    }


    //------------------------------------------------------------------------------------------------------------------------------
    #[cfg(test)]
    pub(crate) fn with_fine_temperature(calibration : Calibration, fine_temperature : i32) -> Self {
        Self {
            calibration,
            fine_temperature,
            fine_temperature_set : true,
        }
    }


    //------------------------------------------------------------------------------------------------------------------------------
    pub fn fine_temperature(&self) -> i32 {
        self.fine_temperature
    }


    //------------------------------------------------------------------------------------------------------------------------------
    /// Temperature in DegC. Also refreshes the fine temperature.
    pub fn compensate_temperature(&mut self, raw : i32) -> f64 {
        let calib = &self.calibration.temperature;
        let adc = raw as f64;
        let t1 = calib.t1 as f64;

        let var1 = (adc / 16384.0 - t1 / 1024.0) * (calib.t2 as f64);
        let var2 = (adc / 131072.0 - t1 / 8192.0) * (adc / 131072.0 - t1 / 8192.0) * (calib.t3 as f64);

        // truncates toward zero, saturating outside the i32 range
        let fine = var1 + var2;
        if fine >= 2147483648.0 || fine <= -2147483649.0 {
            warn!("temp_adc {} gives t_fine {} outside i32, saturated", raw, fine);
        }
        self.fine_temperature = fine as i32;
        self.fine_temperature_set = true;

        let temp = fine / 5120.0;
        debug!("temp_adc {} t_fine {} => {} C", raw, self.fine_temperature, temp);
        temp
    }


    //------------------------------------------------------------------------------------------------------------------------------
    /// Pressure in Pa, or exactly 0.0 when the coefficients would divide by zero.
    ///
    /// Without a prior temperature reading the initial fine temperature of 0 is used.
    pub fn compensate_pressure(&self, raw : i32) -> f64 {
        if !self.fine_temperature_set {
            warn!("Pressure compensated before any temperature reading");
        }

        let calib = &self.calibration.pressure;

        let mut var1 = (self.fine_temperature as f64) / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * (calib.p6 as f64) / 32768.0;
        var2 = var2 + var1 * (calib.p5 as f64) * 2.0;
        var2 = (var2 / 4.0) + (calib.p4 as f64) * 65536.0;
        var1 = ((calib.p3 as f64) * var1 * var1 / 524288.0 + (calib.p2 as f64) * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * (calib.p1 as f64);
        if var1 == 0.0 {
            debug!("press_adc {} => var1 is zero", raw);
            return 0.0;
        }

        let mut pressure = 1048576.0 - (raw as f64);
        pressure = (pressure - (var2 / 4096.0)) * 6250.0 / var1;
        var1 = (calib.p9 as f64) * pressure * pressure / 2147483648.0;
        var2 = pressure * (calib.p8 as f64) / 32768.0;
        pressure = pressure + (var1 + var2 + (calib.p7 as f64)) / 16.0;

        debug!("press_adc {} => {} Pa", raw, pressure);
        pressure
    }


    //------------------------------------------------------------------------------------------------------------------------------
    /// Relative humidity in %, clamped to 0..=100.
    ///
    /// Nothing meaningful comes out of this while the humidity coefficients
    /// are the placeholder.
    pub fn compensate_humidity(&self, raw : i32) -> f64 {
        let calib = &self.calibration.humidity;
        if calib.is_placeholder() {
            warn!("Humidity compensated with placeholder coefficients");
        }

        let mut humidity = (self.fine_temperature as f64) - 76800.0;
        humidity = ((raw as f64) - ((calib.h4 as f64) * 64.0 + (calib.h5 as f64) / 16384.0 * humidity))
            * ((calib.h2 as f64) / 65536.0
                * (1.0 + (calib.h6 as f64) / 67108864.0 * humidity
                    * (1.0 + (calib.h3 as f64) / 67108864.0 * humidity)));
        humidity = humidity * (1.0 - (calib.h1 as f64) * humidity / 524288.0);

        let humidity = humidity.clamp(0.0, 100.0);
        debug!("humd_adc {} => {} %", raw, humidity);
        humidity
    }


    //------------------------------------------------------------------------------------------------------------------------------
    /// Temperature then pressure, in the order the fine temperature requires
    pub fn measure(&mut self, raw_temp : i32, raw_press : i32) -> Measurement {
        let temperature = self.compensate_temperature(raw_temp);
        let pressure = self.compensate_pressure(raw_press);
        Measurement { temperature, pressure }
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RAW_TEMP : i32 = 519888;
    const RAW_PRESS : i32 = 328472;

    fn typical_humidity() -> Calibration {
        Calibration {
            humidity : HumidityCalibration { h1 : 75, h2 : 362, h3 : 0, h4 : 313, h5 : 50, h6 : 30 },
            ..Calibration::REFERENCE
        }
    }

    #[test]
    fn temperature_baseline() {
        let mut sensor = Bme280::reference();
        let temp = sensor.compensate_temperature(RAW_TEMP);
        assert_eq!(temp, 20.27567892796942);
        assert_eq!(sensor.fine_temperature(), 103811);
    }

    #[test]
    fn temperature_is_deterministic() {
        let mut sensor = Bme280::reference();
        let first = sensor.compensate_temperature(RAW_TEMP);
        let second = sensor.compensate_temperature(RAW_TEMP);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(Bme280::reference().compensate_temperature(RAW_TEMP).to_bits(), first.to_bits());
    }

    #[test]
    fn fine_temperature_truncates_toward_zero() {
        let mut sensor = Bme280::reference();
        let temp = sensor.compensate_temperature(0);
        assert_relative_eq!(temp, -146.92931227376684, max_relative = 1e-12);
        // -752278.07... truncates up, not down
        assert_eq!(sensor.fine_temperature(), -752278);
        assert_eq!(sensor.fine_temperature(), (temp * 5120.0) as i32);
    }

    #[test]
    fn fine_temperature_saturates_for_extreme_raw() {
        let mut sensor = Bme280::reference();
        let mut pressures = Vec::new();
        for raw in [i32::MAX, i32::MIN, 1_000_000_000] {
            let temp = sensor.compensate_temperature(raw);
            assert!(temp * 5120.0 > i32::MAX as f64, "{} from raw {}", temp, raw);
            assert_eq!(sensor.fine_temperature(), i32::MAX);
            pressures.push(sensor.compensate_pressure(RAW_PRESS));
        }
        // saturated state no longer tells the inputs apart
        assert_eq!(pressures[0], pressures[1]);
        assert_eq!(pressures[0], pressures[2]);
        assert_relative_eq!(pressures[0], 7170.6194, max_relative = 1e-6);

        let temp = sensor.compensate_temperature(RAW_TEMP);
        assert_eq!(temp, 20.27567892796942);
        assert_eq!(sensor.fine_temperature(), 103811);
    }

    #[test]
    fn pressure_baseline() {
        let mut sensor = Bme280::reference();
        sensor.compensate_temperature(RAW_TEMP);
        let pressure = sensor.compensate_pressure(RAW_PRESS);
        assert_eq!(pressure, 105227.89117741618);
        assert_relative_eq!(pressure / 100.0, 1052.28, max_relative = 1e-5);
    }

    #[test]
    fn pressure_without_temperature_uses_zero_fine_temperature() {
        let sensor = Bme280::reference();
        assert_eq!(sensor.fine_temperature(), 0);
        assert_eq!(sensor.compensate_pressure(RAW_PRESS), 101909.08846468177);
    }

    #[test]
    fn pressure_is_idempotent() {
        let mut sensor = Bme280::reference();
        sensor.compensate_temperature(RAW_TEMP);
        let first = sensor.compensate_pressure(RAW_PRESS);
        let second = sensor.compensate_pressure(RAW_PRESS);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(sensor.fine_temperature(), 103811);
    }

    #[test]
    fn pressure_follows_latest_temperature() {
        let mut sensor = Bme280::reference();
        sensor.compensate_temperature(RAW_TEMP);
        let warm = sensor.compensate_pressure(RAW_PRESS);
        sensor.compensate_temperature(415148);
        let cold = sensor.compensate_pressure(RAW_PRESS);
        assert_ne!(warm, cold);
        assert_relative_eq!(cold, 99737.05502254379, max_relative = 1e-12);
    }

    #[test]
    fn pressure_zero_divisor_returns_zero() {
        let mut calib = Calibration::REFERENCE;
        calib.pressure.p1 = 0;
        let mut sensor = Bme280::new(calib);
        sensor.compensate_temperature(RAW_TEMP);
        let pressure = sensor.compensate_pressure(RAW_PRESS);
        assert_eq!(pressure.to_bits(), 0.0_f64.to_bits());

        let sensor = Bme280::with_fine_temperature(calib, i32::MIN);
        assert_eq!(sensor.compensate_pressure(i32::MAX).to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn humidity_placeholder_is_zero() {
        let sensor = Bme280::with_fine_temperature(Calibration::REFERENCE, 103811);
        assert_eq!(sensor.compensate_humidity(30000), 0.0);
    }

    #[test]
    fn humidity_typical_coefficients() {
        let sensor = Bme280::with_fine_temperature(typical_humidity(), 103811);
        assert_relative_eq!(sensor.compensate_humidity(30000), 54.827185088319695, max_relative = 1e-12);
        assert_eq!(sensor.compensate_humidity(0), 0.0);
        assert_eq!(sensor.compensate_humidity(65535), 100.0);
    }

    #[test]
    fn humidity_always_clamped() {
        let raws = [i32::MIN, -1, 0, 1, 20000, 30000, 65535, i32::MAX];
        let fines = [i32::MIN, -752278, 0, 76800, 103811, i32::MAX];
        for calib in [Calibration::REFERENCE, typical_humidity()] {
            for fine in fines {
                let sensor = Bme280::with_fine_temperature(calib, fine);
                for raw in raws {
                    let humidity = sensor.compensate_humidity(raw);
                    assert!((0.0..=100.0).contains(&humidity), "{} from raw {} fine {}", humidity, raw, fine);
                }
            }
        }
    }

    #[test]
    fn measure_orders_temperature_first() {
        let mut sensor = Bme280::reference();
        let measurement = sensor.measure(RAW_TEMP, RAW_PRESS);
        assert_eq!(measurement.temperature, 20.27567892796942);
        assert_eq!(measurement.pressure, 105227.89117741618);
        assert_eq!(measurement.to_string(), "20.28C 105227.89Pa");
    }

    #[test]
    fn sessions_are_independent() {
        let mut indoor = Bme280::reference();
        let mut outdoor = indoor.clone();
        indoor.compensate_temperature(RAW_TEMP);
        outdoor.compensate_temperature(415148);
        assert_eq!(indoor.fine_temperature(), 103811);
        assert_eq!(outdoor.fine_temperature(), -68788);
        assert_eq!(indoor.compensate_pressure(RAW_PRESS), 105227.89117741618);
    }
}
