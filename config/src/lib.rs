use std::path::Path;
use toml::{Table, Value};
use log::{debug, info};

use bme280::{Calibration, TemperatureCalibration, PressureCalibration, HumidityCalibration};
use weather_err::{Result, WeatherError};

//----------------------------------------------------------------------------------------------------------------------------------
pub struct Config {
    config : Table
}


//----------------------------------------------------------------------------------------------------------------------------------
/// Fixed width integer a coefficient is stored in
trait Coefficient : Sized {
    const SIGNED : bool;
    fn from_i64(value : i64) -> Option<Self>;
}

macro_rules! coefficient {
    ($ty:ty, $word:ty, $signed:expr) => {
        impl Coefficient for $ty {
            const SIGNED : bool = $signed;
            fn from_i64(value : i64) -> Option<Self> {
                if let Ok(v) = <$ty>::try_from(value) {
                    return Some(v);
                }
                // signed coefficients may be written as the raw register word
                if Self::SIGNED {
                    return <$word>::try_from(value).ok().map(|w| w as $ty);
                }
                None
            }
        }
    };
}

coefficient!(u8, u8, false);
coefficient!(u16, u16, false);
coefficient!(i8, u8, true);
coefficient!(i16, u16, true);


//----------------------------------------------------------------------------------------------------------------------------------
impl Config {

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn parse(config_str : &str) -> Result<Self> {
        let config = config_str.parse()?;

        Ok(Self { config })
    }


    //------------------------------------------------------------------------------------------------------------------------------
    pub fn load(path : &Path) -> Result<Self> {
        info!("Reading calibration from {:?}", path);
        let config_str = std::fs::read_to_string(path)?;
        Self::parse(&config_str)
    }


    //------------------------------------------------------------------------------------------------------------------------------
    fn get_table(&self, name : &str, group : &str) -> Result<Option<&Table>> {
        let section = match self.config.get(name) {
            Some(Value::Table(section)) => section,
            Some(_) => return Err(WeatherError::config(format!("[{}] is not a table", name))),
            None => return Err(WeatherError::config(format!("No [{}] section in config", name)))
        };
        match section.get(group) {
            Some(Value::Table(table)) => Ok(Some(table)),
            Some(_) => Err(WeatherError::config(format!("[{}.{}] is not a table", name, group))),
            None => Ok(None)
        }
    }


    //------------------------------------------------------------------------------------------------------------------------------
    fn get_required_table(&self, name : &str, group : &str) -> Result<&Table> {
        self.get_table(name, group)?
            .ok_or_else(|| WeatherError::config(format!("No [{}.{}] specified in config", name, group)))
    }


    //------------------------------------------------------------------------------------------------------------------------------
    fn get_coefficient<T : Coefficient>(table : &Table, group : &str, key : &str) -> Result<T> {
        let value = match table.get(key) {
            Some(value) => value,
            None => return Err(WeatherError::config(format!("No {} specified for {}", key, group)))
        };
        let value = match value.as_integer() {
            Some(value) => value,
            None => return Err(WeatherError::config(format!("{}.{} is not an integer", group, key)))
        };
        T::from_i64(value)
            .ok_or_else(|| WeatherError::config(format!("{}.{} = {} is out of range", group, key, value)))
    }


    //------------------------------------------------------------------------------------------------------------------------------
    /// Coefficients from `[name.temperature]`, `[name.pressure]` and the optional `[name.humidity]`
    pub fn calibration(&self, name : &str) -> Result<Calibration> {
        let table = self.get_required_table(name, "temperature")?;
        let temperature = TemperatureCalibration {
            t1 : Self::get_coefficient(table, "temperature", "t1")?,
            t2 : Self::get_coefficient(table, "temperature", "t2")?,
            t3 : Self::get_coefficient(table, "temperature", "t3")?,
        };

        let table = self.get_required_table(name, "pressure")?;
        let pressure = PressureCalibration {
            p1 : Self::get_coefficient(table, "pressure", "p1")?,
            p2 : Self::get_coefficient(table, "pressure", "p2")?,
            p3 : Self::get_coefficient(table, "pressure", "p3")?,
            p4 : Self::get_coefficient(table, "pressure", "p4")?,
            p5 : Self::get_coefficient(table, "pressure", "p5")?,
            p6 : Self::get_coefficient(table, "pressure", "p6")?,
            p7 : Self::get_coefficient(table, "pressure", "p7")?,
            p8 : Self::get_coefficient(table, "pressure", "p8")?,
            p9 : Self::get_coefficient(table, "pressure", "p9")?,
        };

        let humidity = match self.get_table(name, "humidity")? {
            Some(table) => HumidityCalibration {
                h1 : Self::get_coefficient(table, "humidity", "h1")?,
                h2 : Self::get_coefficient(table, "humidity", "h2")?,
                h3 : Self::get_coefficient(table, "humidity", "h3")?,
                h4 : Self::get_coefficient(table, "humidity", "h4")?,
                h5 : Self::get_coefficient(table, "humidity", "h5")?,
                h6 : Self::get_coefficient(table, "humidity", "h6")?,
            },
            None => {
                debug!("No [{}.humidity], using placeholder coefficients", name);
                HumidityCalibration::PLACEHOLDER
            }
        };

        Ok(Calibration { temperature, pressure, humidity })
    }
}
