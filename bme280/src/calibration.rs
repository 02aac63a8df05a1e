//!
//! Factory calibration coefficients, grouped by measurand
//!

/// Number of bytes in the 0x88..=0xA1 calibration block
pub const TP_BLOCK_LEN : usize = 26;

/// Number of bytes in the 0xE1..=0xE7 calibration block
pub const H_BLOCK_LEN : usize = 7;


//----------------------------------------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureCalibration {
    pub t1 : u16,
    pub t2 : i16,
    pub t3 : i16,
}


//----------------------------------------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureCalibration {
    pub p1 : u16,
    pub p2 : i16,
    pub p3 : i16,
    pub p4 : i16,
    pub p5 : i16,
    pub p6 : i16,
    pub p7 : i16,
    pub p8 : i16,
    pub p9 : i16,
}


//----------------------------------------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumidityCalibration {
    pub h1 : u8,
    pub h2 : i16,
    pub h3 : u8,
    pub h4 : i16,
    pub h5 : i16,
    pub h6 : i8,
}


//----------------------------------------------------------------------------------------------------------------------------------
impl HumidityCalibration {

    /// All zero. Stands in for a device whose humidity trimming has not been read,
    /// humidity computed from it is always 0 %RH and carries no meaning.
    pub const PLACEHOLDER : Self = Self { h1 : 0, h2 : 0, h3 : 0, h4 : 0, h5 : 0, h6 : 0 };

    pub fn is_placeholder(&self) -> bool {
        *self == Self::PLACEHOLDER
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
/// The full coefficient set of one device. Never changes once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub temperature : TemperatureCalibration,
    pub pressure : PressureCalibration,
    pub humidity : HumidityCalibration,
}


//----------------------------------------------------------------------------------------------------------------------------------
impl Calibration {

    /// Coefficients of the reference device. Humidity was never read out of it.
    pub const REFERENCE : Self = Self {
        temperature : TemperatureCalibration {
            t1 : 0x6f8c,
            t2 : 0x6976,
            t3 : 0x0032,
        },
        pressure : PressureCalibration {
            p1 : 0x8e38,
            p2 : 0xd70e_u16 as i16,
            p3 : 0x0bd0,
            p4 : 0x18fa,
            p5 : 0x001f,
            p6 : 0xfff9_u16 as i16,
            p7 : 0x26ac,
            p8 : 0xd80a_u16 as i16,
            p9 : 0x10bd,
        },
        humidity : HumidityCalibration::PLACEHOLDER,
    };


    //------------------------------------------------------------------------------------------------------------------------------
    /// Decode the two calibration register blocks as dumped from the device,
    /// `tp` being 0x88..=0xA1 and `h` being 0xE1..=0xE7.
    pub fn from_registers(tp : &[u8; TP_BLOCK_LEN], h : &[u8; H_BLOCK_LEN]) -> Self {
        // little-endian words
        let u16_at = |n : usize| u16::from_le_bytes([tp[n], tp[n + 1]]);
        let i16_at = |n : usize| i16::from_le_bytes([tp[n], tp[n + 1]]);

        let temperature = TemperatureCalibration {
            t1 : u16_at(0),
            t2 : i16_at(2),
            t3 : i16_at(4),
        };

        let pressure = PressureCalibration {
            p1 : u16_at(6),
            p2 : i16_at(8),
            p3 : i16_at(10),
            p4 : i16_at(12),
            p5 : i16_at(14),
            p6 : i16_at(16),
            p7 : i16_at(18),
            p8 : i16_at(20),
            p9 : i16_at(22),
        };

        // 0xA0 is unused, H1 sits alone at 0xA1.
        // H4 and H5 are 12 bit values sharing the nibbles of 0xE5.
        let humidity = HumidityCalibration {
            h1 : tp[25],
            h2 : i16::from_le_bytes([h[0], h[1]]),
            h3 : h[2],
            h4 : ((h[3] as i8 as i16) << 4) | ((h[4] & 0x0F) as i16),
            h5 : ((h[5] as i8 as i16) << 4) | ((h[4] >> 4) as i16),
            h6 : h[6] as i8,
        };

        Self { temperature, pressure, humidity }
    }
}
