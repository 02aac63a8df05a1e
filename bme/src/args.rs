use weather_err::{ErrorKind, Result, WeatherError};

pub const USAGE : &str = "invalid parameters. use \"bme -t <adc_T> -p <adc_P>";


//----------------------------------------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawArgs {
    pub temperature : i32,
    pub pressure : i32,
}


//----------------------------------------------------------------------------------------------------------------------------------
/// Integer in C literal notation: decimal, 0x hex or leading 0 octal,
/// truncated to 32 bits once it has been read as a 64 bit value
pub fn parse_int(text : &str) -> Result<i32> {
    // C isspace, which unlike is_ascii_whitespace includes vertical tab
    let trimmed = text.trim_start_matches(|c : char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed)
    };

    let (radix, digits) = if let Some(hex) = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix would take a second sign
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(WeatherError::new(ErrorKind::Parse, format!("Not an integer {:?}", text)));
    }

    let magnitude = i128::from_str_radix(digits, radix)?;
    let value = if negative { -magnitude } else { magnitude };
    let value = i64::try_from(value)
        .map_err(|_| WeatherError::new(ErrorKind::Parse, format!("Out of range {:?}", text)))?;

    // same as a C cast, keeps the low 32 bits
    Ok(value as i32)
}


//----------------------------------------------------------------------------------------------------------------------------------
fn expect_flag(arg : &str, flag : &str) -> Result<()> {
    if arg.eq_ignore_ascii_case(flag) {
        Ok(())
    } else {
        Err(WeatherError::argument(format!("Expected {} but got {:?}", flag, arg)))
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
/// Arguments after the program name, exactly `-t <raw_T> -p <raw_P>`
pub fn parse_args<S : AsRef<str>>(args : &[S]) -> Result<RawArgs> {
    if args.len() != 4 {
        return Err(WeatherError::argument(format!("Expected 4 arguments, got {}", args.len())));
    }

    expect_flag(args[0].as_ref(), "-t")?;
    let temperature = parse_int(args[1].as_ref())?;

    expect_flag(args[2].as_ref(), "-p")?;
    let pressure = parse_int(args[3].as_ref())?;

    Ok(RawArgs { temperature, pressure })
}
