use std::fmt;
use std::io;
use std::num::ParseIntError;

//----------------------------------------------------------------------------------------------------------------------------------
/// Broad class of a failure, so callers can pick how to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Parse,
    Config,
    Io,
}

//----------------------------------------------------------------------------------------------------------------------------------
pub struct WeatherError {
    kind : ErrorKind,
    error : String
}

pub type Result<T> = std::result::Result<T, WeatherError>;


//----------------------------------------------------------------------------------------------------------------------------------
impl WeatherError {

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn new(kind : ErrorKind, error : impl Into<String>) -> Self {
        Self {
            kind,
            error : error.into()
        }
    }

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn argument(error : impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, error)
    }

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn config(error : impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, error)
    }

    //------------------------------------------------------------------------------------------------------------------------------
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    //------------------------------------------------------------------------------------------------------------------------------
    /// True for the errors a command line user caused by mistyping
    pub fn is_usage(&self) -> bool {
        matches!(self.kind, ErrorKind::Argument | ErrorKind::Parse)
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl From<io::Error> for WeatherError {
    fn from(error: io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("IO Error {}", error))
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl From<&str> for WeatherError {
    fn from(error : &str) -> Self {
        Self::argument(error)
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl From<toml::de::Error> for WeatherError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("TOML Error {}", error))
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl From<ParseIntError> for WeatherError {
    fn from(error: ParseIntError) -> Self {
        Self::new(ErrorKind::Parse, format!("Parse to Int Error {}", error))
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl fmt::Debug for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}


//----------------------------------------------------------------------------------------------------------------------------------
impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for WeatherError {}
