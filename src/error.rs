use core::fmt;

use crate::transport::TransportError;

/// Reason a clock context was rejected
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Reference clock is zero or above the 1 GHz system clock rating in PLL bypass
    ReferenceOutOfRange,
    /// Reference clock can't be brought into the 3.2 to 60 MHz PLL input window,
    /// even through the divide-by-two input divider
    PllInputOutOfRange,
    /// PLL multiplier outside 12..=127
    MultiplierOutOfRange,
    /// The resulting system clock falls in no VCO band
    NoVcoBand,
    /// The resulting system clock exceeds 1 GHz and overclocking is not allowed
    Overclocked,
}

/// Error type returned by every driver operation
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Malformed caller input: zero duration, reversed range, bad lengths...
    InvalidParameter,
    /// Clock context constraints can't be satisfied
    Configuration(ConfigError),
    /// The transport reported a failure
    Hardware(TransportError),
    /// The transport timed out
    Timeout,
    /// The driver (or the transport) has not been initialized
    NotInitialized,
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => Error::Timeout,
            TransportError::NotInitialized => Error::NotInitialized,
            TransportError::InvalidArgument => Error::InvalidParameter,
            TransportError::Generic | TransportError::InvalidPin => Error::Hardware(error),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Error::Configuration(error)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ConfigError::ReferenceOutOfRange => "reference clock out of range",
            ConfigError::PllInputOutOfRange => "PLL input out of the 3.2-60 MHz window",
            ConfigError::MultiplierOutOfRange => "PLL multiplier must be 12..=127",
            ConfigError::NoVcoBand => "system clock outside every VCO band",
            ConfigError::Overclocked => "system clock above 1 GHz without overclock",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidParameter => write!(f, "invalid parameter"),
            Error::Configuration(error) => write!(f, "configuration error: {}", error),
            Error::Hardware(error) => write!(f, "hardware error: {:?}", error),
            Error::Timeout => write!(f, "timeout"),
            Error::NotInitialized => write!(f, "not initialized"),
        }
    }
}
