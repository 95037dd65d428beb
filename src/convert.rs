//! Frequency, amplitude and phase word conversions

// std's inherent f32 methods shadow these in test builds
#[allow(unused_imports)]
use micromath::F32Ext;

/// Largest 14-bit amplitude scale factor
pub const ASF_MAX: u16 = 0x3FFF;

/// Attenuation at which the amplitude scale factor reaches zero
pub const ASF_FLOOR_DB: i16 = -85;

/// Offset of the device's dB-to-linear amplitude curve
const ASF_DB_OFFSET: f32 = 84.288;

/// Converts a frequency to a 32-bit frequency tuning word,
/// `round(freq_hz * 2^32 / sysclk_hz)`.
///
/// Zero in either argument gives zero. Frequencies at or above the system clock
/// saturate at `0xFFFF_FFFF`.
pub fn frequency_to_ftw(freq_hz: u64, sysclk_hz: u64) -> u32 {
    if freq_hz == 0 || sysclk_hz == 0 {
        return 0;
    }
    if freq_hz >= sysclk_hz {
        return u32::MAX;
    }
    let sysclk = sysclk_hz as u128;
    let ftw = (((freq_hz as u128) << 32) + sysclk / 2) / sysclk;
    ftw.min(u32::MAX as u128) as u32
}

/// Output frequency in Hz produced by `ftw`, rounded to the nearest Hz
pub fn ftw_to_frequency(ftw: u32, sysclk_hz: u64) -> u64 {
    let numerator = ftw as u128 * sysclk_hz as u128 + (1u128 << 31);
    (numerator >> 32) as u64
}

/// Converts an attenuation in dB (0 is full scale) to a 14-bit amplitude
/// scale factor
pub fn amplitude_to_asf(amplitude_db: i16) -> u16 {
    if amplitude_db <= ASF_FLOOR_DB {
        return 0;
    }
    if amplitude_db >= 0 {
        return ASF_MAX;
    }
    let exponent = (amplitude_db as f32 + ASF_DB_OFFSET) / 20.0;
    let asf = 10f32.powf(exponent).round();
    if asf <= 0.0 {
        0
    } else if asf >= ASF_MAX as f32 {
        ASF_MAX
    } else {
        asf as u16
    }
}

/// Converts a phase offset in degrees to a 16-bit phase offset word
pub fn phase_to_pow(degrees: f32) -> u16 {
    let turns = degrees / 360.0;
    let fraction = turns - turns.floor();
    ((fraction * 65536.0).round() as u32 & 0xFFFF) as u16
}

// Tests
