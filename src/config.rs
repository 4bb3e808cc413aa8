//! Per-instance calibration of the driver.

/// Default 7-bit I2C address of the RCWL-1X05. The sensor family only ships
/// with this address.
pub const DEFAULT_ADDRESS: u8 = 0x57;

/// Speed of sound in mm/s the sensor firmware assumes when it converts echo
/// time into the distance it reports. The "datasheet" does not say which
/// temperature this corresponds to; 343.5 m/s matches roughly 20 °C.
pub const DEFAULT_REFERENCE_SPEED: u32 = 343_500;

/// Smallest distance in micrometers the median filter accepts (25 cm, the
/// edge of the blind zone).
pub const DEFAULT_MIN_DISTANCE: u32 = 250_000;

/// Largest distance in micrometers the median filter accepts (5 m).
pub const DEFAULT_MAX_DISTANCE: u32 = 5_000_000;

/// Immutable calibration for one sensor instance.
///
/// Several sensors with different calibration can be driven side by side, each
/// driver keeps its own copy.
///
/// ```rust
/// use rcwl1x05::Config;
///
/// let config = Config::new()
///     .with_min_distance(300_000)
///     .with_max_distance(3_000_000);
/// assert_eq!(config.address, 0x57);
/// assert_eq!(config.min_distance, 300_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I2C address of the sensor
    pub address: u8,
    /// Speed of sound (mm/s) the sensor firmware uses for its raw distance
    pub reference_speed: u32,
    /// Lower bound (µm) of samples entered into the median filter
    pub min_distance: u32,
    /// Upper bound (µm) of samples entered into the median filter
    pub max_distance: u32,
}

impl Config {
    /// Configuration matching the stock sensor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            reference_speed: DEFAULT_REFERENCE_SPEED,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Use a different I2C address.
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Use a different firmware reference speed of sound (mm/s).
    #[must_use]
    pub const fn with_reference_speed(mut self, reference_speed: u32) -> Self {
        self.reference_speed = reference_speed;
        self
    }

    /// Use a different lower filter bound (µm).
    #[must_use]
    pub const fn with_min_distance(mut self, min_distance: u32) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Use a different upper filter bound (µm).
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = max_distance;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_stock_sensor() {
        let config = Config::default();
        assert_eq!(config.address, 0x57);
        assert_eq!(config.reference_speed, 343_500);
        assert_eq!(config.min_distance, 250_000);
        assert_eq!(config.max_distance, 5_000_000);
    }

    #[test]
    fn builders_only_touch_their_field() {
        let config = Config::new().with_address(0x58).with_reference_speed(340_000);
        assert_eq!(config.address, 0x58);
        assert_eq!(config.reference_speed, 340_000);
        assert_eq!(config.min_distance, DEFAULT_MIN_DISTANCE);
        assert_eq!(config.max_distance, DEFAULT_MAX_DISTANCE);
    }
}
