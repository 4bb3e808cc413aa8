//! Speed-of-sound compensation.
//!
//! The sensor converts echo time into distance assuming a fixed speed of
//! sound. Air at a different temperature carries sound at a different speed,
//! so every reported distance is rescaled to the speed implied by the
//! configured ambient temperature.

/// Ambient temperature assumed until told otherwise (°C).
pub const DEFAULT_TEMPERATURE: i16 = 20;

/// Speed of sound in dry air at 0 °C (mm/s).
const SPEED_AT_ZERO_CELSIUS: i32 = 331_500;

/// Linear increase of the speed of sound per °C (mm/s).
const SPEED_PER_DEGREE: i32 = 600;

/// Speed of sound in mm/s at `celsius`, using the linear approximation
/// `331.5 m/s + 0.6 m/s/°C`. Saturates at 0 far below any real temperature.
#[must_use]
pub fn speed_of_sound(celsius: i16) -> u32 {
    let speed = SPEED_AT_ZERO_CELSIUS + SPEED_PER_DEGREE * i32::from(celsius);
    u32::try_from(speed).unwrap_or(0)
}

/// Temperature state of one sensor together with its derived speed of sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureModel {
    temperature: i16,
    speed_of_sound: u32,
    reference_speed: u32,
}

impl TemperatureModel {
    /// Model at [`DEFAULT_TEMPERATURE`] for a sensor whose firmware assumes
    /// `reference_speed` mm/s.
    #[must_use]
    pub fn new(reference_speed: u32) -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            speed_of_sound: speed_of_sound(DEFAULT_TEMPERATURE),
            reference_speed,
        }
    }

    /// Stores `celsius` and recomputes the speed of sound.
    pub fn set_temperature(&mut self, celsius: i16) {
        self.temperature = celsius;
        self.speed_of_sound = speed_of_sound(celsius);
    }

    /// Configured ambient temperature (°C).
    #[must_use]
    pub fn temperature(&self) -> i16 {
        self.temperature
    }

    /// Speed of sound at the configured temperature (mm/s).
    #[must_use]
    pub fn speed_of_sound(&self) -> u32 {
        self.speed_of_sound
    }

    /// Rescales `distance_mm`, measured at the reference speed, to the speed
    /// of sound at the configured temperature.
    ///
    /// The product is formed in 64 bits before dividing, so the result is the
    /// exact floor of `distance * speed / reference` for every `u32` input.
    #[must_use]
    pub fn correct(&self, distance_mm: u32) -> u32 {
        if self.reference_speed == 0 {
            return distance_mm;
        }
        let scaled = u64::from(distance_mm) * u64::from(self.speed_of_sound)
            / u64::from(self.reference_speed);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REFERENCE_SPEED;

    #[test]
    fn speed_follows_linear_approximation() {
        assert_eq!(speed_of_sound(0), 331_500);
        assert_eq!(speed_of_sound(20), 343_500);
        assert_eq!(speed_of_sound(30), 349_500);
        assert_eq!(speed_of_sound(-10), 325_500);
        assert_eq!(speed_of_sound(i16::MIN), 0);
    }

    #[test]
    fn defaults_to_twenty_degrees() {
        let model = TemperatureModel::new(DEFAULT_REFERENCE_SPEED);
        assert_eq!(model.temperature(), 20);
        assert_eq!(model.speed_of_sound(), 343_500);
    }

    #[test]
    fn identity_at_reference_speed() {
        let model = TemperatureModel::new(DEFAULT_REFERENCE_SPEED);
        for distance in [0, 1, 250, 300, 1234, 4999, u32::MAX] {
            assert_eq!(model.correct(distance), distance);
        }
    }

    #[test]
    fn warmer_air_stretches_distance() {
        let mut model = TemperatureModel::new(DEFAULT_REFERENCE_SPEED);
        model.set_temperature(30);
        assert_eq!(model.speed_of_sound(), 349_500);
        assert_eq!(model.correct(300), 305);
    }

    #[test]
    fn colder_air_shrinks_distance() {
        let mut model = TemperatureModel::new(DEFAULT_REFERENCE_SPEED);
        model.set_temperature(0);
        // 1000 * 331500 / 343500 = 965.06
        assert_eq!(model.correct(1000), 965);
    }

    #[test]
    fn deviation_scales_linearly_with_speed_delta() {
        let mut model = TemperatureModel::new(DEFAULT_REFERENCE_SPEED);
        model.set_temperature(30);
        let single = model.correct(3435) - 3435;
        model.set_temperature(40);
        let double = model.correct(3435) - 3435;
        assert_eq!(single, 60);
        assert_eq!(double, 2 * single);
    }

    #[test]
    fn custom_reference_speed() {
        let mut model = TemperatureModel::new(340_000);
        model.set_temperature(30);
        // 340 * 349500 / 340000 = 349.5
        assert_eq!(model.correct(340), 349);
    }
}
