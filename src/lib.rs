//! # RCWL-1605 / RCWL-1005 Ultrasonic Distance Sensor Driver
//!
//! This crate provides a `no_std` driver for the cheap single-transducer
//! ultrasonic distance sensors RCWL-1605 (16 mm) and RCWL-1005 (10 mm) in their
//! I2C mode.
//!
//! The sensor has no "measurement ready" signal: after the ranging command is
//! sent, the controller has to wait long enough before reading the result. The
//! driver hides this behind three [`Mode`]s:
//!
//! - [`Mode::OneShot`]: [`read`](Rcwl1x05::read) triggers, blocks for the
//!   timeout and returns the distance.
//! - [`Mode::Triggered`]: the caller triggers with
//!   [`trigger`](Rcwl1x05::trigger), does something else for at least the
//!   timeout, then calls `read`.
//! - [`Mode::Continuous`]: the caller polls [`update`](Rcwl1x05::update) as
//!   often as it likes; the bus is touched at most once per timeout window and
//!   `read` returns the latest completed value.
//!
//! Every distance is corrected for the speed of sound at the configured air
//! temperature and can optionally pass a five-sample median filter.
//!
//! **Note**: the blind zone of the sensor is 250 mm. Values at or below that
//! cannot be trusted, and 0 means no data was available.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use rcwl1x05::{Mode, Rcwl1x05};
//!
//! let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! let delay = embedded_hal_mock::eh1::delay::NoopDelay;
//! // any `Fn() -> u32` returning monotonic milliseconds works as a clock
//! let clock = || 0u32;
//! let mut sensor = Rcwl1x05::new(i2c, delay, clock);
//!
//! sensor.init().unwrap();
//! sensor.set_temperature(25);
//! sensor.set_mode(Mode::Continuous);
//!
//! loop {
//!     if sensor.update() {
//!         println!("Distance: {} mm", sensor.read());
//!     }
//! }
//! ```
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod fmt; // <-- must be first module!

mod clock;
mod config;
mod filter;
mod temperature;

pub use clock::Now;
pub use config::{
    Config, DEFAULT_ADDRESS, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE, DEFAULT_REFERENCE_SPEED,
};
pub use filter::{median5, MedianFilter, WINDOW};
pub use temperature::{speed_of_sound, TemperatureModel, DEFAULT_TEMPERATURE};

#[cfg(not(feature = "async"))]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

/// Default wait between trigger and read in milliseconds, the minimum the
/// "datasheet" recommends.
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// Command byte that starts a ranging cycle.
const START_RANGING: u8 = 0x01;

/// Operating mode, selected with [`Rcwl1x05::set_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Blocking: `read()` triggers, waits for the timeout and reads.
    #[default]
    OneShot,
    /// Non-blocking: the caller triggers and waits, `read()` only reads.
    Triggered,
    /// Non-blocking: `update()` reads and re-triggers, `read()` returns the
    /// latest value.
    Continuous,
}

/// Mode together with the state only that mode needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OneShot,
    Triggered,
    Continuous { last_mm: u32 },
}

impl From<Mode> for State {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::OneShot => State::OneShot,
            Mode::Triggered => State::Triggered,
            Mode::Continuous => State::Continuous { last_mm: 0 },
        }
    }
}

impl From<State> for Mode {
    fn from(state: State) -> Self {
        match state {
            State::OneShot => Mode::OneShot,
            State::Triggered => Mode::Triggered,
            State::Continuous { .. } => Mode::Continuous,
        }
    }
}

/// Decodes a raw sensor sample into micrometers.
///
/// The sensor answers with three bytes, most significant first. Any other
/// number of bytes means no data was available and decodes to 0.
///
/// ```rust
/// use rcwl1x05::decode_raw;
///
/// assert_eq!(decode_raw(&[0x04, 0x93, 0xE0]), 300_000);
/// assert_eq!(decode_raw(&[0x04, 0x93]), 0);
/// ```
#[must_use]
pub fn decode_raw(bytes: &[u8]) -> u32 {
    match *bytes {
        [high, middle, low] => u32::from_be_bytes([0, high, middle, low]),
        _ => 0,
    }
}

/// RCWL-1X05 ultrasonic distance sensor driver.
///
/// The driver owns the I2C bus handle, a delay used in [`Mode::OneShot`] and a
/// millisecond clock used to pace [`Mode::Continuous`]. It is generic over
/// embedded-hal (or embedded-hal-async with the `async` feature)
/// implementations.
pub struct Rcwl1x05<I2C, D, C> {
    /// I2C interface for communication with the sensor
    i2c: I2C,
    /// Delay for the blocking wait in one-shot mode
    delay: D,
    /// Millisecond clock
    clock: C,
    /// Calibration of this sensor
    config: Config,
    /// Active mode and its bookkeeping
    state: State,
    temperature: TemperatureModel,
    timeout_ms: u32,
    /// Clock reading at the most recent trigger
    last_trigger_ms: u32,
    /// Present while filtering is enabled
    filter: Option<MedianFilter>,
}

impl<I2C, D, C> Rcwl1x05<I2C, D, C> {
    /// Creates a new driver for a stock sensor at address `0x57`.
    ///
    /// Nothing is sent on the bus; call [`init`](Self::init) before use.
    ///
    /// # Default Configuration
    ///
    /// - **Mode**: [`Mode::OneShot`]
    /// - **Temperature**: 20 °C
    /// - **Timeout**: 100 ms
    /// - **Filter**: off
    pub fn new(i2c: I2C, delay: D, clock: C) -> Self {
        Self::with_config(i2c, delay, clock, Config::default())
    }

    /// Creates a new driver with a custom [`Config`].
    ///
    /// ```rust,no_run
    /// use rcwl1x05::{Config, Rcwl1x05};
    ///
    /// let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    /// let delay = embedded_hal_mock::eh1::delay::NoopDelay;
    /// let config = Config::new().with_min_distance(300_000);
    /// let mut sensor = Rcwl1x05::with_config(i2c, delay, || 0u32, config);
    /// ```
    pub fn with_config(i2c: I2C, delay: D, clock: C, config: Config) -> Self {
        Self {
            i2c,
            delay,
            clock,
            config,
            state: State::OneShot,
            temperature: TemperatureModel::new(config.reference_speed),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            last_trigger_ms: 0,
            filter: None,
        }
    }

    /// Sets the ambient air temperature in °C used for speed-of-sound
    /// correction. The default is 20 °C.
    pub fn set_temperature(&mut self, celsius: i16) {
        self.temperature.set_temperature(celsius);
        debug!(
            "Temperature {} C, speed of sound {} mm/s",
            celsius,
            self.temperature.speed_of_sound()
        );
    }

    /// Sets the time in milliseconds after which a measurement is assumed to
    /// be complete.
    ///
    /// Depending on the mode, this is
    ///
    /// 1. how long [`read`](Self::read) blocks in [`Mode::OneShot`],
    /// 2. how long the caller must wait between [`trigger`](Self::trigger) and
    ///    `read` in [`Mode::Triggered`], and
    /// 3. the maximum staleness of a value in [`Mode::Continuous`].
    ///
    /// The default of 100 ms is the recommended minimum. Shorter timeouts
    /// (30-40 ms) work for ranges up to about 3 m; a timeout that is too short
    /// shows up as 0 readings with the filter off.
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
        debug!("Timeout {} ms", timeout_ms);
    }

    /// Enables or disables the five-sample median filter.
    ///
    /// With the filter on, every reading reports the median of the last five
    /// in-range raw samples; samples outside the configured
    /// `min_distance..=max_distance` are ignored. Turning the filter on seeds
    /// its history with alternating bounds. Turning it on while already on
    /// keeps the history; turning it off discards it.
    ///
    /// The filter adds lag proportional to the measurement rate, so it fits
    /// [`Mode::Continuous`] best.
    pub fn set_filter(&mut self, on: bool) {
        match (self.filter.is_some(), on) {
            (false, true) => {
                debug!("Median filter enabled");
                self.filter = Some(MedianFilter::new(
                    self.config.min_distance,
                    self.config.max_distance,
                ));
            }
            (true, false) => {
                debug!("Median filter disabled");
                self.filter = None;
            }
            _ => {}
        }
    }

    /// Active operating mode.
    pub fn mode(&self) -> Mode {
        self.state.into()
    }

    /// Configured ambient temperature in °C.
    pub fn temperature(&self) -> i16 {
        self.temperature.temperature()
    }

    /// Speed of sound in mm/s at the configured temperature.
    pub fn speed_of_sound(&self) -> u32 {
        self.temperature.speed_of_sound()
    }

    /// Configured timeout in milliseconds.
    pub fn timeout(&self) -> u32 {
        self.timeout_ms
    }

    /// Whether the median filter is enabled.
    pub fn is_filter_enabled(&self) -> bool {
        self.filter.is_some()
    }

    /// Calibration of this sensor.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the I2C bus, delay and clock.
    pub fn destroy(self) -> (I2C, D, C) {
        (self.i2c, self.delay, self.clock)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C, E, D, C> Rcwl1x05<I2C, D, C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    D: DelayNs,
    C: Now,
{
    /// Checks that the sensor answers on its address.
    ///
    /// The sensor is probed with an empty write. Afterwards one raw sample is
    /// read and discarded: without it the first real measurement reads 0.
    /// The bus must already be configured; nothing else is sent.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the sensor acknowledged the probe
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If the sensor did not acknowledge
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use rcwl1x05::Rcwl1x05;
    ///
    /// let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    /// let delay = embedded_hal_mock::eh1::delay::NoopDelay;
    /// let mut sensor = Rcwl1x05::new(i2c, delay, || 0u32);
    ///
    /// if sensor.init().is_err() {
    ///     println!("No sensor at 0x{:02X}", sensor.config().address);
    /// }
    /// ```
    pub async fn init(&mut self) -> Result<(), Error<E>> {
        info!("Probing sensor at {:#x}", self.config.address);
        let probe = self.i2c.write(self.config.address, &[]).await;
        let _ = self.read_raw().await;
        if probe.is_err() {
            warn!("Sensor at {:#x} did not respond", self.config.address);
        }
        probe?;
        Ok(())
    }

    /// Selects the operating mode. The default is [`Mode::OneShot`].
    ///
    /// Switching to [`Mode::Continuous`] (also from continuous) forgets the
    /// last value and starts a measurement right away. A failed trigger is
    /// only logged; [`update`](Self::update) re-triggers once the timeout has
    /// passed.
    pub async fn set_mode(&mut self, mode: Mode) {
        debug!("Mode {:?}", mode);
        self.state = State::from(mode);
        if mode == Mode::Continuous && self.trigger().await.is_err() {
            warn!("Failed to start continuous ranging");
        }
    }

    /// Starts a measurement.
    ///
    /// Meant for [`Mode::Triggered`]. The timeout window starts now even if
    /// the command could not be sent.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the ranging command was acknowledged
    ///
    /// # Errors
    ///
    /// * `Err(Error::I2cError(E))` - If there was an I2C communication error
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use rcwl1x05::{Mode, Rcwl1x05};
    ///
    /// let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    /// let delay = embedded_hal_mock::eh1::delay::NoopDelay;
    /// let mut sensor = Rcwl1x05::new(i2c, delay, || 0u32);
    ///
    /// sensor.init().unwrap();
    /// sensor.set_mode(Mode::Triggered);
    /// sensor.trigger().unwrap();
    /// // do something else for at least `sensor.timeout()` milliseconds
    /// println!("Distance: {} mm", sensor.read());
    /// ```
    pub async fn trigger(&mut self) -> Result<(), Error<E>> {
        self.last_trigger_ms = self.clock.now_millis();
        self.i2c
            .write(self.config.address, &[START_RANGING])
            .await?;
        Ok(())
    }

    /// Returns a distance in millimeters, corrected for temperature and
    /// filtered if the filter is on.
    ///
    /// - [`Mode::OneShot`]: triggers, blocks for the timeout, then reads.
    /// - [`Mode::Triggered`]: reads immediately; the caller must have
    ///   triggered and waited.
    /// - [`Mode::Continuous`]: returns the value captured by the last
    ///   successful [`update`](Self::update) without touching the bus.
    ///
    /// 0 means no data was available: a missing trigger, a timeout that is
    /// too short or a bus error. Values of 250 mm or less are inside the blind
    /// zone and cannot be trusted.
    pub async fn read(&mut self) -> u32 {
        match self.state {
            State::OneShot => {
                if self.trigger().await.is_err() {
                    warn!("Failed to trigger one-shot measurement");
                }
                self.delay.delay_ms(self.timeout_ms).await;
                self.read_corrected().await
            }
            State::Triggered => self.read_corrected().await,
            State::Continuous { last_mm } => last_mm,
        }
    }

    /// Collects a finished measurement and starts the next one.
    ///
    /// Meant for [`Mode::Continuous`]; call it as often as possible. Once more
    /// than the timeout has passed since the last trigger the result is read,
    /// cached for [`read`](Self::read) and a new measurement is started. Until
    /// then nothing is sent on the bus. In the other modes this does nothing.
    ///
    /// # Returns
    ///
    /// `true` if a new value was captured by this call.
    pub async fn update(&mut self) -> bool {
        let State::Continuous { .. } = self.state else {
            trace!("update() ignored outside continuous mode");
            return false;
        };
        let elapsed = self
            .clock
            .now_millis()
            .wrapping_sub(self.last_trigger_ms);
        if elapsed <= self.timeout_ms {
            return false;
        }
        let last_mm = self.read_corrected().await;
        self.state = State::Continuous { last_mm };
        if self.trigger().await.is_err() {
            warn!("Failed to re-trigger continuous ranging");
        }
        true
    }

    /// Reads one raw sample in micrometers, without filtering or temperature
    /// correction.
    ///
    /// A failed or short read yields 0.
    pub async fn read_raw(&mut self) -> u32 {
        let mut buffer = [0u8; 3];
        match self.i2c.read(self.config.address, &mut buffer).await {
            Ok(()) => decode_raw(&buffer),
            Err(_) => {
                debug!("Raw read failed, reporting 0");
                0
            }
        }
    }

    async fn read_corrected(&mut self) -> u32 {
        let raw = self.read_raw().await;
        let micrometers = match self.filter.as_mut() {
            Some(filter) => filter.filter(raw),
            None => raw,
        };
        self.temperature.correct(micrometers / 1000)
    }
}

/// Error type for RCWL-1X05 sensor operations.
///
/// The sensor reports nothing beyond whether it acknowledged a transfer, so
/// the only error is the one from the bus.
///
/// # Examples
///
/// ```rust,no_run
/// use rcwl1x05::Error;
///
/// let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// let delay = embedded_hal_mock::eh1::delay::NoopDelay;
/// let mut sensor = rcwl1x05::Rcwl1x05::new(i2c, delay, || 0u32);
///
/// match sensor.trigger() {
///     Ok(()) => println!("Measurement started"),
///     Err(Error::I2cError(e)) => println!("I2C communication error: {:?}", e),
/// }
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: core::fmt::Debug> {
    /// I2C communication error from the underlying hardware
    I2cError(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl<E: core::fmt::Debug> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2cError(error)
    }
}
