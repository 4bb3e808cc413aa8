/// Monotonic millisecond clock.
///
/// The counter is allowed to wrap; the driver only ever looks at differences
/// computed with wrapping subtraction. Any `Fn() -> u32` is a clock, so an
/// embassy-based application can pass
/// `|| embassy_time::Instant::now().as_millis() as u32`.
pub trait Now {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_millis(&self) -> u32;
}

impl<F> Now for F
where
    F: Fn() -> u32,
{
    fn now_millis(&self) -> u32 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::Now;

    #[test]
    fn closures_are_clocks() {
        let clock = || 42u32;
        assert_eq!(clock.now_millis(), 42);
    }
}
