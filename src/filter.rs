//! Five-sample streaming median filter.
//!
//! The filter keeps the last five *valid* raw samples in a ring and reports
//! their median. Samples outside the configured window are dropped without
//! touching the history, so a burst of echo dropouts cannot flush good data.

/// Number of samples the median is taken over.
pub const WINDOW: usize = 5;

/// Median filter over the last [`WINDOW`] raw samples in micrometers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MedianFilter {
    buffer: [u32; WINDOW],
    index: usize,
    latest: u32,
    min_distance: u32,
    max_distance: u32,
}

impl MedianFilter {
    /// Creates a filter accepting samples in `min_distance..=max_distance`.
    ///
    /// The ring is pre-seeded with alternating bounds so the first few medians
    /// land inside the valid window instead of collapsing to zero.
    #[must_use]
    pub fn new(min_distance: u32, max_distance: u32) -> Self {
        Self {
            buffer: [
                min_distance,
                max_distance,
                min_distance,
                max_distance,
                min_distance,
            ],
            index: 0,
            latest: 0,
            min_distance,
            max_distance,
        }
    }

    /// Enters `sample` into the ring if it lies inside the accepted window.
    ///
    /// Returns `true` if the sample was stored. Rejected samples are still
    /// remembered as the most recent raw sample for [`value`](Self::value).
    pub fn feed(&mut self, sample: u32) -> bool {
        self.latest = sample;
        if !(self.min_distance..=self.max_distance).contains(&sample) {
            trace!("Discarding out of range sample: {}", sample);
            return false;
        }
        if let Some(slot) = self.buffer.get_mut(self.index) {
            *slot = sample;
        }
        self.index = (self.index + 1) % WINDOW;
        true
    }

    /// Median of the ring, or the most recent raw sample if the median is 0.
    #[must_use]
    pub fn value(&self) -> u32 {
        let [a, b, c, d, e] = self.buffer;
        match median5(a, b, c, d, e) {
            0 => self.latest,
            median => median,
        }
    }

    /// Feeds `sample` and returns the resulting [`value`](Self::value).
    pub fn filter(&mut self, sample: u32) -> u32 {
        self.feed(sample);
        self.value()
    }

    /// Current ring contents in slot order.
    #[must_use]
    pub fn samples(&self) -> &[u32; WINDOW] {
        &self.buffer
    }

    /// Slot the next accepted sample will be written to.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.index
    }
}

/// Median of five values through a fixed tree of pairwise comparisons.
///
/// Every path performs at most six comparisons and no data is moved, which
/// keeps the cost flat inside a polling loop.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn median5(a: u32, b: u32, c: u32, d: u32, e: u32) -> u32 {
    if b < a {
        if d < c {
            if b < d {
                if a < e {
                    if a < d {
                        if e < d { e } else { d }
                    } else if c < a {
                        c
                    } else {
                        a
                    }
                } else if e < d {
                    if a < d { a } else { d }
                } else if c < e {
                    c
                } else {
                    e
                }
            } else if c < e {
                if b < c {
                    if a < c { a } else { c }
                } else if e < b {
                    e
                } else {
                    b
                }
            } else if b < e {
                if a < e { a } else { e }
            } else if c < b {
                c
            } else {
                b
            }
        } else if b < c {
            if a < e {
                if a < c {
                    if e < c { e } else { c }
                } else if d < a {
                    d
                } else {
                    a
                }
            } else if e < c {
                if a < c { a } else { c }
            } else if d < e {
                d
            } else {
                e
            }
        } else if d < e {
            if b < d {
                if a < d { a } else { d }
            } else if e < b {
                e
            } else {
                b
            }
        } else if b < e {
            if a < e { a } else { e }
        } else if d < b {
            d
        } else {
            b
        }
    } else if d < c {
        if a < d {
            if b < e {
                if b < d {
                    if e < d { e } else { d }
                } else if c < b {
                    c
                } else {
                    b
                }
            } else if e < d {
                if b < d { b } else { d }
            } else if c < e {
                c
            } else {
                e
            }
        } else if c < e {
            if a < c {
                if b < c { b } else { c }
            } else if e < a {
                e
            } else {
                a
            }
        } else if a < e {
            if b < e { b } else { e }
        } else if c < a {
            c
        } else {
            a
        }
    } else if a < c {
        if b < e {
            if b < c {
                if e < c { e } else { c }
            } else if d < b {
                d
            } else {
                b
            }
        } else if e < c {
            if b < c { b } else { c }
        } else if d < e {
            d
        } else {
            e
        }
    } else if d < e {
        if a < d {
            if b < d { b } else { d }
        } else if e < a {
            e
        } else {
            a
        }
    } else if a < e {
        if b < e { b } else { e }
    } else if d < a {
        d
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u32 = 250_000;
    const MAX: u32 = 5_000_000;

    fn sorted_median(values: [u32; 5]) -> u32 {
        let mut sorted = values;
        sorted.sort_unstable();
        sorted[2]
    }

    #[test]
    fn median_of_every_permutation_of_distinct_values() {
        let values = [10, 20, 30, 40, 50];
        let mut checked = 0;
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    for l in 0..5 {
                        for m in 0..5 {
                            let idx = [i, j, k, l, m];
                            let distinct = (0..5).all(|n| idx.iter().filter(|&&x| x == n).count() == 1);
                            if !distinct {
                                continue;
                            }
                            let [a, b, c, d, e] = idx.map(|n| values[n]);
                            assert_eq!(median5(a, b, c, d, e), 30, "input {:?}", [a, b, c, d, e]);
                            checked += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 120);
    }

    #[test]
    fn median_with_duplicates() {
        for n in 0..243u32 {
            let mut rest = n;
            let mut values = [0u32; 5];
            for v in &mut values {
                *v = rest % 3 + 1;
                rest /= 3;
            }
            let [a, b, c, d, e] = values;
            assert_eq!(
                median5(a, b, c, d, e),
                sorted_median(values),
                "input {values:?}"
            );
        }
    }

    #[test]
    fn seeded_with_alternating_bounds() {
        let filter = MedianFilter::new(MIN, MAX);
        assert_eq!(filter.samples(), &[MIN, MAX, MIN, MAX, MIN]);
        assert_eq!(filter.next_index(), 0);
        assert_eq!(filter.value(), MIN);
    }

    #[test]
    fn first_sample_after_seeding_is_bounded() {
        let mut filter = MedianFilter::new(MIN, MAX);
        let value = filter.filter(1_000_000);
        assert_ne!(value, 0);
        assert!((MIN..=MAX).contains(&value));
        assert_eq!(value, 1_000_000);
    }

    #[test]
    fn out_of_range_samples_are_not_stored() {
        let mut filter = MedianFilter::new(MIN, MAX);
        let before = filter.clone();

        assert!(!filter.feed(0));
        assert!(!filter.feed(MIN - 1));
        assert!(!filter.feed(MAX + 1));

        assert_eq!(filter.samples(), before.samples());
        assert_eq!(filter.next_index(), 0);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut filter = MedianFilter::new(MIN, MAX);
        assert!(filter.feed(MIN));
        assert!(filter.feed(MAX));
        assert_eq!(filter.next_index(), 2);
    }

    #[test]
    fn index_wraps_after_five_samples() {
        let mut filter = MedianFilter::new(MIN, MAX);
        for sample in [300_000, 310_000, 320_000, 330_000, 340_000, 350_000] {
            filter.feed(sample);
        }
        assert_eq!(filter.next_index(), 1);
        assert_eq!(
            filter.samples(),
            &[350_000, 310_000, 320_000, 330_000, 340_000]
        );
        assert_eq!(filter.value(), 330_000);
    }

    #[test]
    fn single_outlier_is_rejected_by_median() {
        let mut filter = MedianFilter::new(MIN, MAX);
        for sample in [1_000_000, 1_010_000, 4_900_000, 1_020_000, 990_000] {
            filter.feed(sample);
        }
        assert_eq!(filter.value(), 1_010_000);
    }

    #[test]
    fn zero_median_falls_back_to_latest_raw_sample() {
        let mut filter = MedianFilter::new(0, MAX);
        for _ in 0..3 {
            filter.feed(0);
        }
        assert_eq!(filter.filter(0), 0);

        let mut filter = MedianFilter::new(0, 0);
        assert_eq!(filter.filter(700_000), 700_000);
    }
}
