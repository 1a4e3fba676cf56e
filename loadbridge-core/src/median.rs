//! Bounded running-median filter over raw readings
//!
//! A fixed-capacity ring buffer paired with an order (indirection) array.
//! `add` overwrites the oldest physical slot; the median is computed
//! lazily by sorting the *order* array, never the ring itself. Moving raw
//! values around would break the overwrite discipline `add` relies on, so
//! the separation is load-bearing, not an optimization.
//!
//! The sort is an exchange sort with an early-exit flag. Between two
//! median queries the window typically changed by a single sample, so the
//! re-sort finishes in a pass or two; the worst case stays quadratic,
//! which is acceptable at these window sizes.
//!
//! Both arrays are allocated once at construction to the clamped capacity
//! and never resized.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::errors::{MeasureError, MeasureResult};

// Optional logging, compiled out without the feature
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Smallest permitted window
pub const MIN_WINDOW: usize = 1;

/// Largest permitted window
///
/// Beyond this the filter stops being useful for spike rejection and the
/// quadratic sort starts to show.
pub const MAX_WINDOW: usize = 99;

/// Running median over the most recent `capacity` samples
///
/// States are the product of {empty, partial, full} and {sorted,
/// unsorted}: `add` always leaves the filter unsorted, a successful
/// `median` always leaves it sorted. There is no terminal state; `clear`
/// makes the filter reusable indefinitely.
pub struct RunningMedian {
    /// Physical ring of samples; slot assignment never changes after a sort
    values: Vec<i32>,
    /// Permutation of `0..len` ordered by the values the indices point at
    order: Vec<u16>,
    len: usize,
    write_pos: usize,
    sorted: bool,
}

impl RunningMedian {
    /// Create a cleared filter
    ///
    /// Capacities outside `[MIN_WINDOW, MAX_WINDOW]` are clamped rather
    /// than rejected - a silent correction, logged when the `log` feature
    /// is enabled.
    pub fn new(capacity: usize) -> Self {
        let clamped = capacity.clamp(MIN_WINDOW, MAX_WINDOW);
        if clamped != capacity {
            log_warn!("median window {} clamped to {}", capacity, clamped);
        }

        let mut filter = Self {
            values: vec![0; clamped],
            order: vec![0; clamped],
            len: 0,
            write_pos: 0,
            sorted: false,
        };
        filter.clear();
        filter
    }

    /// Reset to the empty state; the order array becomes the identity
    pub fn clear(&mut self) {
        self.len = 0;
        self.write_pos = 0;
        self.sorted = false;
        for (i, slot) in self.order.iter_mut().enumerate() {
            *slot = i as u16;
        }
    }

    /// Add a sample, overwriting the oldest once the window is full
    pub fn add(&mut self, value: i32) {
        self.values[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.values.len();
        if self.len < self.values.len() {
            self.len += 1;
        }
        self.sorted = false;
    }

    /// Median of the current window
    ///
    /// Sorts lazily if needed. An even-length window reports the
    /// truncating integer average of the two central elements - kept
    /// bit-for-bit with the element type, negatives included, matching
    /// how the readings themselves truncate.
    pub fn median(&mut self) -> MeasureResult<i32> {
        if self.len == 0 {
            return Err(MeasureError::EmptyFilter);
        }
        if !self.sorted {
            self.sort();
        }

        let mid = self.len / 2;
        if self.len % 2 == 1 {
            Ok(self.values[usize::from(self.order[mid])])
        } else {
            let upper = i64::from(self.values[usize::from(self.order[mid])]);
            let lower = i64::from(self.values[usize::from(self.order[mid - 1])]);
            Ok(((upper + lower) / 2) as i32)
        }
    }

    /// Configured window size
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the filter holds no samples
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the ring has wrapped into overwrite mode
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Exchange sort over the indirection array with early exit
    fn sort(&mut self) {
        for pass in 1..self.len {
            let mut swapped = false;
            for j in 1..=(self.len - pass) {
                let a = usize::from(self.order[j - 1]);
                let b = usize::from(self.order[j]);
                if self.values[a] > self.values[b] {
                    self.order.swap(j - 1, j);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
        self.sorted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_reports_error() {
        let mut filter = RunningMedian::new(5);
        assert!(filter.is_empty());
        assert_eq!(filter.median(), Err(MeasureError::EmptyFilter));
    }

    #[test]
    fn capacity_is_clamped_not_rejected() {
        assert_eq!(RunningMedian::new(0).capacity(), MIN_WINDOW);
        assert_eq!(RunningMedian::new(500).capacity(), MAX_WINDOW);
        assert_eq!(RunningMedian::new(7).capacity(), 7);
    }

    #[test]
    fn odd_window_takes_middle_element() {
        let mut filter = RunningMedian::new(5);
        for v in [5, 3, 8, 1, 9] {
            filter.add(v);
        }
        assert_eq!(filter.median(), Ok(5));
    }

    #[test]
    fn even_window_averages_central_pair() {
        let mut filter = RunningMedian::new(4);
        for v in [10, 20, 30, 40] {
            filter.add(v);
        }
        assert_eq!(filter.median(), Ok(25));
    }

    #[test]
    fn even_window_truncates_toward_zero_for_negatives() {
        let mut filter = RunningMedian::new(2);
        filter.add(-5);
        filter.add(-2);
        // (-5 + -2) / 2 truncates to -3, not -4
        assert_eq!(filter.median(), Ok(-3));
    }

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let mut filter = RunningMedian::new(3);
        for v in [100, 200, 300, 1, 2] {
            filter.add(v);
        }
        assert!(filter.is_full());
        assert_eq!(filter.len(), 3);
        // window is now [300, 1, 2]
        assert_eq!(filter.median(), Ok(2));
    }

    #[test]
    fn partial_window_uses_only_added_samples() {
        let mut filter = RunningMedian::new(9);
        filter.add(4);
        filter.add(2);
        assert!(!filter.is_full());
        assert_eq!(filter.median(), Ok(3));

        filter.add(10);
        assert_eq!(filter.median(), Ok(4));
    }

    #[test]
    fn clear_resets_to_empty_identity() {
        let mut filter = RunningMedian::new(4);
        for v in [9, 1, 7, 3] {
            filter.add(v);
        }
        filter.median().unwrap();

        filter.clear();
        assert!(filter.is_empty());
        assert_eq!(filter.median(), Err(MeasureError::EmptyFilter));
        assert_eq!(filter.order, (0..4u16).collect::<Vec<u16>>());

        // reusable after clear
        filter.add(11);
        assert_eq!(filter.median(), Ok(11));
    }

    #[test]
    fn second_median_performs_no_further_sorting() {
        let mut filter = RunningMedian::new(5);
        for v in [5, 1, 4, 2, 3] {
            filter.add(v);
        }
        assert!(!filter.sorted);

        assert_eq!(filter.median(), Ok(3));
        assert!(filter.sorted);
        let order_after_first = filter.order.clone();

        assert_eq!(filter.median(), Ok(3));
        assert_eq!(filter.order, order_after_first);
    }

    #[test]
    fn add_marks_unsorted_again() {
        let mut filter = RunningMedian::new(3);
        filter.add(2);
        filter.median().unwrap();
        assert!(filter.sorted);

        filter.add(1);
        assert!(!filter.sorted);
    }

    #[test]
    fn sort_leaves_physical_slots_untouched() {
        let mut filter = RunningMedian::new(4);
        for v in [40, 10, 30, 20] {
            filter.add(v);
        }
        filter.median().unwrap();

        // ring order is exactly insertion order, only `order` moved
        assert_eq!(filter.values, vec![40, 10, 30, 20]);

        // overwrite still hits the oldest slot after the sort
        filter.add(99);
        assert_eq!(filter.values, vec![99, 10, 30, 20]);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    /// Median over a plain sorted copy, with the same truncating average
    /// for even lengths
    fn reference_median(window: &[i32]) -> i32 {
        let mut sorted = window.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            ((i64::from(sorted[mid]) + i64::from(sorted[mid - 1])) / 2) as i32
        }
    }

    proptest! {
        #[test]
        fn median_matches_sorted_reference(
            capacity in 1usize..40,
            samples in prop::collection::vec(-8_388_608i32..8_388_608, 1..120),
        ) {
            let mut filter = RunningMedian::new(capacity);
            for &s in &samples {
                filter.add(s);
            }

            // the window is exactly the last `capacity` samples added
            let window_len = samples.len().min(filter.capacity());
            let window = &samples[samples.len() - window_len..];

            prop_assert_eq!(filter.len(), window_len);
            prop_assert_eq!(filter.median().unwrap(), reference_median(window));
        }

        #[test]
        fn median_is_stable_across_repeat_queries(
            samples in prop::collection::vec(-1000i32..1000, 1..30),
        ) {
            let mut filter = RunningMedian::new(samples.len());
            for &s in &samples {
                filter.add(s);
            }

            let first = filter.median().unwrap();
            let second = filter.median().unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
