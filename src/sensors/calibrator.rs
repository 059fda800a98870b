//! Running-average filter for noisy ADC channels.
//!
//! Samples are summed until exactly `N` have been collected; the average is
//! then a right shift by `log2(N)`, which is why `N` must be a power of two.
//! Non-power-of-two sizes are rejected at compile time.

/// Samples per calibrated reading, shared by moisture, battery and solar.
pub const SAMPLES_PER_READING: usize = 8;

/// Accumulator for one analog channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calibrator<const N: usize> {
    sum: u32,
    count: usize,
}

impl<const N: usize> Calibrator<N> {
    const SHIFT: u32 = {
        assert!(N.is_power_of_two(), "calibrator sample count must be a power of two");
        N.trailing_zeros()
    };

    pub const fn new() -> Self {
        let _ = Self::SHIFT;
        Self { sum: 0, count: 0 }
    }

    /// Accumulate one raw sample. Out-of-range raw values are taken as-is.
    ///
    /// Returns `false` (and drops the sample) once `N` samples are already
    /// waiting to be averaged.
    pub fn add_sample(&mut self, raw: u16) -> bool {
        if self.count >= N {
            return false;
        }
        self.sum += u32::from(raw);
        self.count += 1;
        true
    }

    /// Average of exactly `N` samples; resets the accumulator.
    /// `None` while fewer than `N` samples have been collected.
    pub fn average(&mut self) -> Option<u16> {
        if self.count != N {
            return None;
        }
        let avg = (self.sum >> Self::SHIFT) as u16;
        self.reset();
        Some(avg)
    }

    pub fn is_ready(&self) -> bool {
        self.count == N
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.sum = 0;
        self.count = 0;
    }
}

/// A calibrator that keeps its last completed reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibratedChannel<const N: usize> {
    filter: Calibrator<N>,
    value: Option<u16>,
}

impl<const N: usize> CalibratedChannel<N> {
    pub const fn new() -> Self {
        Self {
            filter: Calibrator::new(),
            value: None,
        }
    }

    /// Feed one sample. Returns the fresh reading when this sample completed a batch.
    pub fn push(&mut self, raw: u16) -> Option<u16> {
        self.filter.add_sample(raw);
        let fresh = self.filter.average()?;
        self.value = Some(fresh);
        Some(fresh)
    }

    /// Last completed reading.
    pub fn value(&self) -> Option<u16> {
        self.value
    }

    pub fn pending_samples(&self) -> usize {
        self.filter.sample_count()
    }
}
