// MyoBand - EMG Envelope Filter & Gesture Threshold
//
// Both halves run once per sample tick from the sampling task. They use only
// integer arithmetic with explicit 32-bit wraparound and never allocate.

/// Leaky running sum standing in for the last `WINDOW` raw samples.
///
/// Each update removes one average-sized sample and adds the new one, so
/// `sum / WINDOW` tracks the moving average without a history array. It is an
/// approximation of a true sliding window (first-order IIR with gain
/// `1 / WINDOW`).
///
/// The caller must pick `WINDOW` so that `max_sample * (WINDOW + 1)` fits in
/// a `u32`. The firmware window is checked at compile time in `config`; here
/// the accumulator silently wraps.
#[derive(Debug, Clone, Default)]
pub struct AverageFilter<const WINDOW: u32> {
    accumulated_sum: u32,
}

impl<const WINDOW: u32> AverageFilter<WINDOW> {
    const WINDOW_NONZERO: () = assert!(WINDOW > 0, "filter window must be non-zero");

    pub const fn new() -> Self {
        let () = Self::WINDOW_NONZERO;
        Self { accumulated_sum: 0 }
    }

    pub fn update(&mut self, raw_sample: u32) {
        let deduction = self.accumulated_sum / WINDOW;
        self.accumulated_sum = self
            .accumulated_sum
            .wrapping_sub(deduction)
            .wrapping_add(raw_sample);
    }

    /// Start the sum as if the last `WINDOW` samples had all been `sample`.
    pub fn seed(&mut self, sample: u32) {
        self.accumulated_sum = sample.wrapping_mul(WINDOW);
    }

    /// Current moving-average estimate of a single sample.
    pub fn average(&self) -> u32 {
        self.accumulated_sum / WINDOW
    }

    pub fn accumulated_sum(&self) -> u32 {
        self.accumulated_sum
    }
}

/// Upper threshold `average + average * delta_percent / 100`.
pub fn pass_threshold(average: u32, delta_percent: u8) -> u32 {
    average.wrapping_add(average.wrapping_mul(u32::from(delta_percent)) / 100)
}

/// Schmitt-style gesture latch.
///
/// Both directions compare against the same upper threshold: the latch rises
/// on `raw > threshold` and falls on `raw <= threshold`.
#[derive(Debug, Clone, Default)]
pub struct ThresholdDetector {
    gesture_active: bool,
}

impl ThresholdDetector {
    pub const fn new() -> Self {
        Self { gesture_active: false }
    }

    pub fn evaluate(&mut self, raw_sample: u32, threshold: u32) -> bool {
        if self.gesture_active {
            if raw_sample <= threshold {
                self.gesture_active = false;
            }
        } else if raw_sample > threshold {
            self.gesture_active = true;
        }
        self.gesture_active
    }

    pub fn is_active(&self) -> bool {
        self.gesture_active
    }
}

/// Filter and detector pair owned by the sampling path.
#[derive(Debug, Clone, Default)]
pub struct Emg<const WINDOW: u32> {
    filter: AverageFilter<WINDOW>,
    detector: ThresholdDetector,
}

impl<const WINDOW: u32> Emg<WINDOW> {
    pub const fn new() -> Self {
        Self {
            filter: AverageFilter::new(),
            detector: ThresholdDetector::new(),
        }
    }

    /// Fold a new ADC reading into the moving average.
    pub fn update(&mut self, raw_sample: u32) {
        self.filter.update(raw_sample);
    }

    /// Jump the moving average straight to `raw_sample`.
    pub fn seed(&mut self, raw_sample: u32) {
        self.filter.seed(raw_sample);
    }

    /// Classify `raw_sample` against the current average and return the
    /// new latch state.
    pub fn evaluate(&mut self, raw_sample: u32, delta_percent: u8) -> bool {
        let threshold = self.threshold(delta_percent);
        self.detector.evaluate(raw_sample, threshold)
    }

    pub fn threshold(&self, delta_percent: u8) -> u32 {
        pass_threshold(self.filter.average(), delta_percent)
    }

    pub fn average(&self) -> u32 {
        self.filter.average()
    }

    pub fn is_active(&self) -> bool {
        self.detector.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pre-load the filter so its average sits exactly at `avg`.
    fn settled<const W: u32>(avg: u32) -> Emg<W> {
        let mut emg = Emg::<W>::new();
        for _ in 0..(W * 40) {
            emg.update(avg);
        }
        assert_eq!(emg.average(), avg);
        emg
    }

    #[test]
    fn average_rises_monotonically_to_constant_input() {
        let mut filter = AverageFilter::<16>::new();
        let mut previous = 0;
        for _ in 0..2000 {
            filter.update(2000);
            let avg = filter.average();
            assert!(avg >= previous, "average dropped from {previous} to {avg}");
            assert!(avg <= 2000);
            previous = avg;
        }
        assert_eq!(filter.average(), 2000);
    }

    #[test]
    fn average_falls_monotonically_to_lower_input() {
        let mut filter = AverageFilter::<16>::new();
        for _ in 0..2000 {
            filter.update(3000);
        }
        let mut previous = filter.average();
        for _ in 0..2000 {
            filter.update(500);
            let avg = filter.average();
            assert!(avg <= previous);
            assert!(avg >= 500);
            previous = avg;
        }
        assert_eq!(filter.average(), 500);
    }

    #[test]
    fn accumulator_settles_within_one_window_of_target() {
        let mut filter = AverageFilter::<32>::new();
        for _ in 0..5000 {
            filter.update(1234);
        }
        let sum = filter.accumulated_sum();
        assert!((1234 * 32..1234 * 32 + 32).contains(&sum), "sum = {sum}");
    }

    #[test]
    fn first_update_is_just_the_sample() {
        let mut filter = AverageFilter::<8>::new();
        filter.update(100);
        assert_eq!(filter.accumulated_sum(), 100);
        assert_eq!(filter.average(), 12);
    }

    #[test]
    fn accumulator_wraps_instead_of_trapping() {
        let mut filter = AverageFilter::<1>::new();
        filter.update(u32::MAX);
        // Deduction removes the whole sum, so the new sample replaces it.
        filter.update(5);
        assert_eq!(filter.accumulated_sum(), 5);

        let mut filter = AverageFilter::<{ u32::MAX }>::new();
        filter.update(u32::MAX);
        filter.update(2);
        assert_eq!(filter.accumulated_sum(), 0);
    }

    #[test]
    fn seed_sets_average_in_one_step() {
        let mut filter = AverageFilter::<32>::new();
        filter.seed(600);
        assert_eq!(filter.accumulated_sum(), 600 * 32);
        assert_eq!(filter.average(), 600);

        // A constant input matching the seed leaves the sum where it is.
        filter.update(600);
        assert_eq!(filter.accumulated_sum(), 600 * 32);
    }

    #[test]
    fn seeded_resting_level_does_not_latch() {
        let mut emg = Emg::<32>::new();
        emg.seed(600);
        for _ in 0..500 {
            emg.update(600);
            assert!(!emg.evaluate(600, 30));
        }
    }

    #[test]
    fn threshold_adds_percentage_band() {
        assert_eq!(pass_threshold(1000, 30), 1300);
        assert_eq!(pass_threshold(1000, 0), 1000);
        assert_eq!(pass_threshold(0, 200), 0);
        // Integer percent truncates.
        assert_eq!(pass_threshold(7, 50), 10);
        assert_eq!(pass_threshold(4095, 255), 4095 + 10442);
    }

    #[test]
    fn rises_only_strictly_above_threshold() {
        let mut emg = settled::<16>(1000);
        assert_eq!(emg.threshold(10), 1100);

        assert!(!emg.evaluate(1100, 10));
        assert!(emg.evaluate(1101, 10));
    }

    #[test]
    fn falls_on_same_upper_threshold() {
        let mut emg = settled::<16>(1000);
        assert!(emg.evaluate(1500, 10));

        // Still above the upper bound: latched.
        assert!(emg.evaluate(1101, 10));
        // Equal to the bound: released. No separate lower threshold.
        assert!(!emg.evaluate(1100, 10));
    }

    #[test]
    fn zero_delta_compares_against_average() {
        let mut emg = settled::<16>(800);
        assert!(!emg.evaluate(800, 0));
        assert!(emg.evaluate(801, 0));
        assert!(!emg.evaluate(800, 0));
    }

    #[test]
    fn zero_average_goes_high_on_any_positive_sample() {
        let mut emg = Emg::<16>::new();
        assert_eq!(emg.average(), 0);
        assert!(!emg.evaluate(0, 50));
        assert!(emg.evaluate(1, 50));
        assert!(emg.is_active());
    }

    #[test]
    fn update_then_evaluate_tracks_a_burst() {
        let mut emg = settled::<32>(400);
        let mut states = Vec::new();
        for raw in [400, 420, 900, 950, 880, 410, 400] {
            emg.update(raw);
            states.push(emg.evaluate(raw, 30));
        }
        assert_eq!(states, [false, false, true, true, true, false, false]);
    }

    #[test]
    fn detector_latch_independent_of_filter() {
        let mut detector = ThresholdDetector::new();
        assert!(!detector.evaluate(10, 10));
        assert!(detector.evaluate(11, 10));
        assert!(detector.evaluate(11, 10));
        assert!(!detector.evaluate(10, 10));
        assert!(!detector.is_active());
    }
}
