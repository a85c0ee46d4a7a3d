//! Exponential smoothing for the legacy Euler input path

use std::time::Duration;

use crate::types::{NOMINAL_TICK, SmoothingMode, SmoothingSettings};

/// Per-axis exponential smoother.
///
/// Each step closes a fraction `k` of the gap to the target:
/// `current += (target - current) * k`. With `0 < k <= 1` the output converges
/// geometrically and never overshoots.
///
/// Angles are treated as plain numbers. A target that crosses ±180° is
/// approached the long way round, which shows up as a visible snap.
///
/// # Example
/// ```
/// use quad_attitude::SmoothingFilter;
///
/// let mut filter = SmoothingFilter::per_tick(0.2);
/// let mut value = 0.0;
/// for _ in 0..25 {
///     value = filter.step(30.0);
/// }
/// assert!((30.0 - value) < 0.3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFilter {
    mode: SmoothingMode,
    current: f64,
}

impl SmoothingFilter {
    pub fn new(settings: SmoothingSettings) -> Self {
        Self {
            mode: settings.mode,
            current: 0.0,
        }
    }

    /// Frame-coupled smoother with a fixed per-tick coefficient
    pub fn per_tick(coefficient: f64) -> Self {
        Self::new(SmoothingSettings {
            mode: SmoothingMode::PerTick { coefficient },
        })
    }

    /// Smoother with the given e-folding time in seconds
    pub fn time_constant(seconds: f64) -> Self {
        Self::new(SmoothingSettings {
            mode: SmoothingMode::TimeConstant { seconds },
        })
    }

    /// Advance one tick of nominal length (1/60 s)
    pub fn step(&mut self, target: f64) -> f64 {
        self.advance(target, self.coefficient(NOMINAL_TICK))
    }

    /// Advance by the measured time since the previous tick
    ///
    /// Per-tick smoothers ignore `elapsed`. A zero elapsed time leaves a
    /// time-constant smoother where it is.
    pub fn step_elapsed(&mut self, target: f64, elapsed: Duration) -> f64 {
        self.advance(target, self.coefficient(elapsed.as_secs_f64()))
    }

    /// Fraction of the remaining error closed by a tick of `elapsed` seconds
    pub fn coefficient(&self, elapsed: f64) -> f64 {
        let k = match self.mode {
            SmoothingMode::PerTick { coefficient } => coefficient,
            SmoothingMode::TimeConstant { seconds } => 1.0 - (-elapsed / seconds).exp(),
        };
        // 0/0 when both the elapsed time and the time constant are zero
        if k.is_nan() { 0.0 } else { k.clamp(0.0, 1.0) }
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    /// Jump straight to `value`, e.g. on the first sample of a session
    pub fn reset(&mut self, value: f64) {
        self.current = value;
    }

    fn advance(&mut self, target: f64, k: f64) -> f64 {
        self.current += (target - self.current) * k;
        self.current
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(SmoothingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_step() {
        let mut filter = SmoothingFilter::per_tick(0.2);
        assert!((filter.step(30.0) - 6.0).abs() < 1e-12);
        assert!((filter.step(30.0) - 10.8).abs() < 1e-12);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut filter = SmoothingFilter::per_tick(0.2);
        let mut previous = filter.value();
        for _ in 0..100 {
            let value = filter.step(30.0);
            assert!(value >= previous);
            assert!(value <= 30.0);
            previous = value;
        }
        assert!((30.0 - previous).abs() < 1e-6);
    }

    #[test]
    fn test_converges_from_above() {
        let mut filter = SmoothingFilter::per_tick(0.5);
        filter.reset(10.0);
        for _ in 0..60 {
            let value = filter.step(-10.0);
            assert!(value >= -10.0);
        }
        assert!((filter.value() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_shrinks_geometrically() {
        let mut filter = SmoothingFilter::per_tick(0.2);
        for n in 1..=30 {
            let error = 30.0 - filter.step(30.0);
            let expected = 30.0 * 0.8f64.powi(n);
            assert!((error - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_time_constant_is_independent_of_frame_rate() {
        let tau = 0.1;
        let mut at_60hz = SmoothingFilter::time_constant(tau);
        let mut at_144hz = SmoothingFilter::time_constant(tau);

        for _ in 0..60 {
            at_60hz.step_elapsed(30.0, Duration::from_secs_f64(1.0 / 60.0));
        }
        for _ in 0..144 {
            at_144hz.step_elapsed(30.0, Duration::from_secs_f64(1.0 / 144.0));
        }

        // After one second both have closed 1 - e^-10 of the gap
        let expected = 30.0 * (1.0 - (-1.0f64 / tau).exp());
        assert!((at_60hz.value() - expected).abs() < 1e-6);
        assert!((at_144hz.value() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_per_tick_ignores_elapsed() {
        let mut filter = SmoothingFilter::per_tick(0.2);
        filter.step_elapsed(10.0, Duration::from_secs(5));
        assert!((filter.value() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_elapsed_holds_value() {
        let mut filter = SmoothingFilter::time_constant(0.1);
        filter.reset(4.0);
        assert_eq!(filter.step_elapsed(20.0, Duration::ZERO), 4.0);
    }

    #[test]
    fn test_oversized_coefficient_does_not_overshoot() {
        let mut filter = SmoothingFilter::per_tick(1.5);
        filter.reset(10.0);
        assert_eq!(filter.step(20.0), 20.0);
        assert_eq!(filter.step(20.0), 20.0);
    }

    #[test]
    fn test_default_matches_legacy_coefficient_at_nominal_rate() {
        let filter = SmoothingFilter::default();
        assert!((filter.coefficient(NOMINAL_TICK) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_no_wraparound_handling() {
        let mut filter = SmoothingFilter::per_tick(0.2);
        filter.reset(170.0);
        // Crossing +180 to -170 goes the long way round, through zero
        let value = filter.step(-170.0);
        assert!((value - 102.0).abs() < 1e-9);
    }
}
