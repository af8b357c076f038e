/// How a [`TargetTracker`] moves from its current value to a new target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Constant increment per step.
    Linear,
    /// Constant ratio per step, so the ramp is exponential in the value domain. Only valid when
    /// both ends are positive, otherwise the segment is ramped linearly.
    Multiplicative,
}

/// Steps a value towards a target over a fixed number of samples, then reports that it is at
/// rest. The last step lands exactly on the target so whatever is derived from the final value
/// matches what would be derived from the target directly.
#[derive(Debug, Clone, Copy)]
pub struct TargetTracker {
    ramp: Ramp,
    current: f64,
    target: f64,
    /// Either an increment or a ratio, depending on `segment`.
    step: f64,
    segment: Ramp,
    remaining_steps: u32,
    steps_to_target: u32,
}

impl TargetTracker {
    pub fn new(initial: f64, ramp: Ramp) -> Self {
        Self {
            ramp,
            current: initial,
            target: initial,
            step: 0.0,
            segment: ramp,
            remaining_steps: 0,
            steps_to_target: 0,
        }
    }

    /// Sets the ramp length for the given sample rate and snaps to the current target.
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        self.steps_to_target = (ramp_seconds * sample_rate).floor().max(0.0) as u32;
        self.snap_to(self.target);
    }

    /// Jumps to `value` without ramping.
    pub fn snap_to(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.remaining_steps = 0;
    }

    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }

        if self.steps_to_target == 0 {
            self.snap_to(target);
            return;
        }

        self.target = target;
        self.remaining_steps = self.steps_to_target;

        let steps = self.steps_to_target as f64;
        self.segment = match self.ramp {
            Ramp::Multiplicative if self.current > 0.0 && target > 0.0 => Ramp::Multiplicative,
            _ => Ramp::Linear,
        };
        self.step = match self.segment {
            Ramp::Linear => (target - self.current) / steps,
            Ramp::Multiplicative => ((target.ln() - self.current.ln()) / steps).exp(),
        };
    }

    /// Advances one step and returns the new value. At rest this just returns the target.
    #[inline]
    pub fn next(&mut self) -> f64 {
        if self.remaining_steps == 0 {
            return self.target;
        }

        self.remaining_steps -= 1;
        if self.remaining_steps == 0 {
            self.current = self.target;
        } else {
            match self.segment {
                Ramp::Linear => self.current += self.step,
                Ramp::Multiplicative => self.current *= self.step,
            }
        }

        self.current
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.remaining_steps > 0
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn steps_to_target(&self) -> u32 {
        self.steps_to_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramped(ramp: Ramp, from: f64, to: f64) -> (TargetTracker, Vec<f64>) {
        let mut tracker = TargetTracker::new(from, ramp);
        tracker.reset(1000.0, 0.01);
        tracker.set_target(to);

        let mut values = Vec::new();
        while tracker.is_smoothing() {
            values.push(tracker.next());
        }

        (tracker, values)
    }

    #[test]
    fn reset_derives_step_count_from_sample_rate() {
        let mut tracker = TargetTracker::new(1000.0, Ramp::Multiplicative);
        tracker.reset(44100.0, 0.05);
        assert_eq!(tracker.steps_to_target(), 2205);
        tracker.reset(48000.0, 0.05);
        assert_eq!(tracker.steps_to_target(), 2400);
        assert!(!tracker.is_smoothing());
    }

    #[test]
    fn linear_ramp_is_monotonic_and_lands_on_target() {
        let (tracker, values) = ramped(Ramp::Linear, 100.0, 200.0);

        assert_eq!(values.len(), 10);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
        assert!((values[0] - 110.0).abs() < 1e-9);
        assert_eq!(*values.last().unwrap(), 200.0);
        assert_eq!(tracker.current(), 200.0);
    }

    #[test]
    fn multiplicative_ramp_has_constant_ratio() {
        let (_, values) = ramped(Ramp::Multiplicative, 100.0, 1600.0);

        assert_eq!(values.len(), 10);
        let ratio = values[1] / values[0];
        for w in values[..9].windows(2) {
            assert!((w[1] / w[0] - ratio).abs() < 1e-9);
        }
        assert!(values.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(*values.last().unwrap(), 1600.0);
    }

    #[test]
    fn multiplicative_ramp_falls_back_to_linear_through_zero() {
        let (_, values) = ramped(Ramp::Multiplicative, -5.0, 5.0);

        assert_eq!(values.len(), 10);
        assert!((values[0] - -4.0).abs() < 1e-9);
        assert!(values.iter().all(|v| v.is_finite()));
        assert_eq!(*values.last().unwrap(), 5.0);
    }

    #[test]
    fn downward_ramp_is_monotonic() {
        let (_, values) = ramped(Ramp::Multiplicative, 8000.0, 250.0);
        assert!(values.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(*values.last().unwrap(), 250.0);
    }

    #[test]
    fn repeated_target_does_not_restart_the_ramp() {
        let mut tracker = TargetTracker::new(100.0, Ramp::Linear);
        tracker.reset(1000.0, 0.01);
        tracker.set_target(200.0);
        tracker.next();
        tracker.next();
        tracker.set_target(200.0);

        let mut remaining = 0;
        while tracker.is_smoothing() {
            tracker.next();
            remaining += 1;
        }
        assert_eq!(remaining, 8);
    }

    #[test]
    fn zero_length_ramp_snaps() {
        let mut tracker = TargetTracker::new(100.0, Ramp::Linear);
        tracker.set_target(300.0);
        assert!(!tracker.is_smoothing());
        assert_eq!(tracker.current(), 300.0);
        assert_eq!(tracker.next(), 300.0);
    }

    #[test]
    fn reset_snaps_a_pending_ramp() {
        let mut tracker = TargetTracker::new(100.0, Ramp::Linear);
        tracker.reset(1000.0, 0.01);
        tracker.set_target(200.0);
        tracker.next();
        tracker.reset(2000.0, 0.01);

        assert!(!tracker.is_smoothing());
        assert_eq!(tracker.current(), 200.0);
        assert_eq!(tracker.steps_to_target(), 20);
    }
}
