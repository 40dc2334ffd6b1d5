use stampede_core::RampStage;
use std::time::Duration;

/// Piecewise-linear VU schedule built from the declared stages.
///
/// Within each stage the VU count moves linearly from the previous stage's
/// target (0 before the first stage) to the stage's own target, so a
/// `(10s, 200)` stage following a `(5s, 100)` stage climbs 100 -> 200 over
/// its ten seconds.
pub(crate) struct RampSchedule {
    stages: Vec<RampStage>,
    total: Duration,
}

impl RampSchedule {
    pub fn new(stages: &[RampStage]) -> Self {
        let total = stages.iter().map(|s| s.duration).sum();
        Self {
            stages: stages.to_vec(),
            total,
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// Target VU count at `elapsed`, or `None` once the schedule is exhausted.
    pub fn target_at(&self, elapsed: Duration) -> Option<usize> {
        if elapsed >= self.total {
            return None;
        }

        let mut from = 0usize;
        let mut offset = Duration::ZERO;
        for stage in &self.stages {
            if elapsed < offset + stage.duration {
                let frac = (elapsed - offset).as_secs_f64() / stage.duration.as_secs_f64();
                let interpolated = from as f64 + (stage.target as f64 - from as f64) * frac;
                return Some(interpolated.round() as usize);
            }
            offset += stage.duration;
            from = stage.target;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn schedule(stages: &[(u64, usize)]) -> RampSchedule {
        let stages: Vec<_> = stages
            .iter()
            .map(|&(duration, target)| RampStage::new(Duration::from_secs(duration), target))
            .collect();
        RampSchedule::new(&stages)
    }

    #[test]
    fn ramps_linearly_within_a_stage() {
        let schedule = schedule(&[(10, 100)]);
        assert_eq!(schedule.target_at(secs(0.)), Some(0));
        assert_eq!(schedule.target_at(secs(5.)), Some(50));
        assert_eq!(schedule.target_at(secs(9.)), Some(90));
        assert_eq!(schedule.target_at(secs(10.)), None);
    }

    #[test]
    fn later_stages_ramp_from_the_previous_target() {
        // The declared breaking ramp: 0->5, 5->100, 100->200, 200->0.
        let schedule = schedule(&[(5, 5), (5, 100), (10, 200), (5, 0)]);

        assert_eq!(schedule.total_duration(), Duration::from_secs(25));
        assert_eq!(schedule.target_at(secs(0.)), Some(0));
        assert_eq!(schedule.target_at(secs(2.5)), Some(3));
        assert_eq!(schedule.target_at(secs(5.)), Some(5));
        assert_eq!(schedule.target_at(secs(7.5)), Some(53));
        assert_eq!(schedule.target_at(secs(10.)), Some(100));
        assert_eq!(schedule.target_at(secs(15.)), Some(150));
        assert_eq!(schedule.target_at(secs(20.)), Some(200));
        assert_eq!(schedule.target_at(secs(22.5)), Some(100));
        assert_eq!(schedule.target_at(secs(24.9)), Some(4));
        assert_eq!(schedule.target_at(secs(25.)), None);
        assert_eq!(schedule.target_at(secs(60.)), None);
    }

    #[test]
    fn empty_schedule_ends_immediately() {
        let schedule = schedule(&[]);
        assert_eq!(schedule.total_duration(), Duration::ZERO);
        assert_eq!(schedule.target_at(Duration::ZERO), None);
    }

    #[test]
    fn zero_duration_stage_jumps_instantly() {
        let schedule = schedule(&[(0, 50), (10, 50)]);
        // The zero-length stage only moves the starting point of the next one.
        assert_eq!(schedule.target_at(secs(0.)), Some(50));
        assert_eq!(schedule.target_at(secs(5.)), Some(50));
    }
}
