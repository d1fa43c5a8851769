//! Cadence timers and fixed-period step pacing.

use core::time::Duration;

/// Idle time left in the last step, or how far it ran over budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Headroom {
    /// Finished early; slept for this long.
    Slack(Duration),
    /// Finished this long after the deadline; did not sleep.
    Overrun(Duration),
}

impl Default for Headroom {
    fn default() -> Self {
        Self::Slack(Duration::ZERO)
    }
}

impl Headroom {
    /// Signed microseconds: positive slack, negative overrun.
    #[must_use]
    pub fn as_micros(&self) -> i64 {
        match self {
            Self::Slack(d) => i64::try_from(d.as_micros()).unwrap_or(i64::MAX),
            Self::Overrun(d) => i64::try_from(d.as_micros()).map_or(i64::MIN, |us| -us),
        }
    }

    #[must_use]
    pub const fn is_overrun(&self) -> bool {
        matches!(self, Self::Overrun(_))
    }
}

/// Fires at most once per period.
///
/// A freshly created or [`reset`](Self::reset) timer is due immediately.
#[derive(Clone, Copy, Debug)]
pub struct PeriodicTimer {
    period: Duration,
    last: Option<Duration>,
}

impl PeriodicTimer {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        self.last
            .map_or(true, |last| now.saturating_sub(last) >= self.period)
    }

    /// Returns `true` and restarts the period if the timer is due.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.is_due(now) {
            self.last = Some(now);
            true
        } else {
            false
        }
    }

    /// Make the timer due on the next poll.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

/// Keeps consecutive step returns at least one period apart.
#[derive(Clone, Copy, Debug)]
pub struct StepPacer {
    period: Duration,
    last_return: Option<Duration>,
    headroom: Headroom,
    overruns: u32,
}

impl StepPacer {
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            last_return: None,
            headroom: Headroom::Slack(Duration::ZERO),
            overruns: 0,
        }
    }

    /// Start measuring from `now`, as if a step had just returned.
    pub fn restart(&mut self, now: Duration) {
        self.last_return = Some(now);
    }

    /// Record the headroom of a step whose work ended at `now`.
    ///
    /// Returns the deadline to sleep until, or `None` if the step is
    /// already late (or no step has returned yet).
    pub fn settle(&mut self, now: Duration) -> Option<Duration> {
        let deadline = self.last_return? + self.period;
        match deadline.checked_sub(now) {
            Some(slack) => {
                self.headroom = Headroom::Slack(slack);
                Some(deadline)
            }
            None => {
                self.headroom = Headroom::Overrun(now - deadline);
                self.overruns = self.overruns.saturating_add(1);
                None
            }
        }
    }

    /// Mark the step as returned at `now`.
    pub fn finish(&mut self, now: Duration) {
        self.last_return = Some(now);
    }

    #[must_use]
    pub const fn headroom(&self) -> Headroom {
        self.headroom
    }

    /// Steps that ended after their deadline.
    #[must_use]
    pub const fn overruns(&self) -> u32 {
        self.overruns
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_timer_due_immediately_then_periodic() {
        let mut timer = PeriodicTimer::new(100 * MS);
        assert!(timer.poll(5 * MS));
        assert!(!timer.poll(50 * MS));
        assert!(!timer.poll(104 * MS));
        assert!(timer.poll(105 * MS));
        timer.reset();
        assert!(timer.is_due(106 * MS));
    }

    #[test]
    fn test_pacer_slack() {
        let mut pacer = StepPacer::new(20 * MS);
        pacer.restart(Duration::ZERO);
        assert_eq!(pacer.settle(5 * MS), Some(20 * MS));
        assert_eq!(pacer.headroom(), Headroom::Slack(15 * MS));
        assert_eq!(pacer.headroom().as_micros(), 15_000);
        pacer.finish(20 * MS);
        assert_eq!(pacer.settle(20 * MS), Some(40 * MS));
        assert_eq!(pacer.overruns(), 0);
    }

    #[test]
    fn test_pacer_overrun() {
        let mut pacer = StepPacer::new(20 * MS);
        pacer.restart(Duration::ZERO);
        assert_eq!(pacer.settle(27 * MS), None);
        assert_eq!(pacer.headroom(), Headroom::Overrun(7 * MS));
        assert_eq!(pacer.headroom().as_micros(), -7_000);
        assert!(pacer.headroom().is_overrun());
        assert_eq!(pacer.overruns(), 1);
    }

    #[test]
    fn test_pacer_exact_deadline_is_slack() {
        let mut pacer = StepPacer::new(20 * MS);
        pacer.restart(10 * MS);
        assert_eq!(pacer.settle(30 * MS), Some(30 * MS));
        assert_eq!(pacer.headroom(), Headroom::Slack(Duration::ZERO));
    }

    #[test]
    fn test_pacer_before_start() {
        let mut pacer = StepPacer::new(20 * MS);
        assert_eq!(pacer.settle(Duration::ZERO), None);
        assert_eq!(pacer.overruns(), 0);
    }
}
