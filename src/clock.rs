//! [`Clock`] on top of the embassy time driver.

use core::time::Duration;

use embassy_time::{Instant, Timer};
use livetune_core::Clock;

/// Monotonic clock measured from the moment it was created.
pub struct EmbassyClock {
    origin: Instant,
}

impl EmbassyClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for EmbassyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for EmbassyClock {
    fn elapsed(&self) -> Duration {
        Duration::from_micros(self.origin.elapsed().as_micros())
    }

    async fn sleep_until(&mut self, deadline: Duration) {
        let offset = u64::try_from(deadline.as_micros())
            .map(embassy_time::Duration::from_micros)
            .unwrap_or(embassy_time::Duration::MAX);
        let at = self.origin.checked_add(offset).unwrap_or(Instant::MAX);
        Timer::at(at).await;
    }
}
