//! Monotonic time source used for pacing and cadence timers.

use core::future::Future;
use core::time::Duration;

/// Monotonic clock with an async sleep.
///
/// `elapsed` is measured from an arbitrary origin fixed when the clock is
/// created; only differences between readings are meaningful.
pub trait Clock {
    /// Time since the clock's origin.
    fn elapsed(&self) -> Duration;

    /// Resolve once [`elapsed`](Clock::elapsed) has reached `deadline`.
    ///
    /// Returns immediately if the deadline has already passed.
    fn sleep_until(&mut self, deadline: Duration) -> impl Future<Output = ()>;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) -> impl Future<Output = ()> {
        (**self).sleep_until(deadline)
    }
}

/// Host clock backed by [`std::time::Instant`], sleeping the current thread.
#[cfg(feature = "std")]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep_until(&mut self, deadline: Duration) {
        if let Some(remaining) = deadline.checked_sub(self.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
