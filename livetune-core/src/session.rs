//! Connection state machine.
//!
//! ```text
//!                 handshake (\n)
//!   Disconnected ───────────────▶ Active
//!        ▲                          │
//!        └──────────────────────────┘
//!            negative control index
//! ```
//!
//! While disconnected the schema is advertised every advertise period;
//! while active a report frame is due every report period.

use core::time::Duration;

use crate::config::Config;
use crate::logging::info;
use crate::scheduler::PeriodicTimer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Advertising the schema, waiting for the host handshake.
    #[default]
    Disconnected,
    /// Exchanging control updates and report frames.
    Active,
}

/// Session state plus its two cadence timers.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    state: SessionState,
    advertise: PeriodicTimer,
    report: PeriodicTimer,
}

impl Session {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            state: SessionState::Disconnected,
            advertise: PeriodicTimer::new(config.advertise_period),
            report: PeriodicTimer::new(config.report_period),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Host acknowledged the schema. The next report is due at once.
    pub fn handshake(&mut self) {
        if self.state == SessionState::Disconnected {
            info!("host connected");
            self.state = SessionState::Active;
            self.report.reset();
        }
    }

    /// Host ended the session. The next advertisement is due at once.
    pub fn disconnect(&mut self) {
        if self.state == SessionState::Active {
            info!("host disconnected");
            self.state = SessionState::Disconnected;
            self.advertise.reset();
        }
    }

    /// Whether to send the schema now; restarts the advertise period if so.
    pub fn poll_advertise(&mut self, now: Duration) -> bool {
        self.state == SessionState::Disconnected && self.advertise.poll(now)
    }

    /// Whether to send a report frame now; restarts the report period if so.
    pub fn poll_report(&mut self, now: Duration) -> bool {
        self.state == SessionState::Active && self.report.poll(now)
    }
}
