//! Runtime configuration and capacity limits.

use core::time::Duration;

pub use livetune_proto::{MAX_LINE_LENGTH, MAX_TITLE_LENGTH};

/// Number of control slots (a joystick takes two).
pub const MAX_CONTROLS: usize = 16;

/// Number of reporter slots (a plot takes one per series).
pub const MAX_REPORTERS: usize = 16;

/// Byte capacity of the advertised schema line, terminator excluded.
pub const SCHEMA_CAPACITY: usize = 1024;

/// Schema retransmission interval while no host is connected.
pub const DEFAULT_ADVERTISE_PERIOD: Duration = Duration::from_secs(1);

/// How a control update is written when its token type does not match the
/// slot it targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Coercion {
    /// Reject the update: booleans only into toggles and buttons, numbers
    /// only into sliders and joystick axes.
    #[default]
    Strict,
    /// Convert: `true`/`false` become `1.0`/`0.0`, numbers become `!= 0`.
    Lenient,
}

/// Timing and decoding parameters.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use livetune_core::{Coercion, Config};
///
/// let config = Config::new(Duration::from_millis(20), Duration::from_millis(100))
///     .with_coercion(Coercion::Lenient);
/// assert_eq!(config.advertise_period, Duration::from_secs(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Minimum time between the starts of consecutive steps.
    pub step_period: Duration,
    /// Interval between report frames while connected.
    pub report_period: Duration,
    /// Interval between schema advertisements while disconnected.
    pub advertise_period: Duration,
    pub coercion: Coercion,
}

impl Config {
    #[must_use]
    pub const fn new(step_period: Duration, report_period: Duration) -> Self {
        Self {
            step_period,
            report_period,
            advertise_period: DEFAULT_ADVERTISE_PERIOD,
            coercion: Coercion::Strict,
        }
    }

    #[must_use]
    pub const fn with_advertise_period(mut self, period: Duration) -> Self {
        self.advertise_period = period;
        self
    }

    #[must_use]
    pub const fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }
}
