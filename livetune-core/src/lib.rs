//! Platform-agnostic runtime for live-tunable firmware values.
//!
//! An application registers controls (values the host console can set) and
//! reporters (values it displays) on a [`Dashboard`], then connects it to a
//! [`Transport`] and a [`Clock`]. The resulting [`CommManager`] is driven by
//! calling [`CommManager::step`] from the main loop.
//!
//! # Overview
//!
//! - [`dashboard`]: registration ([`Dashboard`])
//! - [`registry`]: control and reporter slot tables
//! - [`schema`]: the advertised schema line
//! - [`session`]: `Disconnected` / `Active` state machine
//! - [`scheduler`]: cadence timers and step pacing ([`Headroom`])
//! - [`manager`]: the running link ([`CommManager`])
//! - [`transport`] / [`clock`]: platform traits
//!
//! # Example
//!
//! ```
//! use core::cell::Cell;
//! use core::time::Duration;
//! use embassy_futures::block_on;
//! use livetune_core::{Config, Dashboard, NullTransport, TransportError};
//! # use livetune_core::Clock;
//! # struct Fixed;
//! # impl Clock for Fixed {
//! #     fn elapsed(&self) -> Duration { Duration::ZERO }
//! #     async fn sleep_until(&mut self, _deadline: Duration) {}
//! # }
//!
//! let enable = Cell::new(false);
//! let mut dash = Dashboard::new(Config::new(
//!     Duration::from_millis(20),
//!     Duration::from_millis(100),
//! ));
//! dash.add_toggle(&enable, "Enable").unwrap();
//!
//! // No socket backend on this target.
//! let link = block_on(dash.connect(NullTransport, Fixed));
//! assert_eq!(link.err(), Some(TransportError::Unsupported));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support and [`StdClock`]
//! - **`defmt`**: Log through defmt instead of `log`, derive `defmt::Format`
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default. All tables have fixed capacity
//! (see [`config`]); nothing is allocated.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

mod logging;

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod manager;
pub mod message;
pub mod registry;
pub mod scheduler;
pub mod schema;
pub mod session;
pub mod transport;

#[cfg(feature = "std")]
pub use clock::StdClock;
pub use clock::Clock;
pub use config::{
    Coercion, Config, DEFAULT_ADVERTISE_PERIOD, MAX_CONTROLS, MAX_LINE_LENGTH, MAX_REPORTERS,
    MAX_TITLE_LENGTH, SCHEMA_CAPACITY,
};
pub use dashboard::Dashboard;
pub use manager::{CommManager, LinkError, LinkStats};
pub use message::{LineBuffer, MessageError};
pub use registry::{
    ControlId, ControlKind, ControlRegistry, ControlSlot, ControlStorage, RegisterError,
    ReporterId, ReporterRegistry, ReporterStorage,
};
pub use scheduler::{Headroom, PeriodicTimer, StepPacer};
pub use schema::SchemaBuilder;
pub use session::{Session, SessionState};
pub use transport::{NullTransport, Transport, TransportError};
