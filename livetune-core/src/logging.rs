//! Logging macros.
//!
//! With the `defmt` feature the defmt macros are used directly; otherwise
//! the `log` facade is used, so host builds can attach any logger.

#![allow(unused_imports)]

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, info, trace, warn};

#[cfg(not(feature = "defmt"))]
pub(crate) use log::{debug, info, trace, warn};
