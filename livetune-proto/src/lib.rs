//! Wire protocol for exposing live-tunable values to a host console.
//!
//! A device advertises which widgets it offers, the host answers with a
//! handshake, and from then on the two sides exchange small messages over a
//! plain byte stream (usually a serial line):
//!
//! - **Schema** ([`schema`]): one text line describing every registered
//!   control and reporter, retransmitted until the host connects
//! - **Control updates** ([`parser`]): `<index>:<value>\n` lines from the host
//! - **Report frames** ([`serialize`]): `R` plus 4 raw bytes per reporter
//! - **Debug frames**: `D`, free text, then a zero byte
//!
//! # Protocol Format
//!
//! ## Handshake
//!
//! The host sends a single `\n` to acknowledge the schema.
//!
//! ## Control Update
//!
//! ```text
//! <index>:<value>\n
//! ```
//!
//! - `index` - registration index of the control; negative means disconnect
//! - `value` - `true`, `false`, or a decimal number
//!
//! ## Report Frame
//!
//! ```text
//! R<b0 b1 b2 b3><b0 b1 b2 b3>...
//! ```
//!
//! One little-endian `f32` or `i32` per reporter, in registration order.
//!
//! # Examples
//!
//! ## Parsing a Control Update
//!
//! ```
//! use livetune_proto::{parse_control_update, ControlUpdate, ControlValue};
//!
//! let update = parse_control_update(b"1:0.5\n").unwrap();
//! assert_eq!(update, ControlUpdate::Set { index: 1, value: ControlValue::Number(0.5) });
//! ```
//!
//! ## Writing a Schema Record
//!
//! ```
//! use livetune_proto::Widget;
//!
//! let mut line = String::new();
//! Widget::Toggle { title: "Enable" }.write_record(&mut line).unwrap();
//! assert_eq!(line, "T\rEnable\r");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `serialize_to_vec()` methods
//! - **`embedded-io`**: Enable `serialize_io()` methods for I/O peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod builder;
pub mod parser;
pub mod schema;
pub mod serialize;
pub mod types;

// Re-export types at crate root for convenience
pub use builder::{ControlBuilder, DisconnectBuilder, MessageBuilder};
pub use parser::{
    parse_control_update, parse_debug, parse_frame, parse_report, parse_value, strip_line_ending,
    Frame, FrameError, ParseError, ReportSamples, MAX_LINE_LENGTH,
};
pub use schema::{
    records, NumberFormat, Record, Records, SchemaError, TitleError, Widget, WidgetTag,
    FIELD_DELIMITER, MAX_RECORD_FIELDS, MAX_RECORD_LENGTH, MAX_TITLE_LENGTH,
};
pub use serialize::{ReportFrame, Serialize, SerializeError, MAX_UPDATE_SIZE};
pub use types::{
    ControlUpdate, ControlValue, Sample, DEBUG_TAG, DEBUG_TERMINATOR, HANDSHAKE, REPORT_TAG,
    SAMPLE_SIZE,
};
