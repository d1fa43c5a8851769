//! Control and reporter slot tables.
//!
//! Slots borrow application-owned [`Cell`]s: the application keeps reading
//! and writing its values as usual, the registry writes incoming control
//! updates into them and samples reporters when a frame is due. A slot's
//! index is its registration position and doubles as its wire identifier.

use core::cell::Cell;

use heapless::Vec;
use livetune_proto::{ControlValue, NumberFormat, Sample};

use crate::config::{Coercion, MAX_CONTROLS, MAX_REPORTERS};
use crate::message::MessageError;

/// Error type for widget registration.
///
/// A failed registration leaves every registry and the schema unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// Not enough free control or reporter slots.
    CapacityExceeded,
    /// Title longer than [`MAX_TITLE_LENGTH`](crate::config::MAX_TITLE_LENGTH) bytes.
    TitleTooLong,
    /// Title contains `\r` or `\n`.
    InvalidTitle,
    /// Plot registered without any series.
    EmptySeries,
    /// The schema line has no room for the record.
    SchemaOverflow,
}

impl core::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "slot capacity exceeded"),
            Self::TitleTooLong => write!(f, "title too long"),
            Self::InvalidTitle => write!(f, "title contains a delimiter"),
            Self::EmptySeries => write!(f, "plot has no series"),
            Self::SchemaOverflow => write!(f, "schema capacity exceeded"),
        }
    }
}

/// Index of a registered control. For a joystick this is the x axis; the
/// y axis is the next index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlId(pub u16);

impl ControlId {
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// Index of a registered reporter. For a plot this is the first series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReporterId(pub u16);

impl ReporterId {
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// Widget a control slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    Toggle,
    Button,
    Slider,
    JoystickX,
    JoystickY,
}

/// The application value a control slot writes to.
#[derive(Clone, Copy, Debug)]
pub enum ControlStorage<'a> {
    Bool(&'a Cell<bool>),
    Float(&'a Cell<f32>),
}

#[derive(Clone, Copy, Debug)]
pub struct ControlSlot<'a> {
    pub kind: ControlKind,
    pub storage: ControlStorage<'a>,
}

impl<'a> ControlSlot<'a> {
    #[must_use]
    pub const fn toggle(cell: &'a Cell<bool>) -> Self {
        Self {
            kind: ControlKind::Toggle,
            storage: ControlStorage::Bool(cell),
        }
    }

    #[must_use]
    pub const fn button(cell: &'a Cell<bool>) -> Self {
        Self {
            kind: ControlKind::Button,
            storage: ControlStorage::Bool(cell),
        }
    }

    #[must_use]
    pub const fn float(kind: ControlKind, cell: &'a Cell<f32>) -> Self {
        Self {
            kind,
            storage: ControlStorage::Float(cell),
        }
    }

    /// Store `value`, converting or rejecting on a type mismatch according
    /// to `coercion`. `index` is only used for the error.
    pub fn apply(
        &self,
        index: u16,
        value: ControlValue,
        coercion: Coercion,
    ) -> Result<(), MessageError> {
        match (self.storage, value, coercion) {
            (ControlStorage::Bool(cell), ControlValue::Bool(b), _) => cell.set(b),
            (ControlStorage::Float(cell), ControlValue::Number(v), _) => cell.set(v),
            (ControlStorage::Bool(cell), v, Coercion::Lenient) => cell.set(v.to_bool()),
            (ControlStorage::Float(cell), v, Coercion::Lenient) => cell.set(v.to_f32()),
            (_, _, Coercion::Strict) => return Err(MessageError::TypeMismatch(index)),
        }
        Ok(())
    }
}

/// Fixed-capacity table of control slots.
#[derive(Debug, Default)]
pub struct ControlRegistry<'a> {
    slots: Vec<ControlSlot<'a>, MAX_CONTROLS>,
}

impl<'a> ControlRegistry<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Free slots left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_CONTROLS - self.slots.len()
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&ControlSlot<'a>> {
        self.slots.get(usize::from(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlSlot<'a>> {
        self.slots.iter()
    }

    /// Append `slots` at consecutive indices, all or nothing.
    pub fn insert(&mut self, slots: &[ControlSlot<'a>]) -> Result<ControlId, RegisterError> {
        let first = self.next_id();
        self.slots
            .extend_from_slice(slots)
            .map_err(|()| RegisterError::CapacityExceeded)?;
        Ok(first)
    }

    /// Apply a decoded update to the slot at `index`.
    pub fn apply(
        &self,
        index: u16,
        value: ControlValue,
        coercion: Coercion,
    ) -> Result<(), MessageError> {
        self.get(index)
            .ok_or(MessageError::UnknownIndex(index))?
            .apply(index, value, coercion)
    }

    fn next_id(&self) -> ControlId {
        // MAX_CONTROLS is far below u16::MAX
        ControlId(self.slots.len() as u16)
    }
}

/// The application value a reporter samples.
#[derive(Clone, Copy, Debug)]
pub enum ReporterStorage<'a> {
    Float(&'a Cell<f32>),
    Int(&'a Cell<i32>),
}

impl ReporterStorage<'_> {
    #[must_use]
    pub fn sample(&self) -> Sample {
        match self {
            Self::Float(cell) => Sample::from_f32(cell.get()),
            Self::Int(cell) => Sample::from_i32(cell.get()),
        }
    }

    #[must_use]
    pub const fn format(&self) -> NumberFormat {
        match self {
            Self::Float(_) => NumberFormat::Float,
            Self::Int(_) => NumberFormat::Int,
        }
    }
}

impl<'a> From<&'a Cell<f32>> for ReporterStorage<'a> {
    fn from(cell: &'a Cell<f32>) -> Self {
        Self::Float(cell)
    }
}

impl<'a> From<&'a Cell<i32>> for ReporterStorage<'a> {
    fn from(cell: &'a Cell<i32>) -> Self {
        Self::Int(cell)
    }
}

/// Fixed-capacity table of reporter slots.
#[derive(Debug, Default)]
pub struct ReporterRegistry<'a> {
    slots: Vec<ReporterStorage<'a>, MAX_REPORTERS>,
}

impl<'a> ReporterRegistry<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_REPORTERS - self.slots.len()
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&ReporterStorage<'a>> {
        self.slots.get(usize::from(index))
    }

    /// Append reporters at consecutive indices, all or nothing.
    pub fn insert(
        &mut self,
        storage: impl ExactSizeIterator<Item = ReporterStorage<'a>>,
    ) -> Result<ReporterId, RegisterError> {
        if storage.len() > self.remaining() {
            return Err(RegisterError::CapacityExceeded);
        }
        // MAX_REPORTERS is far below u16::MAX
        let first = ReporterId(self.slots.len() as u16);
        for slot in storage {
            self.slots
                .push(slot)
                .map_err(|_| RegisterError::CapacityExceeded)?;
        }
        Ok(first)
    }

    /// Sample every reporter in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Sample, MAX_REPORTERS> {
        self.slots.iter().map(ReporterStorage::sample).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_apply() {
        let flag = Cell::new(false);
        let gain = Cell::new(0.0f32);
        let mut controls = ControlRegistry::new();
        controls.insert(&[ControlSlot::toggle(&flag)]).unwrap();
        controls
            .insert(&[ControlSlot::float(ControlKind::Slider, &gain)])
            .unwrap();

        controls
            .apply(0, ControlValue::Bool(true), Coercion::Strict)
            .unwrap();
        assert!(flag.get());
        controls
            .apply(1, ControlValue::Number(2.75), Coercion::Strict)
            .unwrap();
        assert_eq!(gain.get(), 2.75);

        assert_eq!(
            controls.apply(0, ControlValue::Number(0.0), Coercion::Strict),
            Err(MessageError::TypeMismatch(0))
        );
        assert_eq!(
            controls.apply(1, ControlValue::Bool(false), Coercion::Strict),
            Err(MessageError::TypeMismatch(1))
        );
        assert!(flag.get());
        assert_eq!(gain.get(), 2.75);
    }

    #[test]
    fn test_lenient_apply_converts() {
        let flag = Cell::new(false);
        let gain = Cell::new(0.0f32);
        let mut controls = ControlRegistry::new();
        controls
            .insert(&[
                ControlSlot::button(&flag),
                ControlSlot::float(ControlKind::Slider, &gain),
            ])
            .unwrap();

        controls
            .apply(0, ControlValue::Number(2.5), Coercion::Lenient)
            .unwrap();
        assert!(flag.get());
        controls
            .apply(0, ControlValue::Number(0.0), Coercion::Lenient)
            .unwrap();
        assert!(!flag.get());
        controls
            .apply(1, ControlValue::Bool(true), Coercion::Lenient)
            .unwrap();
        assert_eq!(gain.get(), 1.0);
    }

    #[test]
    fn test_unknown_index() {
        let controls = ControlRegistry::new();
        assert_eq!(
            controls.apply(0, ControlValue::Bool(true), Coercion::Lenient),
            Err(MessageError::UnknownIndex(0))
        );
    }

    #[test]
    fn test_control_insert_is_all_or_nothing() {
        let cells: [Cell<bool>; MAX_CONTROLS] = core::array::from_fn(|_| Cell::new(false));
        let x = Cell::new(0.0f32);
        let mut controls = ControlRegistry::new();
        for cell in &cells[..MAX_CONTROLS - 1] {
            controls.insert(&[ControlSlot::toggle(cell)]).unwrap();
        }
        let pair = [
            ControlSlot::float(ControlKind::JoystickX, &x),
            ControlSlot::float(ControlKind::JoystickY, &x),
        ];
        assert_eq!(controls.insert(&pair), Err(RegisterError::CapacityExceeded));
        assert_eq!(controls.len(), MAX_CONTROLS - 1);

        let last = controls
            .insert(&[ControlSlot::toggle(&cells[MAX_CONTROLS - 1])])
            .unwrap();
        assert_eq!(last, ControlId(MAX_CONTROLS as u16 - 1));
        assert_eq!(controls.remaining(), 0);
    }

    #[test]
    fn test_reporter_snapshot_order() {
        let speed = Cell::new(1.5f32);
        let ticks = Cell::new(-3i32);
        let mut reporters = ReporterRegistry::new();
        let first = reporters
            .insert([ReporterStorage::from(&speed)].into_iter())
            .unwrap();
        let second = reporters
            .insert([ReporterStorage::from(&ticks)].into_iter())
            .unwrap();
        assert_eq!((first, second), (ReporterId(0), ReporterId(1)));

        let samples = reporters.snapshot();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].as_f32(), 1.5);
        assert_eq!(samples[1].as_i32(), -3);

        speed.set(2.0);
        assert_eq!(reporters.snapshot()[0].as_f32(), 2.0);
    }

    #[test]
    fn test_reporter_insert_over_capacity() {
        let cells: [Cell<f32>; MAX_REPORTERS + 1] = core::array::from_fn(|_| Cell::new(0.0));
        let mut reporters = ReporterRegistry::new();
        assert_eq!(
            reporters.insert(cells.iter().map(ReporterStorage::from)),
            Err(RegisterError::CapacityExceeded)
        );
        assert!(reporters.is_empty());
        reporters
            .insert(cells[..MAX_REPORTERS].iter().map(ReporterStorage::from))
            .unwrap();
        assert_eq!(reporters.remaining(), 0);
        assert_eq!(reporters.get(0).map(ReporterStorage::format), Some(NumberFormat::Float));
    }
}
