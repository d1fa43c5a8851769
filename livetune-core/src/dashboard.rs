//! Widget registration.
//!
//! A [`Dashboard`] collects controls and reporters before the link starts.
//! [`Dashboard::connect`] consumes it, so nothing can be registered once the
//! schema has been advertised.

use core::cell::Cell;
use core::ops::RangeInclusive;

use livetune_proto::Widget;

use crate::clock::Clock;
use crate::config::Config;
use crate::logging::debug;
use crate::manager::CommManager;
use crate::registry::{
    ControlId, ControlKind, ControlRegistry, ControlSlot, RegisterError, ReporterId,
    ReporterRegistry, ReporterStorage,
};
use crate::schema::SchemaBuilder;
use crate::transport::{Transport, TransportError};

/// Registration phase of a live-tuning link.
///
/// Every `add_*` call appends one schema record and claims the next free
/// slot indices. A call that fails changes nothing.
///
/// # Example
///
/// ```
/// use core::cell::Cell;
/// use core::time::Duration;
/// use livetune_core::{Config, Dashboard};
///
/// let enable = Cell::new(false);
/// let speed = Cell::new(0.0f32);
///
/// let mut dash = Dashboard::new(Config::new(
///     Duration::from_millis(20),
///     Duration::from_millis(100),
/// ));
/// let id = dash.add_toggle(&enable, "Enable").unwrap();
/// dash.add_number(&speed, "Speed").unwrap();
///
/// assert_eq!(id.index(), 0);
/// assert_eq!(dash.schema(), "T\rEnable\rN\rSpeed\rfloat\r");
/// ```
pub struct Dashboard<'a> {
    config: Config,
    controls: ControlRegistry<'a>,
    reporters: ReporterRegistry<'a>,
    schema: SchemaBuilder,
}

impl<'a> Dashboard<'a> {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            controls: ControlRegistry::new(),
            reporters: ReporterRegistry::new(),
            schema: SchemaBuilder::new(),
        }
    }

    /// On/off switch.
    pub fn add_toggle(
        &mut self,
        value: &'a Cell<bool>,
        title: &str,
    ) -> Result<ControlId, RegisterError> {
        self.register_controls(&Widget::Toggle { title }, &[ControlSlot::toggle(value)])
    }

    /// Momentary push button; `value` is true while held.
    pub fn add_button(
        &mut self,
        value: &'a Cell<bool>,
        title: &str,
    ) -> Result<ControlId, RegisterError> {
        self.register_controls(&Widget::Button { title }, &[ControlSlot::button(value)])
    }

    /// Numeric slider over `range` in steps of `resolution`.
    ///
    /// With `toggle` set the host also renders a switch that enables the
    /// slider.
    pub fn add_slider(
        &mut self,
        value: &'a Cell<f32>,
        title: &str,
        range: RangeInclusive<f32>,
        resolution: f32,
        toggle: bool,
    ) -> Result<ControlId, RegisterError> {
        let widget = Widget::Slider {
            title,
            min: *range.start(),
            max: *range.end(),
            resolution,
            toggle,
        };
        self.register_controls(&widget, &[ControlSlot::float(ControlKind::Slider, value)])
    }

    /// Two-axis joystick. Takes two consecutive control indices: the
    /// returned one for `x`, the next one for `y`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_joystick(
        &mut self,
        x: &'a Cell<f32>,
        y: &'a Cell<f32>,
        title: &str,
        x_range: RangeInclusive<f32>,
        y_range: RangeInclusive<f32>,
        resolution: f32,
        sticky: bool,
    ) -> Result<ControlId, RegisterError> {
        let widget = Widget::Joystick {
            title,
            x_min: *x_range.start(),
            x_max: *x_range.end(),
            y_min: *y_range.start(),
            y_max: *y_range.end(),
            resolution,
            sticky,
        };
        self.register_controls(
            &widget,
            &[
                ControlSlot::float(ControlKind::JoystickX, x),
                ControlSlot::float(ControlKind::JoystickY, y),
            ],
        )
    }

    /// Scrolling plot with one trace per cell of `series`, showing the last
    /// `steps_displayed` reports. Each series takes one reporter index.
    pub fn add_plot(
        &mut self,
        series: &'a [Cell<f32>],
        title: &str,
        y_range: RangeInclusive<f32>,
        steps_displayed: u32,
    ) -> Result<ReporterId, RegisterError> {
        if series.is_empty() {
            return Err(RegisterError::EmptySeries);
        }
        let widget = Widget::Plot {
            title,
            y_min: *y_range.start(),
            y_max: *y_range.end(),
            steps_displayed,
            series: u32::try_from(series.len()).map_err(|_| RegisterError::CapacityExceeded)?,
        };
        self.register_reporters(&widget, series.iter().map(ReporterStorage::Float))
    }

    /// Single numeric readout of a `Cell<f32>` or `Cell<i32>`.
    pub fn add_number(
        &mut self,
        value: impl Into<ReporterStorage<'a>>,
        title: &str,
    ) -> Result<ReporterId, RegisterError> {
        let storage = value.into();
        let widget = Widget::Number {
            title,
            format: storage.format(),
        };
        self.register_reporters(&widget, core::iter::once(storage))
    }

    /// The schema line as it will be advertised, without the newline.
    #[must_use]
    pub fn schema(&self) -> &str {
        self.schema.as_str()
    }

    #[must_use]
    pub fn controls(&self) -> &ControlRegistry<'a> {
        &self.controls
    }

    #[must_use]
    pub fn reporters(&self) -> &ReporterRegistry<'a> {
        &self.reporters
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Open `transport` and start the link.
    ///
    /// Waits until the transport is ready and discards anything it received
    /// before. The returned manager starts out disconnected and advertises
    /// on its first step.
    pub async fn connect<T: Transport, C: Clock>(
        self,
        mut transport: T,
        clock: C,
    ) -> Result<CommManager<'a, T, C>, TransportError> {
        transport.open().await?;
        debug!(
            "link open: {} controls, {} reporters, schema {} bytes",
            self.controls.len(),
            self.reporters.len(),
            self.schema.as_str().len()
        );
        Ok(CommManager::new(
            transport,
            clock,
            self.config,
            self.controls,
            self.reporters,
            self.schema,
        ))
    }

    fn register_controls(
        &mut self,
        widget: &Widget<'_>,
        slots: &[ControlSlot<'a>],
    ) -> Result<ControlId, RegisterError> {
        if slots.len() > self.controls.remaining() {
            return Err(RegisterError::CapacityExceeded);
        }
        let record = self.schema.encode(widget)?;
        self.schema.commit(&record)?;
        let id = self.controls.insert(slots)?;
        debug!("registered control {} at index {}", widget.title(), id.index());
        Ok(id)
    }

    fn register_reporters(
        &mut self,
        widget: &Widget<'_>,
        storage: impl ExactSizeIterator<Item = ReporterStorage<'a>>,
    ) -> Result<ReporterId, RegisterError> {
        if storage.len() > self.reporters.remaining() {
            return Err(RegisterError::CapacityExceeded);
        }
        let record = self.schema.encode(widget)?;
        self.schema.commit(&record)?;
        let id = self.reporters.insert(storage)?;
        debug!("registered reporter {} at index {}", widget.title(), id.index());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn dashboard<'a>() -> Dashboard<'a> {
        Dashboard::new(Config::new(
            Duration::from_millis(20),
            Duration::from_millis(100),
        ))
    }

    #[test]
    fn test_indices_follow_registration_order() {
        let a = Cell::new(false);
        let b = Cell::new(false);
        let x = Cell::new(0.0f32);
        let y = Cell::new(0.0f32);
        let mut dash = dashboard();

        assert_eq!(dash.add_toggle(&a, "A"), Ok(ControlId(0)));
        assert_eq!(
            dash.add_joystick(&x, &y, "Stick", -1.0..=1.0, -1.0..=1.0, 0.1, false),
            Ok(ControlId(1))
        );
        assert_eq!(dash.add_button(&b, "B"), Ok(ControlId(3)));
        assert_eq!(dash.controls().len(), 4);
        assert_eq!(
            dash.controls().get(2).map(|slot| slot.kind),
            Some(ControlKind::JoystickY)
        );
    }

    #[test]
    fn test_plot_takes_one_reporter_per_series() {
        let series = [Cell::new(0.0f32), Cell::new(0.0), Cell::new(0.0)];
        let count = Cell::new(0i32);
        let mut dash = dashboard();

        assert_eq!(
            dash.add_plot(&series, "Angles", -90.0..=90.0, 200),
            Ok(ReporterId(0))
        );
        assert_eq!(dash.add_number(&count, "Count"), Ok(ReporterId(3)));
        assert_eq!(
            dash.schema(),
            "P\rAngles\r-90.000000\r90.000000\r200\r3\rN\rCount\rint\r"
        );
    }

    #[test]
    fn test_empty_plot_rejected() {
        let none: [Cell<f32>; 0] = [];
        let mut dash = dashboard();
        assert_eq!(
            dash.add_plot(&none, "Nothing", 0.0..=1.0, 10),
            Err(RegisterError::EmptySeries)
        );
        assert_eq!(dash.schema(), "");
    }

    #[test]
    fn test_failed_registration_changes_nothing() {
        let flag = Cell::new(false);
        let mut dash = dashboard();
        dash.add_toggle(&flag, "Ok").unwrap();
        let schema_before = dash.schema().len();

        assert_eq!(
            dash.add_toggle(&flag, "this title is definitely too long"),
            Err(RegisterError::TitleTooLong)
        );
        assert_eq!(
            dash.add_toggle(&flag, "bad\rtitle"),
            Err(RegisterError::InvalidTitle)
        );
        assert_eq!(dash.schema().len(), schema_before);
        assert_eq!(dash.controls().len(), 1);
    }

    #[test]
    fn test_slider_record() {
        let gain = Cell::new(1.0f32);
        let mut dash = dashboard();
        dash.add_slider(&gain, "Gain", 0.0..=10.0, 0.5, true).unwrap();
        assert_eq!(dash.schema(), "S\rGain\r0.000000\r10.000000\r0.500000\rTrue\r");
    }
}
