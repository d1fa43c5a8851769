//! Schema records: the widget description advertised to the host.
//!
//! Every registered control or reporter contributes one record. A record is
//! a one-letter tag followed by its fields, each terminated by
//! [`FIELD_DELIMITER`]. Records are concatenated into a single line, so the
//! host reads the whole schema as one flat token stream:
//!
//! ```text
//! T\rEnable\rS\rGain\r0.000000\r10.000000\r0.100000\rFalse\rN\rSpeed\rfloat\r\n
//! ```
//!
//! | Widget   | Tag | Fields after the tag                                   |
//! |----------|-----|--------------------------------------------------------|
//! | Toggle   | `T` | title                                                  |
//! | Button   | `B` | title                                                  |
//! | Slider   | `S` | title, min, max, resolution, toggle flag               |
//! | Joystick | `J` | title, x min, x max, y min, y max, resolution, sticky  |
//! | Plot     | `P` | title, y min, y max, steps displayed, series count     |
//! | Number   | `N` | title, `float` or `int`                                |
//!
//! Reals are written with six fractional digits, flags as `True`/`False`.

use core::fmt::{self, Write};

/// Separator and terminator of every record field.
pub const FIELD_DELIMITER: char = '\r';

/// Maximum title length in bytes.
pub const MAX_TITLE_LENGTH: usize = 30;

/// Upper bound on one encoded record.
///
/// Largest case is a joystick with five reals at `f32::MIN` (47 bytes each
/// with six fractional digits) and a full-length title.
pub const MAX_RECORD_LENGTH: usize = 288;

/// Most fields any record carries after its tag.
pub const MAX_RECORD_FIELDS: usize = 7;

/// Widget kind, identified on the wire by a single letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetTag {
    Toggle,
    Button,
    Slider,
    Joystick,
    Plot,
    Number,
}

impl WidgetTag {
    /// The tag letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Toggle => 'T',
            Self::Button => 'B',
            Self::Slider => 'S',
            Self::Joystick => 'J',
            Self::Plot => 'P',
            Self::Number => 'N',
        }
    }

    /// Look up a tag by its token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "T" => Self::Toggle,
            "B" => Self::Button,
            "S" => Self::Slider,
            "J" => Self::Joystick,
            "P" => Self::Plot,
            "N" => Self::Number,
            _ => return None,
        })
    }

    /// Number of fields following the tag, title included.
    #[must_use]
    pub const fn field_count(self) -> usize {
        match self {
            Self::Toggle | Self::Button => 1,
            Self::Number => 2,
            Self::Slider | Self::Plot => 5,
            Self::Joystick => 7,
        }
    }
}

/// Storage type of a number reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumberFormat {
    Float,
    Int,
}

impl NumberFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
        }
    }
}

/// Why a title cannot be advertised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TitleError {
    /// Longer than [`MAX_TITLE_LENGTH`] bytes.
    TooLong,
    /// Contains the field delimiter or a line terminator.
    InvalidCharacter,
}

/// One schema record, borrowed from its registration call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Widget<'t> {
    Toggle {
        title: &'t str,
    },
    /// Momentary push button.
    Button {
        title: &'t str,
    },
    Slider {
        title: &'t str,
        min: f32,
        max: f32,
        resolution: f32,
        /// Host renders a toggle that gates the slider.
        toggle: bool,
    },
    /// Two-axis control; backs two consecutive control slots (x, then y).
    Joystick {
        title: &'t str,
        x_min: f32,
        x_max: f32,
        y_min: f32,
        y_max: f32,
        resolution: f32,
        /// Stays where released instead of springing back to center.
        sticky: bool,
    },
    Plot {
        title: &'t str,
        y_min: f32,
        y_max: f32,
        steps_displayed: u32,
        series: u32,
    },
    Number {
        title: &'t str,
        format: NumberFormat,
    },
}

impl<'t> Widget<'t> {
    #[must_use]
    pub const fn tag(&self) -> WidgetTag {
        match self {
            Self::Toggle { .. } => WidgetTag::Toggle,
            Self::Button { .. } => WidgetTag::Button,
            Self::Slider { .. } => WidgetTag::Slider,
            Self::Joystick { .. } => WidgetTag::Joystick,
            Self::Plot { .. } => WidgetTag::Plot,
            Self::Number { .. } => WidgetTag::Number,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'t str {
        match self {
            Self::Toggle { title }
            | Self::Button { title }
            | Self::Slider { title, .. }
            | Self::Joystick { title, .. }
            | Self::Plot { title, .. }
            | Self::Number { title, .. } => *title,
        }
    }

    /// Check the title against the length limit and the delimiter.
    pub fn validate_title(&self) -> Result<(), TitleError> {
        let title = self.title();
        if title.len() > MAX_TITLE_LENGTH {
            return Err(TitleError::TooLong);
        }
        if title.contains([FIELD_DELIMITER, '\n']) {
            return Err(TitleError::InvalidCharacter);
        }
        Ok(())
    }

    /// Append this widget's record to `out`.
    pub fn write_record<W: Write>(&self, out: &mut W) -> fmt::Result {
        let mut rec = RecordWriter { out };
        rec.field(self.tag().as_char())?;
        rec.field(self.title())?;
        match *self {
            Self::Toggle { .. } | Self::Button { .. } => {}
            Self::Slider {
                min,
                max,
                resolution,
                toggle,
                ..
            } => {
                rec.real(min)?;
                rec.real(max)?;
                rec.real(resolution)?;
                rec.flag(toggle)?;
            }
            Self::Joystick {
                x_min,
                x_max,
                y_min,
                y_max,
                resolution,
                sticky,
                ..
            } => {
                rec.real(x_min)?;
                rec.real(x_max)?;
                rec.real(y_min)?;
                rec.real(y_max)?;
                rec.real(resolution)?;
                rec.flag(sticky)?;
            }
            Self::Plot {
                y_min,
                y_max,
                steps_displayed,
                series,
                ..
            } => {
                rec.real(y_min)?;
                rec.real(y_max)?;
                rec.field(steps_displayed)?;
                rec.field(series)?;
            }
            Self::Number { format, .. } => {
                rec.field(format.as_str())?;
            }
        }
        Ok(())
    }
}

/// Writes delimiter-terminated fields.
struct RecordWriter<'w, W> {
    out: &'w mut W,
}

impl<W: Write> RecordWriter<'_, W> {
    fn field(&mut self, value: impl fmt::Display) -> fmt::Result {
        write!(self.out, "{}{}", value, FIELD_DELIMITER)
    }

    fn real(&mut self, value: f32) -> fmt::Result {
        write!(self.out, "{:.6}{}", value, FIELD_DELIMITER)
    }

    fn flag(&mut self, value: bool) -> fmt::Result {
        self.field(if value { "True" } else { "False" })
    }
}

// ---------------------------------------------------------------------------
// Host-side reader
// ---------------------------------------------------------------------------

/// Error type for schema decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchemaError {
    /// A record starts with an unknown tag.
    UnknownTag,
    /// The schema ends in the middle of a record.
    MissingField,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag => write!(f, "unknown record tag"),
            Self::MissingField => write!(f, "record is missing fields"),
        }
    }
}

/// A decoded schema record: tag plus raw field tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record<'s> {
    pub tag: WidgetTag,
    fields: [&'s str; MAX_RECORD_FIELDS],
}

impl<'s> Record<'s> {
    #[must_use]
    pub fn title(&self) -> &'s str {
        self.fields[0]
    }

    /// All fields after the tag, title first.
    #[must_use]
    pub fn fields(&self) -> &[&'s str] {
        &self.fields[..self.tag.field_count()]
    }

    /// Control slots this record occupies on the device.
    #[must_use]
    pub fn control_slots(&self) -> usize {
        match self.tag {
            WidgetTag::Toggle | WidgetTag::Button | WidgetTag::Slider => 1,
            WidgetTag::Joystick => 2,
            WidgetTag::Plot | WidgetTag::Number => 0,
        }
    }

    /// Samples this record contributes to each report frame.
    #[must_use]
    pub fn reporter_slots(&self) -> usize {
        match self.tag {
            WidgetTag::Number => 1,
            WidgetTag::Plot => self.fields[4].parse().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Iterator over the records of an advertised schema line.
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct Records<'s> {
    tokens: core::str::Split<'s, char>,
    failed: bool,
}

/// Split a schema line into records.
///
/// A trailing line terminator is accepted.
///
/// # Example
///
/// ```
/// use livetune_proto::{records, WidgetTag};
///
/// let mut it = records("T\rEnable\rN\rSpeed\rfloat\r\n");
/// let toggle = it.next().unwrap().unwrap();
/// assert_eq!(toggle.tag, WidgetTag::Toggle);
/// assert_eq!(toggle.title(), "Enable");
/// assert_eq!(it.next().unwrap().unwrap().fields(), &["Speed", "float"]);
/// assert!(it.next().is_none());
/// ```
#[must_use]
pub fn records(schema: &str) -> Records<'_> {
    Records {
        tokens: schema.trim_end_matches('\n').split(FIELD_DELIMITER),
        failed: false,
    }
}

impl<'s> Iterator for Records<'s> {
    type Item = Result<Record<'s>, SchemaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.tokens.next()?;
        if token.is_empty() {
            return None;
        }
        let result = self.read_record(token);
        self.failed = result.is_err();
        Some(result)
    }
}

impl<'s> Records<'s> {
    fn read_record(&mut self, tag: &str) -> Result<Record<'s>, SchemaError> {
        let tag = WidgetTag::from_token(tag).ok_or(SchemaError::UnknownTag)?;
        let mut fields = [""; MAX_RECORD_FIELDS];
        for field in fields.iter_mut().take(tag.field_count()) {
            *field = self.tokens.next().ok_or(SchemaError::MissingField)?;
        }
        Ok(Record { tag, fields })
    }
}
