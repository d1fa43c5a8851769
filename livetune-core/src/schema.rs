//! Accumulates the advertised schema line.

use heapless::String;
use livetune_proto::{TitleError, Widget, MAX_RECORD_LENGTH};

use crate::config::SCHEMA_CAPACITY;
use crate::registry::RegisterError;

/// One encoded record, validated but not yet appended.
pub type EncodedRecord = String<MAX_RECORD_LENGTH>;

/// Append-only schema text, one record per registration.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    text: String<SCHEMA_CAPACITY>,
    records: usize,
}

impl SchemaBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            records: 0,
        }
    }

    /// Validate `widget` and encode its record without touching the schema.
    pub fn encode(&self, widget: &Widget<'_>) -> Result<EncodedRecord, RegisterError> {
        widget.validate_title().map_err(|e| match e {
            TitleError::TooLong => RegisterError::TitleTooLong,
            TitleError::InvalidCharacter => RegisterError::InvalidTitle,
        })?;

        let mut record = EncodedRecord::new();
        widget
            .write_record(&mut record)
            .map_err(|_| RegisterError::SchemaOverflow)?;
        if record.len() > self.remaining() {
            return Err(RegisterError::SchemaOverflow);
        }
        Ok(record)
    }

    /// Append a record produced by [`encode`](Self::encode).
    pub fn commit(&mut self, record: &EncodedRecord) -> Result<(), RegisterError> {
        self.text
            .push_str(record)
            .map_err(|()| RegisterError::SchemaOverflow)?;
        self.records += 1;
        Ok(())
    }

    /// The schema line, without its terminating newline.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of records appended.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Bytes still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        SCHEMA_CAPACITY - self.text.len()
    }
}
