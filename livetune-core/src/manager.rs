//! The running link: one state-machine dispatch per step, paced to a fixed
//! period.

use livetune_proto::{
    parse_control_update, strip_line_ending, ControlUpdate, ReportFrame, Serialize,
    SerializeError, DEBUG_TAG, DEBUG_TERMINATOR, HANDSHAKE, SAMPLE_SIZE,
};

use crate::clock::Clock;
use crate::config::{Config, MAX_REPORTERS};
use crate::logging::{trace, warn};
use crate::message::{LineBuffer, MessageError};
use crate::registry::{ControlRegistry, ReporterRegistry};
use crate::scheduler::{Headroom, StepPacer};
use crate::schema::SchemaBuilder;
use crate::session::{Session, SessionState};
use crate::transport::{Transport, TransportError};

/// Largest report frame: tag plus one sample per reporter.
const REPORT_BUFFER_SIZE: usize = 1 + SAMPLE_SIZE * MAX_REPORTERS;

/// Error type for a single step.
///
/// None of these end the link; the step that returns one has still been
/// paced and the next step carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Writing to the transport failed.
    Transport(TransportError),
    /// An incoming control message was rejected.
    Malformed(MessageError),
    /// A report frame could not be encoded.
    Encode(SerializeError),
}

impl From<TransportError> for LinkError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<MessageError> for LinkError {
    fn from(e: MessageError) -> Self {
        Self::Malformed(e)
    }
}

impl From<SerializeError> for LinkError {
    fn from(e: SerializeError) -> Self {
        Self::Encode(e)
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {}", e),
            Self::Malformed(e) => write!(f, "malformed message: {}", e),
            Self::Encode(e) => write!(f, "encode: {}", e),
        }
    }
}

/// Link counters since [`Dashboard::connect`](crate::Dashboard::connect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Schema lines sent.
    pub advertisements: u32,
    /// Report frames sent.
    pub reports: u32,
    /// Control updates applied.
    pub updates: u32,
    /// Control messages rejected.
    pub rejected: u32,
    /// Steps that finished after their deadline.
    pub overruns: u32,
}

/// Running link between registered widgets and a host console.
///
/// Created by [`Dashboard::connect`](crate::Dashboard::connect). Call
/// [`step`](Self::step) from the main loop; it returns no sooner than one
/// step period after the previous call returned.
pub struct CommManager<'a, T, C> {
    transport: T,
    clock: C,
    config: Config,
    controls: ControlRegistry<'a>,
    reporters: ReporterRegistry<'a>,
    schema: SchemaBuilder,
    session: Session,
    pacer: StepPacer,
    lines: LineBuffer,
    stats: LinkStats,
}

impl<'a, T: Transport, C: Clock> CommManager<'a, T, C> {
    pub(crate) fn new(
        transport: T,
        clock: C,
        config: Config,
        controls: ControlRegistry<'a>,
        reporters: ReporterRegistry<'a>,
        schema: SchemaBuilder,
    ) -> Self {
        let mut pacer = StepPacer::new(config.step_period);
        pacer.restart(clock.elapsed());
        Self {
            transport,
            clock,
            config,
            controls,
            reporters,
            schema,
            session: Session::new(&config),
            pacer,
            lines: LineBuffer::new(),
            stats: LinkStats::default(),
        }
    }

    /// Run one dispatch, then sleep out the rest of the step period.
    ///
    /// While disconnected: take one pending byte (a newline completes the
    /// handshake), otherwise advertise the schema when due. While active:
    /// send a report frame when due, then apply at most one pending control
    /// update.
    ///
    /// # Errors
    ///
    /// Returns the first transport or message error of this dispatch. The
    /// step has been paced either way.
    pub async fn step(&mut self) -> Result<(), LinkError> {
        let result = self.dispatch().await;
        self.pace().await;
        result
    }

    /// Send a debug frame: `D`, `text`, then a zero byte.
    ///
    /// Allowed in any session state. `text` is cut at its first zero byte,
    /// which would otherwise end the frame early.
    pub async fn debug(&mut self, text: &str) -> Result<(), TransportError> {
        let text = text.find('\0').map_or(text, |end| &text[..end]);
        self.transport.write(&[DEBUG_TAG]).await?;
        self.transport.write(text.as_bytes()).await?;
        self.transport.write(&[DEBUG_TERMINATOR]).await
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Idle time measured at the end of the last step.
    #[must_use]
    pub fn headroom(&self) -> Headroom {
        self.pacer.headroom()
    }

    #[must_use]
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            overruns: self.pacer.overruns(),
            ..self.stats
        }
    }

    #[must_use]
    pub fn schema(&self) -> &str {
        self.schema.as_str()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Decompose the manager into its transport and clock.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }

    async fn dispatch(&mut self) -> Result<(), LinkError> {
        match self.session.state() {
            SessionState::Disconnected => self.step_disconnected().await,
            SessionState::Active => self.step_active().await,
        }
    }

    async fn step_disconnected(&mut self) -> Result<(), LinkError> {
        if self.transport.available() > 0 {
            match self.transport.read_byte() {
                Some(HANDSHAKE) => {
                    self.lines.clear();
                    self.session.handshake();
                    return Ok(());
                }
                Some(_) => trace!("discarding byte while disconnected"),
                None => {}
            }
        }

        if self.session.poll_advertise(self.clock.elapsed()) {
            trace!("advertising schema ({} bytes)", self.schema.as_str().len());
            self.transport.write_line(self.schema.as_str()).await?;
            self.stats.advertisements = self.stats.advertisements.wrapping_add(1);
        }
        Ok(())
    }

    async fn step_active(&mut self) -> Result<(), LinkError> {
        let report = if !self.reporters.is_empty()
            && self.session.poll_report(self.clock.elapsed())
        {
            self.send_report().await
        } else {
            Ok(())
        };
        let control = self.poll_control().map_err(|e| {
            warn!("rejected control message: {}", e);
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            LinkError::from(e)
        });
        report.and(control)
    }

    async fn send_report(&mut self) -> Result<(), LinkError> {
        let samples = self.reporters.snapshot();
        let frame = ReportFrame::new(&samples).serialize_to_vec::<REPORT_BUFFER_SIZE>()?;
        trace!("report frame ({} samples)", samples.len());
        self.transport.write(&frame).await?;
        self.stats.reports = self.stats.reports.wrapping_add(1);
        Ok(())
    }

    /// Read until one line completes or input runs dry, then handle it.
    fn poll_control(&mut self) -> Result<(), MessageError> {
        while self.transport.available() > 0 {
            let Some(byte) = self.transport.read_byte() else {
                break;
            };
            if let Some(line) = self.lines.push(byte) {
                return self.handle_line(&line?);
            }
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &[u8]) -> Result<(), MessageError> {
        // A repeated handshake.
        if strip_line_ending(line).is_empty() {
            return Ok(());
        }

        match parse_control_update(line)? {
            ControlUpdate::Disconnect => {
                self.lines.clear();
                self.session.disconnect();
            }
            ControlUpdate::Set { index, value } => {
                self.controls.apply(index, value, self.config.coercion)?;
                self.stats.updates = self.stats.updates.wrapping_add(1);
            }
        }
        Ok(())
    }

    async fn pace(&mut self) {
        match self.pacer.settle(self.clock.elapsed()) {
            Some(deadline) => self.clock.sleep_until(deadline).await,
            None => {
                if let Headroom::Overrun(late) = self.pacer.headroom() {
                    warn!("step overran by {} us", late.as_micros() as u64);
                }
            }
        }
        self.pacer.finish(self.clock.elapsed());
    }
}
