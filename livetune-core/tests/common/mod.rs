//! Shared mocks for link tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use livetune_core::{Clock, Transport, TransportError};

pub const MS: Duration = Duration::from_millis(1);

/// Manually advanced clock. Sleeping jumps straight to the deadline.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for MockClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }

    async fn sleep_until(&mut self, deadline: Duration) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

#[derive(Default)]
struct Wire {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    fail_writes: bool,
    opened: bool,
}

/// In-memory transport. The paired [`Host`] feeds input and collects output.
pub struct MockTransport {
    wire: Rc<RefCell<Wire>>,
    clock: Option<MockClock>,
    write_cost: Duration,
}

impl MockTransport {
    /// Every write advances `clock` by `cost`.
    pub fn with_write_cost(mut self, clock: &MockClock, cost: Duration) -> Self {
        self.clock = Some(clock.clone());
        self.write_cost = cost;
        self
    }
}

impl Transport for MockTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        let mut wire = self.wire.borrow_mut();
        wire.rx.clear();
        wire.opened = true;
        Ok(())
    }

    fn available(&mut self) -> usize {
        self.wire.borrow().rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.wire.borrow_mut().rx.pop_front()
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if let Some(clock) = &self.clock {
            clock.advance(self.write_cost);
        }
        let mut wire = self.wire.borrow_mut();
        if wire.fail_writes {
            return Err(TransportError::Io);
        }
        wire.tx.extend_from_slice(bytes);
        Ok(())
    }
}

/// Host end of a [`MockTransport`].
#[derive(Clone)]
pub struct Host {
    wire: Rc<RefCell<Wire>>,
}

impl Host {
    pub fn send(&self, bytes: &[u8]) {
        self.wire.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Everything the device wrote since the last call.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().tx)
    }

    pub fn pending_input(&self) -> usize {
        self.wire.borrow().rx.len()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.wire.borrow_mut().fail_writes = fail;
    }

    pub fn opened(&self) -> bool {
        self.wire.borrow().opened
    }
}

pub fn mock_link() -> (MockTransport, Host) {
    let wire = Rc::new(RefCell::new(Wire::default()));
    let transport = MockTransport {
        wire: Rc::clone(&wire),
        clock: None,
        write_cost: Duration::ZERO,
    };
    (transport, Host { wire })
}

/// `R` followed by the little-endian bytes of each value.
pub fn report_frame(values: &[f32]) -> Vec<u8> {
    let mut frame = vec![b'R'];
    for v in values {
        frame.extend_from_slice(&v.to_le_bytes());
    }
    frame
}
