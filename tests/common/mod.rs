//! Shared test infrastructure for panel-countdown integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use panel_countdown::nanoleaf::DeviceError;
use panel_countdown::{
    DeviceConfig, DeviceCredentials, DeviceProvisioner, Interrupted, Pacer, PanelCommand,
    PanelCommandSink, PanelId, PanelOrder, PanelPosition, SinkError,
};

// ============================================================================
// Event Log
// ============================================================================

/// Something a sink or pacer was asked to do, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Sent(PanelCommand),
    Paused(Duration),
}

/// Log shared by a sink and a pacer so tests can check interleaving
pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn sent(log: &EventLog) -> Vec<PanelCommand> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Sent(command) => Some(*command),
            Event::Paused(_) => None,
        })
        .collect()
}

pub fn pauses(log: &EventLog) -> Vec<Duration> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Paused(d) => Some(*d),
            Event::Sent(_) => None,
        })
        .collect()
}

// ============================================================================
// Mock Sink
// ============================================================================

/// Mock sink that records every command, optionally failing the nth send
pub struct RecordingSink {
    log: EventLog,
    fail_at: Option<usize>,
    attempts: usize,
}

impl RecordingSink {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            fail_at: None,
            attempts: 0,
        }
    }

    /// Fails the send with this zero-based index; earlier sends succeed
    pub fn failing_at(log: &EventLog, index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::new(log)
        }
    }
}

impl PanelCommandSink for RecordingSink {
    fn send(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(SinkError::Closed);
        }
        self.log.borrow_mut().push(Event::Sent(*command));
        Ok(())
    }
}

// ============================================================================
// Mock Pacer
// ============================================================================

/// Mock pacer that records requested holds instead of sleeping
pub struct RecordingPacer {
    log: EventLog,
    interrupt_at: Option<usize>,
    calls: usize,
}

impl RecordingPacer {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            interrupt_at: None,
            calls: 0,
        }
    }

    /// Interrupts the pause with this zero-based index
    pub fn interrupting_at(log: &EventLog, index: usize) -> Self {
        Self {
            interrupt_at: Some(index),
            ..Self::new(log)
        }
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) -> Result<(), Interrupted> {
        let call = self.calls;
        self.calls += 1;
        if self.interrupt_at == Some(call) {
            return Err(Interrupted);
        }
        self.log.borrow_mut().push(Event::Paused(duration));
        Ok(())
    }
}

// ============================================================================
// Mock Provisioner
// ============================================================================

/// Mock provisioner with canned discovery, pairing and layout answers
pub struct MockProvisioner {
    pub addresses: Vec<String>,
    pub refuse_pairing: bool,
    /// Discovery reports a cancellation instead of answering
    pub interrupt_discovery: bool,
    pub layout: Vec<PanelPosition>,
    pub discover_calls: usize,
    pub provisioned: Vec<String>,
}

impl MockProvisioner {
    pub fn new(addresses: &[&str], layout_ids: &[u16]) -> Self {
        Self {
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
            refuse_pairing: false,
            interrupt_discovery: false,
            layout: layout_ids
                .iter()
                .enumerate()
                .map(|(i, &id)| PanelPosition {
                    panel: PanelId(id),
                    x: 100 * i as i32,
                    y: 0,
                    orientation: 0,
                })
                .collect(),
            discover_calls: 0,
            provisioned: Vec::new(),
        }
    }
}

impl DeviceProvisioner for MockProvisioner {
    fn discover(&mut self, _timeout: Duration) -> Result<Vec<String>, DeviceError> {
        self.discover_calls += 1;
        if self.interrupt_discovery {
            return Err(DeviceError::Interrupted);
        }
        Ok(self.addresses.clone())
    }

    fn provision(&mut self, address: &str) -> Result<String, DeviceError> {
        if self.refuse_pairing {
            return Err(DeviceError::NotPairing);
        }
        self.provisioned.push(address.to_string());
        Ok(format!("token-for-{}", address))
    }

    fn panel_positions(
        &mut self,
        _credentials: &DeviceCredentials,
    ) -> Result<Vec<PanelPosition>, DeviceError> {
        Ok(self.layout.clone())
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub fn order(ids: &[u16]) -> PanelOrder {
    PanelOrder::from_ids(ids.iter().copied().map(PanelId)).unwrap()
}

pub fn config(ids: &[u16]) -> DeviceConfig {
    DeviceConfig {
        credentials: DeviceCredentials {
            address: "192.168.1.40".to_string(),
            auth_token: "secret".to_string(),
        },
        panel_order: order(ids),
    }
}
