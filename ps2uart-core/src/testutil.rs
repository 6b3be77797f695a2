//! In-memory transport and clock for unit tests.

extern crate std;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::transport::{Clock, Transport, TransportError};

#[derive(Default)]
struct Link {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    bauds: Vec<u32>,
    reply: Option<Vec<u8>>,
    flushes: usize,
    fail_writes: bool,
}

/// Transport whose receive side is fed by the test and whose transmit side is recorded.
///
/// Clones share the same link so a test can keep a handle after moving one
/// into the controller.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    link: Arc<Mutex<Link>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the receive queue.
    pub fn feed(&self, bytes: &[u8]) {
        self.link.lock().unwrap().rx.extend(bytes.iter().copied());
    }

    /// Bytes delivered on the next flush, as if the remote answered.
    pub fn reply_on_flush(&self, bytes: &[u8]) {
        self.link.lock().unwrap().reply = Some(bytes.to_vec());
    }

    pub fn fail_writes(&self) {
        self.link.lock().unwrap().fail_writes = true;
    }

    pub fn pending(&self) -> usize {
        self.link.lock().unwrap().rx.len()
    }

    pub fn written(&self) -> Vec<u8> {
        self.link.lock().unwrap().tx.clone()
    }

    pub fn flushes(&self) -> usize {
        self.link.lock().unwrap().flushes
    }

    pub fn baud_history(&self) -> Vec<u32> {
        self.link.lock().unwrap().bauds.clone()
    }
}

impl Transport for ScriptedTransport {
    fn begin(&mut self, baud: u32) -> Result<(), TransportError> {
        self.link.lock().unwrap().bauds.push(baud);
        Ok(())
    }

    fn available(&mut self) -> bool {
        !self.link.lock().unwrap().rx.is_empty()
    }

    fn read(&mut self) -> Option<u8> {
        self.link.lock().unwrap().rx.pop_front()
    }

    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        let mut link = self.link.lock().unwrap();
        if link.fail_writes {
            return Err(TransportError::Io);
        }
        link.tx.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        let mut link = self.link.lock().unwrap();
        link.flushes += 1;
        if let Some(reply) = link.reply.take() {
            link.rx.extend(reply);
        }
        Ok(())
    }
}

/// Manually driven clock. Optionally advances by a fixed step on every read.
#[derive(Clone, Default)]
pub struct TestClock {
    now: Arc<AtomicU32>,
    step: u32,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that moves `step` ms forward each time it is read.
    pub fn ticking(step: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(0)),
            step,
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u32) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn get(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}
