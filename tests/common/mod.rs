#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use stm32_spi::gpio::{AltFunction, Pin, PinMux};
use stm32_spi::rcc::PeripheralClock;
use stm32_spi::regs::{Cr1, Sr, SpiRegisters};
use stm32_spi::{Hertz, Instance, Shutdown};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub struct StubClock {
    pub frequency: Hertz,
    pub enabled: Vec<Instance>,
    pub enable_calls: Vec<Instance>,
}

impl StubClock {
    pub fn new(frequency: Hertz) -> Self {
        Self {
            frequency,
            enabled: Vec::new(),
            enable_calls: Vec::new(),
        }
    }
}

impl PeripheralClock for StubClock {
    fn is_enabled(&self, spi: Instance) -> bool {
        self.enabled.contains(&spi)
    }

    fn enable(&mut self, spi: Instance) {
        self.enable_calls.push(spi);
        self.enabled.push(spi);
    }

    fn frequency(&self, _spi: Instance) -> Hertz {
        self.frequency
    }
}

// ---------------------------------------------------------------------------
// Pin mux
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubPins {
    pub calls: Vec<(Pin, AltFunction, bool)>,
}

impl PinMux for StubPins {
    fn configure_peripheral(&mut self, pin: Pin, function: AltFunction, input: bool) {
        self.calls.push((pin, function, input));
    }
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Counts calls, then unwinds in place of halting.
pub struct CountingShutdown<'a>(pub &'a AtomicUsize);

impl Shutdown for CountingShutdown<'_> {
    fn shutdown(&self, reason: &'static str) -> ! {
        self.0.fetch_add(1, Ordering::SeqCst);
        panic!("shutdown: {reason}")
    }
}

// ---------------------------------------------------------------------------
// Register block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Cr1(Instance, u32),
    Sr(Instance),
    WriteDr(Instance, u8),
    ReadDr(Instance, u8),
}

/// Simulated controller: every byte written to DR is answered with
/// `reply(byte)` after `busy_polls` status reads.
pub struct SimRegs<F> {
    reply: F,
    busy_polls: usize,
    polls_left: usize,
    pending: Option<u8>,
    pub log: Vec<Access>,
}

impl<F: FnMut(u8) -> u8> SimRegs<F> {
    pub fn new(reply: F) -> Self {
        Self::with_busy_polls(reply, 0)
    }

    pub fn with_busy_polls(reply: F, busy_polls: usize) -> Self {
        Self {
            reply,
            busy_polls,
            polls_left: 0,
            pending: None,
            log: Vec::new(),
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Access::WriteDr(_, b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

impl<F: FnMut(u8) -> u8> SpiRegisters for SimRegs<F> {
    fn write_cr1(&mut self, spi: Instance, cr1: Cr1) {
        self.log.push(Access::Cr1(spi, cr1.bits()));
    }

    fn read_sr(&mut self, spi: Instance) -> Sr {
        self.log.push(Access::Sr(spi));
        let mut sr = Sr::from_bits(0);
        if self.pending.is_some() {
            if self.polls_left == 0 {
                sr.set_rxne(true);
            } else {
                self.polls_left -= 1;
            }
        }
        sr
    }

    fn write_dr(&mut self, spi: Instance, data: u8) {
        self.log.push(Access::WriteDr(spi, data));
        self.pending = Some((self.reply)(data));
        self.polls_left = self.busy_polls;
    }

    fn read_dr(&mut self, spi: Instance) -> u8 {
        let data = self.pending.take().unwrap_or(0);
        self.log.push(Access::ReadDr(spi, data));
        data
    }
}
