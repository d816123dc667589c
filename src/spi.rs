//! SPI
//!
//! Blocking, byte-wide, full-duplex controller mode.

/*
Controller mode only, chip select is left to the caller
8-bit frames, MSB first
Clock is f_pclk / 2^(BR + 1), BR in 0..=7
NSS is managed in software and held asserted internally
Every byte is exchanged completely before the next one is written
*/

use core::convert::Infallible;

use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};
use fugit::HertzU32 as Hertz;
use heapless::Vec;

use crate::bus::BusInfo;
use crate::error::{Error, Panic, Shutdown};
use crate::gpio::PinMux;
use crate::peripherals::Instance;
use crate::rcc::PeripheralClock;
use crate::regs::{Cr1, SpiRegisters};

/// Largest baud rate divisor, f_pclk / 256
pub const BR_MAX: u8 = 7;

/// Mode from the 2-bit CPOL:CPHA selector.
pub const fn mode_from_bits(bits: u8) -> Mode {
    match bits & 0b11 {
        0 => MODE_0,
        1 => MODE_1,
        2 => MODE_2,
        _ => MODE_3,
    }
}

// CPOL:CPHA
const fn mode_bits(mode: Mode) -> u32 {
    let cpha = match mode.phase {
        Phase::CaptureOnFirstTransition => 0,
        Phase::CaptureOnSecondTransition => 1,
    };
    let cpol = match mode.polarity {
        Polarity::IdleLow => 0,
        Polarity::IdleHigh => 1,
    };
    (cpol << 1) | cpha
}

/// Smallest divisor whose rate `pclk >> (div + 1)` does not exceed `rate`.
///
/// Saturates at [`BR_MAX`] when `pclk` cannot be divided down far enough.
pub fn divisor(pclk: Hertz, rate: Hertz) -> u8 {
    let pclk = pclk.raw();
    let rate = rate.raw();

    let mut div = 0;
    while (pclk >> (div + 1)) > rate && div < BR_MAX {
        div += 1;
    }
    div
}

/// Precomputed controller setup for one bus, mode and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    spi: Instance,
    cr1: Cr1,
}

impl Config {
    #[inline]
    pub fn instance(&self) -> Instance {
        self.spi
    }

    /// Image loaded into CR1 by [`prepare`]
    #[inline]
    pub fn cr1(&self) -> Cr1 {
        self.cr1
    }

    #[inline]
    pub fn divisor(&self) -> u8 {
        self.cr1.br() as u8
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        mode_from_bits(self.cr1.mode() as u8)
    }

    /// Bus clock produced from a peripheral clock of `pclk`
    pub fn frequency(&self, pclk: Hertz) -> Hertz {
        Hertz::from_raw(pclk.raw() >> (self.divisor() + 1))
    }
}

/// Controllers whose clock and pins have been set up.
///
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct EnableRegistry {
    enabled: Vec<Instance, { Instance::COUNT }>,
}

impl EnableRegistry {
    pub const fn new() -> Self {
        Self { enabled: Vec::new() }
    }

    #[inline]
    pub fn is_enabled(&self, spi: Instance) -> bool {
        self.enabled.contains(&spi)
    }

    /// Returns `false` if `spi` was already marked.
    pub fn mark(&mut self, spi: Instance) -> bool {
        if self.is_enabled(spi) {
            return false;
        }
        // holds every instance, cannot be full here
        let _ = self.enabled.push(spi);
        true
    }
}

/// Turns bus numbers into [`Config`]s, enabling each controller on first use.
pub struct Configurator<'a, C, P, S = Panic> {
    buses: &'a [BusInfo],
    rcc: C,
    gpio: P,
    shutdown: S,
    registry: EnableRegistry,
}

impl<'a, C: PeripheralClock, P: PinMux> Configurator<'a, C, P> {
    pub fn new(buses: &'a [BusInfo], rcc: C, gpio: P) -> Self {
        Self::with_shutdown(buses, rcc, gpio, Panic)
    }
}

impl<'a, C: PeripheralClock, P: PinMux, S: Shutdown> Configurator<'a, C, P, S> {
    pub fn with_shutdown(buses: &'a [BusInfo], rcc: C, gpio: P, shutdown: S) -> Self {
        Self {
            buses,
            rcc,
            gpio,
            shutdown,
            registry: EnableRegistry::new(),
        }
    }

    /// Build the configuration of `bus`.
    ///
    /// An unknown bus number is fatal and ends in [`Shutdown::shutdown`].
    pub fn setup(&mut self, bus: u32, mode: Mode, rate: Hertz) -> Config {
        match self.try_setup(bus, mode, rate) {
            Ok(config) => config,
            Err(e) => self.shutdown.shutdown(e.reason()),
        }
    }

    pub fn try_setup(&mut self, bus: u32, mode: Mode, rate: Hertz) -> Result<Config, Error> {
        let Some(info) = self.buses.get(bus as usize).copied() else {
            error!("spi: invalid bus {=u32}", bus);
            return Err(Error::InvalidBus);
        };

        if self.registry.mark(info.spi) {
            self.enable(&info);
        }

        let pclk = self.rcc.frequency(info.spi);
        let div = divisor(pclk, rate);
        if div == BR_MAX && (pclk.raw() >> (BR_MAX + 1)) > rate.raw() {
            warn!(
                "spi: {=str} clamped to pclk/256, {=u32} Hz requested",
                info.name,
                rate.raw()
            );
        }

        let mut cr1 = Cr1::from_bits(0);
        cr1.set_mode(mode_bits(mode));
        cr1.set_br(div as u32);
        cr1.set_spe(true);
        cr1.set_mstr(true);
        cr1.set_ssm(true);
        cr1.set_ssi(true);

        trace!("spi: {=str} cr1={=u32:#x}", info.name, cr1.bits());

        Ok(Config { spi: info.spi, cr1 })
    }

    fn enable(&mut self, info: &BusInfo) {
        debug!("spi: enabling {=str}", info.name);

        if !self.rcc.is_enabled(info.spi) {
            self.rcc.enable(info.spi);
        }
        self.gpio.configure_peripheral(info.miso, info.function, true);
        self.gpio.configure_peripheral(info.mosi, info.function, false);
        self.gpio.configure_peripheral(info.sck, info.function, false);
    }

    #[inline]
    pub fn registry(&self) -> &EnableRegistry {
        &self.registry
    }

    pub fn release(self) -> (C, P, S) {
        (self.rcc, self.gpio, self.shutdown)
    }
}

/// Load `config` into its controller.
///
/// Needed before the first transfer, and whenever another config of the same
/// controller was loaded in between.
#[inline]
pub fn prepare<R: SpiRegisters + ?Sized>(regs: &mut R, config: Config) {
    regs.write_cr1(config.spi, config.cr1);
}

/// Exchange `data` on the bus, byte by byte.
///
/// With `receive` the received bytes replace `data`, otherwise they are dropped.
/// Spins on RXNE without a timeout.
pub fn transfer<R: SpiRegisters + ?Sized>(regs: &mut R, config: Config, receive: bool, data: &mut [u8]) {
    for b in data.iter_mut() {
        let rdata = exchange(regs, config.spi, *b);
        if receive {
            *b = rdata;
        }
    }
}

#[inline]
fn exchange<R: SpiRegisters + ?Sized>(regs: &mut R, spi: Instance, data: u8) -> u8 {
    regs.write_dr(spi, data);
    while !regs.read_sr(spi).rxne() {}
    regs.read_dr(spi)
}

/// [`embedded_hal::spi::SpiBus`] on a prepared controller.
pub struct SpiBus<'r, R: SpiRegisters + ?Sized> {
    regs: &'r mut R,
    config: Config,
}

impl<'r, R: SpiRegisters + ?Sized> SpiBus<'r, R> {
    /// Loads `config` into the controller.
    pub fn new(regs: &'r mut R, config: Config) -> Self {
        prepare(regs, config);
        Self { regs, config }
    }

    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }
}

impl<R: SpiRegisters + ?Sized> embedded_hal::spi::ErrorType for SpiBus<'_, R> {
    type Error = Infallible;
}

impl<R: SpiRegisters + ?Sized> embedded_hal::spi::SpiBus for SpiBus<'_, R> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for w in words {
            *w = exchange(&mut *self.regs, self.config.spi, 0);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &w in words {
            exchange(&mut *self.regs, self.config.spi, w);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let rdata = exchange(&mut *self.regs, self.config.spi, write.get(i).copied().unwrap_or(0));
            if let Some(r) = read.get_mut(i) {
                *r = rdata;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        transfer(&mut *self.regs, self.config, true, words);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // every byte is complete once RXNE was seen
        Ok(())
    }
}
