use core::ptr;

use fugit::HertzU32 as Hertz;

use crate::peripherals::{Apb, Instance};

// Reset default: HSI, no prescalers
const DEFAULT_FREQUENCY: Hertz = Hertz::from_raw(16_000_000);

const RCC_APB1ENR: usize = 0x4002_3840;
const RCC_APB2ENR: usize = 0x4002_3844;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Clocks {
    pub sysclk: Hertz,
    /// Clock of APB1
    pub pclk1: Hertz,
    /// Clock of APB2
    pub pclk2: Hertz,
}

impl Default for Clocks {
    fn default() -> Self {
        Self {
            sysclk: DEFAULT_FREQUENCY,
            pclk1: DEFAULT_FREQUENCY,
            pclk2: DEFAULT_FREQUENCY,
        }
    }
}

impl Clocks {
    #[inline]
    pub fn pclk(&self, apb: Apb) -> Hertz {
        match apb {
            Apb::Apb1 => self.pclk1,
            Apb::Apb2 => self.pclk2,
        }
    }
}

/// Clock gating and frequency of peripheral clocks.
pub trait PeripheralClock {
    fn is_enabled(&self, spi: Instance) -> bool;

    fn enable(&mut self, spi: Instance);

    /// Frequency feeding the controller's baud rate generator
    fn frequency(&self, spi: Instance) -> Hertz;
}

impl<T: PeripheralClock + ?Sized> PeripheralClock for &mut T {
    #[inline]
    fn is_enabled(&self, spi: Instance) -> bool {
        T::is_enabled(self, spi)
    }

    #[inline]
    fn enable(&mut self, spi: Instance) {
        T::enable(self, spi)
    }

    #[inline]
    fn frequency(&self, spi: Instance) -> Hertz {
        T::frequency(self, spi)
    }
}

/// RCC of the STM32F4 family.
///
/// The clock tree is set up by the board, `clocks` must describe the result.
pub struct Rcc {
    clocks: Clocks,
}

impl Rcc {
    /// # Safety
    ///
    /// Must only be used on the target, where it accesses RCC registers directly.
    pub unsafe fn new(clocks: Clocks) -> Self {
        Self { clocks }
    }

    #[inline]
    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    #[inline]
    fn enable_register(spi: Instance) -> *mut u32 {
        match spi.apb() {
            Apb::Apb1 => RCC_APB1ENR as *mut u32,
            Apb::Apb2 => RCC_APB2ENR as *mut u32,
        }
    }
}

impl PeripheralClock for Rcc {
    fn is_enabled(&self, spi: Instance) -> bool {
        let v = unsafe { ptr::read_volatile(Self::enable_register(spi)) };
        v & (1 << spi.enable_bit()) != 0
    }

    fn enable(&mut self, spi: Instance) {
        let reg = Self::enable_register(spi);
        critical_section::with(|_| unsafe {
            ptr::write_volatile(reg, ptr::read_volatile(reg) | (1 << spi.enable_bit()));
        });
        // read back, the peripheral is usable two cycles after the write
        let _ = unsafe { ptr::read_volatile(reg) };
    }

    fn frequency(&self, spi: Instance) -> Hertz {
        self.clocks.pclk(spi.apb())
    }
}
