//! SPI register block access

use core::ptr;

use bitfield::bitfield;

use crate::peripherals::Instance;

bitfield! {
    /// Control register 1
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Cr1(u32);
    impl Debug;
    u32;
    /// Clock phase
    pub cpha, set_cpha : 0;
    /// Clock polarity
    pub cpol, set_cpol : 1;
    /// CPOL and CPHA together, the SPI mode number
    pub mode, set_mode : 1, 0;
    /// Controller (master) role
    pub mstr, set_mstr : 2;
    /// Baud rate, f_pclk / 2^(br + 1)
    pub br, set_br : 5, 3;
    /// Peripheral enable
    pub spe, set_spe : 6;
    pub lsbfirst, set_lsbfirst : 7;
    /// Internal slave select
    pub ssi, set_ssi : 8;
    /// Software slave management
    pub ssm, set_ssm : 9;
}

impl Cr1 {
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

bitfield! {
    /// Status register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Sr(u32);
    impl Debug;
    u32;
    /// Receive buffer not empty
    pub rxne, set_rxne : 0;
    /// Transmit buffer empty
    pub txe, set_txe : 1;
    pub modf, _ : 5;
    pub ovr, _ : 6;
    pub bsy, _ : 7;
}

impl Sr {
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

/// Access to the register blocks of the SPI controllers.
pub trait SpiRegisters {
    fn write_cr1(&mut self, spi: Instance, cr1: Cr1);

    fn read_sr(&mut self, spi: Instance) -> Sr;

    /// Writing DR starts a frame.
    fn write_dr(&mut self, spi: Instance, data: u8);

    /// Reading DR clears RXNE.
    fn read_dr(&mut self, spi: Instance) -> u8;
}

impl<T: SpiRegisters + ?Sized> SpiRegisters for &mut T {
    #[inline]
    fn write_cr1(&mut self, spi: Instance, cr1: Cr1) {
        T::write_cr1(self, spi, cr1)
    }

    #[inline]
    fn read_sr(&mut self, spi: Instance) -> Sr {
        T::read_sr(self, spi)
    }

    #[inline]
    fn write_dr(&mut self, spi: Instance, data: u8) {
        T::write_dr(self, spi, data)
    }

    #[inline]
    fn read_dr(&mut self, spi: Instance) -> u8 {
        T::read_dr(self, spi)
    }
}

const CR1: usize = 0x00;
const SR: usize = 0x08;
const DR: usize = 0x0C;

/// Volatile access to the memory mapped controllers.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Must only be used on the target, and only once per controller at a time.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl SpiRegisters for Mmio {
    #[inline]
    fn write_cr1(&mut self, spi: Instance, cr1: Cr1) {
        unsafe { ptr::write_volatile((spi.base() + CR1) as *mut u32, cr1.bits()) }
    }

    #[inline]
    fn read_sr(&mut self, spi: Instance) -> Sr {
        Sr::from_bits(unsafe { ptr::read_volatile((spi.base() + SR) as *const u32) })
    }

    // DR must be accessed as a byte to keep 8-bit frames
    #[inline]
    fn write_dr(&mut self, spi: Instance, data: u8) {
        unsafe { ptr::write_volatile((spi.base() + DR) as *mut u8, data) }
    }

    #[inline]
    fn read_dr(&mut self, spi: Instance) -> u8 {
        unsafe { ptr::read_volatile((spi.base() + DR) as *const u8) }
    }
}
