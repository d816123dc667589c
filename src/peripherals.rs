//! SPI controller instances

use core::fmt;

/// Handle of one SPI controller.
///
/// Carries no ownership of the hardware, any number of copies may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instance {
    SPI1,
    SPI2,
    SPI3,
}

/// Peripheral bus the controller's clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Apb {
    Apb1,
    Apb2,
}

impl Instance {
    pub const COUNT: usize = 3;
    pub const ALL: [Instance; Self::COUNT] = [Instance::SPI1, Instance::SPI2, Instance::SPI3];

    /// Base address of the register block (STM32F4 memory map)
    #[inline]
    pub const fn base(self) -> usize {
        match self {
            Instance::SPI1 => 0x4001_3000,
            Instance::SPI2 => 0x4000_3800,
            Instance::SPI3 => 0x4000_3C00,
        }
    }

    #[inline]
    pub const fn apb(self) -> Apb {
        match self {
            Instance::SPI1 => Apb::Apb2,
            Instance::SPI2 | Instance::SPI3 => Apb::Apb1,
        }
    }

    /// Bit of the clock enable register (APB1ENR or APB2ENR)
    #[inline]
    pub const fn enable_bit(self) -> u8 {
        match self {
            Instance::SPI1 => 12,
            Instance::SPI2 => 14,
            Instance::SPI3 => 15,
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::SPI1 => f.write_str("spi1"),
            Instance::SPI2 => f.write_str("spi2"),
            Instance::SPI3 => f.write_str("spi3"),
        }
    }
}
