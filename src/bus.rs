//! Bus table
//!
//! Index into [`BUSES`] is the bus number used by [`crate::spi::Configurator`].

use crate::gpio::{AltFunction, Pin};
use crate::peripherals::Instance;

/// One SPI bus: a controller and the pins wired to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusInfo {
    pub spi: Instance,
    pub miso: Pin,
    pub mosi: Pin,
    pub sck: Pin,
    pub function: AltFunction,
    pub name: &'static str,
}

impl BusInfo {
    pub const fn new(
        name: &'static str,
        spi: Instance,
        miso: Pin,
        mosi: Pin,
        sck: Pin,
        function: AltFunction,
    ) -> Self {
        Self {
            spi,
            miso,
            mosi,
            sck,
            function,
            name,
        }
    }
}

const AF5: AltFunction = AltFunction::new(5);
#[cfg(feature = "spi3")]
const AF6: AltFunction = AltFunction::new(6);

pub static BUSES: &[BusInfo] = &[
    BusInfo::new("spi2", Instance::SPI2, Pin::new('B', 14), Pin::new('B', 15), Pin::new('B', 13), AF5),
    BusInfo::new("spi1", Instance::SPI1, Pin::new('A', 6), Pin::new('A', 7), Pin::new('A', 5), AF5),
    #[cfg(feature = "spi3")]
    BusInfo::new("spi3", Instance::SPI3, Pin::new('B', 4), Pin::new('B', 5), Pin::new('B', 3), AF6),
];
