//! Blocking SPI controller driver for STM32F4-class parts
//!
//! ```ignore
//! let mut spi = Configurator::new(BUSES, rcc, gpio);
//! let config = spi.setup(1, MODE_0, Hertz::MHz(4));
//!
//! prepare(&mut regs, config);
//! transfer(&mut regs, config, true, &mut buf);
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod error;
pub mod gpio;
pub mod peripherals;
pub mod rcc;
pub mod regs;
pub mod spi;

pub use embedded_hal::spi::{Mode, MODE_0, MODE_1, MODE_2, MODE_3};
pub use fugit::HertzU32 as Hertz;

pub use bus::{BusInfo, BUSES};
pub use error::{Error, Shutdown};
pub use peripherals::Instance;
pub use spi::{prepare, transfer, Config, Configurator};
