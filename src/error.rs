//! Errors and the fatal error path

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Bus index outside the bus table
    InvalidBus,
}

impl Error {
    /// Message handed to [`Shutdown`]
    pub const fn reason(&self) -> &'static str {
        match self {
            Error::InvalidBus => "Invalid spi bus",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Terminates the firmware after a configuration error.
pub trait Shutdown {
    fn shutdown(&self, reason: &'static str) -> !;
}

impl<T: Shutdown + ?Sized> Shutdown for &T {
    #[inline]
    fn shutdown(&self, reason: &'static str) -> ! {
        T::shutdown(self, reason)
    }
}

/// Shutdown through the panic handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct Panic;

impl Shutdown for Panic {
    fn shutdown(&self, reason: &'static str) -> ! {
        panic!("{}", reason)
    }
}
