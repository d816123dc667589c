//! GPIO
//!
//! Pin identifiers and routing of pins to a peripheral alternate function.

use core::fmt;
use core::ptr;

/// A GPIO pin, encoded as `port * 16 + pin`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pin_port: u8,
}

impl Pin {
    /// `Pin::new('B', 13)` is PB13.
    ///
    /// Panics on a port outside 'A'..='K' or a pin number above 15, which
    /// turns into a compile error when used in a const context.
    pub const fn new(port: char, pin: u8) -> Self {
        assert!(port >= 'A' && port <= 'K', "invalid gpio port");
        assert!(pin < 16, "invalid gpio pin");
        Self {
            pin_port: (port as u8 - b'A') * 16 + pin,
        }
    }

    /// Number of the pin within the port (0..15)
    #[inline]
    pub const fn pin(&self) -> u8 {
        self.pin_port % 16
    }

    /// Port of the pin, 0 for GPIOA
    #[inline]
    pub const fn port(&self) -> u8 {
        self.pin_port / 16
    }

    #[inline]
    pub const fn pin_port(&self) -> u8 {
        self.pin_port
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", (b'A' + self.port()) as char, self.pin())
    }
}

/// Alternate function selector (AF0..AF15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AltFunction(u8);

impl AltFunction {
    pub const fn new(af: u8) -> Self {
        assert!(af < 16, "invalid alternate function");
        Self(af)
    }

    #[inline]
    pub const fn af(self) -> u8 {
        self.0
    }
}

/// Routes pins to peripheral functions.
pub trait PinMux {
    /// Hand `pin` over to the peripheral selected by `function`.
    ///
    /// `input` pins are sampled by the peripheral, the others are driven by it.
    /// Calling this again with the same arguments has no further effect.
    fn configure_peripheral(&mut self, pin: Pin, function: AltFunction, input: bool);
}

impl<T: PinMux + ?Sized> PinMux for &mut T {
    #[inline]
    fn configure_peripheral(&mut self, pin: Pin, function: AltFunction, input: bool) {
        T::configure_peripheral(self, pin, function, input)
    }
}

const GPIO_BASE: usize = 0x4002_0000;
const GPIO_PORT_STRIDE: usize = 0x400;

const MODER: usize = 0x00;
const OSPEEDR: usize = 0x08;
const PUPDR: usize = 0x0C;
const AFRL: usize = 0x20;
const AFRH: usize = 0x24;

const MODE_AF: u32 = 0b10;
const SPEED_HIGH: u32 = 0b10;
const PULL_NONE: u32 = 0b00;
const PULL_UP: u32 = 0b01;

const RCC_AHB1ENR: usize = 0x4002_3830;

/// Memory mapped GPIO ports of the STM32F4 family.
pub struct Gpio {
    _private: (),
}

impl Gpio {
    /// Enable the clocks of GPIOA to GPIOC.
    ///
    /// # Safety
    ///
    /// Must only be called on the target, with exclusive access to RCC.
    pub unsafe fn init() -> Self {
        critical_section::with(|_| unsafe {
            modify(RCC_AHB1ENR, 0b111, 0b111);
        });
        Self { _private: () }
    }

    #[inline]
    fn block(pin: Pin) -> usize {
        GPIO_BASE + pin.port() as usize * GPIO_PORT_STRIDE
    }
}

impl PinMux for Gpio {
    fn configure_peripheral(&mut self, pin: Pin, function: AltFunction, input: bool) {
        let block = Self::block(pin);
        let n = pin.pin() as u32;

        let (afr, shift) = if n < 8 { (AFRL, n * 4) } else { (AFRH, (n - 8) * 4) };
        let pull = if input { PULL_UP } else { PULL_NONE };

        critical_section::with(|_| unsafe {
            // AF must be selected before the pin switches over
            modify(block + afr, 0b1111 << shift, (function.af() as u32) << shift);
            modify(block + PUPDR, 0b11 << (n * 2), pull << (n * 2));
            modify(block + OSPEEDR, 0b11 << (n * 2), SPEED_HIGH << (n * 2));
            modify(block + MODER, 0b11 << (n * 2), MODE_AF << (n * 2));
        });
    }
}

#[inline]
unsafe fn modify(addr: usize, mask: u32, bits: u32) {
    let reg = addr as *mut u32;
    let v = ptr::read_volatile(reg);
    ptr::write_volatile(reg, (v & !mask) | (bits & mask));
}
