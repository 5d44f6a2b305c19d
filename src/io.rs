/*
 * The I/O module for the traffic light.
 *
 * This module wraps the three digital lines the controller uses: the green
 * and red lamp outputs and the pedestrian push button. It is generic over the
 * embedded-hal pin traits so that the board can hand in its GPIO types and the
 * tests can hand in recording mocks. Nothing else in the crate touches a pin.
 *
 * Yellow has no line of its own; it is green and red lit together.
 */

use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use enum_ordinalize::Ordinalize;

use crate::error::{Error, Line};

#[derive(Debug, Ordinalize, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Lamp {
    Green,
    Red,
}

/// Which pin level lights a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

/// The output driver: both lamp lines, indexed by `Lamp::ordinal()`.
pub struct Lamps<P> {
    pins: [P; Lamp::VARIANT_COUNT],
    polarity: Polarity,
}

impl<P: OutputPin> Lamps<P> {
    pub fn new(green: P, red: P) -> Self {
        Self {
            pins: [green, red],
            polarity: Polarity::ActiveHigh,
        }
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Bring a line to its inactive level. A line that cannot even do that is
    /// considered unclaimable.
    pub fn configure(&mut self, lamp: Lamp) -> Result<(), Error> {
        self.drive(lamp, false).map_err(|kind| Error::Config {
            line: lamp.into(),
            kind,
        })
    }

    /// Best-effort write: failures are logged and dropped.
    pub fn set(&mut self, lamp: Lamp, on: bool) {
        if let Err(err) = self.try_set(lamp, on) {
            warn!("{}", err);
        }
    }

    pub fn try_set(&mut self, lamp: Lamp, on: bool) -> Result<(), Error> {
        self.drive(lamp, on).map_err(|kind| Error::Io {
            line: lamp.into(),
            kind,
        })
    }

    // Deal with active-high or active-low here, so that callers can just use
    // `true` for a lit lamp.
    fn drive(&mut self, lamp: Lamp, on: bool) -> Result<(), embedded_hal::digital::ErrorKind> {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let pin = &mut self.pins[lamp.ordinal()];
        let result = if high { pin.set_high() } else { pin.set_low() };
        result.map_err(|err| err.kind())
    }
}

/// The pedestrian push button: pulled up, so a press reads low.
pub struct PedestrianInput<I> {
    pin: I,
}

impl<I: InputPin> PedestrianInput<I> {
    /// Claim the button line. The first read doubles as the check that the
    /// line is usable.
    pub fn configure(mut pin: I) -> Result<Self, Error> {
        pin.is_low().map_err(|err| Error::Config {
            line: Line::Pedestrian,
            kind: err.kind(),
        })?;
        Ok(Self { pin })
    }

    /// Whether the button is held down right now. A failed read counts as
    /// released.
    pub fn is_asserted(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(pressed) => pressed,
            Err(err) => {
                let err = Error::Io {
                    line: Line::Pedestrian,
                    kind: err.kind(),
                };
                warn!("{}", err);
                false
            }
        }
    }
}
