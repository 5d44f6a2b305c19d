use embedded_hal::digital::ErrorKind;

use crate::io::Lamp;

/// The digital lines the controller touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Green,
    Red,
    Pedestrian,
}

impl From<Lamp> for Line {
    fn from(lamp: Lamp) -> Self {
        match lamp {
            Lamp::Green => Line::Green,
            Lamp::Red => Line::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The line could not be claimed or brought to its idle level. Fatal for
    /// the task that owns the line.
    #[error("cannot configure {line:?} line: {kind:?}")]
    Config { line: Line, kind: ErrorKind },

    /// A read or write failed on a line that was configured earlier. Logged
    /// and otherwise ignored.
    #[error("i/o failure on {line:?} line: {kind:?}")]
    Io { line: Line, kind: ErrorKind },
}

impl Error {
    pub fn line(&self) -> Line {
        match self {
            Error::Config { line, .. } | Error::Io { line, .. } => *line,
        }
    }
}
