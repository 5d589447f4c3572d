use core::fmt;

/// Board pin number of a relay output or sensor bus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PinId(u8);

impl PinId {
    pub const fn new(pin: u8) -> Self {
        Self(pin)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for PinId {
    fn from(pin: u8) -> Self {
        Self(pin)
    }
}

impl fmt::Debug for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinId({})", self.0)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}
