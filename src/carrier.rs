use crate::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Valid GLONASS FDMA frequency channels
pub const GLONASS_CHANNELS: std::ops::RangeInclusive<i8> = -7..=6;

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    /// L1 (GPS/QZSS)
    #[default]
    L1,
    /// L2 (GPS/QZSS)
    L2,
    /// G1 (GLONASS FDMA) on given frequency channel
    G1(i8),
    /// G2 (GLONASS FDMA) on given frequency channel
    G2(i8),
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::G1(k) => write!(f, "G1({})", k),
            Self::G2(k) => write!(f, "G2({})", k),
        }
    }
}

impl Carrier {
    /// Carrier frequency in Hz
    pub fn frequency(&self) -> f64 {
        match self {
            Self::L1 => 1575.42E6_f64,
            Self::L2 => 1227.60E6_f64,
            Self::G1(k) => 1602.0E6_f64 + *k as f64 * 562.5E3,
            Self::G2(k) => 1246.0E6_f64 + *k as f64 * 437.5E3,
        }
    }

    /// Returns the (primary, secondary) [Carrier] pair this [SV] transmits
    /// on bands 1 and 2. GLONASS requires its frequency channel.
    /// None when the constellation does not broadcast on both bands, or the
    /// channel is unknown or invalid.
    pub fn dual_frequency(sv: SV, glonass_channel: Option<i8>) -> Option<(Self, Self)> {
        match sv.constellation {
            Constellation::GPS | Constellation::QZSS => Some((Self::L1, Self::L2)),
            Constellation::Glonass => {
                let k = glonass_channel?;
                if GLONASS_CHANNELS.contains(&k) {
                    Some((Self::G1(k), Self::G2(k)))
                } else {
                    None
                }
            },
            _ => None,
        }
    }
}
