use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Inverter working mode for one half-hour segment.
///
/// The declaration order is the deterministic tie-break order used by the
/// lattice searches when two modes lead to the same objective.
#[derive(Debug, Deserialize, Hash, Serialize, enumset::EnumSetType)]
pub enum Mode {
    /// Solar covers the load first; surplus charges the battery, deficit drains it.
    Discharge,

    /// All solar is routed to the battery; the load is served from the grid.
    ChargeSolarOnly,

    /// Solar plus a bounded grid draw charge the battery; the load is served from the grid.
    ChargeFromGridAndSolar,
}

impl Mode {
    /// Every mode, in tie-break order.
    pub const ALL: [Self; 3] = [Self::Discharge, Self::ChargeSolarOnly, Self::ChargeFromGridAndSolar];

    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::Discharge => 0,
            Self::ChargeSolarOnly => 1,
            Self::ChargeFromGridAndSolar => 2,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Discharge => "Discharge",
            Self::ChargeSolarOnly => "ChargeSolarOnly",
            Self::ChargeFromGridAndSolar => "ChargeFromGridAndSolar",
        })
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Discharge" => Ok(Self::Discharge),
            "ChargeSolarOnly" => Ok(Self::ChargeSolarOnly),
            "ChargeFromGridAndSolar" => Ok(Self::ChargeFromGridAndSolar),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}
