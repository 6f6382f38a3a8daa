//! Moment (radar product) naming.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named physical quantity measured by the radar.
///
/// The three-character names come from the digital radar data moment
/// blocks ("REF", "VEL", ...). Names this crate does not recognize are
/// preserved under [`Moment::Other`] rather than dropped, so data from
/// future moment types survives a round trip through the decoder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Moment {
    Reflectivity,
    Velocity,
    SpectrumWidth,
    DifferentialReflectivity,
    DifferentialPhase,
    CorrelationCoefficient,
    ClutterFilterPower,
    Other(String),
}

impl Moment {
    /// Map a moment block name to a moment. Trailing spaces in the
    /// transmitted name (e.g. `"SW "`) are ignored.
    pub fn from_name(name: &str) -> Self {
        match name.trim_end() {
            "REF" => Moment::Reflectivity,
            "VEL" => Moment::Velocity,
            "SW" => Moment::SpectrumWidth,
            "ZDR" => Moment::DifferentialReflectivity,
            "PHI" => Moment::DifferentialPhase,
            "RHO" => Moment::CorrelationCoefficient,
            "CFP" => Moment::ClutterFilterPower,
            other => Moment::Other(other.to_string()),
        }
    }

    /// The transmitted short name.
    pub fn name(&self) -> &str {
        match self {
            Moment::Reflectivity => "REF",
            Moment::Velocity => "VEL",
            Moment::SpectrumWidth => "SW",
            Moment::DifferentialReflectivity => "ZDR",
            Moment::DifferentialPhase => "PHI",
            Moment::CorrelationCoefficient => "RHO",
            Moment::ClutterFilterPower => "CFP",
            Moment::Other(name) => name,
        }
    }

    /// Whether this is a name the crate recognizes.
    pub fn is_known(&self) -> bool {
        !matches!(self, Moment::Other(_))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
