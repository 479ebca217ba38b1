//! Collection of readout topologies.
//!
//! Each topology module exposes a `check` function that validates the
//! frame geometry, and a `run` function that writes the row-major frame
//! into `dst` given the raw readout order in `src`.  `run` assumes
//! `check` has passed and that both slices hold `columns * rows` samples.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::{DeinterlaceError, DeinterlaceResult};

/// The channel arrangement used to read the frame off the sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Algorithm {
    None,
    Parallel,
    Serial,
    QuadCcd,
    QuadIr,
    QuadIrCds,
    HawaiiRg,
    Sta1600,
    Custom,
}

pub mod hawaii;
pub mod parallel;
pub mod quad;
pub mod serial;
pub mod sta1600;

impl Algorithm {
    pub const ALL: [Algorithm; 9] = [
        Algorithm::None,
        Algorithm::Parallel,
        Algorithm::Serial,
        Algorithm::QuadCcd,
        Algorithm::QuadIr,
        Algorithm::QuadIrCds,
        Algorithm::HawaiiRg,
        Algorithm::Sta1600,
        Algorithm::Custom,
    ];

    /// Numeric id used on the C interface.
    pub fn id(self) -> u32 {
        match self {
            Algorithm::None => 0,
            Algorithm::Parallel => 1,
            Algorithm::Serial => 2,
            Algorithm::QuadCcd => 3,
            Algorithm::QuadIr => 4,
            Algorithm::QuadIrCds => 5,
            Algorithm::HawaiiRg => 6,
            Algorithm::Sta1600 => 7,
            Algorithm::Custom => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::None => "NONE",
            Algorithm::Parallel => "PARALLEL",
            Algorithm::Serial => "SERIAL",
            Algorithm::QuadCcd => "QUAD_CCD",
            Algorithm::QuadIr => "QUAD_IR",
            Algorithm::QuadIrCds => "QUAD_IR_CDS",
            Algorithm::HawaiiRg => "HAWAII_RG",
            Algorithm::Sta1600 => "STA1600",
            Algorithm::Custom => "CUSTOM",
        }
    }
}

impl TryFrom<u32> for Algorithm {
    type Error = DeinterlaceError;

    fn try_from(id: u32) -> DeinterlaceResult<Self> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.id() == id)
            .ok_or_else(|| DeinterlaceError::UnsupportedAlgorithm(id.to_string()))
    }
}

impl FromStr for Algorithm {
    type Err = DeinterlaceError;

    fn from_str(s: &str) -> DeinterlaceResult<Self> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| DeinterlaceError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fail unless `value` is a multiple of `divisor`.
fn require_multiple(
    algorithm: Algorithm,
    what: &str,
    value: usize,
    divisor: usize,
) -> DeinterlaceResult<()> {
    if value % divisor != 0 {
        return Err(DeinterlaceError::invalid(format!(
            "{} requires {} divisible by {}, got {}",
            algorithm, what, divisor, value
        )));
    }
    Ok(())
}

fn require_even(algorithm: Algorithm, what: &str, value: usize) -> DeinterlaceResult<()> {
    require_multiple(algorithm, what, value, 2)
}

#[cfg(test)]
mod tests {
    use super::Algorithm;
    use std::convert::TryFrom;

    #[test]
    fn test_id_roundtrip() {
        for a in Algorithm::ALL.iter() {
            assert_eq!(Algorithm::try_from(a.id()).unwrap(), *a);
            assert_eq!(a.name().parse::<Algorithm>().unwrap(), *a);
        }
    }

    #[test]
    fn test_unknown_id() {
        assert!(Algorithm::try_from(9).is_err());
        assert!("quad_ccd".parse::<Algorithm>().is_err());
    }
}
