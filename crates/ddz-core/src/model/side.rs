use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Side {
    Landlord = 0,
    /// The two opposing players, modelled as one combined hand.
    Peasant = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Landlord, Side::Peasant];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Side::Landlord),
            1 => Some(Side::Peasant),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> Side {
        match self {
            Side::Landlord => Side::Peasant,
            Side::Peasant => Side::Landlord,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Landlord => "landlord",
            Side::Peasant => "peasant",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError(String);

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown side '{}' (expected landlord or peasant)", self.0)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landlord" | "l" => Ok(Side::Landlord),
            "peasant" | "peasants" | "p" => Ok(Side::Peasant),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Side;

    #[test]
    fn other_swaps_sides() {
        assert_eq!(Side::Landlord.other(), Side::Peasant);
        assert_eq!(Side::Peasant.other().other(), Side::Peasant);
    }

    #[test]
    fn index_roundtrip() {
        for (i, side) in Side::BOTH.iter().enumerate() {
            assert_eq!(Side::from_index(i), Some(*side));
            assert_eq!(side.index(), i);
        }
        assert_eq!(Side::from_index(2), None);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Landlord".parse::<Side>(), Ok(Side::Landlord));
        assert_eq!(" p ".parse::<Side>(), Ok(Side::Peasant));
        assert!("dealer".parse::<Side>().is_err());
        assert_eq!(Side::Peasant.to_string(), "peasant");
    }
}
