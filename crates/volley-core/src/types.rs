use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// LauncherId
// ---------------------------------------------------------------------------

/// Stable integer identity of a launcher, assigned sequentially at
/// registration time and valid for the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LauncherId(pub u32);

impl LauncherId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LauncherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for LauncherId {
    type Err = crate::error::VolleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(LauncherId)
            .map_err(|_| crate::error::VolleyError::InvalidArgument(format!("bad launcher id '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TargetId
// ---------------------------------------------------------------------------

/// Identity of an abstract physical objective (a building on the board).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn launcher_id_parses_decimal() {
        assert_eq!(LauncherId::from_str("3").unwrap(), LauncherId(3));
        assert!(LauncherId::from_str("x").is_err());
        assert!(LauncherId::from_str("-1").is_err());
    }

    #[test]
    fn ids_display_with_hash() {
        assert_eq!(LauncherId(0).to_string(), "#0");
        assert_eq!(TargetId(1).to_string(), "#1");
    }
}
