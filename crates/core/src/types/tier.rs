//! Loyalty tiers.

use serde::{Deserialize, Serialize};

/// Lifetime-points thresholds for each tier, lowest first.
const THRESHOLDS: &[(i64, Tier)] = &[
    (0, Tier::Iron),
    (10_000, Tier::Bronze),
    (50_000, Tier::Silver),
    (200_000, Tier::Gold),
];

/// Loyalty tier associated with a user.
///
/// Tiers are derived from accumulated points and only ever move upward;
/// an admin may also set one explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Iron,
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    /// The tier a user with the given lifetime points qualifies for.
    #[must_use]
    pub fn for_points(points: i64) -> Self {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(min, _)| points >= *min)
            .map_or(Self::Iron, |(_, tier)| *tier)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iron => write!(f, "iron"),
            Self::Bronze => write!(f, "bronze"),
            Self::Silver => write!(f, "silver"),
            Self::Gold => write!(f, "gold"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iron" => Ok(Self::Iron),
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            _ => Err(format!("invalid tier: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(Tier::for_points(0), Tier::Iron);
        assert_eq!(Tier::for_points(9_999), Tier::Iron);
        assert_eq!(Tier::for_points(10_000), Tier::Bronze);
        assert_eq!(Tier::for_points(50_000), Tier::Silver);
        assert_eq!(Tier::for_points(1_000_000), Tier::Gold);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Iron < Tier::Bronze);
        assert!(Tier::Silver < Tier::Gold);
    }
}
