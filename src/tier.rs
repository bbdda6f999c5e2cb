//! Skill tier ladder
//!
//! Ten fixed ranks with a strict total order, strongest first. Rank numbers
//! are the raw values the balancer sums, so a lower sum means a stronger team.

use std::fmt;

/// Skill tier, strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Radiant,
    Immortal,
    Ascendant,
    Diamond,
    Platinum,
    Gold,
    Silver,
    Bronze,
    Iron,
    Unranked,
}

impl Tier {
    /// All tiers in enumeration order (strongest first). This order is the
    /// tie-break authority for role matching and average-tier labelling.
    pub const ORDER: [Tier; 10] = [
        Tier::Radiant,
        Tier::Immortal,
        Tier::Ascendant,
        Tier::Diamond,
        Tier::Platinum,
        Tier::Gold,
        Tier::Silver,
        Tier::Bronze,
        Tier::Iron,
        Tier::Unranked,
    ];

    /// Numeric rank, 1 (strongest) through 10 (weakest).
    pub fn rank(self) -> u32 {
        match self {
            Tier::Radiant => 1,
            Tier::Immortal => 2,
            Tier::Ascendant => 3,
            Tier::Diamond => 4,
            Tier::Platinum => 5,
            Tier::Gold => 6,
            Tier::Silver => 7,
            Tier::Bronze => 8,
            Tier::Iron => 9,
            Tier::Unranked => 10,
        }
    }

    /// Display name, matching the Discord role names the bot resolves against.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Radiant => "Radiant",
            Tier::Immortal => "Immortal",
            Tier::Ascendant => "Ascendant",
            Tier::Diamond => "Diamond",
            Tier::Platinum => "Platinum",
            Tier::Gold => "Gold",
            Tier::Silver => "Silver",
            Tier::Bronze => "Bronze",
            Tier::Iron => "Iron",
            Tier::Unranked => "Unranked",
        }
    }

    /// Marker glyph used in roster and team listings.
    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Radiant => "🟡",
            Tier::Immortal => "🔴",
            Tier::Ascendant => "🟢",
            Tier::Diamond => "🟣",
            Tier::Platinum => "🔷",
            Tier::Gold => "🟠",
            Tier::Silver => "⚪",
            Tier::Bronze => "🟤",
            Tier::Iron => "⚫",
            Tier::Unranked => "▫️",
        }
    }

    /// Resolve a member's tier from their role names: first tier (strongest
    /// first) whose name appears among the roles wins, Unranked otherwise.
    pub fn from_role_names<S: AsRef<str>>(roles: &[S]) -> Tier {
        for tier in Tier::ORDER {
            if roles.iter().any(|r| r.as_ref() == tier.name()) {
                return tier;
            }
        }
        Tier::Unranked
    }

    /// Tier whose rank is numerically closest to `mean`. Ties in closeness go
    /// to the tier enumerated first (strongest).
    pub fn closest_to_mean(mean: f64) -> Tier {
        let mut best = Tier::Radiant;
        let mut best_distance = f64::INFINITY;
        for tier in Tier::ORDER {
            let distance = (f64::from(tier.rank()) - mean).abs();
            if distance < best_distance {
                best = tier;
                best_distance = distance;
            }
        }
        best
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_one_through_ten_in_order() {
        for (i, tier) in Tier::ORDER.iter().enumerate() {
            assert_eq!(tier.rank(), i as u32 + 1);
        }
    }

    #[test]
    fn role_match_prefers_strongest() {
        let roles = ["Gold", "Immortal", "Member"];
        assert_eq!(Tier::from_role_names(&roles), Tier::Immortal);
    }

    #[test]
    fn no_tier_role_defaults_to_unranked() {
        let roles = ["Member", "Booster"];
        assert_eq!(Tier::from_role_names(&roles), Tier::Unranked);
        assert_eq!(Tier::from_role_names::<&str>(&[]), Tier::Unranked);
    }

    #[test]
    fn closest_tier_rounds_to_nearest_rank() {
        assert_eq!(Tier::closest_to_mean(1.0), Tier::Radiant);
        assert_eq!(Tier::closest_to_mean(5.2), Tier::Platinum);
        assert_eq!(Tier::closest_to_mean(9.8), Tier::Unranked);
    }

    #[test]
    fn closest_tier_tie_goes_to_stronger() {
        // 5.5 is equidistant from Platinum (5) and Gold (6).
        assert_eq!(Tier::closest_to_mean(5.5), Tier::Platinum);
    }
}
