//! Greedy tier-balanced team assignment
//!
//! Pure computation over a finalized roster of exactly ten players. One
//! stable sort, one linear pass, no rebalancing afterwards; the single-pass
//! heuristic is the contract, not an approximation of an optimal partition.

use crate::error::BalanceError;
use crate::session::{Participant, ROSTER_CAPACITY};
use crate::tier::Tier;

/// Rank-sum difference at or below which a match counts as very balanced.
pub const VERY_BALANCED_MAX_DIFF: u32 = 1;
/// Rank-sum difference at or below which a match is merely a little lopsided.
pub const SLIGHT_IMBALANCE_MAX_DIFF: u32 = 3;

/// Qualitative verdict on how even the two teams came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceVerdict {
    VeryBalanced,
    SlightlyImbalanced,
    RecommendRebalance,
}

impl BalanceVerdict {
    fn from_diff(diff: u32) -> Self {
        if diff <= VERY_BALANCED_MAX_DIFF {
            Self::VeryBalanced
        } else if diff <= SLIGHT_IMBALANCE_MAX_DIFF {
            Self::SlightlyImbalanced
        } else {
            Self::RecommendRebalance
        }
    }
}

/// One of the two assigned teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub members: Vec<Participant>,
    /// Sum of member rank values; lower means stronger.
    pub rank_sum: u32,
}

impl Team {
    fn new() -> Self {
        Self {
            members: Vec::with_capacity(ROSTER_CAPACITY / 2),
            rank_sum: 0,
        }
    }

    fn push(&mut self, participant: Participant) {
        self.rank_sum += participant.tier.rank();
        self.members.push(participant);
    }

    /// Tier label closest to the team's mean rank, or None for an empty team.
    pub fn average_tier(&self) -> Option<Tier> {
        if self.members.is_empty() {
            return None;
        }
        let mean = f64::from(self.rank_sum) / self.members.len() as f64;
        Some(Tier::closest_to_mean(mean))
    }
}

/// Derived assignment report. Never persisted, never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    pub team_a: Team,
    pub team_b: Team,
}

impl TeamAssignment {
    pub fn rank_sum_diff(&self) -> u32 {
        self.team_a.rank_sum.abs_diff(self.team_b.rank_sum)
    }

    pub fn verdict(&self) -> BalanceVerdict {
        BalanceVerdict::from_diff(self.rank_sum_diff())
    }
}

/// Split a ten-player roster into two teams of five.
///
/// Players are taken strongest-first; each goes to team A whenever A's
/// running rank-sum is less than or equal to B's (ties favor A), otherwise to
/// team B. Anything but exactly ten players is a call-sequencing defect.
pub fn assign_teams(roster: &[Participant]) -> Result<TeamAssignment, BalanceError> {
    if roster.len() != ROSTER_CAPACITY {
        return Err(BalanceError::InvalidRosterSize {
            actual: roster.len(),
            expected: ROSTER_CAPACITY,
        });
    }

    let mut sorted = roster.to_vec();
    sorted.sort_by_key(|p| p.tier.rank());

    let mut team_a = Team::new();
    let mut team_b = Team::new();

    for participant in sorted {
        if team_a.rank_sum <= team_b.rank_sum {
            team_a.push(participant);
        } else {
            team_b.push(participant);
        }
    }

    Ok(TeamAssignment { team_a, team_b })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(user_id: u64, tier: Tier) -> Participant {
        Participant { user_id, tier }
    }

    fn full_ladder() -> Vec<Participant> {
        Tier::ORDER
            .iter()
            .enumerate()
            .map(|(i, &tier)| player(i as u64 + 1, tier))
            .collect()
    }

    #[test]
    fn rejects_short_and_long_rosters() {
        let mut roster = full_ladder();
        roster.pop();
        assert_eq!(
            assign_teams(&roster),
            Err(BalanceError::InvalidRosterSize {
                actual: 9,
                expected: 10,
            })
        );

        let mut roster = full_ladder();
        roster.push(player(11, Tier::Gold));
        assert_eq!(
            assign_teams(&roster),
            Err(BalanceError::InvalidRosterSize {
                actual: 11,
                expected: 10,
            })
        );
    }

    #[test]
    fn full_ladder_alternates_with_tie_to_team_a() {
        let assignment = assign_teams(&full_ladder()).unwrap();

        let ranks = |team: &Team| -> Vec<u32> {
            team.members.iter().map(|p| p.tier.rank()).collect()
        };
        assert_eq!(ranks(&assignment.team_a), vec![1, 3, 5, 7, 9]);
        assert_eq!(ranks(&assignment.team_b), vec![2, 4, 6, 8, 10]);
        assert_eq!(assignment.team_a.rank_sum, 25);
        assert_eq!(assignment.team_b.rank_sum, 30);
        assert_eq!(assignment.rank_sum_diff(), 5);
        assert_eq!(assignment.verdict(), BalanceVerdict::RecommendRebalance);
    }

    #[test]
    fn teams_partition_the_roster() {
        let roster: Vec<Participant> = (1..=10)
            .map(|i| player(i, if i % 3 == 0 { Tier::Gold } else { Tier::Silver }))
            .collect();
        let assignment = assign_teams(&roster).unwrap();

        assert_eq!(assignment.team_a.members.len(), 5);
        assert_eq!(assignment.team_b.members.len(), 5);

        let mut ids: Vec<u64> = assignment
            .team_a
            .members
            .iter()
            .chain(&assignment.team_b.members)
            .map(|p| p.user_id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    }

    #[test]
    fn uniform_roster_is_very_balanced() {
        let roster: Vec<Participant> = (1..=10).map(|i| player(i, Tier::Gold)).collect();
        let assignment = assign_teams(&roster).unwrap();

        assert_eq!(assignment.team_a.rank_sum, 30);
        assert_eq!(assignment.team_b.rank_sum, 30);
        assert_eq!(assignment.verdict(), BalanceVerdict::VeryBalanced);
        assert_eq!(assignment.team_a.average_tier(), Some(Tier::Gold));
    }

    #[test]
    fn empty_team_has_no_average_tier() {
        let team = Team {
            members: Vec::new(),
            rank_sum: 0,
        };
        assert_eq!(team.average_tier(), None);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(BalanceVerdict::from_diff(0), BalanceVerdict::VeryBalanced);
        assert_eq!(BalanceVerdict::from_diff(1), BalanceVerdict::VeryBalanced);
        assert_eq!(
            BalanceVerdict::from_diff(2),
            BalanceVerdict::SlightlyImbalanced
        );
        assert_eq!(
            BalanceVerdict::from_diff(3),
            BalanceVerdict::SlightlyImbalanced
        );
        assert_eq!(
            BalanceVerdict::from_diff(4),
            BalanceVerdict::RecommendRebalance
        );
    }

    #[test]
    fn sort_is_stable_for_equal_tiers() {
        // Two Radiants, first-joined first-placed.
        let mut roster = full_ladder();
        roster[1] = player(2, Tier::Radiant);
        let assignment = assign_teams(&roster).unwrap();
        assert_eq!(assignment.team_a.members[0].user_id, 1);
        assert_eq!(assignment.team_b.members[0].user_id, 2);
    }
}
