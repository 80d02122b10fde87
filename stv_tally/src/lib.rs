/*!
Deterministic tally engine for ranked-preference elections.

Two counting modes are available:

- [`tally_stv`] runs a single transferable vote count: Droop quota, surplus
  transfers from elected candidates and elimination of the trailing candidate,
  one round at a time, until all the seats are filled or no candidate is left.
- [`tally_flat_weighted`] sums a fixed weight per rank for every ballot and
  ranks the candidates by total. There is no quota and no elimination.

All vote weights are fixed-point numbers (see [`VoteCount`]), so that two
independent runs over the same ballots always produce the same result, down to
the last micro-vote.

```
use stv_tally::{tally_stv, validate_ballot, Candidate, Termination};
# use stv_tally::TallyError;

let candidates = vec![
    Candidate::new("A", "Anna"),
    Candidate::new("B", "Bob"),
    Candidate::new("C", "Clara"),
];
let raw = [["A", "B", "C"], ["A", "C", "B"], ["B", "A", "C"], ["C", "B", "A"]];
let ballots: Vec<_> = raw
    .iter()
    .map(|prefs| {
        let prefs: Vec<String> = prefs.iter().map(|s| s.to_string()).collect();
        validate_ballot(&candidates, &prefs, None)
    })
    .collect::<Result<_, _>>()
    .unwrap();

let result = tally_stv(&ballots, &candidates, 1)?;
assert_eq!(result.winners(), vec!["A".to_string()]);
assert_eq!(result.termination, Termination::AllSeatsFilled);
# Ok::<(), TallyError>(())
```
*/

pub mod builder;
mod config;
mod engine;
mod flat;
pub mod manual;
mod quota;
mod results;
mod validation;

use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
};

pub use crate::config::*;
pub use crate::engine::{Election, ElectionState};
pub use crate::flat::tally_flat_weighted;
pub use crate::quota::{droop_quota, Quota};
pub use crate::validation::{validate_ballot, validate_roster, MAX_BALLOT_WEIGHT};

/// A quantity of votes, in fixed-point arithmetic.
///
/// The unit is the micro-vote: one whole vote is [`VoteCount::SCALE`] units.
/// Fractions only appear after a surplus transfer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct VoteCount(u64);

impl VoteCount {
    pub const EMPTY: VoteCount = VoteCount(0);

    /// Number of micro-votes in one vote.
    pub const SCALE: u64 = 1_000_000;

    /// Converts a whole number of votes. Returns None on overflow.
    pub fn from_votes(votes: u64) -> Option<VoteCount> {
        votes.checked_mul(Self::SCALE).map(VoteCount)
    }

    pub const fn from_micro_votes(micro_votes: u64) -> VoteCount {
        VoteCount(micro_votes)
    }

    pub const fn micro_votes(self) -> u64 {
        self.0
    }

    /// The number of whole votes, rounded down.
    pub const fn whole_votes(self) -> u64 {
        self.0 / Self::SCALE
    }

    pub fn checked_add(self, rhs: VoteCount) -> Option<VoteCount> {
        self.0.checked_add(rhs.0).map(VoteCount)
    }
}

impl fmt::Display for VoteCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / Self::SCALE, self.0 % Self::SCALE)
    }
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

impl Sub for VoteCount {
    type Output = VoteCount;
    fn sub(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 - rhs.0)
    }
}

/// Runs a single transferable vote count.
///
/// Arguments:
/// * `ballots` the validated ballots, see [`validate_ballot`]
/// * `candidates` the candidate roster. Identifiers must be unique.
/// * `seats` the number of seats to fill, between 1 and the number of candidates
///
/// Setup errors (seat count, empty ballot set, ballots that reference another
/// roster) are returned before the first round starts.
pub fn tally_stv(
    ballots: &[Ballot],
    candidates: &[Candidate],
    seats: u32,
) -> Result<StvResult, TallyError> {
    Election::new(candidates, seats, ballots)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_count_display() {
        assert_eq!(VoteCount::from_votes(3).unwrap().to_string(), "3.000000");
        assert_eq!(VoteCount::from_micro_votes(333_334).to_string(), "0.333334");
        assert_eq!(VoteCount::EMPTY.to_string(), "0.000000");
    }

    #[test]
    fn vote_count_overflow() {
        assert_eq!(VoteCount::from_votes(u64::MAX), None);
        assert_eq!(
            VoteCount::from_micro_votes(u64::MAX).checked_add(VoteCount::from_micro_votes(1)),
            None
        );
        assert_eq!(VoteCount::from_micro_votes(2_500_000).whole_votes(), 2);
    }

    #[test]
    fn rounds_driven_one_by_one() {
        let candidates = vec![Candidate::new("A", "Anna"), Candidate::new("B", "Bob")];
        let ballots: Vec<Ballot> = [["A", "B"], ["B", "A"], ["A", "B"]]
            .iter()
            .map(|prefs| {
                let prefs: Vec<String> = prefs.iter().map(|s| s.to_string()).collect();
                validate_ballot(&candidates, &prefs, None).unwrap()
            })
            .collect();
        let election = Election::new(&candidates, 1, &ballots).unwrap();
        let start: ElectionState = election.initial_state();
        let (next, stats): (ElectionState, RoundStats) = election.run_round(&start, 1).unwrap();
        assert_eq!(start.num_elected(), 0);
        assert_eq!(next.num_elected(), 1);
        assert_eq!(
            stats.action,
            RoundAction::Elected {
                elected: vec!["A".to_string()]
            }
        );
    }

    #[test]
    fn repeated_and_reordered_counts_agree() {
        // 7 votes, 2 seats: quota 3. A carries a surplus of 1/4 forward, one
        // of its ballots exhausts. D then C are eliminated and B gets elected.
        let candidates: Vec<Candidate> = ["A", "B", "C", "D"]
            .iter()
            .map(|id| Candidate::new(id, id))
            .collect();
        let raw = [
            ("A B C", 2),
            ("A C", 1),
            ("A", 1),
            ("B D", 1),
            ("C B", 1),
            ("D B", 1),
        ];
        let ballots: Vec<Ballot> = raw
            .iter()
            .map(|(prefs, weight)| {
                let prefs: Vec<String> = prefs.split_whitespace().map(|s| s.to_string()).collect();
                validate_ballot(&candidates, &prefs, Some(*weight)).unwrap()
            })
            .collect();

        let first = tally_stv(&ballots, &candidates, 2).unwrap();
        assert_eq!(first.winners(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            first.elimination_order,
            vec!["D".to_string(), "C".to_string()]
        );
        assert_eq!(first.exhausted, VoteCount::from_micro_votes(500_000));
        assert_eq!(first.round_stats.len(), 4);

        let second = tally_stv(&ballots, &candidates, 2).unwrap();
        assert_eq!(first, second);

        let mut reversed = ballots.clone();
        reversed.reverse();
        assert_eq!(tally_stv(&reversed, &candidates, 2).unwrap(), first);

        for shift in 1..ballots.len() {
            let mut rotated = ballots.clone();
            rotated.rotate_left(shift);
            assert_eq!(tally_stv(&rotated, &candidates, 2).unwrap(), first);
        }
    }
}
