use std::collections::HashSet;

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::VoteCount;

/// The largest accepted ballot weight, in votes.
pub const MAX_BALLOT_WEIGHT: u64 = u64::MAX / VoteCount::SCALE;

/// Checks a raw preference list against the roster and builds a ballot out of it.
///
/// `weight` defaults to 1. This is meant to be called once, when the ballot is
/// submitted: a ballot that is turned down never takes part in a tally.
///
/// ```
/// use stv_tally::{validate_ballot, BallotError, Candidate};
///
/// let roster = vec![Candidate::new("A", "Anna"), Candidate::new("B", "Bob")];
/// let prefs = vec!["A".to_string(), "A".to_string()];
/// assert_eq!(
///     validate_ballot(&roster, &prefs, None),
///     Err(BallotError::DuplicateCandidateInBallot { candidate: "A".to_string() })
/// );
/// ```
pub fn validate_ballot(
    roster: &[Candidate],
    preferences: &[String],
    weight: Option<u64>,
) -> Result<Ballot, BallotError> {
    ensure!(
        !preferences.is_empty() && preferences.len() <= roster.len(),
        InvalidBallotLengthSnafu {
            len: preferences.len(),
            max: roster.len(),
        }
    );

    let known: HashSet<&str> = roster.iter().map(|c| c.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    for cid in preferences.iter() {
        ensure!(
            known.contains(cid.as_str()),
            UnknownCandidateReferenceSnafu {
                candidate: cid.clone()
            }
        );
        ensure!(
            seen.insert(cid.as_str()),
            DuplicateCandidateInBallotSnafu {
                candidate: cid.clone()
            }
        );
    }

    let weight = weight.unwrap_or(1);
    ensure!(
        (1..=MAX_BALLOT_WEIGHT).contains(&weight),
        InvalidBallotWeightSnafu {
            weight,
            max: MAX_BALLOT_WEIGHT,
        }
    );

    debug!("validate_ballot: accepted {:?} weight {}", preferences, weight);
    Ok(Ballot {
        preferences: preferences.to_vec(),
        weight,
    })
}

/// Checks that every candidate identifier is registered only once.
pub fn validate_roster(roster: &[Candidate]) -> Result<(), TallyError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for c in roster.iter() {
        ensure!(
            seen.insert(c.id.as_str()),
            DuplicateCandidateIdSnafu {
                candidate: c.id.clone()
            }
        );
    }
    Ok(())
}
