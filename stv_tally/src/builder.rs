use log::warn;

pub use crate::config::*;
use crate::flat::tally_flat_weighted;
use crate::validation::{validate_ballot, validate_roster};

/// A builder for collecting ballots.
///
/// Every ballot is checked when it is added. A ballot that fails the checks is
/// kept aside (see [`Builder::rejected`]) and never counted.
///
/// ```
/// use stv_tally::builder::Builder;
/// use stv_tally::Candidate;
/// # use stv_tally::TallyError;
///
/// let mut builder = Builder::new(&[Candidate::new("A", "Anna"), Candidate::new("B", "Bob")])?;
///
/// builder.add_ballot(&["A".to_string(), "B".to_string()]).unwrap();
/// assert!(builder.add_ballot(&["A".to_string(), "A".to_string()]).is_err());
///
/// let result = builder.tally_stv(1)?;
/// assert_eq!(result.winners(), vec!["A".to_string()]);
/// assert_eq!(builder.rejected().len(), 1);
/// # Ok::<(), TallyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    candidates: Vec<Candidate>,
    ballots: Vec<Ballot>,
    rejected: Vec<RejectedBallot>,
}

impl Builder {
    pub fn new(candidates: &[Candidate]) -> Result<Builder, TallyError> {
        validate_roster(candidates)?;
        Ok(Builder {
            candidates: candidates.to_vec(),
            ballots: Vec::new(),
            rejected: Vec::new(),
        })
    }

    /// Adds a ballot with a weight of 1.
    pub fn add_ballot(&mut self, preferences: &[String]) -> Result<(), BallotError> {
        self.add_weighted_ballot(preferences, 1)
    }

    /// Adds a ballot that counts `weight` times.
    ///
    /// preferences: the candidate identifiers, most preferred first.
    pub fn add_weighted_ballot(
        &mut self,
        preferences: &[String],
        weight: u64,
    ) -> Result<(), BallotError> {
        match validate_ballot(&self.candidates, preferences, Some(weight)) {
            Ok(ballot) => {
                self.ballots.push(ballot);
                Ok(())
            }
            Err(reason) => {
                warn!("Rejected ballot {:?}: {}", preferences, reason);
                self.rejected.push(RejectedBallot {
                    position: self.ballots.len() + self.rejected.len(),
                    preferences: preferences.to_vec(),
                    weight,
                    reason: reason.clone(),
                });
                Err(reason)
            }
        }
    }

    /// The accepted ballots, in submission order.
    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn rejected(&self) -> &[RejectedBallot] {
        &self.rejected
    }

    pub fn tally_stv(&self, seats: u32) -> Result<StvResult, TallyError> {
        crate::tally_stv(&self.ballots, &self.candidates, seats)
    }

    pub fn tally_flat_weighted(
        &self,
        rank_weights: &[u64],
    ) -> Result<Vec<FlatStanding>, TallyError> {
        tally_flat_weighted(&self.ballots, &self.candidates, rank_weights)
    }

    pub fn tally(&self, mode: &CountingMode) -> Result<TallyOutcome, TallyError> {
        match mode {
            CountingMode::Stv { seats } => self.tally_stv(*seats).map(TallyOutcome::Stv),
            CountingMode::FlatWeighted { rank_weights } => self
                .tally_flat_weighted(rank_weights)
                .map(TallyOutcome::FlatWeighted),
        }
    }
}
