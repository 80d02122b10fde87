// ********* Input data structures ***********

use snafu::Snafu;

use crate::VoteCount;

/// A registered candidate.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Candidate {
    /// Stable identifier, unique in the roster.
    /// All the ties are resolved in favour of the lowest identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Candidate {
    pub fn new(id: &str, name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// A ballot that passed validation.
///
/// It can only be built with [`crate::validate_ballot`] or the builder:
/// the preferences are known candidates, without repetition, and the weight
/// is at least 1.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    pub(crate) preferences: Vec<String>,
    pub(crate) weight: u64,
}

impl Ballot {
    /// Candidate identifiers, most preferred first.
    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }
}

/// A ballot turned down at submission time, kept for reporting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RejectedBallot {
    /// Position of the ballot among all the submitted ones, starting from 0.
    pub position: usize,
    pub preferences: Vec<String>,
    pub weight: u64,
    pub reason: BallotError,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CandidateStatus {
    /// Neither elected nor eliminated, still receiving votes.
    Hopeful,
    Elected,
    Eliminated,
}

/// Where the ballots of one candidate went during a round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub from: String,
    /// For surplus transfers, the transfer value as (surplus, total).
    /// None for eliminations: ballots move with their full weight.
    pub transfer_value: Option<(VoteCount, VoteCount)>,
    /// Weight received by each candidate, in roster order.
    pub transfers: Vec<(String, VoteCount)>,
    /// Weight of the ballots that ran out of preferences.
    pub exhausted: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RoundAction {
    /// The candidates reached the quota and took the last open seats.
    /// Nothing is transferred.
    Elected { elected: Vec<String> },
    /// The candidates reached the quota and their surplus was transferred,
    /// in the order of election.
    SurplusTransfer {
        elected: Vec<String>,
        transfers: Vec<TransferStats>,
    },
    /// Nobody reached the quota, the trailing candidate was removed.
    Eliminated {
        eliminated: String,
        transfer: TransferStats,
    },
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// Totals after counting, in roster order.
    pub tally: Vec<(String, VoteCount)>,
    pub action: RoundAction,
    /// Totals once the action is applied, in roster order.
    pub tally_after: Vec<(String, VoteCount)>,
    /// Cumulative weight of the exhausted ballots at the end of the round.
    pub exhausted: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Termination {
    AllSeatsFilled,
    /// No hopeful candidate was left while some seats were still open.
    /// The seats are left vacant.
    NoCandidatesRemain { vacant_seats: u32 },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Standing {
    pub id: String,
    pub name: String,
    pub status: CandidateStatus,
    /// The final total. For an eliminated candidate, the total held when it
    /// was eliminated.
    pub total: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StvResult {
    pub seats: u32,
    pub quota: VoteCount,
    /// Elected candidates in order of election, then everybody else by
    /// decreasing total.
    pub standings: Vec<Standing>,
    pub elimination_order: Vec<String>,
    pub termination: Termination,
    pub exhausted: VoteCount,
    pub round_stats: Vec<RoundStats>,
}

impl StvResult {
    /// The identifiers of the elected candidates, in order of election.
    pub fn winners(&self) -> Vec<String> {
        self.standings
            .iter()
            .filter(|s| s.status == CandidateStatus::Elected)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn all_seats_filled(&self) -> bool {
        self.termination == Termination::AllSeatsFilled
    }

    pub fn vacant_seats(&self) -> u32 {
        match self.termination {
            Termination::AllSeatsFilled => 0,
            Termination::NoCandidatesRemain { vacant_seats } => vacant_seats,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlatStanding {
    pub id: String,
    pub name: String,
    pub total: u64,
}

/// The outcome of a tally, for either counting mode.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyOutcome {
    Stv(StvResult),
    FlatWeighted(Vec<FlatStanding>),
}

// ********* Errors **********

/// Reasons for turning down a ballot at submission time.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BallotError {
    #[snafu(display("ballot has {len} preferences, expected between 1 and {max}"))]
    InvalidBallotLength { len: usize, max: usize },
    #[snafu(display("candidate {candidate} appears more than once in the ballot"))]
    DuplicateCandidateInBallot { candidate: String },
    #[snafu(display("ballot references unknown candidate {candidate}"))]
    UnknownCandidateReference { candidate: String },
    #[snafu(display("ballot weight {weight} is outside the accepted range 1..={max}"))]
    InvalidBallotWeight { weight: u64, max: u64 },
}

/// Errors that prevent a tally from starting.
///
/// `InvariantViolation` is different from the others: it flags a defect in
/// the engine itself, never a problem with the input.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TallyError {
    #[snafu(display("invalid seat count {seats}, expected between 1 and {candidates}"))]
    InvalidSeatCount { seats: u32, candidates: usize },
    #[snafu(display("the quota cannot be reached: there is no valid vote"))]
    QuotaUnreachable {},
    #[snafu(display("candidate identifier {candidate} is registered more than once"))]
    DuplicateCandidateId { candidate: String },
    #[snafu(display("ballot references candidate {candidate}, which is not in the roster"))]
    BallotOutsideRoster { candidate: String },
    #[snafu(display("the total weight of the ballots is too large"))]
    WeightOverflow {},
    #[snafu(display("internal invariant violated in round {round}: {detail}"))]
    InvariantViolation { round: u32, detail: String },
}

impl TallyError {
    /// True if the error comes from a defect of the engine rather than from
    /// the input.
    pub fn is_defect(&self) -> bool {
        matches!(self, TallyError::InvariantViolation { .. })
    }
}

// ********* Configuration **********

/// The rank weights of the flat weighted count, when none are provided.
pub const DEFAULT_RANK_WEIGHTS: [u64; 3] = [3, 2, 1];

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CountingMode {
    /// Single transferable vote for the given number of seats.
    Stv { seats: u32 },
    /// Sum of `rank_weights[i]` for every candidate ranked at position `i`.
    FlatWeighted { rank_weights: Vec<u64> },
}

impl CountingMode {
    pub fn flat_weighted_default() -> CountingMode {
        CountingMode::FlatWeighted {
            rank_weights: DEFAULT_RANK_WEIGHTS.to_vec(),
        }
    }
}
