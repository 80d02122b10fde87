/// The winning threshold of an election.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Quota {
    /// Number of whole votes a candidate needs to be elected.
    Reachable(u64),
    /// There is no valid vote: nobody can be elected.
    Unreachable,
}

/// The Droop quota: `floor(total_valid_votes / (seats + 1)) + 1`.
///
/// `total_valid_votes` is the sum of the weights of the accepted ballots.
pub fn droop_quota(total_valid_votes: u64, seats: u32) -> Quota {
    if total_valid_votes == 0 {
        Quota::Unreachable
    } else {
        Quota::Reachable(total_valid_votes / (seats as u64 + 1) + 1)
    }
}
