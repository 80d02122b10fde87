use log::{debug, info};
use snafu::prelude::*;

use std::collections::{BTreeMap, HashMap};

use crate::config::*;
use crate::quota::{droop_quota, Quota};
use crate::results::aggregate_results;
use crate::validation::validate_roster;
use crate::VoteCount;

// **** Private structures ****

type RoundId = u32;

/// Position of a candidate in the roster.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(usize);

// Invariant: between two rounds, `cursor` designates a hopeful candidate, or is
// past the end of `ranks` once the ballot is exhausted.
#[derive(Eq, PartialEq, Debug, Clone)]
struct LiveBallot {
    ranks: Vec<CandidateId>,
    cursor: usize,
    weight: VoteCount,
}

impl LiveBallot {
    fn current(&self) -> Option<CandidateId> {
        self.ranks.get(self.cursor).copied()
    }

    /// Moves to the next hopeful candidate, skipping the elected and the
    /// eliminated ones. Returns None when the ballot gets exhausted.
    fn advance(&mut self, statuses: &[CandidateStatus]) -> Option<CandidateId> {
        self.cursor += 1;
        while let Some(cid) = self.ranks.get(self.cursor) {
            if statuses[cid.0] == CandidateStatus::Hopeful {
                return Some(*cid);
            }
            self.cursor += 1;
        }
        None
    }
}

/// The state of a count between two rounds.
///
/// A round is a pure function from one state to the next
/// (see [`Election::run_round`]); the state can be kept by the caller after
/// each round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionState {
    statuses: Vec<CandidateStatus>,
    totals: Vec<VoteCount>,
    ballots: Vec<LiveBallot>,
    exhausted: VoteCount,
    num_elected: u32,
}

impl ElectionState {
    /// Status of each candidate, in roster order.
    pub fn statuses(&self) -> &[CandidateStatus] {
        &self.statuses
    }

    /// Total of each candidate, in roster order.
    pub fn totals(&self) -> &[VoteCount] {
        &self.totals
    }

    pub fn exhausted(&self) -> VoteCount {
        self.exhausted
    }

    pub fn num_elected(&self) -> u32 {
        self.num_elected
    }

    pub fn has_hopeful(&self) -> bool {
        self.statuses.contains(&CandidateStatus::Hopeful)
    }
}

/// An election ready to be counted: roster, seats, quota and ballots.
///
/// All the checks happen in [`Election::new`]. Once built, the count always
/// runs to the end.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    candidates: Vec<Candidate>,
    seats: u32,
    quota: VoteCount,
    total_weight: VoteCount,
    ballots: Vec<LiveBallot>,
}

impl Election {
    pub fn new(
        candidates: &[Candidate],
        seats: u32,
        ballots: &[Ballot],
    ) -> Result<Election, TallyError> {
        validate_roster(candidates)?;
        ensure!(
            seats >= 1 && seats as usize <= candidates.len(),
            InvalidSeatCountSnafu {
                seats,
                candidates: candidates.len(),
            }
        );

        let index: HashMap<&str, CandidateId> = candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id.as_str(), CandidateId(idx)))
            .collect();

        let mut total_votes: u64 = 0;
        let mut live_ballots: Vec<LiveBallot> = Vec::with_capacity(ballots.len());
        for b in ballots.iter() {
            let mut ranks: Vec<CandidateId> = Vec::with_capacity(b.preferences.len());
            for cid in b.preferences.iter() {
                let id = index.get(cid.as_str()).context(BallotOutsideRosterSnafu {
                    candidate: cid.clone(),
                })?;
                ranks.push(*id);
            }
            total_votes = total_votes
                .checked_add(b.weight)
                .context(WeightOverflowSnafu)?;
            live_ballots.push(LiveBallot {
                ranks,
                cursor: 0,
                weight: VoteCount::from_votes(b.weight).context(WeightOverflowSnafu)?,
            });
        }
        let total_weight = VoteCount::from_votes(total_votes).context(WeightOverflowSnafu)?;

        let quota = match droop_quota(total_votes, seats) {
            Quota::Reachable(q) => VoteCount::from_votes(q).context(WeightOverflowSnafu)?,
            Quota::Unreachable => return QuotaUnreachableSnafu.fail(),
        };
        info!(
            "Election: {} candidates, {} seats, {} ballots, {} votes, quota {}",
            candidates.len(),
            seats,
            live_ballots.len(),
            total_votes,
            quota
        );

        Ok(Election {
            candidates: candidates.to_vec(),
            seats,
            quota,
            total_weight,
            ballots: live_ballots,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn quota(&self) -> VoteCount {
        self.quota
    }

    /// Sum of the weights of all the ballots.
    pub fn total_weight(&self) -> VoteCount {
        self.total_weight
    }

    /// The state before the first round: everybody is hopeful and every
    /// ballot points at its first preference.
    pub fn initial_state(&self) -> ElectionState {
        let num_candidates = self.candidates.len();
        let exhausted: VoteCount = self
            .ballots
            .iter()
            .filter(|b| b.current().is_none())
            .map(|b| b.weight)
            .sum();
        ElectionState {
            statuses: vec![CandidateStatus::Hopeful; num_candidates],
            totals: vec![VoteCount::EMPTY; num_candidates],
            ballots: self.ballots.clone(),
            exhausted,
            num_elected: 0,
        }
    }

    /// Runs all the rounds until the seats are filled or no hopeful candidate
    /// is left.
    pub fn run(&self) -> Result<StvResult, TallyError> {
        {
            let mut sorted_candidates: Vec<&Candidate> = self.candidates.iter().collect();
            sorted_candidates.sort_by(|a, b| a.id.cmp(&b.id));
            for c in sorted_candidates.iter() {
                info!("Candidate: {}: {}", c.id, c.name);
            }
        }

        // Every round elects or eliminates at least one candidate.
        let max_rounds = self.candidates.len() as RoundId + 1;
        let mut state = self.initial_state();
        let mut round_stats: Vec<RoundStats> = Vec::new();

        let termination = loop {
            let round_id = round_stats.len() as RoundId + 1;
            ensure!(
                round_id <= max_rounds,
                InvariantViolationSnafu {
                    round: round_id,
                    detail: "the count did not converge",
                }
            );

            if !state.has_hopeful() {
                let vacant_seats = self.seats - state.num_elected;
                info!(
                    "Round {}: no hopeful candidate left, {} seat(s) left vacant",
                    round_id, vacant_seats
                );
                break Termination::NoCandidatesRemain { vacant_seats };
            }

            let (next, stats) = self.run_round(&state, round_id)?;
            ensure!(
                next.num_elected >= state.num_elected && next.num_elected <= self.seats,
                InvariantViolationSnafu {
                    round: round_id,
                    detail: format!(
                        "elected count went from {} to {} with {} seats",
                        state.num_elected, next.num_elected, self.seats
                    ),
                }
            );
            info!("Round {}: {:?}", round_id, stats.action);
            round_stats.push(stats);
            state = next;

            if state.num_elected == self.seats {
                info!("Round {}: all the seats are filled", round_id);
                break Termination::AllSeatsFilled;
            }
        };

        Ok(aggregate_results(self, round_stats, termination))
    }

    /// Runs one round: counting, election check, then either a surplus
    /// transfer or an elimination.
    ///
    /// The input state is not modified.
    pub fn run_round(
        &self,
        state: &ElectionState,
        round_id: u32,
    ) -> Result<(ElectionState, RoundStats), TallyError> {
        let tally = self.compute_tally(state, round_id)?;
        self.check_conservation(&tally, state.exhausted, round_id, "counting")?;
        debug!("run_round {}: tally: {:?}", round_id, tally);

        let mut next = state.clone();
        next.totals = tally.clone();

        let mut newly_elected = self.find_elected_candidates(&tally, &state.statuses);
        newly_elected.truncate((self.seats - state.num_elected) as usize);
        for cid in newly_elected.iter() {
            next.statuses[cid.0] = CandidateStatus::Elected;
        }
        next.num_elected += newly_elected.len() as u32;
        let elected_names: Vec<String> = newly_elected
            .iter()
            .map(|cid| self.candidates[cid.0].id.clone())
            .collect();
        debug!("run_round {}: elected: {:?}", round_id, elected_names);

        let action = if !newly_elected.is_empty() && next.num_elected == self.seats {
            RoundAction::Elected {
                elected: elected_names,
            }
        } else if !newly_elected.is_empty() {
            let transfers: Vec<TransferStats> = newly_elected
                .iter()
                .map(|cid| self.transfer_surplus(&mut next, *cid))
                .collect();
            RoundAction::SurplusTransfer {
                elected: elected_names,
                transfers,
            }
        } else {
            let eliminated = self
                .find_eliminated_candidate(&tally, &state.statuses)
                .context(InvariantViolationSnafu {
                    round: round_id,
                    detail: "no hopeful candidate to eliminate",
                })?;
            next.statuses[eliminated.0] = CandidateStatus::Eliminated;
            let transfer = self.eliminate(&mut next, eliminated);
            RoundAction::Eliminated {
                eliminated: self.candidates[eliminated.0].id.clone(),
                transfer,
            }
        };

        self.check_conservation(&next.totals, next.exhausted, round_id, "transfer")?;

        let stats = RoundStats {
            round: round_id,
            tally: self.named_tally(&tally),
            action,
            tally_after: self.named_tally(&next.totals),
            exhausted: next.exhausted,
        };
        Ok((next, stats))
    }

    // Elected candidates keep the votes they had after their transfer.
    // Everybody else starts from zero.
    fn compute_tally(
        &self,
        state: &ElectionState,
        round_id: u32,
    ) -> Result<Vec<VoteCount>, TallyError> {
        let mut tally: Vec<VoteCount> = state
            .statuses
            .iter()
            .zip(state.totals.iter())
            .map(|(status, vc)| match status {
                CandidateStatus::Elected => *vc,
                _ => VoteCount::EMPTY,
            })
            .collect();
        for b in state.ballots.iter() {
            if let Some(cid) = b.current() {
                ensure!(
                    state.statuses[cid.0] == CandidateStatus::Hopeful,
                    InvariantViolationSnafu {
                        round: round_id,
                        detail: format!(
                            "a ballot is still assigned to {} ({:?})",
                            self.candidates[cid.0].id, state.statuses[cid.0]
                        ),
                    }
                );
                tally[cid.0] += b.weight;
            }
        }
        Ok(tally)
    }

    fn check_conservation(
        &self,
        totals: &[VoteCount],
        exhausted: VoteCount,
        round_id: RoundId,
        stage: &str,
    ) -> Result<(), TallyError> {
        let accounted: VoteCount = totals.iter().cloned().sum::<VoteCount>() + exhausted;
        ensure!(
            accounted == self.total_weight,
            InvariantViolationSnafu {
                round: round_id,
                detail: format!(
                    "after {}: {} votes accounted for, expected {}",
                    stage, accounted, self.total_weight
                ),
            }
        );
        Ok(())
    }

    /// The hopeful candidates at or above the quota, highest total first.
    fn find_elected_candidates(
        &self,
        tally: &[VoteCount],
        statuses: &[CandidateStatus],
    ) -> Vec<CandidateId> {
        let mut res: Vec<CandidateId> = (0..self.candidates.len())
            .map(CandidateId)
            .filter(|cid| statuses[cid.0] == CandidateStatus::Hopeful)
            .filter(|cid| tally[cid.0] >= self.quota)
            .collect();
        res.sort_by(|a, b| {
            tally[b.0]
                .cmp(&tally[a.0])
                .then_with(|| self.candidates[a.0].id.cmp(&self.candidates[b.0].id))
        });
        res
    }

    /// The hopeful candidate with the lowest total. Ties go to the lowest identifier.
    fn find_eliminated_candidate(
        &self,
        tally: &[VoteCount],
        statuses: &[CandidateStatus],
    ) -> Option<CandidateId> {
        (0..self.candidates.len())
            .map(CandidateId)
            .filter(|cid| statuses[cid.0] == CandidateStatus::Hopeful)
            .min_by(|a, b| {
                tally[a.0]
                    .cmp(&tally[b.0])
                    .then_with(|| self.candidates[a.0].id.cmp(&self.candidates[b.0].id))
            })
    }

    /// Rescales the ballots of an elected candidate by surplus / total and
    /// moves them to their next hopeful preference. The candidate keeps
    /// exactly the quota.
    fn transfer_surplus(&self, next: &mut ElectionState, from: CandidateId) -> TransferStats {
        let total = next.totals[from.0];
        let surplus = total - self.quota;
        let den = total.micro_votes() as u128;

        // (ballot index, share in micro-votes, remainder of the division)
        let mut shares: Vec<(usize, u64, u64)> = next
            .ballots
            .iter()
            .enumerate()
            .filter(|(_, b)| b.current() == Some(from))
            .map(|(idx, b)| {
                let num = b.weight.micro_votes() as u128 * surplus.micro_votes() as u128;
                (idx, (num / den) as u64, (num % den) as u64)
            })
            .collect();

        // Rounding down loses less than one micro-vote per ballot. The missing
        // units go to the largest remainders, so that exactly the surplus moves.
        // The order only depends on the content of the ballots.
        let distributed: u64 = shares.iter().map(|s| s.1).sum();
        let leftover = (surplus.micro_votes() - distributed) as usize;
        if leftover > 0 {
            let ballots = &next.ballots;
            let mut order: Vec<usize> = (0..shares.len()).collect();
            order.sort_by(|&a, &b| {
                let (ia, _, ra) = shares[a];
                let (ib, _, rb) = shares[b];
                rb.cmp(&ra)
                    .then_with(|| ballots[ia].ranks.cmp(&ballots[ib].ranks))
                    .then_with(|| ballots[ia].weight.cmp(&ballots[ib].weight))
                    .then_with(|| ballots[ia].cursor.cmp(&ballots[ib].cursor))
            });
            for &pos in order.iter().take(leftover) {
                shares[pos].1 += 1;
            }
        }

        let moves: Vec<(usize, VoteCount)> = shares
            .into_iter()
            .map(|(idx, share, _)| (idx, VoteCount::from_micro_votes(share)))
            .collect();
        let (received, exhausted) = move_ballots(next, moves);
        next.totals[from.0] = self.quota;

        debug!(
            "transfer_surplus: {} surplus {} / {}: transfers {:?} exhausted {}",
            self.candidates[from.0].id, surplus, total, received, exhausted
        );
        TransferStats {
            from: self.candidates[from.0].id.clone(),
            transfer_value: Some((surplus, total)),
            transfers: self.named_transfers(&received),
            exhausted,
        }
    }

    /// Moves the ballots of an eliminated candidate with their full weight.
    fn eliminate(&self, next: &mut ElectionState, from: CandidateId) -> TransferStats {
        let moves: Vec<(usize, VoteCount)> = next
            .ballots
            .iter()
            .enumerate()
            .filter(|(_, b)| b.current() == Some(from))
            .map(|(idx, b)| (idx, b.weight))
            .collect();
        let (received, exhausted) = move_ballots(next, moves);
        next.totals[from.0] = VoteCount::EMPTY;

        debug!(
            "eliminate: {}: transfers {:?} exhausted {}",
            self.candidates[from.0].id, received, exhausted
        );
        TransferStats {
            from: self.candidates[from.0].id.clone(),
            transfer_value: None,
            transfers: self.named_transfers(&received),
            exhausted,
        }
    }

    fn named_tally(&self, tally: &[VoteCount]) -> Vec<(String, VoteCount)> {
        self.candidates
            .iter()
            .zip(tally.iter())
            .map(|(c, vc)| (c.id.clone(), *vc))
            .collect()
    }

    fn named_transfers(
        &self,
        received: &BTreeMap<CandidateId, VoteCount>,
    ) -> Vec<(String, VoteCount)> {
        received
            .iter()
            .map(|(cid, vc)| (self.candidates[cid.0].id.clone(), *vc))
            .collect()
    }
}

/// Gives each ballot its new weight and advances it to the next hopeful
/// candidate. Returns what each candidate received and the exhausted weight.
fn move_ballots(
    next: &mut ElectionState,
    moves: Vec<(usize, VoteCount)>,
) -> (BTreeMap<CandidateId, VoteCount>, VoteCount) {
    let mut received: BTreeMap<CandidateId, VoteCount> = BTreeMap::new();
    let mut exhausted = VoteCount::EMPTY;
    for (idx, weight) in moves {
        let ballot = &mut next.ballots[idx];
        ballot.weight = weight;
        match ballot.advance(&next.statuses) {
            Some(to) => {
                *received.entry(to).or_insert(VoteCount::EMPTY) += weight;
            }
            None => {
                exhausted += weight;
            }
        }
    }
    for (to, vc) in received.iter() {
        next.totals[to.0] += *vc;
    }
    next.exhausted += exhausted;
    (received, exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_ballot;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn roster(ids: &[&str]) -> Vec<Candidate> {
        ids.iter()
            .map(|id| Candidate::new(id, &format!("Candidate {}", id)))
            .collect()
    }

    // Each ballot is written as space-separated identifiers and a weight.
    fn ballots(candidates: &[Candidate], raw: &[(&str, u64)]) -> Vec<Ballot> {
        raw.iter()
            .map(|(prefs, weight)| {
                let prefs: Vec<String> = prefs.split_whitespace().map(|s| s.to_string()).collect();
                validate_ballot(candidates, &prefs, Some(*weight)).unwrap()
            })
            .collect()
    }

    fn votes(n: u64) -> VoteCount {
        VoteCount::from_votes(n).unwrap()
    }

    fn micro(n: u64) -> VoteCount {
        VoteCount::from_micro_votes(n)
    }

    fn assert_conservation(election: &Election, result: &StvResult) {
        for rs in result.round_stats.iter() {
            let before: VoteCount = rs.tally.iter().map(|(_, vc)| *vc).sum();
            let after: VoteCount = rs.tally_after.iter().map(|(_, vc)| *vc).sum();
            assert_eq!(after + rs.exhausted, election.total_weight());
            assert!(before <= election.total_weight());
        }
    }

    #[test]
    fn setup_errors() {
        init();
        let cands = roster(&["A", "B"]);
        let bs = ballots(&cands, &[("A", 1)]);
        assert_eq!(
            Election::new(&cands, 0, &bs),
            Err(TallyError::InvalidSeatCount {
                seats: 0,
                candidates: 2
            })
        );
        assert_eq!(
            Election::new(&cands, 3, &bs),
            Err(TallyError::InvalidSeatCount {
                seats: 3,
                candidates: 2
            })
        );
        assert_eq!(
            Election::new(&cands, 1, &[]),
            Err(TallyError::QuotaUnreachable {})
        );
        let other = roster(&["A", "B", "Z"]);
        let foreign = ballots(&other, &[("Z A", 1)]);
        assert_eq!(
            Election::new(&cands, 1, &foreign),
            Err(TallyError::BallotOutsideRoster {
                candidate: "Z".to_string()
            })
        );
    }

    #[test]
    fn weight_overflow() {
        let cands = roster(&["A", "B"]);
        let bs = ballots(
            &cands,
            &[("A", crate::MAX_BALLOT_WEIGHT), ("B", crate::MAX_BALLOT_WEIGHT)],
        );
        assert_eq!(
            Election::new(&cands, 1, &bs),
            Err(TallyError::WeightOverflow {})
        );
    }

    #[test]
    fn elimination_then_election() {
        init();
        let cands = roster(&["A", "B", "C"]);
        let bs = ballots(&cands, &[("A B C", 1), ("A C B", 1), ("B A C", 1), ("C B A", 1)]);
        let election = Election::new(&cands, 1, &bs).unwrap();
        assert_eq!(election.quota(), votes(3));

        let state = election.initial_state();
        let (state, round1) = election.run_round(&state, 1).unwrap();
        assert_eq!(
            round1.tally,
            vec![
                ("A".to_string(), votes(2)),
                ("B".to_string(), votes(1)),
                ("C".to_string(), votes(1)),
            ]
        );
        assert_eq!(
            round1.action,
            RoundAction::Eliminated {
                eliminated: "B".to_string(),
                transfer: TransferStats {
                    from: "B".to_string(),
                    transfer_value: None,
                    transfers: vec![("A".to_string(), votes(1))],
                    exhausted: VoteCount::EMPTY,
                },
            }
        );
        assert_eq!(
            state.statuses(),
            &[
                CandidateStatus::Hopeful,
                CandidateStatus::Eliminated,
                CandidateStatus::Hopeful
            ]
        );

        let (state, round2) = election.run_round(&state, 2).unwrap();
        assert_eq!(round2.tally[0], ("A".to_string(), votes(3)));
        assert_eq!(
            round2.action,
            RoundAction::Elected {
                elected: vec!["A".to_string()]
            }
        );
        assert_eq!(state.num_elected(), 1);
    }

    #[test]
    fn surplus_transfer_is_fractional() {
        init();
        // 7 votes, 2 seats: the quota is 3. A has 5 votes, the surplus of 2
        // moves with a transfer value of 2/5.
        let cands = roster(&["A", "B", "C", "D"]);
        let bs = ballots(&cands, &[("A B", 3), ("A C", 2), ("D", 1), ("C", 1)]);
        let election = Election::new(&cands, 2, &bs).unwrap();
        assert_eq!(election.quota(), votes(3));
        let (state, round1) = election.run_round(&election.initial_state(), 1).unwrap();
        assert_eq!(
            round1.action,
            RoundAction::SurplusTransfer {
                elected: vec!["A".to_string()],
                transfers: vec![TransferStats {
                    from: "A".to_string(),
                    transfer_value: Some((votes(2), votes(5))),
                    transfers: vec![
                        ("B".to_string(), micro(1_200_000)),
                        ("C".to_string(), micro(800_000)),
                    ],
                    exhausted: VoteCount::EMPTY,
                }],
            }
        );
        assert_eq!(
            state.totals(),
            &[votes(3), micro(1_200_000), micro(1_800_000), votes(1)]
        );
    }

    #[test]
    fn exhausted_ballot_keeps_residual_weight() {
        init();
        // 6 votes, 2 seats: quota 3. A has 4 votes, each of its ballots
        // carries 1/4 forward. The last one has no further choice.
        let cands = roster(&["A", "B", "C", "D"]);
        let bs = ballots(
            &cands,
            &[("A B", 1), ("A C", 1), ("A D", 1), ("A", 1), ("B", 1), ("C", 1)],
        );
        let election = Election::new(&cands, 2, &bs).unwrap();
        let (state, round1) = election.run_round(&election.initial_state(), 1).unwrap();
        match round1.action {
            RoundAction::SurplusTransfer { transfers, .. } => {
                let t = &transfers[0];
                let moved: VoteCount =
                    t.transfers.iter().map(|(_, vc)| *vc).sum::<VoteCount>() + t.exhausted;
                assert_eq!(moved, votes(1));
                assert_eq!(t.exhausted, micro(250_000));
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(state.exhausted(), micro(250_000));
        assert_eq!(round1.exhausted, micro(250_000));
    }

    #[test]
    fn rounding_residue_goes_to_largest_remainder() {
        init();
        // 5 votes, 2 seats: quota 2. A has 3 votes and a surplus of 1, so each
        // ballot carries 1/3. The leftover micro-vote goes to the ballot with
        // the lowest ranking, A then B.
        let cands = roster(&["A", "B", "C", "D"]);
        let raw = [("A B", 1), ("A C", 1), ("A D", 1), ("B", 1), ("C", 1)];
        let election = Election::new(&cands, 2, &ballots(&cands, &raw)).unwrap();
        assert_eq!(election.quota(), votes(2));
        let (_, round1) = election.run_round(&election.initial_state(), 1).unwrap();
        let expected = RoundAction::SurplusTransfer {
            elected: vec!["A".to_string()],
            transfers: vec![TransferStats {
                from: "A".to_string(),
                transfer_value: Some((votes(1), votes(3))),
                transfers: vec![
                    ("B".to_string(), micro(333_334)),
                    ("C".to_string(), micro(333_333)),
                    ("D".to_string(), micro(333_333)),
                ],
                exhausted: VoteCount::EMPTY,
            }],
        };
        assert_eq!(round1.action, expected);

        // Same outcome when the ballots come in another order.
        let mut reversed = raw.to_vec();
        reversed.reverse();
        let election2 = Election::new(&cands, 2, &ballots(&cands, &reversed)).unwrap();
        let (_, round1b) = election2.run_round(&election2.initial_state(), 1).unwrap();
        assert_eq!(round1b.action, expected);
    }

    #[test]
    fn zero_surplus_moves_empty_ballots() {
        init();
        // 7 votes, 2 seats: quota 3. A reaches it exactly, its ballots move on
        // with a weight of zero.
        let cands = roster(&["A", "B", "C"]);
        let bs = ballots(
            &cands,
            &[
                ("A B", 1),
                ("A C", 1),
                ("A B C", 1),
                ("B", 1),
                ("C", 1),
                ("C B", 1),
                ("B C", 1),
            ],
        );
        let election = Election::new(&cands, 2, &bs).unwrap();
        let result = election.run().unwrap();
        assert_conservation(&election, &result);
        assert_eq!(result.round_stats[0].exhausted, VoteCount::EMPTY);
        // Round 2: B and C are tied at 2, B goes. Round 3: C reaches 3.
        assert_eq!(result.elimination_order, vec!["B".to_string()]);
        assert_eq!(result.winners(), vec!["A".to_string(), "C".to_string()]);
        assert_eq!(result.round_stats.len(), 3);
        assert_eq!(result.exhausted, votes(1));
    }

    #[test]
    fn vacant_seat() {
        init();
        let cands = roster(&["A", "B"]);
        let bs = ballots(&cands, &[("A", 1)]);
        let election = Election::new(&cands, 2, &bs).unwrap();
        assert_eq!(election.quota(), votes(1));
        let result = election.run().unwrap();
        assert_eq!(result.winners(), vec!["A".to_string()]);
        assert_eq!(
            result.termination,
            Termination::NoCandidatesRemain { vacant_seats: 1 }
        );
        assert_eq!(result.vacant_seats(), 1);
        assert_eq!(result.elimination_order, vec!["B".to_string()]);
        assert_eq!(result.round_stats.len(), 2);
        assert_eq!(result.exhausted, VoteCount::EMPTY);
        assert_conservation(&election, &result);
    }

    #[test]
    fn simultaneous_election_in_order() {
        init();
        // 9 votes, 2 seats: quota 4. B and A reach it in the first round.
        let cands = roster(&["A", "B", "C"]);
        let bs = ballots(&cands, &[("A C", 4), ("B C", 5)]);
        let election = Election::new(&cands, 2, &bs).unwrap();
        let (state, round1) = election.run_round(&election.initial_state(), 1).unwrap();
        assert_eq!(
            round1.action,
            RoundAction::Elected {
                elected: vec!["B".to_string(), "A".to_string()]
            }
        );
        assert_eq!(state.num_elected(), 2);
    }

    #[test]
    fn more_quota_reachers_than_seats() {
        init();
        // 8 votes, 2 seats: quota 3. A, C reach it with the same total, B does not.
        let cands = roster(&["A", "B", "C"]);
        let bs = ballots(&cands, &[("C", 3), ("B", 2), ("A", 3)]);
        let election = Election::new(&cands, 2, &bs).unwrap();
        assert_eq!(election.quota(), votes(3));
        let result = election.run().unwrap();
        assert_eq!(result.winners(), vec!["A".to_string(), "C".to_string()]);
        assert_eq!(result.round_stats.len(), 1);
        assert!(result.all_seats_filled());
    }

    #[test]
    fn seats_are_monotonic() {
        init();
        let cands = roster(&["A", "B", "C", "D", "E"]);
        let bs = ballots(
            &cands,
            &[
                ("A B C", 7),
                ("B A", 3),
                ("C D E", 4),
                ("D C", 2),
                ("E D B", 3),
                ("B E", 2),
            ],
        );
        let election = Election::new(&cands, 3, &bs).unwrap();
        let mut state = election.initial_state();
        let mut round_id = 1;
        let mut previous = 0;
        while state.has_hopeful() && state.num_elected() < election.seats() {
            let (next, _) = election.run_round(&state, round_id).unwrap();
            assert!(next.num_elected() >= previous);
            assert!(next.num_elected() <= election.seats());
            previous = next.num_elected();
            state = next;
            round_id += 1;
        }
        let result = election.run().unwrap();
        assert_conservation(&election, &result);
        assert_eq!(result.winners().len() as u32, state.num_elected());
    }

    #[test]
    fn compute_tally_detects_stale_assignment() {
        let cands = roster(&["A", "B"]);
        let bs = ballots(&cands, &[("A B", 1), ("B", 1)]);
        let election = Election::new(&cands, 1, &bs).unwrap();
        let mut state = election.initial_state();
        state.statuses[0] = CandidateStatus::Eliminated;
        let err = election.run_round(&state, 1).unwrap_err();
        assert!(err.is_defect());
    }
}
