use log::{debug, info};
use snafu::prelude::*;

use std::collections::HashMap;

use crate::config::*;
use crate::validation::validate_roster;

/// Flat rank-weighted count.
///
/// A candidate ranked at position `i` (starting from 0) on a ballot receives
/// `rank_weights[i]` times the weight of the ballot. Positions beyond the end
/// of `rank_weights` are worth nothing. There is no quota, no transfer and
/// no seat: all the candidates are returned by decreasing total, ties going to
/// the lowest identifier.
///
/// ```
/// use stv_tally::{tally_flat_weighted, validate_ballot, Candidate};
/// # use stv_tally::TallyError;
///
/// let roster = vec![Candidate::new("A", "Anna"), Candidate::new("B", "Bob")];
/// let ballot = validate_ballot(&roster, &["B".to_string(), "A".to_string()], None).unwrap();
/// let standings = tally_flat_weighted(&[ballot], &roster, &[3, 2, 1])?;
/// assert_eq!(standings[0].id, "B");
/// assert_eq!(standings[0].total, 3);
/// assert_eq!(standings[1].total, 2);
/// # Ok::<(), TallyError>(())
/// ```
pub fn tally_flat_weighted(
    ballots: &[Ballot],
    candidates: &[Candidate],
    rank_weights: &[u64],
) -> Result<Vec<FlatStanding>, TallyError> {
    validate_roster(candidates)?;
    info!(
        "Flat weighted count: {} candidates, {} ballots, rank weights {:?}",
        candidates.len(),
        ballots.len(),
        rank_weights
    );

    let index: HashMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.id.as_str(), idx))
        .collect();
    let mut totals: Vec<u64> = vec![0; candidates.len()];

    for b in ballots.iter() {
        for (rank, cid) in b.preferences.iter().enumerate() {
            let idx = *index.get(cid.as_str()).context(BallotOutsideRosterSnafu {
                candidate: cid.clone(),
            })?;
            let points = rank_weights
                .get(rank)
                .cloned()
                .unwrap_or(0)
                .checked_mul(b.weight)
                .context(WeightOverflowSnafu)?;
            totals[idx] = totals[idx]
                .checked_add(points)
                .context(WeightOverflowSnafu)?;
        }
    }
    debug!("tally_flat_weighted: totals: {:?}", totals);

    let mut standings: Vec<FlatStanding> = candidates
        .iter()
        .zip(totals)
        .map(|(c, total)| FlatStanding {
            id: c.id.clone(),
            name: c.name.clone(),
            total,
        })
        .collect();
    standings.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.id.cmp(&b.id)));
    Ok(standings)
}
