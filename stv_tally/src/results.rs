use log::debug;

use std::collections::HashMap;

use crate::config::*;
use crate::engine::Election;
use crate::VoteCount;

/// Collects the history of a count into the final result.
///
/// The elected candidates come first, in the order they were elected. The
/// other candidates follow by decreasing total, ties going to the lowest
/// identifier. An eliminated candidate is listed with the total it had in the
/// round it was eliminated.
pub(crate) fn aggregate_results(
    election: &Election,
    round_stats: Vec<RoundStats>,
    termination: Termination,
) -> StvResult {
    let mut elected: Vec<String> = Vec::new();
    let mut eliminated: HashMap<String, VoteCount> = HashMap::new();
    let mut elimination_order: Vec<String> = Vec::new();
    for rs in round_stats.iter() {
        match &rs.action {
            RoundAction::Elected { elected: names }
            | RoundAction::SurplusTransfer { elected: names, .. } => {
                elected.extend(names.iter().cloned());
            }
            RoundAction::Eliminated { eliminated: name, .. } => {
                let total = rs
                    .tally
                    .iter()
                    .find(|(cid, _)| cid == name)
                    .map(|(_, vc)| *vc)
                    .unwrap_or(VoteCount::EMPTY);
                eliminated.insert(name.clone(), total);
                elimination_order.push(name.clone());
            }
        }
    }

    let final_tally: HashMap<&str, VoteCount> = round_stats
        .last()
        .map(|rs| {
            rs.tally_after
                .iter()
                .map(|(cid, vc)| (cid.as_str(), *vc))
                .collect()
        })
        .unwrap_or_default();
    let final_total = |cid: &str| final_tally.get(cid).cloned().unwrap_or(VoteCount::EMPTY);

    let names: HashMap<&str, &str> = election
        .candidates()
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let mut standings: Vec<Standing> = elected
        .iter()
        .map(|cid| Standing {
            id: cid.clone(),
            name: names.get(cid.as_str()).unwrap_or(&"").to_string(),
            status: CandidateStatus::Elected,
            total: final_total(cid.as_str()),
        })
        .collect();

    let mut others: Vec<Standing> = election
        .candidates()
        .iter()
        .filter(|c| !elected.contains(&c.id))
        .map(|c| match eliminated.get(&c.id) {
            Some(total) => Standing {
                id: c.id.clone(),
                name: c.name.clone(),
                status: CandidateStatus::Eliminated,
                total: *total,
            },
            None => Standing {
                id: c.id.clone(),
                name: c.name.clone(),
                status: CandidateStatus::Hopeful,
                total: final_total(c.id.as_str()),
            },
        })
        .collect();
    others.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.id.cmp(&b.id)));
    standings.extend(others);
    debug!("aggregate_results: standings: {:?}", standings);

    let exhausted = round_stats
        .last()
        .map(|rs| rs.exhausted)
        .unwrap_or(VoteCount::EMPTY);

    StvResult {
        seats: election.seats(),
        quota: election.quota(),
        standings,
        elimination_order,
        termination,
        exhausted,
        round_stats,
    }
}
