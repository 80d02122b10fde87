use log::{info, warn};

use snafu::{prelude::*, Snafu};
use stv_tally::builder::Builder;
use stv_tally::*;

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

mod config_reader;

use crate::tabulate::config_reader::*;

#[derive(Debug, Snafu)]
pub enum TabulateError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Voter {voter} submitted more than one ballot"))]
    DuplicateVoter { voter: String },
    #[snafu(display("Unknown counting mode {mode:?}, expected stv or flatWeighted"))]
    UnknownMode { mode: String },
    #[snafu(display("The number of seats is required for an stv count"))]
    MissingSeats {},
    #[snafu(display("Invalid list of candidates: {source}"))]
    InvalidRoster { source: TallyError },
    #[snafu(display("The tally failed: {source}"))]
    Tally { source: TallyError },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type TabulateResult<T> = Result<T, TabulateError>;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<String>,
    #[serde(rename = "rankWeights", skip_serializing_if = "Option::is_none")]
    pub rank_weights: Option<Vec<u64>>,
}

fn status_to_string(status: CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::Hopeful => "hopeful",
        CandidateStatus::Elected => "elected",
        CandidateStatus::Eliminated => "eliminated",
    }
}

fn transfers_to_json(ts: &TransferStats) -> JSMap<String, JSValue> {
    let mut transfers: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in ts.transfers.iter() {
        transfers.insert(name.clone(), json!(count.to_string()));
    }
    if ts.exhausted > VoteCount::EMPTY {
        transfers.insert("exhausted".to_string(), json!(ts.exhausted.to_string()));
    }
    transfers
}

fn rejected_ballots_to_json(
    config: &ElectionConfig,
    rejected: &[RejectedBallot],
) -> Vec<JSValue> {
    rejected
        .iter()
        .map(|r| {
            let voter = match config.ballots.get(r.position) {
                Some(b) => b.label(r.position),
                None => format!("#{}", r.position + 1),
            };
            json!({"voter": voter, "reason": r.reason.to_string()})
        })
        .collect()
}

fn result_stats_to_json(rs: &StvResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        match &round_stat.action {
            RoundAction::Elected { elected } => {
                for winner_name in elected.iter() {
                    tally_results.push(json!({
                        "elected": winner_name,
                        "transfers": {}
                    }));
                }
            }
            RoundAction::SurplusTransfer { transfers, .. } => {
                for ts in transfers.iter() {
                    let transfer_value = ts
                        .transfer_value
                        .map(|(surplus, total)| format!("{}/{}", surplus, total));
                    tally_results.push(json!({
                        "elected": ts.from,
                        "transferValue": transfer_value,
                        "transfers": transfers_to_json(ts)
                    }));
                }
            }
            RoundAction::Eliminated {
                eliminated,
                transfer,
            } => {
                tally_results.push(json!({
                    "eliminated": eliminated,
                    "transfers": transfers_to_json(transfer)
                }));
            }
        }

        let js = json!({
            "round": round_stat.round,
            "tally": tally,
            "tallyResults": tally_results,
            "exhausted": round_stat.exhausted.to_string()
        });
        l.push(js);
    }
    l
}

fn build_summary_js(
    config: &ElectionConfig,
    mode: &CountingMode,
    rejected: Vec<JSValue>,
    outcome: &TallyOutcome,
) -> JSValue {
    match outcome {
        TallyOutcome::Stv(res) => {
            let c = OutputConfig {
                contest: config.contest.clone(),
                mode: "stv".to_string(),
                seats: Some(res.seats),
                quota: Some(res.quota.to_string()),
                rank_weights: None,
            };
            let standings: Vec<JSValue> = res
                .standings
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "name": s.name,
                        "status": status_to_string(s.status),
                        "total": s.total.to_string()
                    })
                })
                .collect();
            let termination = match res.termination {
                Termination::AllSeatsFilled => "allSeatsFilled",
                Termination::NoCandidatesRemain { .. } => "noCandidatesRemain",
            };
            json!({
                "config": c,
                "rejectedBallots": rejected,
                "results": result_stats_to_json(res),
                "standings": standings,
                "outcome": {
                    "winners": res.winners(),
                    "termination": termination,
                    "vacantSeats": res.vacant_seats(),
                    "exhausted": res.exhausted.to_string(),
                    "eliminationOrder": res.elimination_order
                }
            })
        }
        TallyOutcome::FlatWeighted(flat_standings) => {
            let rank_weights = match mode {
                CountingMode::FlatWeighted { rank_weights } => Some(rank_weights.clone()),
                CountingMode::Stv { .. } => None,
            };
            let c = OutputConfig {
                contest: config.contest.clone(),
                mode: "flatWeighted".to_string(),
                seats: None,
                quota: None,
                rank_weights,
            };
            let standings: Vec<JSValue> = flat_standings
                .iter()
                .map(|s| json!({"id": s.id, "name": s.name, "total": s.total}))
                .collect();
            json!({
                "config": c,
                "rejectedBallots": rejected,
                "standings": standings
            })
        }
    }
}

/// Reads an election, counts it and writes the summary.
///
/// out: 'stdout' or a file path.
/// check_summary_path: a reference summary that the computed one must match.
pub fn run_election(
    config_path: &str,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> TabulateResult<()> {
    let config = read_election_config(config_path)?;
    info!(
        "Election {:?}: {} candidates, {} ballots",
        config.contest,
        config.candidates.len(),
        config.ballots.len()
    );

    check_unique_voters(&config.ballots)?;
    let mode = config.counting_mode()?;
    info!("Counting mode: {:?}", mode);

    let mut builder = Builder::new(&config.roster()).context(InvalidRosterSnafu {})?;
    for (idx, b) in config.ballots.iter().enumerate() {
        let weight = b.weight.unwrap_or(1);
        if let Err(reason) = builder.add_weighted_ballot(&b.preferences, weight) {
            warn!("Ballot {} is not counted: {}", b.label(idx), reason);
        }
    }
    info!(
        "{} ballots accepted, {} rejected",
        builder.ballots().len(),
        builder.rejected().len()
    );
    let rejected = rejected_ballots_to_json(&config, builder.rejected());

    let outcome = builder.tally(&mode).context(TallySnafu {})?;

    // Assemble the final json
    let result_js = build_summary_js(&config, &mode, rejected, &outcome);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, pretty_js_stats.as_str()).context(WritingSummarySnafu { path })?;
            info!("Summary written to {}", path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p.as_str())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("The summary matches the reference {}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
fn run_election_test(
    test_name: &str,
    config_lpath: &str,
    summary_lpath: &str,
) -> TabulateResult<()> {
    let test_dir =
        option_env!("STV_TEST_DIR").unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data"));
    info!("Running test {}", test_name);
    run_election(
        format!("{}/{}/{}", test_dir, test_name, config_lpath).as_str(),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        None,
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_election_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        if let Some(bt) = snafu::ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        panic!("test {} failed: {}", test_name, e);
    }
}
