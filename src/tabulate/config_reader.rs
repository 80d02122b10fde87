use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use std::collections::HashSet;
use std::fs;

use stv_tally::{Candidate, CountingMode, DEFAULT_RANK_WEIGHTS};

use crate::tabulate::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionCandidate {
    pub id: String,
    /// Defaults to the identifier.
    pub name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionBallot {
    pub voter: Option<String>,
    pub preferences: Vec<String>,
    pub weight: Option<u64>,
}

impl ElectionBallot {
    /// The name of the ballot in the logs and the summary.
    /// idx: the position of the ballot in the file, starting from 0.
    pub fn label(&self, idx: usize) -> String {
        match &self.voter {
            Some(v) => v.clone(),
            None => format!("#{}", idx + 1),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub contest: String,
    pub mode: Option<String>,
    pub seats: Option<u32>,
    #[serde(rename = "rankWeights")]
    pub rank_weights: Option<Vec<u64>>,
    pub candidates: Vec<ElectionCandidate>,
    pub ballots: Vec<ElectionBallot>,
}

impl ElectionConfig {
    pub fn roster(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .map(|c| Candidate {
                id: c.id.clone(),
                name: c.name.clone().unwrap_or_else(|| c.id.clone()),
            })
            .collect()
    }

    pub fn counting_mode(&self) -> TabulateResult<CountingMode> {
        match self.mode.as_deref().unwrap_or("stv") {
            "stv" => {
                let seats = self.seats.context(MissingSeatsSnafu {})?;
                Ok(CountingMode::Stv { seats })
            }
            "flatWeighted" => Ok(CountingMode::FlatWeighted {
                rank_weights: self
                    .rank_weights
                    .clone()
                    .unwrap_or_else(|| DEFAULT_RANK_WEIGHTS.to_vec()),
            }),
            x => UnknownModeSnafu { mode: x }.fail(),
        }
    }
}

/// A voter may only submit one ballot.
pub fn check_unique_voters(ballots: &[ElectionBallot]) -> TabulateResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for voter in ballots.iter().filter_map(|b| b.voter.as_deref()) {
        ensure!(seen.insert(voter), DuplicateVoterSnafu { voter });
    }
    Ok(())
}

pub fn read_election_config(path: &str) -> TabulateResult<ElectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!(
        "read_election_config: {} candidates, {} ballots",
        config.candidates.len(),
        config.ballots.len()
    );
    Ok(config)
}

pub fn read_summary(path: &str) -> TabulateResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
