use crate::simulation::{CycleDelta, ShardReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// The configured number of cycles ran.
    MaxCycles,
    /// The global population reached the configured ceiling.
    CellCeiling,
    /// No living cell is left.
    Extinct,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxCycles => write!(f, "max cycles reached"),
            Self::CellCeiling => write!(f, "cell ceiling reached"),
            Self::Extinct => write!(f, "population extinct"),
        }
    }
}

/// Aggregate of one completed cycle over all shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle: i64,
    /// Living cells after the cycle.
    pub population: usize,
    pub delta: CycleDelta,
    /// Cumulative driver mutations since the run started.
    pub driver_mutations: u64,
    /// Cumulative passenger mutations since the run started.
    pub passenger_mutations: u64,
    /// Living cells per shard, before load balancing.
    pub shard_populations: Vec<usize>,
    /// Wall-clock time of the slowest shard, in milliseconds.
    pub slowest_shard_ms: f64,
}

/// Process-wide statistics of a run.
///
/// Updated exactly once per cycle, from the barrier's release action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStatistics {
    population: usize,
    driver_mutations: u64,
    passenger_mutations: u64,
    history: Vec<CycleSummary>,
}

impl LiveStatistics {
    pub fn new(initial_population: usize) -> Self {
        Self {
            population: initial_population,
            ..Self::default()
        }
    }

    /// Fold the reports of every shard for one cycle into the totals.
    pub fn record(&mut self, cycle: i64, reports: &[ShardReport]) -> &CycleSummary {
        let mut delta = CycleDelta::default();
        for report in reports {
            delta += report.delta;
        }
        self.population = reports.iter().map(|r| r.population).sum();
        self.driver_mutations += delta.drivers;
        self.passenger_mutations += delta.passengers;

        let slowest = reports
            .iter()
            .map(|r| r.duration.as_secs_f64() * 1e3)
            .fold(0.0, f64::max);
        self.history.push(CycleSummary {
            cycle,
            population: self.population,
            delta,
            driver_mutations: self.driver_mutations,
            passenger_mutations: self.passenger_mutations,
            shard_populations: reports.iter().map(|r| r.population).collect(),
            slowest_shard_ms: slowest,
        });
        &self.history[self.history.len() - 1]
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.population
    }

    #[inline]
    pub fn driver_mutations(&self) -> u64 {
        self.driver_mutations
    }

    #[inline]
    pub fn passenger_mutations(&self) -> u64 {
        self.passenger_mutations
    }

    pub fn history(&self) -> &[CycleSummary] {
        &self.history
    }

    pub fn last(&self) -> Option<&CycleSummary> {
        self.history.last()
    }
}

/// Outcome of one run (one iteration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub iteration: usize,
    pub seed: u64,
    /// Cycles that advanced the population (the terminal flush is not counted).
    pub cycles: u64,
    pub stop_reason: StopReason,
    pub final_population: usize,
    pub driver_mutations: u64,
    pub passenger_mutations: u64,
    /// Genomes in the arena at the end, root included.
    pub genomes: usize,
    pub history: Vec<CycleSummary>,
}
