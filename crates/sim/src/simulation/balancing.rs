//! Moving cells between shards in the serial gap between cycles.
//!
//! Every strategy implements [`LoadBalancer`]. The equalising strategies
//! share one transfer routine ([`equalize`]) and differ only in the measure
//! fed to it ([`measure`]). Whatever the strategy, the total length of all
//! shard lists is the same before and after a call.

use crate::base::safe_ratio;
use crate::simulation::CellPopulation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest shard size that [`GreedyFillEmpty`] will never split.
pub const GREEDY_MIN_DONOR: usize = 5;

/// A strategy that redistributes cells across shards.
pub trait LoadBalancer: Send + Sync {
    /// Rebalance in place. Never called while shards are running.
    fn rebalance(&self, shards: &mut [CellPopulation]);

    fn name(&self) -> &'static str;
}

/// Leaves every shard as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBalancing;

impl LoadBalancer for NoBalancing {
    fn rebalance(&self, _shards: &mut [CellPopulation]) {}

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Each empty shard takes half of the largest shard's cells.
///
/// The largest shard is looked up again for every empty shard, in one pass.
/// A donor with at most `min_donor` cells is left alone.
#[derive(Debug, Clone, Copy)]
pub struct GreedyFillEmpty {
    pub min_donor: usize,
}

impl Default for GreedyFillEmpty {
    fn default() -> Self {
        Self {
            min_donor: GREEDY_MIN_DONOR,
        }
    }
}

impl LoadBalancer for GreedyFillEmpty {
    fn rebalance(&self, shards: &mut [CellPopulation]) {
        for target in 0..shards.len() {
            if !shards[target].is_empty() {
                continue;
            }
            let Some(donor) = largest(shards) else {
                continue;
            };
            let size = shards[donor].len();
            if size <= self.min_donor {
                continue;
            }
            let moved = shards[donor].take_tail(size / 2);
            tracing::trace!(from = donor, to = target, cells = moved.len(), "greedy transfer");
            shards[target].absorb(moved);
        }
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Evens out the number of cells per shard.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualizeCellCount;

impl LoadBalancer for EqualizeCellCount {
    fn rebalance(&self, shards: &mut [CellPopulation]) {
        let total: usize = shards.iter().map(CellPopulation::len).sum();
        if total == 0 {
            return;
        }
        let fill: Vec<f64> = shards
            .iter()
            .map(|s| s.len() as f64 / total as f64)
            .collect();
        equalize(shards, &measure(&fill));
    }

    fn name(&self) -> &'static str {
        "cell-count"
    }
}

/// Evens out the wall-clock time of the last cycle step.
///
/// Each shard's duty cycle is its step duration divided by the slowest
/// shard's. Shards that ran longer than average shed cells to the faster
/// ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualizeDutyCycle;

impl LoadBalancer for EqualizeDutyCycle {
    fn rebalance(&self, shards: &mut [CellPopulation]) {
        let slowest = shards
            .iter()
            .map(|s| s.last_cycle_duration().as_secs_f64())
            .fold(0.0, f64::max);
        if slowest <= 0.0 {
            return;
        }
        let duty: Vec<f64> = shards
            .iter()
            .map(|s| s.last_cycle_duration().as_secs_f64() / slowest)
            .collect();
        equalize(shards, &measure(&duty));
    }

    fn name(&self) -> &'static str {
        "duty-cycle"
    }
}

/// A shard's measure during one balancing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskMeasure {
    pub shard: usize,
    /// Raw measure (fill ratio or duty cycle).
    pub value: f64,
    /// `value / mean(value)`; above 1 means overloaded.
    pub relational: f64,
    /// Share of the shed cells this shard receives; sums to 1 over the
    /// under-loaded shards and is 0 elsewhere.
    pub balancing_factor: f64,
}

/// Derive relational values and balancing factors from raw per-shard values.
pub fn measure(values: &[f64]) -> Vec<TaskMeasure> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut measures: Vec<TaskMeasure> = values
        .iter()
        .enumerate()
        .map(|(shard, &value)| {
            let relational = if mean > 0.0 { safe_ratio(value, mean) } else { 1.0 };
            TaskMeasure {
                shard,
                value,
                relational,
                balancing_factor: (1.0 - relational).max(0.0),
            }
        })
        .collect();

    let factor_sum: f64 = measures.iter().map(|m| m.balancing_factor).sum();
    for m in &mut measures {
        m.balancing_factor = if factor_sum > 0.0 {
            m.balancing_factor / factor_sum
        } else {
            0.0
        };
    }
    measures
}

/// Move cells from overloaded to under-loaded shards.
///
/// Every shard with `relational > 1` sheds `round(size - size / relational)`
/// cells from its tail, always keeping at least one. The shed cells are
/// dealt to the shards with `relational < 1` by balancing factor; the last
/// receiver takes whatever rounding left over. With no receiver the cells
/// go back to the first donor.
pub fn equalize(shards: &mut [CellPopulation], measures: &[TaskMeasure]) {
    let mut buffer = Vec::new();
    let mut first_donor = None;

    for m in measures.iter().filter(|m| m.relational > 1.0) {
        let Some(shard) = shards.get_mut(m.shard) else {
            continue;
        };
        let size = shard.len();
        if size == 0 {
            continue;
        }
        let shed = (size as f64 - size as f64 / m.relational).round() as usize;
        let shed = shed.min(size - 1);
        if shed == 0 {
            continue;
        }
        buffer.extend(shard.take_tail(shed));
        first_donor.get_or_insert(m.shard);
    }

    let Some(first_donor) = first_donor else {
        return;
    };

    let receivers: Vec<&TaskMeasure> = measures
        .iter()
        .filter(|m| m.relational < 1.0 && m.balancing_factor > 0.0 && m.shard < shards.len())
        .collect();
    if receivers.is_empty() {
        shards[first_donor].absorb(buffer);
        return;
    }

    let shed_total = buffer.len();
    let last = receivers.len() - 1;
    for (i, m) in receivers.iter().enumerate() {
        let share = if i == last {
            buffer.len()
        } else {
            ((shed_total as f64 * m.balancing_factor).round() as usize).min(buffer.len())
        };
        let cells = buffer.split_off(buffer.len() - share);
        tracing::trace!(to = m.shard, cells = cells.len(), "equalize transfer");
        shards[m.shard].absorb(cells);
    }
}

fn largest(shards: &[CellPopulation]) -> Option<usize> {
    shards
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

/// Load-balancing strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BalancingStrategy {
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "greedy")]
    GreedyFillEmpty,
    #[serde(rename = "cell-count")]
    EqualizeCellCount,
    #[serde(rename = "duty-cycle")]
    EqualizeDutyCycle,
}

impl BalancingStrategy {
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::GreedyFillEmpty,
        Self::EqualizeCellCount,
        Self::EqualizeDutyCycle,
    ];

    /// A boxed balancer implementing this strategy.
    pub fn balancer(self) -> Box<dyn LoadBalancer> {
        match self {
            Self::None => Box::new(NoBalancing),
            Self::GreedyFillEmpty => Box::new(GreedyFillEmpty::default()),
            Self::EqualizeCellCount => Box::new(EqualizeCellCount),
            Self::EqualizeDutyCycle => Box::new(EqualizeDutyCycle),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::GreedyFillEmpty => "greedy",
            Self::EqualizeCellCount => "cell-count",
            Self::EqualizeDutyCycle => "duty-cycle",
        }
    }
}

impl fmt::Display for BalancingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BalancingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "greedy" | "default" => Ok(Self::GreedyFillEmpty),
            "cell-count" => Ok(Self::EqualizeCellCount),
            "duty-cycle" => Ok(Self::EqualizeDutyCycle),
            _ => Err(format!(
                "Unknown balancing strategy: {s}. Available: none, greedy, cell-count, duty-cycle"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::IdGenerator;
    use std::time::Duration;

    fn shards(sizes: &[usize]) -> Vec<CellPopulation> {
        let ids = IdGenerator::new();
        sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| CellPopulation::seeded(i, n, &ids))
            .collect()
    }

    fn sizes(shards: &[CellPopulation]) -> Vec<usize> {
        shards.iter().map(CellPopulation::len).collect()
    }

    #[test]
    fn test_greedy_fills_empty_shards() {
        let mut s = shards(&[40, 0, 10, 0]);
        GreedyFillEmpty::default().rebalance(&mut s);
        // shard 1 takes 20 of 40; shard 3 then takes 10 of the largest (20, shard 0)
        assert_eq!(sizes(&s), vec![10, 20, 10, 10]);
    }

    #[test]
    fn test_greedy_respects_threshold() {
        let mut s = shards(&[5, 0, 0]);
        GreedyFillEmpty::default().rebalance(&mut s);
        assert_eq!(sizes(&s), vec![5, 0, 0]);

        let mut s = shards(&[6, 0]);
        GreedyFillEmpty::default().rebalance(&mut s);
        assert_eq!(sizes(&s), vec![3, 3]);
    }

    #[test]
    fn test_measure_factors_normalised() {
        let m = measure(&[0.5, 0.25, 0.25, 0.0]);
        assert_eq!(m[0].relational, 2.0);
        assert_eq!(m[0].balancing_factor, 0.0);
        assert_eq!(m[1].relational, 1.0);
        assert_eq!(m[3].balancing_factor, 1.0);

        let m = measure(&[0.6, 0.3, 0.1, 0.0]);
        let sum: f64 = m.iter().map(|t| t.balancing_factor).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(m[3].balancing_factor > m[2].balancing_factor);
    }

    #[test]
    fn test_equalize_single_loaded_shard() {
        let mut s = shards(&[100, 0, 0, 0]);
        EqualizeCellCount.rebalance(&mut s);
        assert_eq!(sizes(&s), vec![25, 25, 25, 25]);
    }

    #[test]
    fn test_equalize_never_empties_donor() {
        let mut s = shards(&[1, 0, 0, 0]);
        EqualizeCellCount.rebalance(&mut s);
        assert_eq!(sizes(&s), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_equalize_balanced_is_noop() {
        let mut s = shards(&[7, 7, 7]);
        EqualizeCellCount.rebalance(&mut s);
        assert_eq!(sizes(&s), vec![7, 7, 7]);
    }

    #[test]
    fn test_duty_cycle_moves_from_slow_shard() {
        let mut s = shards(&[60, 60]);
        s[0].set_cycle_duration(Duration::from_millis(30));
        s[1].set_cycle_duration(Duration::from_millis(10));
        EqualizeDutyCycle.rebalance(&mut s);
        // duty [1, 1/3], mean 2/3, relational [1.5, 0.5]; shard 0 sheds 20
        assert_eq!(sizes(&s), vec![40, 80]);
    }

    #[test]
    fn test_duty_cycle_without_timings_is_noop() {
        let mut s = shards(&[60, 0]);
        EqualizeDutyCycle.rebalance(&mut s);
        assert_eq!(sizes(&s), vec![60, 0]);
    }

    #[test]
    fn test_conservation_all_strategies() {
        let layouts: [&[usize]; 6] = [
            &[100, 0, 0, 0],
            &[3, 97, 0, 12, 55],
            &[0, 0, 0],
            &[1],
            &[6, 0],
            &[1000, 999, 1, 0, 250, 17, 42],
        ];
        for strategy in BalancingStrategy::ALL {
            let balancer = strategy.balancer();
            for layout in layouts {
                let mut s = shards(layout);
                for (i, shard) in s.iter_mut().enumerate() {
                    shard.set_cycle_duration(Duration::from_micros(1 + (i as u64 * 37) % 11));
                }
                let before: usize = layout.iter().sum();
                for _ in 0..5 {
                    balancer.rebalance(&mut s);
                    assert_eq!(sizes(&s).iter().sum::<usize>(), before, "{strategy} {layout:?}");
                }
            }
        }
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in BalancingStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<BalancingStrategy>(), Ok(strategy));
            assert_eq!(strategy.balancer().name(), strategy.name());
        }
        assert!("fastest".parse::<BalancingStrategy>().is_err());
        assert_eq!(BalancingStrategy::default(), BalancingStrategy::GreedyFillEmpty);
    }
}
