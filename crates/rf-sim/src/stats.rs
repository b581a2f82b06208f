//! Simulation statistics — per-round tallies merged across worker threads

use std::collections::BTreeMap;

use serde::Serialize;

use rf_cycle::CycleId;
use rf_outcome::RoundResult;

/// Additive tallies over a batch of rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub rounds: u64,
    pub winning_rounds: u64,
    pub total_win: i64,
    pub max_win: i64,
    pub cycles: u64,
    /// Rounds that left the base game
    pub feature_rounds: u64,
    /// Win paid outside the base game cycle
    pub feature_win: i64,
    /// Hits per prize name
    pub prize_hits: BTreeMap<String, u64>,
}

impl SimStats {
    /// Tallies of a single round
    pub fn from_round(result: &RoundResult) -> Self {
        let base = CycleId::base_game();
        let feature_win = result
            .cycles
            .iter()
            .filter(|c| c.cycle.id != base)
            .fold(0i64, |acc, c| acc.saturating_add(c.win));

        let mut prize_hits = BTreeMap::new();
        for award in result.cycles.iter().flat_map(|c| &c.awards) {
            *prize_hits.entry(award.name.clone()).or_insert(0) += 1;
        }

        Self {
            rounds: 1,
            winning_rounds: u64::from(result.is_win()),
            total_win: result.total_win,
            max_win: result.total_win,
            cycles: result.cycle_count() as u64,
            feature_rounds: u64::from(result.cycle_count() > 1),
            feature_win,
            prize_hits,
        }
    }

    /// Combine two batches
    pub fn merge(mut self, other: SimStats) -> SimStats {
        self.rounds += other.rounds;
        self.winning_rounds += other.winning_rounds;
        self.total_win = self.total_win.saturating_add(other.total_win);
        self.max_win = self.max_win.max(other.max_win);
        self.cycles += other.cycles;
        self.feature_rounds += other.feature_rounds;
        self.feature_win = self.feature_win.saturating_add(other.feature_win);
        for (name, hits) in other.prize_hits {
            *self.prize_hits.entry(name).or_insert(0) += hits;
        }
        self
    }

    /// Ratios for a stake of `bet` per round
    pub fn report(&self, game: &str, bet: i64, calls: BTreeMap<String, u64>) -> SimReport {
        let rounds = self.rounds.max(1) as f64;
        let wagered = bet as f64 * self.rounds as f64;
        let ratio = |win: i64| if wagered > 0.0 { win as f64 / wagered } else { 0.0 };

        SimReport {
            game: game.to_string(),
            rounds: self.rounds,
            bet,
            total_wagered: wagered,
            total_win: self.total_win,
            rtp: ratio(self.total_win),
            feature_rtp: ratio(self.feature_win),
            hit_rate: self.winning_rounds as f64 / rounds,
            feature_rate: self.feature_rounds as f64 / rounds,
            average_cycles: self.cycles as f64 / rounds,
            max_win_x: if bet > 0 { self.max_win as f64 / bet as f64 } else { 0.0 },
            prize_hits: self.prize_hits.clone(),
            calls,
        }
    }
}

/// JSON report printed by the simulator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimReport {
    pub game: String,
    pub rounds: u64,
    pub bet: i64,
    pub total_wagered: f64,
    pub total_win: i64,
    pub rtp: f64,
    pub feature_rtp: f64,
    pub hit_rate: f64,
    pub feature_rate: f64,
    pub average_cycles: f64,
    pub max_win_x: f64,
    pub prize_hits: BTreeMap<String, u64>,
    pub calls: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(win: i64, cycles: u64, hits: &[&str]) -> SimStats {
        SimStats {
            rounds: 1,
            winning_rounds: u64::from(win > 0),
            total_win: win,
            max_win: win,
            cycles,
            feature_rounds: u64::from(cycles > 1),
            feature_win: if cycles > 1 { win / 2 } else { 0 },
            prize_hits: hits.iter().map(|h| (h.to_string(), 1)).collect(),
        }
    }

    #[test]
    fn test_merge_adds_and_keeps_max() {
        let merged = stats(10, 1, &["HP1x3"])
            .merge(stats(0, 1, &[]))
            .merge(stats(40, 9, &["HP1x3", "SCATx3"]));

        assert_eq!(merged.rounds, 3);
        assert_eq!(merged.winning_rounds, 2);
        assert_eq!(merged.total_win, 50);
        assert_eq!(merged.max_win, 40);
        assert_eq!(merged.cycles, 11);
        assert_eq!(merged.feature_rounds, 1);
        assert_eq!(merged.prize_hits["HP1x3"], 2);
        assert_eq!(merged.prize_hits["SCATx3"], 1);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = stats(10, 1, &["A"]);
        let b = stats(30, 4, &["B"]);
        assert_eq!(a.clone().merge(b.clone()), b.merge(a));
    }

    #[test]
    fn test_report_ratios() {
        let merged = stats(10, 1, &[]).merge(stats(0, 1, &[])).merge(stats(0, 1, &[])).merge(stats(30, 1, &[]));
        let report = merged.report("Test", 10, BTreeMap::new());

        assert_eq!(report.total_wagered, 40.0);
        assert!((report.rtp - 1.0).abs() < 1e-12);
        assert!((report.hit_rate - 0.5).abs() < 1e-12);
        assert!((report.max_win_x - 3.0).abs() < 1e-12);
        assert_eq!(report.feature_rate, 0.0);
    }

    #[test]
    fn test_empty_report_is_zero() {
        let report = SimStats::default().report("Empty", 1, BTreeMap::new());
        assert_eq!(report.rounds, 0);
        assert_eq!(report.rtp, 0.0);
        assert_eq!(report.hit_rate, 0.0);
    }
}
