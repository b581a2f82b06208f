//! Property tests for masks, decisions and windows

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use rf_outcome::{
    CellMask, DecisionGenerator, LineSelection, MaskPrize, Pattern, Patterns, SymbolList,
    SymbolWindowResult, SymbolWindowStructure, evaluate_lines,
};

// --- STRATEGIES ---

prop_compose! {
    fn arb_mask_pair()(length in 1usize..200)(
        length in Just(length),
        a in proptest::collection::vec(any::<bool>(), length),
        b in proptest::collection::vec(any::<bool>(), length)
    ) -> (CellMask, CellMask) {
        (to_mask(&a), to_mask(&b))
    }
}

prop_compose! {
    fn arb_weights()(weights in proptest::collection::vec(0u64..20, 1..30)) -> Vec<u64> {
        weights
    }
}

prop_compose! {
    /// 5×3 window cells over 4 symbols
    fn arb_window_cells()(cells in proptest::collection::vec(0usize..4, 15)) -> Vec<usize> {
        cells
    }
}

fn to_mask(bits: &[bool]) -> CellMask {
    let indexes = bits.iter().enumerate().filter(|&(_, &b)| b).map(|(i, _)| i);
    CellMask::from_indexes(bits.len(), indexes).unwrap()
}

fn window(cells: &[usize]) -> SymbolWindowResult {
    let symbols = Arc::new(SymbolList::new(["WILD", "HP1", "LP1", "LP2"]));
    let structure = Arc::new(SymbolWindowStructure::rectangular(5, 3).unwrap());
    SymbolWindowResult::from_cell_symbols(symbols, structure, cells).unwrap()
}

fn lines() -> Patterns {
    let lines = (0..3)
        .map(|row| {
            let cells: Vec<usize> = (0..5).map(|reel| reel * 3 + row).collect();
            Pattern::line(format!("Line{}", row + 1), 15, &cells).unwrap()
        })
        .collect();
    Patterns::new(lines).unwrap()
}

fn prizes() -> Vec<MaskPrize> {
    let mut prizes = Vec::new();
    for (symbol, base) in [(1usize, 10i64), (2, 2), (3, 1)] {
        for count in 3..=5 {
            prizes.push(MaskPrize::new(
                format!("{}x{}", symbol, count),
                vec![symbol, 0],
                count,
                base * count as i64,
            ));
        }
    }
    prizes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // --- MASK ALGEBRA ---

    #[test]
    fn prop_and_or_not_laws((a, b) in arb_mask_pair()) {
        let n = a.bit_length();
        prop_assert_eq!(a.and(&b).unwrap().or(&a).unwrap(), a.clone());
        prop_assert_eq!(a.not().not(), a.clone());
        prop_assert_eq!(a.and(&a.not()).unwrap(), CellMask::all_false(n));
        prop_assert_eq!(a.or(&a.not()).unwrap(), CellMask::all_true(n));
        prop_assert_eq!(a.and_not(&b).unwrap(), a.and(&b.not()).unwrap());
        // De Morgan
        prop_assert_eq!(a.or(&b).unwrap().not(), a.not().and(&b.not()).unwrap());
    }

    #[test]
    fn prop_counts_and_enumeration((a, b) in arb_mask_pair()) {
        let indexes: Vec<usize> = a.enumerate_indexes().collect();
        prop_assert_eq!(indexes.len(), a.true_count());
        prop_assert!(indexes.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(indexes.iter().all(|&i| a[i]));
        prop_assert_eq!(a.is_empty(), a.true_count() == 0);
        prop_assert_eq!(a.and_not_empty(&b).unwrap(), !a.and(&b).unwrap().is_empty());
        prop_assert_eq!(
            a.or(&b).unwrap().true_count() + a.and(&b).unwrap().true_count(),
            a.true_count() + b.true_count()
        );
    }

    #[test]
    fn prop_json_preserves_mask((a, _) in arb_mask_pair()) {
        let json = serde_json::to_string(&a).unwrap();
        let back: CellMask = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, a);
    }

    // --- DECISIONS ---

    #[test]
    fn prop_same_seed_same_decisions(seed in any::<u64>(), weights in arb_weights()) {
        prop_assume!(weights.iter().sum::<u64>() > 0);
        let mut a = DecisionGenerator::seeded(seed);
        let mut b = DecisionGenerator::seeded(seed);
        for n in 0..10 {
            let x = a.choose_one_index(&weights, || format!("Pick{}", n)).unwrap();
            let y = b.choose_one_index(&weights, || format!("Pick{}", n)).unwrap();
            prop_assert_eq!(x, y);
            prop_assert!(weights[x] > 0);
        }
        prop_assert_eq!(a.trace(), b.trace());
    }

    #[test]
    fn prop_replay_reproduces_choices(seed in any::<u64>(), weights in arb_weights()) {
        prop_assume!(weights.iter().sum::<u64>() > 0);
        let mut live = DecisionGenerator::seeded(seed);
        let picks: Vec<usize> = (0..8)
            .map(|n| live.choose_one_index(&weights, || format!("Pick{}", n)).unwrap())
            .collect();

        let mut replay = DecisionGenerator::replay(live.trace());
        let replayed: Vec<usize> = (0..8)
            .map(|n| replay.choose_one_index(&weights, || format!("Pick{}", n)).unwrap())
            .collect();
        prop_assert_eq!(picks, replayed);
    }

    #[test]
    fn prop_distinct_draws_never_repeat(seed in any::<u64>(), weights in arb_weights(), take in 0usize..30) {
        let total: u64 = weights.iter().sum();
        let available = weights.iter().filter(|&&w| w > 0).count();
        let mut generator = DecisionGenerator::seeded(seed);
        let result = generator.choose_indexes(
            weights.len(),
            take,
            true,
            |i| weights[i],
            total,
            |i| format!("#{}", i),
            || "Distinct".into(),
        );

        if take > available {
            prop_assert!(result.is_err());
        } else {
            let chosen = result.unwrap();
            let unique: BTreeSet<usize> = chosen.iter().copied().collect();
            prop_assert_eq!(unique.len(), take);
            prop_assert!(chosen.iter().all(|&i| weights[i] > 0));
        }
    }

    // --- WINDOWS ---

    #[test]
    fn prop_window_partitions_cells(cells in arb_window_cells()) {
        let window = window(&cells);
        prop_assert!(window.check_partition());
        prop_assert_eq!(window.cell_symbols(), cells.clone());

        let smashed = window.smash_symbol_over_population(0).unwrap();
        prop_assert!(smashed.check_partition());
    }

    #[test]
    fn prop_pay_best_one_prize_per_line(cells in arb_window_cells()) {
        let window = window(&cells);
        let patterns = lines();
        let best = evaluate_lines(&window, &patterns, &prizes(), LineSelection::All, true).unwrap();
        let many = evaluate_lines(&window, &patterns, &prizes(), LineSelection::All, false).unwrap();

        let slots: BTreeSet<Option<usize>> = best.iter().map(|p| p.line).collect();
        prop_assert_eq!(slots.len(), best.len());
        prop_assert!(best.len() <= patterns.lines().len());
        prop_assert!(best.len() <= many.len());
        for prize in &best {
            let line_max = many
                .iter()
                .filter(|p| p.line == prize.line)
                .map(|p| p.value)
                .max()
                .unwrap();
            prop_assert_eq!(prize.value, line_max);
        }
    }
}
