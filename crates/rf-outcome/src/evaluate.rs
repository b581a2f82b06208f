//! Prize evaluation — lines, ways and scatters over a symbol window
//!
//! All evaluators are pure: they read the window, patterns and prizes and
//! return fresh [`CellPrizeResult`]s.
//!
//! ## Matching
//!
//! A group matches a prize when any of its cells shows one of the prize's
//! symbols. A prize hits when the run (Left/Right) or the number of matching
//! groups (Any) equals the prize count exactly, and [`check_add_prize`]
//! passes on the winning cells.

use crate::error::{OutcomeError, OutcomeResult};
use crate::mask::CellMask;
use crate::pattern::{Pattern, Patterns};
use crate::prize::{CellPrizeResult, LineSelection, MaskPrize, Strategy, check_add_prize};
use crate::window::SymbolWindowResult;

// ═══════════════════════════════════════════════════════════════════════════════
// MATCHING
// ═══════════════════════════════════════════════════════════════════════════════

/// A run longer than the prize count can no longer hit
fn early_out(run: usize, count: usize) -> bool {
    run > count
}

/// Contiguous matching run over `groups`; winning cells when it equals `count`
fn contiguous_run<'a>(
    groups: impl Iterator<Item = &'a CellMask>,
    prize_mask: &CellMask,
    count: usize,
) -> OutcomeResult<Option<CellMask>> {
    let mut run = 0;
    let mut winning = CellMask::all_false(prize_mask.bit_length());
    for group in groups {
        if !group.and_not_empty(prize_mask)? {
            break;
        }
        run += 1;
        if early_out(run, count) {
            return Ok(None);
        }
        winning = winning.or(&group.and(prize_mask)?)?;
    }
    Ok((run == count).then_some(winning))
}

/// Matching groups anywhere on the pattern; no early out
fn any_groups<'a>(pattern: &'a Pattern, prize_mask: &CellMask) -> OutcomeResult<Vec<&'a CellMask>> {
    let mut matched = Vec::new();
    for group in pattern.groups() {
        if group.and_not_empty(prize_mask)? {
            matched.push(group);
        }
    }
    Ok(matched)
}

fn union_within(groups: &[&CellMask], prize_mask: &CellMask) -> OutcomeResult<CellMask> {
    groups
        .iter()
        .try_fold(CellMask::all_false(prize_mask.bit_length()), |acc, group| {
            acc.or(&group.and(prize_mask)?)
        })
}

/// Winning masks of one prize on one pattern
fn match_pattern(pattern: &Pattern, prize: &MaskPrize, prize_mask: &CellMask) -> OutcomeResult<Vec<CellMask>> {
    let groups = pattern.groups();
    let count = prize.count;
    let hits = match prize.strategy {
        Strategy::Left => contiguous_run(groups.iter(), prize_mask, count)?
            .into_iter()
            .collect(),
        Strategy::Right => contiguous_run(groups.iter().rev(), prize_mask, count)?
            .into_iter()
            .collect(),
        Strategy::Any => {
            let matched = any_groups(pattern, prize_mask)?;
            if matched.len() == count {
                vec![union_within(&matched, prize_mask)?]
            } else {
                Vec::new()
            }
        }
        Strategy::Both => {
            let left = contiguous_run(groups.iter(), prize_mask, count)?;
            let right = contiguous_run(groups.iter().rev(), prize_mask, count)?;
            match (left, right) {
                // Full-line match seen from both ends
                (Some(l), Some(r)) if l == r => vec![l],
                (l, r) => l.into_iter().chain(r).collect(),
            }
        }
    };
    Ok(hits)
}

fn prize_result(prize: &MaskPrize, pattern: &Pattern, line: Option<usize>, value: i64, winning: CellMask) -> CellPrizeResult {
    log::trace!(
        "[Evaluate] {} hit on {} for {}",
        prize.name,
        pattern.name(),
        value
    );
    CellPrizeResult {
        name: prize.name.clone(),
        count: prize.count,
        value,
        pattern: pattern.name().to_string(),
        line,
        winning_mask: winning,
        kind: prize.kind.clone(),
    }
}

/// Cells showing any of the prize's symbols, or `None` when nothing can hit
fn live_prize_mask(window: &SymbolWindowResult, prize: &MaskPrize) -> OutcomeResult<Option<CellMask>> {
    if prize.count == 0 {
        return Ok(None);
    }
    let mask = window.union_of(&prize.symbols)?;
    Ok((!mask.is_empty()).then_some(mask))
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINES
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate line prizes over the selected lines
///
/// With `pay_best`, each line slot keeps only its highest paying hit (an
/// equal value keeps the earlier prize) and results come back in line
/// order. Otherwise every hit is returned.
pub fn evaluate_lines(
    window: &SymbolWindowResult,
    patterns: &Patterns,
    prizes: &[MaskPrize],
    selection: LineSelection,
    pay_best: bool,
) -> OutcomeResult<Vec<CellPrizeResult>> {
    let available = patterns.lines().len();
    let selected = selection.resolve(available);
    if selected == 0 {
        if available == 0 {
            log::warn!("[Evaluate] No line patterns configured");
        }
        return Ok(Vec::new());
    }
    let lines = &patterns.lines()[..selected];

    let mut best: Vec<Option<CellPrizeResult>> = vec![None; if pay_best { selected } else { 0 }];
    let mut many = Vec::new();

    for prize in prizes {
        let Some(prize_mask) = live_prize_mask(window, prize)? else {
            continue;
        };
        for (slot, line) in lines.iter().enumerate() {
            for winning in match_pattern(line, prize, &prize_mask)? {
                if !check_add_prize(prize, &winning, window) {
                    continue;
                }
                let hit = prize_result(prize, line, Some(slot), prize.value, winning);
                if pay_best {
                    let current = &mut best[slot];
                    if current.as_ref().is_none_or(|c| hit.value > c.value) {
                        *current = Some(hit);
                    }
                } else {
                    many.push(hit);
                }
            }
        }
    }

    if pay_best {
        Ok(best.into_iter().flatten().collect())
    } else {
        Ok(many)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WAYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate ways prizes
///
/// Without cluster patterns this is a pay-many line evaluation. With
/// clusters, Left and Any are supported and a hit pays value × ways, where
/// ways is the product of matching cells per matched group. Right and Both
/// are rejected before anything is evaluated.
pub fn evaluate_ways(
    window: &SymbolWindowResult,
    patterns: &Patterns,
    prizes: &[MaskPrize],
) -> OutcomeResult<Vec<CellPrizeResult>> {
    let Some(clusters) = patterns.clusters() else {
        return evaluate_lines(window, patterns, prizes, LineSelection::All, false);
    };
    if let Some(prize) = prizes
        .iter()
        .find(|p| matches!(p.strategy, Strategy::Right | Strategy::Both))
    {
        return Err(OutcomeError::UnsupportedStrategy {
            strategy: prize.strategy,
            evaluation: "ways",
        });
    }

    let mut results = Vec::new();
    for prize in prizes {
        let Some(prize_mask) = live_prize_mask(window, prize)? else {
            continue;
        };
        for cluster in clusters {
            let matched: Vec<&CellMask> = match prize.strategy {
                Strategy::Left => {
                    let mut run = Vec::new();
                    for group in cluster.groups() {
                        if !group.and_not_empty(&prize_mask)? || early_out(run.len() + 1, prize.count) {
                            break;
                        }
                        run.push(group);
                    }
                    // A longer run belongs to a longer prize
                    let longer = cluster
                        .groups()
                        .get(run.len())
                        .map(|next| next.and_not_empty(&prize_mask))
                        .transpose()?
                        .unwrap_or(false);
                    if longer { Vec::new() } else { run }
                }
                _ => any_groups(cluster, &prize_mask)?,
            };
            if matched.len() != prize.count {
                continue;
            }

            let mut ways: i64 = 1;
            for group in &matched {
                let cells = group.and(&prize_mask)?.true_count() as i64;
                ways = ways
                    .checked_mul(cells)
                    .ok_or_else(|| OutcomeError::MultiplierOverflow(prize.name.clone()))?;
            }
            let value = prize
                .value
                .checked_mul(ways)
                .ok_or_else(|| OutcomeError::MultiplierOverflow(prize.name.clone()))?;

            let winning = union_within(&matched, &prize_mask)?;
            if check_add_prize(prize, &winning, window) {
                results.push(prize_result(prize, cluster, None, value, winning));
            }
        }
    }
    Ok(results)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCATTERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate scatter prizes
///
/// With cluster patterns a prize hits when the number of matching cells
/// inside a cluster equals its count. Without clusters, scatters are
/// degenerate lines and go through pay-many line evaluation.
pub fn evaluate_scatters(
    window: &SymbolWindowResult,
    patterns: &Patterns,
    prizes: &[MaskPrize],
) -> OutcomeResult<Vec<CellPrizeResult>> {
    let Some(clusters) = patterns.clusters() else {
        return evaluate_lines(window, patterns, prizes, LineSelection::All, false);
    };

    let mut results = Vec::new();
    for prize in prizes {
        let Some(prize_mask) = live_prize_mask(window, prize)? else {
            continue;
        };
        for cluster in clusters {
            let matched = cluster.mask().and(&prize_mask)?;
            if matched.true_count() == prize.count && check_add_prize(prize, &matched, window) {
                results.push(prize_result(prize, cluster, None, prize.value, matched));
            }
        }
    }
    Ok(results)
}
