//! Cycle flow tests
//!
//! Walks whole rounds through the cycle queue the way the outcome engine
//! drives it: complete the current cycle, then apply the stage's exits.

use rf_cycle::{
    CycleId, CycleState, Cycles, CyclesModifier, DesiredExit, Inputs, Lifespan, StageConnection,
    StageResult, TriggerPosition, create_inputs_for_cycle, process_triggers,
};
use serde_json::json;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

fn connections() -> Vec<StageConnection> {
    vec![
        StageConnection::new("Base", "FreeGames", "Free"),
        StageConnection::new("Base", "Respin", "Respin"),
        StageConnection::new("Free", "Respin", "Respin"),
    ]
}

/// Complete the current cycle and apply `exits`
fn step(cycles: &Cycles, exits: &[DesiredExit]) -> Cycles {
    let completed = cycles.complete_current().unwrap();
    let current = cycles.current().unwrap();
    let current = completed.get(&current.id).unwrap().clone();
    process_triggers(&completed, &current, exits, &connections()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUNDS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_base_game_without_exits_finishes() {
    let cycles = step(&Cycles::base_game("Base"), &[]);
    assert!(cycles.is_finished());
    assert_eq!(cycles.len(), 1);
}

#[test]
fn test_free_games_with_retrigger() {
    let trigger = DesiredExit::new("FreeGames", CyclesModifier::trigger("FreeGames", 3));
    let mut cycles = step(&Cycles::base_game("Base"), &[trigger]);

    let current = cycles.current().unwrap();
    assert_eq!(current.stage.as_str(), "Free");
    assert_eq!(current.remaining(), 3);

    // First free game retriggers its own family (no Free/FreeGames connection,
    // so the exit loops back to the Free stage)
    let retrigger = DesiredExit::new("FreeGames", CyclesModifier::retrigger("FreeGames", 2));
    cycles = step(&cycles, &[retrigger]);
    let current = cycles.current().unwrap();
    assert_eq!(current.total_cycles, 5);
    assert_eq!(current.completed_cycles, 1);

    let mut played = 1;
    while !cycles.is_finished() {
        cycles = step(&cycles, &[]);
        played += 1;
    }
    assert_eq!(played, 5);
}

#[test]
fn test_respin_front_of_queue_during_free_games() {
    let trigger = DesiredExit::new("FreeGames", CyclesModifier::trigger("FreeGames", 2));
    let cycles = step(&Cycles::base_game("Base"), &[trigger]);

    let respin = DesiredExit::new(
        "Respin",
        CyclesModifier::trigger("Respin", 3).at(TriggerPosition::Front),
    );
    let cycles = step(&cycles, &[respin]);

    let current = cycles.current().unwrap();
    assert_eq!(current.id, CycleId::new("Respin"));
    assert_eq!(current.stage.as_str(), "Respin");
}

#[test]
fn test_respin_reset_keeps_feature_alive() {
    let mut cycles = Cycles::new(CycleState::new("Respin", "Respin", 3));

    // Two misses, then a hit on the last attempt re-arms three respins
    cycles = step(&cycles, &[]);
    cycles = step(&cycles, &[]);
    assert!(cycles.current().unwrap().is_last_attempt());

    let hit = DesiredExit::new("Respin", CyclesModifier::RespinReset { count: 3 });
    cycles = step(&cycles, &[hit]);
    assert_eq!(cycles.current().unwrap().remaining(), 3);
}

#[test]
fn test_cycle_carry_over_scenario() {
    let cycles = step(&Cycles::base_game("Base"), &[]);
    let inputs = Inputs::new()
        .with("X", json!(5), Lifespan::Permanent)
        .with("Once", json!(1), Lifespan::OneCycle)
        .with("Game", json!(2), Lifespan::OneGame);
    let results = vec![StageResult::permanent("Y", json!(7))];

    let next = create_inputs_for_cycle(&cycles, &inputs, &results).unwrap();
    assert_eq!(next.value::<i64>("X"), Some(5));
    assert_eq!(next.value::<i64>("Y"), Some(7));
    assert!(next.iter().all(|v| v.lifespan == Lifespan::Permanent));
}
