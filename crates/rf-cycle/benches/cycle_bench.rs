//! Cycle queue benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rf_cycle::{CycleState, Cycles, CyclesModifier, DesiredExit, StageConnection, process_triggers};

fn bench_free_game_family(c: &mut Criterion) {
    let connections = vec![StageConnection::new("Base", "FreeGames", "Free")];
    let exits = vec![DesiredExit::new(
        "FreeGames",
        CyclesModifier::trigger("FreeGames", 10),
    )];

    c.bench_function("cycles_trigger_and_play_10", |b| {
        b.iter(|| {
            let cycles = Cycles::base_game("Base").complete_current().unwrap();
            let current = cycles.iter().next().unwrap().clone();
            let mut cycles = process_triggers(&cycles, &current, &exits, &connections).unwrap();
            while !cycles.is_finished() {
                cycles = cycles.complete_current().unwrap();
            }
            black_box(cycles)
        })
    });
}

fn bench_retrigger(c: &mut Criterion) {
    let cycles = Cycles::new(CycleState::new("FreeGames", "Free", 10));
    let current = cycles.current().unwrap().clone();
    let modifier = CyclesModifier::retrigger("FreeGames", 5);
    let stage = current.stage.clone();

    c.bench_function("cycles_retrigger", |b| {
        b.iter(|| black_box(modifier.apply(&cycles, &current, &stage).unwrap()))
    });
}

criterion_group!(benches, bench_free_game_family, bench_retrigger);
criterion_main!(benches);
