//! Default cycle orchestration: input carry-over and exit processing
//!
//! Game titles may replace either step; these are the stock behaviours.

use crate::cycle::{CycleState, Cycles};
use crate::error::{CycleError, CycleResult};
use crate::stage::{DesiredExit, ResultKind, StageConnection, StageResult};
use crate::variable::{Inputs, Lifespan, Variable};

/// Build the inputs for the next cycle
///
/// When the queue is finished the round is over, so only permanent
/// variables survive; a `VariablePermanent` result overrides an input of the
/// same name. Mid-round, one-cycle variables are dropped and every result is
/// re-seeded as a variable with the lifespan of its kind. A result that is
/// not a variable kind is rejected.
pub fn create_inputs_for_cycle(
    cycles: &Cycles,
    inputs: &Inputs,
    results: &[StageResult],
) -> CycleResult<Inputs> {
    if cycles.is_finished() {
        let mut next = inputs.filtered(|l| l == Lifespan::Permanent);
        for result in results
            .iter()
            .filter(|r| r.kind == ResultKind::VariablePermanent)
        {
            next.set(Variable::new(
                result.name.clone(),
                result.value.clone(),
                Lifespan::Permanent,
            ));
        }
        return Ok(next);
    }

    let mut next = inputs.filtered(|l| l != Lifespan::OneCycle);
    for result in results {
        let lifespan = result
            .kind
            .lifespan()
            .ok_or_else(|| CycleError::UnsupportedResultType {
                name: result.name.clone(),
                kind: result.kind,
            })?;
        next.set(Variable::new(result.name.clone(), result.value.clone(), lifespan));
    }
    Ok(next)
}

/// Apply the exits a stage asked for
///
/// An exit with a configured connection out of the current stage targets
/// that connection's final stage. An exit without one loops back to the
/// current stage.
pub fn process_triggers(
    cycles: &Cycles,
    current: &CycleState,
    exits: &[DesiredExit],
    connections: &[StageConnection],
) -> CycleResult<Cycles> {
    let mut next = cycles.clone();
    for exit in exits {
        let target = connections
            .iter()
            .find(|c| c.matches(&current.stage, &exit.name))
            .map(|c| &c.final_stage)
            .unwrap_or(&current.stage);
        next = exit.modifier.apply(&next, current, target)?;
    }
    Ok(next)
}
