//! Run loop shared by the single and multi-domain solvers

use super::error::SolverExecutionError;
use super::traits::{SolveOutcome, SolveReport, SolverConfiguration};
use crate::output::Storage;

/// Something that can be advanced one committed step at a time
pub(crate) trait Stepper {
    /// Global step index of the committed state
    fn step_index(&self) -> usize;

    fn time_step(&self) -> f64;

    /// Compute step `step_index() + 1` from the committed state and commit it
    ///
    /// Nothing is committed when an error is returned.
    fn advance(&mut self) -> Result<(), SolverExecutionError>;

    /// Hand the committed state to `storage`, returning the number of snapshots written
    fn emit(&self, storage: &mut dyn Storage) -> Result<usize, SolverExecutionError>;
}

/// Drive `stepper` until the stop condition, cancellation or the first error
///
/// Snapshot policy:
/// - the state at entry is always written
/// - then every `output_every`-th step of this run, counted from entry
/// - the last step of the run is always written
/// - a cancelled run writes its current state unless already written
pub(crate) fn drive(
    stepper: &mut impl Stepper,
    storage: &mut dyn Storage,
    config: &SolverConfiguration,
) -> Result<SolveReport, SolverExecutionError> {
    config.validate().map_err(SolverExecutionError::InvalidConfiguration)?;
    storage.ready().map_err(SolverExecutionError::StorageUnavailable)?;

    let total = config.stop.steps_for(stepper.time_step());
    let start = stepper.step_index();

    let mut written = stepper.emit(storage)?;
    let mut last_written = start;
    let mut outcome = SolveOutcome::Completed;

    for taken in 1..=total {
        if config.is_cancelled() {
            outcome = SolveOutcome::Cancelled;
            break;
        }

        stepper.advance()?;

        if taken % config.output_every == 0 || taken == total {
            written += stepper.emit(storage)?;
            last_written = stepper.step_index();
        }
    }

    let final_step = stepper.step_index();
    if last_written != final_step {
        written += stepper.emit(storage)?;
    }

    storage
        .flush()
        .map_err(|source| SolverExecutionError::StorageFlush { step: final_step, source })?;

    Ok(SolveReport {
        outcome,
        steps_taken: final_step - start,
        final_step,
        final_time: final_step as f64 * stepper.time_step(),
        snapshots_written: written,
    })
}

// =================================================================================================
// Tests
// =================================================================================================
