//! Submit and grade command implementations.

use crate::cli::{GradeArgs, SubmitArgs};
use crate::error::Result;
use crate::output::Formatter;
use ascent_domain::traits::EventSink;
use ascent_engine::ProgressionEngine;
use ascent_store::SqliteStore;

/// Execute the submit command.
pub fn execute_submit<E: EventSink>(
    args: SubmitArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let submission = engine.open_submission(store, args.athlete, args.challenge)?;
    println!("{}", formatter.format_submission(&submission)?);
    Ok(())
}

/// Execute the grade command.
pub fn execute_grade<E: EventSink>(
    args: GradeArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let review = engine.grade_submission(store, args.submission, args.value, args.status.into())?;
    println!("{}", formatter.format_review(&review)?);
    Ok(())
}
