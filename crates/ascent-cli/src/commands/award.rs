//! Award command implementation.

use crate::cli::AwardArgs;
use crate::error::Result;
use crate::output::Formatter;
use ascent_domain::traits::EventSink;
use ascent_engine::{AwardRequest, ProgressionEngine};
use ascent_store::SqliteStore;

/// Execute the award command.
pub fn execute_award<E: EventSink>(
    args: AwardArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let mut request = AwardRequest::new(args.athlete, args.domain, args.amount, args.source.into());
    request.source_ref = args.source_ref;
    request.note = args.note;

    let outcome = engine.award_xp(store, &request)?;
    println!("{}", formatter.format_award(&outcome)?);
    Ok(())
}
