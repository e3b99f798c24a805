//! Breakthrough command implementation.

use crate::cli::BreakthroughArgs;
use crate::error::Result;
use crate::output::Formatter;
use ascent_domain::traits::EventSink;
use ascent_engine::ProgressionEngine;
use ascent_store::SqliteStore;

/// Execute the breakthrough command.
///
/// Without `--confirm` the requirement is only evaluated.
pub fn execute_breakthrough<E: EventSink>(
    args: BreakthroughArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    if args.confirm {
        let outcome = engine.confirm_breakthrough(store, args.athlete, args.domain)?;
        println!("{}", formatter.format_award(&outcome)?);
    } else {
        let status = engine.resolve_breakthrough(store, args.athlete, args.domain)?;
        println!("{}", formatter.format_breakthrough(status.as_ref())?);
    }
    Ok(())
}
