//! Ledger command implementation.

use crate::cli::LedgerArgs;
use crate::error::Result;
use crate::output::Formatter;
use ascent_domain::traits::EventSink;
use ascent_engine::ProgressionEngine;
use ascent_store::SqliteStore;

/// Execute the ledger command.
pub fn execute_ledger<E: EventSink>(
    args: LedgerArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let mut entries = engine.ledger_history(store, args.athlete, args.domain)?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }
    println!("{}", formatter.format_ledger(&entries)?);
    Ok(())
}
