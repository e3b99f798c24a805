//! Prime command implementation.

use crate::cli::AthleteArgs;
use crate::error::Result;
use crate::output::Formatter;
use ascent_domain::traits::EventSink;
use ascent_engine::ProgressionEngine;
use ascent_store::SqliteStore;
use std::collections::HashMap;

/// Execute the prime command.
pub fn execute_prime<E: EventSink>(
    args: AthleteArgs,
    engine: &mut ProgressionEngine<E>,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let prime = engine.prime_level(store, args.athlete)?;
    let rows = engine.progress_for(store, args.athlete)?;

    let names: HashMap<_, _> = store.domains()?.into_iter().map(|d| (d.id, d.name)).collect();
    println!("{}", formatter.format_progress(prime, &rows, &names)?);
    Ok(())
}
