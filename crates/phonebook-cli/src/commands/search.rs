//! Search command handler

use anyhow::{bail, Result};

use phonebook_core::{Lookup, Query, Table};

use crate::output::Output;

/// Print every entry matching all given search fields
pub fn run(table: &mut Table, query: Query, output: &Output) -> Result<()> {
    match table.search(&query)? {
        Lookup::Found(docs) => output.print_documents(&docs),
        Lookup::NoMatches => output.message("No entries matching the criteria"),
        Lookup::NoQuery => {
            bail!("Nothing to search for. Use --search-first-name and/or --search-last-name")
        }
    }
    Ok(())
}
