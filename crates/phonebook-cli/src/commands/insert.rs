//! Insert command handler

use anyhow::{bail, Context, Result};

use phonebook_core::{Document, Table};

use super::parse_payload;
use crate::output::Output;

/// Insert a new entry from field flags or a raw JSON payload
pub fn run(
    table: &mut Table,
    fields: Document,
    doc: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = match doc {
        Some(raw) => {
            if !fields.is_empty() {
                bail!("Use either --doc or field flags, not both");
            }
            table
                .insert_value(parse_payload(&raw)?)
                .context("Failed to insert entry")?
        }
        None => table.insert(fields).context("Failed to insert entry")?,
    };

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({"status": "success", "message": "Saved successfully", "id": id})
        );
    } else {
        output.success("Saved successfully");
    }

    Ok(())
}
