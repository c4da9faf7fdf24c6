//! Status command handler

use anyhow::Result;

use phonebook_core::{Config, Table};

use crate::output::{Output, OutputFormat};

/// Show table location and counts
pub fn show(table: &mut Table, config: &Config, output: &Output) -> Result<()> {
    let stats = table.stats()?;
    let backend = table.backend();
    let size = backend.size()?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "table": table.name(),
                    "path": backend.path(),
                    "mode": backend.mode().as_str(),
                    "size": size,
                    "page_size": config.page_size,
                    "counts": {
                        "documents": stats.documents,
                        "first_names": stats.first_name_values,
                        "last_names": stats.last_name_values
                    },
                    "next_id": stats.next_id
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.documents);
        }
        OutputFormat::Human => {
            println!("Phonebook Status");
            println!("================");
            println!();
            println!("Table:");
            println!("  Name:     {}", table.name());
            println!("  Location: {}", backend.path().display());
            println!("  Mode:     {}", backend.mode());
            println!("  Size:     {} bytes", size);
            println!();
            println!("Contents:");
            println!("  Entries:             {}", stats.documents);
            println!("  Distinct first names: {}", stats.first_name_values);
            println!("  Distinct last names:  {}", stats.last_name_values);
            match stats.next_id {
                Some(id) => println!("  Next id:             {}", id),
                None => println!("  Next id:             none (ids exhausted)"),
            }
        }
    }

    Ok(())
}
