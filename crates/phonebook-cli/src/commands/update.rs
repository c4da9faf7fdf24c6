//! Update command handler

use anyhow::{bail, Context, Result};

use phonebook_core::{Document, Query, Table, UpdateOutcome};

use super::parse_payload;
use crate::output::Output;

/// Overwrite fields of every entry matching the search fields
pub fn run(
    table: &mut Table,
    query: Query,
    fields: Document,
    doc: Option<String>,
    output: &Output,
) -> Result<()> {
    if query.is_empty() {
        bail!("Nothing to match. Use --search-first-name and/or --search-last-name");
    }

    let outcome = match doc {
        Some(raw) => {
            if !fields.is_empty() {
                bail!("Use either --doc or field flags, not both");
            }
            table
                .update_value(&query, parse_payload(&raw)?)
                .context("Failed to update entries")?
        }
        None => {
            if fields.is_empty() {
                bail!("Nothing to update. Provide at least one field flag");
            }
            table
                .update(&query, fields)
                .context("Failed to update entries")?
        }
    };

    match outcome {
        UpdateOutcome::NotFound => output.message("No entries matching the criteria"),
        UpdateOutcome::Updated { count } => {
            if output.is_json() {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "success",
                        "message": "Saved successfully",
                        "updated": count
                    })
                );
            } else {
                output.success("Saved successfully");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use phonebook_core::{AccessMode, IndexedField, Lookup};
    use tempfile::TempDir;

    fn open(temp_dir: &TempDir) -> Table {
        Table::open("phone_book", temp_dir.path().join("phonebook.json"), AccessMode::ReadWrite)
            .unwrap()
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_update_from_flags() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = open(&temp_dir);
        table
            .insert(Document::new().with("first_name", "Ann").with("last_name", "Lee"))
            .unwrap();

        let query = Query::new().with(IndexedField::LastName, "Lee");
        run(
            &mut table,
            query,
            Document::new().with("last_name", "Park"),
            None,
            &quiet(),
        )
        .unwrap();

        let park = Query::new().with(IndexedField::LastName, "Park");
        assert!(table.search(&park).unwrap().is_found());
    }

    #[test]
    fn test_update_from_payload() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = open(&temp_dir);
        table
            .insert(Document::new().with("first_name", "Ann").with("last_name", "Lee"))
            .unwrap();

        let query = Query::new().with(IndexedField::FirstName, "Ann");
        run(
            &mut table,
            query.clone(),
            Document::new(),
            Some(r#"{"company_name": "Acme"}"#.to_string()),
            &quiet(),
        )
        .unwrap();

        let Lookup::Found(docs) = table.search(&query).unwrap() else {
            panic!("expected a match");
        };
        assert_eq!(docs[0].get("company_name"), Some("Acme"));

        // Not a mapping
        let err = run(
            &mut table,
            query,
            Document::new(),
            Some(r#"["Acme"]"#.to_string()),
            &quiet(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("not a mapping"));
    }

    #[test]
    fn test_update_requires_query_and_fields() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = open(&temp_dir);

        assert!(run(
            &mut table,
            Query::new(),
            Document::new().with("last_name", "Park"),
            None,
            &quiet()
        )
        .is_err());

        let query = Query::new().with(IndexedField::LastName, "Lee");
        assert!(run(&mut table, query, Document::new(), None, &quiet()).is_err());
    }
}
